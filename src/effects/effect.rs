//! Card effect variants.
//!
//! Each card id maps to one `CardEffect`, bound when the battle is built.
//! An effect sees both sides and the play in progress through an
//! `EffectContext`, and returns the play's new damage, magic flag and target
//! as an `EffectOutcome`.
//!
//! ## Variants
//!
//! Damage:
//! - `ScaleDamage`: multiply the pending damage
//! - `Cosmetic`: no state change
//!
//! Resources:
//! - `DrainOpponentMana`: lower the opponent's base mana, floor 0
//! - `GainMana`: raise the owner's base mana, uncapped
//! - `HealBase`: raise the owner's base health
//!
//! Cards:
//! - `Draw`, `OpponentDiscardsLast`, `StealDeckTop`, `MillOpponent`,
//!   `MillBoth`, `Rebalance`, `WipeOpponentDeck`

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::battle::{PlayerState, Target};
use crate::cards::Card;

/// An effect failed and was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EffectFault {
    #[error("damage {damage} times {factor} overflows")]
    DamageOverflow { damage: i32, factor: i32 },
}

/// The mutable part of a play: what will hit, how hard, and how.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EffectOutcome {
    pub damage: i32,
    pub magic: bool,
    pub target: Target,
}

/// Everything an effect may look at or change.
pub struct EffectContext<'a> {
    /// Side playing the card. The card has already left its hand.
    pub owner: &'a mut PlayerState,
    pub opponent: &'a mut PlayerState,
    /// Front slot of the acting character.
    pub actor: usize,
    pub card: &'a Card,
    /// The play as it stands before this effect.
    pub pending: EffectOutcome,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardEffect {
    ScaleDamage(i32),
    Cosmetic,
    /// Owner draws up to this many cards.
    Draw(usize),
    DrainOpponentMana(i32),
    GainMana(i32),
    HealBase(i32),
    /// Opponent discards the last card in hand.
    OpponentDiscardsLast,
    /// Move up to this many cards from the top of the opponent's deck onto
    /// the top of the owner's deck.
    StealDeckTop(usize),
    /// Destroy cards from the top and bottom of the opponent's deck.
    MillOpponent { top: usize, bottom: usize },
    /// Destroy cards from both decks. An owner left without a deck has its
    /// base health set to 0.
    MillBoth { top: usize, bottom: usize },
    /// Owner discards the whole hand and draws as many.
    Rebalance,
    WipeOpponentDeck,
}

impl CardEffect {
    /// Apply the effect, returning the play's new shape.
    pub fn apply(&self, ctx: &mut EffectContext<'_>) -> Result<EffectOutcome, EffectFault> {
        let mut outcome = ctx.pending;

        match *self {
            CardEffect::ScaleDamage(factor) => {
                outcome.damage = outcome
                    .damage
                    .checked_mul(factor)
                    .ok_or(EffectFault::DamageOverflow {
                        damage: outcome.damage,
                        factor,
                    })?;
            }
            CardEffect::Cosmetic => {}
            CardEffect::Draw(count) => {
                ctx.owner.draw(count);
            }
            CardEffect::DrainOpponentMana(amount) => {
                ctx.opponent.base_mana = (ctx.opponent.base_mana - amount).max(0);
            }
            CardEffect::GainMana(amount) => {
                ctx.owner.base_mana = ctx.owner.base_mana.saturating_add(amount);
            }
            CardEffect::HealBase(amount) => {
                ctx.owner.base_health = ctx.owner.base_health.saturating_add(amount);
            }
            CardEffect::OpponentDiscardsLast => {
                if let Some(last) = ctx.opponent.hand.len().checked_sub(1) {
                    ctx.opponent.discard_from_hand(last);
                }
            }
            CardEffect::StealDeckTop(count) => {
                for _ in 0..count {
                    match ctx.opponent.deck.pop_back() {
                        Some(card) => ctx.owner.deck.push_back(card),
                        None => break,
                    }
                }
            }
            CardEffect::MillOpponent { top, bottom } => {
                ctx.opponent.mill_top(top);
                ctx.opponent.mill_bottom(bottom);
            }
            CardEffect::MillBoth { top, bottom } => {
                for side in [&mut *ctx.owner, &mut *ctx.opponent] {
                    side.mill_top(top);
                    side.mill_bottom(bottom);
                }
                if ctx.owner.deck.is_empty() {
                    ctx.owner.base_health = 0;
                }
            }
            CardEffect::Rebalance => {
                let count = ctx.owner.hand.len();
                let hand = std::mem::take(&mut ctx.owner.hand);
                ctx.owner.discard.append(hand);
                ctx.owner.draw(count);
            }
            CardEffect::WipeOpponentDeck => {
                let deck = std::mem::take(&mut ctx.opponent.deck);
                ctx.opponent.discard.append(deck);
            }
        }

        Ok(outcome)
    }

    /// Apply the effect, falling back to the pending play on a fault.
    pub fn resolve(&self, ctx: &mut EffectContext<'_>) -> EffectOutcome {
        match self.apply(ctx) {
            Ok(outcome) => outcome,
            Err(fault) => {
                log::warn!("effect of {:?} skipped: {fault}", ctx.card.id);
                ctx.pending
            }
        }
    }
}
