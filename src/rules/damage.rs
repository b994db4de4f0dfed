//! Cost and damage arithmetic.
//!
//! Shared by the local engine and the network mirror, which re-derives the
//! opponent's plays from what the wire tells it.

use crate::battle::{Hit, Lineup, PlayerState, Target};
use crate::cards::{Card, Character};

/// How a card's cost was covered.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Payment {
    pub energy: i32,
    pub mana: i32,
    pub health: i32,
    /// Set when paying with health defeated the caster.
    pub caster_hit: Option<Hit>,
}

impl Payment {
    #[must_use]
    pub fn total(&self) -> i32 {
        self.energy + self.mana + self.health
    }
}

/// What a damage application did on the defending side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DamageReport {
    pub target: Target,
    pub damage: i32,
    /// `None` for base hits.
    pub hit: Option<Hit>,
    /// Total taken from the defender's base, overflow included.
    pub base_loss: i32,
}

/// Physical cards are free; everything else costs its mana value.
#[must_use]
pub fn play_cost(card: &Card) -> i32 {
    if card.is_physical() {
        0
    } else {
        i32::try_from(card.cost).unwrap_or(i32::MAX)
    }
}

/// The card shares an element with the character playing it.
#[must_use]
pub fn elemental_match(card: &Card, caster: &Character) -> bool {
    card.elements.intersects(&caster.elements)
}

/// `max(1, cost)`, doubled on an elemental match.
#[must_use]
pub fn base_damage(card: &Card, matched: bool) -> i32 {
    let damage = i32::try_from(card.cost).unwrap_or(i32::MAX).max(1);
    if matched {
        damage.saturating_mul(2)
    } else {
        damage
    }
}

/// Pay `cost` for the front character at `actor`: energy first, then base
/// mana, then the caster's own health.
///
/// Health payment goes through the normal damage path, so a caster can be
/// defeated by its own play; overflow then lands on its own base.
pub fn pay_cost(player: &mut PlayerState, actor: usize, cost: i32) -> Payment {
    let mut payment = Payment::default();
    let mut remaining = cost.max(0);

    if let Some(caster) = player.lineup.front_mut(actor) {
        payment.energy = caster.spend_energy(remaining);
        remaining -= payment.energy;
    }

    payment.mana = remaining.min(player.base_mana.max(0));
    player.base_mana -= payment.mana;
    remaining -= payment.mana;

    if remaining > 0 {
        if let Some(hit) = player.lineup.take_damage(actor, remaining, false) {
            payment.health = hit.health_lost + hit.overflow;
            player.base_health -= hit.overflow;
            if hit.defeated {
                payment.caster_hit = Some(hit);
            }
        }
    }
    payment
}

/// Apply `damage` to the defending side.
///
/// Returns `None` if the target slot is empty.
pub fn apply_damage(
    base_health: &mut i32,
    lineup: &mut Lineup,
    target: Target,
    damage: i32,
    magic: bool,
) -> Option<DamageReport> {
    let damage = damage.max(0);
    match target {
        Target::Base => {
            *base_health = base_health.saturating_sub(damage);
            Some(DamageReport {
                target,
                damage,
                hit: None,
                base_loss: damage,
            })
        }
        Target::Character(slot) => {
            let hit = lineup.take_damage(slot, damage, magic)?;
            *base_health = base_health.saturating_sub(hit.overflow);
            Some(DamageReport {
                target,
                damage,
                base_loss: hit.overflow,
                hit: Some(hit),
            })
        }
    }
}
