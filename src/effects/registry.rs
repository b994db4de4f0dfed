//! Card id to effect lookup.

use rustc_hash::FxHashMap;

use super::effect::{CardEffect, EffectContext, EffectOutcome};

/// Registry of card effects, keyed by card id.
#[derive(Clone, Debug, Default)]
pub struct EffectRegistry {
    effects: FxHashMap<String, CardEffect>,
}

impl EffectRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in effect table.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for (id, effect) in [
            ("Wordle", CardEffect::ScaleDamage(2)),
            ("madposion", CardEffect::ScaleDamage(3)),
            ("IDontcar", CardEffect::Cosmetic),
            ("organichemistry", CardEffect::Draw(3)),
            ("slowdown", CardEffect::DrainOpponentMana(2)),
            ("Timeelder", CardEffect::OpponentDiscardsLast),
            ("LGBTQ", CardEffect::GainMana(1000)),
            ("Lazarus,Arise!", CardEffect::HealBase(5)),
            ("DontForgotMe", CardEffect::StealDeckTop(8)),
            ("TheCardLetMeWin", CardEffect::MillOpponent { top: 2, bottom: 2 }),
            ("TheCardLetYouLose", CardEffect::MillBoth { top: 2, bottom: 2 }),
            ("whAt", CardEffect::MillOpponent { top: 1, bottom: 0 }),
            ("balance", CardEffect::Rebalance),
            ("TearAll", CardEffect::WipeOpponentDeck),
        ] {
            registry.register(id, effect);
        }
        registry
    }

    /// Bind an effect to a card id.
    ///
    /// Panics if the id already has an effect.
    pub fn register(&mut self, card_id: impl Into<String>, effect: CardEffect) {
        let card_id = card_id.into();
        if self.effects.contains_key(&card_id) {
            panic!("Effect for {:?} already registered", card_id);
        }
        self.effects.insert(card_id, effect);
    }

    #[must_use]
    pub fn has(&self, card_id: &str) -> bool {
        self.effects.contains_key(card_id)
    }

    #[must_use]
    pub fn get(&self, card_id: &str) -> Option<CardEffect> {
        self.effects.get(card_id).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Run the effect registered for `card_id`.
    ///
    /// Unknown ids and faulting effects leave the pending play unchanged.
    pub fn invoke(&self, card_id: &str, ctx: &mut EffectContext<'_>) -> EffectOutcome {
        match self.effects.get(card_id) {
            Some(effect) => effect.resolve(ctx),
            None => ctx.pending,
        }
    }
}
