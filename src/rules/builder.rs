//! Battle construction.

use crate::battle::{BattleSetupError, PlayerState};
use crate::cards::ContentIndex;
use crate::core::{BattleConfig, GameRng, Side, SidePair};
use crate::deck::Deck;
use crate::effects::EffectRegistry;

use super::engine::TurnEngine;

/// One side's inputs to a battle.
#[derive(Clone, Copy, Debug)]
pub struct SideSetup<'a> {
    pub name: &'a str,
    pub deck: &'a Deck,
    pub characters: &'a [String],
}

impl<'a> SideSetup<'a> {
    #[must_use]
    pub fn new(name: &'a str, deck: &'a Deck, characters: &'a [String]) -> Self {
        Self {
            name,
            deck,
            characters,
        }
    }
}

/// Builder for a `TurnEngine`.
///
/// ## Example
///
/// ```
/// use magicwound::cards::{Card, Character, ContentRegistry, Element, Rarity};
/// use magicwound::deck::{Deck, DeckMode};
/// use magicwound::rules::{BattleBuilder, SideSetup};
///
/// let mut content = ContentRegistry::new();
/// content.register_card(Card::new("whAt", "What?", Element::Water, 2, Rarity::Rare));
/// for id in ["a", "b", "c"] {
///     content.register_character(Character::new(id, id, Element::Water, 20, 20));
/// }
/// let deck = Deck::new("Tide", DeckMode::Casual);
/// let chars: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
///
/// let engine = BattleBuilder::new()
///     .seed(7)
///     .build(&content, SideSetup::new("Ann", &deck, &chars), SideSetup::new("Bo", &deck, &chars))
///     .unwrap();
/// assert_eq!(engine.turn(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct BattleBuilder {
    config: BattleConfig,
    effects: EffectRegistry,
    seed: Option<u64>,
}

impl Default for BattleBuilder {
    fn default() -> Self {
        Self {
            config: BattleConfig::default(),
            effects: EffectRegistry::standard(),
            seed: None,
        }
    }
}

impl BattleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: BattleConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the standard effect table.
    pub fn effects(mut self, effects: EffectRegistry) -> Self {
        self.effects = effects;
        self
    }

    /// Fix the shuffle seed. Without one, the battle seeds from entropy.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(
        self,
        index: &dyn ContentIndex,
        a: SideSetup<'_>,
        b: SideSetup<'_>,
    ) -> Result<TurnEngine, BattleSetupError> {
        let rng = match self.seed {
            Some(seed) => GameRng::new(seed),
            None => GameRng::from_entropy(),
        };

        let first = self.build_side(index, Side::A, a, &rng)?;
        let second = self.build_side(index, Side::B, b, &rng)?;

        Ok(TurnEngine::new(SidePair::new(first, second), self.config))
    }

    fn build_side(
        &self,
        index: &dyn ContentIndex,
        side: Side,
        setup: SideSetup<'_>,
        rng: &GameRng,
    ) -> Result<PlayerState, BattleSetupError> {
        PlayerState::build(
            setup.name,
            setup.deck,
            setup.characters,
            index,
            &self.effects,
            &mut rng.for_context(&format!("shuffle-{side}")),
            &self.config,
        )
    }
}

/// Build a battle with the standard rules and a random seed. Each side is
/// named after its deck.
pub fn create_battle(
    index: &dyn ContentIndex,
    deck_a: &Deck,
    deck_b: &Deck,
    chars_a: &[String],
    chars_b: &[String],
) -> Result<TurnEngine, BattleSetupError> {
    BattleBuilder::new().build(
        index,
        SideSetup::new(deck_a.name(), deck_a, chars_a),
        SideSetup::new(deck_b.name(), deck_b, chars_b),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Card, Character, ContentRegistry, Element, Rarity};
    use crate::deck::DeckMode;

    fn content() -> ContentRegistry {
        let mut registry = ContentRegistry::new();
        for i in 0..20 {
            registry.register_card(Card::new(format!("k{i}"), "K", Element::Fire, 1, Rarity::Common));
        }
        for id in ["a", "b", "c"] {
            registry.register_character(Character::new(id, id, Element::Fire, 20, 10));
        }
        registry
    }

    fn full_deck(registry: &ContentRegistry) -> Deck {
        let mut deck = Deck::new("Fire", DeckMode::Casual);
        for card in registry.all_cards() {
            deck.add_card(&card).unwrap();
        }
        deck
    }

    fn chars() -> Vec<String> {
        vec!["a".into(), "b".into(), "c".into()]
    }

    #[test]
    fn test_seeded_battles_repeat() {
        let registry = content();
        let deck = full_deck(&registry);
        let chars = chars();
        let build = || {
            BattleBuilder::new()
                .seed(99)
                .build(&registry, SideSetup::new("A", &deck, &chars), SideSetup::new("B", &deck, &chars))
                .unwrap()
        };

        let (one, two) = (build(), build());
        let ids = |e: &TurnEngine, s: Side| e.player(s).hand.iter().map(|c| c.id().to_string()).collect::<Vec<_>>();
        assert_eq!(ids(&one, Side::A), ids(&two, Side::A));
        assert_eq!(ids(&one, Side::B), ids(&two, Side::B));
        assert_eq!(one.player(Side::A).hand.len(), 4);
    }

    #[test]
    fn test_create_battle_names_sides_after_decks() {
        let registry = content();
        let deck = full_deck(&registry);
        let engine = create_battle(&registry, &deck, &deck, &chars(), &chars()).unwrap();
        assert_eq!(engine.player(Side::A).name, "Fire");
        assert_eq!(engine.player(Side::B).hand.len(), 3);
    }

    #[test]
    fn test_bad_roster_is_reported() {
        let registry = content();
        let deck = full_deck(&registry);
        let short = vec!["a".to_string()];
        let err = create_battle(&registry, &deck, &deck, &chars(), &short).unwrap_err();
        assert_eq!(err, BattleSetupError::WrongCharacterCount(1));
    }
}
