//! Per-side battle state.
//!
//! ## Layout
//!
//! A side has a base (health and mana pools), a lineup of up to three
//! characters and three card piles. Slots 0 and 1 of the lineup are the
//! front line; the reserve waits behind them and is promoted into the first
//! front slot that loses its character.
//!
//! Piles are `im::Vector`s with the draw end at the back, so snapshots of a
//! side are cheap.

use std::sync::Arc;

use im::Vector;
use thiserror::Error;

use crate::cards::{Card, Character, ContentIndex};
use crate::core::{BattleConfig, GameRng};
use crate::deck::Deck;
use crate::effects::{CardEffect, EffectRegistry};

/// Number of front-line slots.
pub const FRONT_SLOTS: usize = 2;

/// Why a side could not be set up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleSetupError {
    #[error("unknown character id {0:?}")]
    UnknownCharacter(String),
    #[error("a side needs exactly 3 characters, got {0}")]
    WrongCharacterCount(usize),
    #[error("deck for {0:?} has no playable cards")]
    EmptyDeck(String),
}

/// A character on the field with its current health and energy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerCharacterState {
    character: Arc<Character>,
    health: i32,
    energy: i32,
}

impl PlayerCharacterState {
    /// Full health, half energy rounded up.
    #[must_use]
    pub fn new(character: Arc<Character>) -> Self {
        let health = character.max_health.max(0);
        let energy = (character.max_energy.max(0) + 1) / 2;
        Self {
            character,
            health,
            energy,
        }
    }

    #[must_use]
    pub fn character(&self) -> &Arc<Character> {
        &self.character
    }

    #[must_use]
    pub fn health(&self) -> i32 {
        self.health
    }

    #[must_use]
    pub fn energy(&self) -> i32 {
        self.energy
    }

    #[must_use]
    pub fn is_mage(&self) -> bool {
        self.character.is_mage()
    }

    /// Gain energy up to the character's maximum.
    pub fn regen_energy(&mut self, amount: i32) {
        self.energy = (self.energy + amount).min(self.character.max_energy).max(self.energy);
    }

    /// Spend up to `amount` energy. Returns what was actually spent.
    pub fn spend_energy(&mut self, amount: i32) -> i32 {
        let spent = amount.clamp(0, self.energy);
        self.energy -= spent;
        spent
    }

    /// Set energy, clamped to `[0, max]`.
    pub fn set_energy(&mut self, energy: i32) {
        self.energy = energy.clamp(0, self.character.max_energy.max(0));
    }

    /// Set health, clamped to `[0, max]`. Use `Lineup::take_damage` for
    /// anything that can defeat the character.
    pub fn set_health(&mut self, health: i32) {
        self.health = health.clamp(0, self.character.max_health.max(0));
    }
}

/// What one damage application did to a character slot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Hit {
    /// Points soaked up by energy.
    pub absorbed: i32,
    /// Points taken from health, capped at the health the character had.
    pub health_lost: i32,
    /// The character dropped to zero or below and left the field.
    pub defeated: bool,
    /// Damage beyond zero health, owed by the owner's base.
    pub overflow: i32,
    /// The reserve moved up into the emptied slot.
    pub promoted: bool,
}

/// Two front slots and a reserve.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Lineup {
    front: [Option<PlayerCharacterState>; FRONT_SLOTS],
    reserve: Option<PlayerCharacterState>,
}

impl Lineup {
    /// Place characters in order: two front slots, then the reserve.
    /// Anything past the third is ignored.
    #[must_use]
    pub fn new(characters: impl IntoIterator<Item = Arc<Character>>) -> Self {
        let mut lineup = Lineup::default();
        let mut states = characters.into_iter().map(PlayerCharacterState::new);
        lineup.front[0] = states.next();
        lineup.front[1] = states.next();
        lineup.reserve = states.next();
        lineup
    }

    #[must_use]
    pub fn front(&self, slot: usize) -> Option<&PlayerCharacterState> {
        self.front.get(slot).and_then(Option::as_ref)
    }

    pub fn front_mut(&mut self, slot: usize) -> Option<&mut PlayerCharacterState> {
        self.front.get_mut(slot).and_then(Option::as_mut)
    }

    #[must_use]
    pub fn reserve(&self) -> Option<&PlayerCharacterState> {
        self.reserve.as_ref()
    }

    /// Every character still on the field, front line first.
    pub fn iter(&self) -> impl Iterator<Item = &PlayerCharacterState> {
        self.front.iter().flatten().chain(self.reserve.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PlayerCharacterState> {
        self.front.iter_mut().flatten().chain(self.reserve.iter_mut())
    }

    /// Number of characters still on the field.
    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply `damage` to a front slot.
    ///
    /// Magic damage against a mage drains energy first. A character brought
    /// to zero or below is removed and the reserve, if any, takes its slot.
    /// Returns `None` if the slot is empty.
    pub fn take_damage(&mut self, slot: usize, damage: i32, magic: bool) -> Option<Hit> {
        let state = self.front.get_mut(slot)?.as_mut()?;
        let mut remaining = damage.max(0);

        let absorbed = if magic && state.is_mage() {
            state.spend_energy(remaining)
        } else {
            0
        };
        remaining -= absorbed;

        let after = state.health - remaining;
        let mut hit = Hit {
            absorbed,
            health_lost: remaining.min(state.health),
            ..Hit::default()
        };

        if after <= 0 {
            log::info!("{} is defeated", state.character.name);
            hit.defeated = true;
            hit.overflow = -after;
            self.front[slot] = self.reserve.take();
            hit.promoted = self.front[slot].is_some();
        } else {
            state.health = after;
        }
        Some(hit)
    }
}

/// A card in a pile, bound to its effect when the battle was built.
#[derive(Clone, Debug, PartialEq)]
pub struct BattleCard {
    pub card: Arc<Card>,
    pub effect: Option<CardEffect>,
}

impl BattleCard {
    #[must_use]
    pub fn bind(card: Arc<Card>, effects: &EffectRegistry) -> Self {
        let effect = effects.get(&card.id);
        Self { card, effect }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.card.id
    }
}

/// One side of a battle.
#[derive(Clone, Debug)]
pub struct PlayerState {
    pub name: String,
    pub base_health: i32,
    pub base_mana: i32,
    pub lineup: Lineup,
    /// Draw pile; the top is the back.
    pub deck: Vector<BattleCard>,
    pub hand: Vector<BattleCard>,
    pub discard: Vector<BattleCard>,
}

impl PlayerState {
    /// An empty side with the configured starting pools.
    #[must_use]
    pub fn new(name: impl Into<String>, config: &BattleConfig) -> Self {
        Self {
            name: name.into(),
            base_health: config.starting_base_health,
            base_mana: config.starting_base_mana,
            lineup: Lineup::default(),
            deck: Vector::new(),
            hand: Vector::new(),
            discard: Vector::new(),
        }
    }

    /// Build a side from a deck identity and the three chosen characters.
    ///
    /// Unknown card ids are skipped. A deck that resolves to nothing falls
    /// back to the whole catalog when the config allows it. The deck is
    /// shuffled with `rng` and the opening hand dealt.
    pub fn build(
        name: impl Into<String>,
        deck: &Deck,
        character_ids: &[String],
        index: &dyn ContentIndex,
        effects: &EffectRegistry,
        rng: &mut GameRng,
        config: &BattleConfig,
    ) -> Result<Self, BattleSetupError> {
        let mut player = PlayerState::new(name, config);

        if character_ids.len() != 3 {
            return Err(BattleSetupError::WrongCharacterCount(character_ids.len()));
        }
        let characters = character_ids
            .iter()
            .map(|id| {
                index
                    .find_character_by_id(id)
                    .ok_or_else(|| BattleSetupError::UnknownCharacter(id.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        player.lineup = Lineup::new(characters);

        let mut cards: Vec<Arc<Card>> = deck
            .card_ids()
            .iter()
            .filter_map(|id| index.find_card_by_id(id))
            .collect();
        if cards.is_empty() && config.fallback_to_catalog {
            log::warn!(
                "deck {:?} resolved to no cards, using the full catalog",
                deck.name()
            );
            cards = index.all_cards();
        }
        if cards.is_empty() {
            return Err(BattleSetupError::EmptyDeck(player.name));
        }

        rng.shuffle(&mut cards);
        player.deck = cards
            .into_iter()
            .map(|card| BattleCard::bind(card, effects))
            .collect();
        player.draw(config.starting_hand_size);

        log::debug!(
            "{} ready: {} in deck, {} in hand",
            player.name,
            player.deck.len(),
            player.hand.len()
        );
        Ok(player)
    }

    /// Move up to `count` cards from the top of the deck to the end of the
    /// hand. Returns how many were drawn.
    pub fn draw(&mut self, count: usize) -> usize {
        let mut drawn = 0;
        while drawn < count {
            match self.deck.pop_back() {
                Some(card) => {
                    self.hand.push_back(card);
                    drawn += 1;
                }
                None => break,
            }
        }
        drawn
    }

    /// Move the hand card at `index` to the discard pile.
    pub fn discard_from_hand(&mut self, index: usize) -> Option<BattleCard> {
        if index >= self.hand.len() {
            return None;
        }
        let card = self.hand.remove(index);
        self.discard.push_back(card.clone());
        Some(card)
    }

    /// Destroy up to `count` cards from the top of the deck.
    pub fn mill_top(&mut self, count: usize) -> usize {
        let mut milled = 0;
        while milled < count {
            match self.deck.pop_back() {
                Some(card) => self.discard.push_back(card),
                None => break,
            }
            milled += 1;
        }
        milled
    }

    /// Destroy up to `count` cards from the bottom of the deck.
    pub fn mill_bottom(&mut self, count: usize) -> usize {
        let mut milled = 0;
        while milled < count {
            match self.deck.pop_front() {
                Some(card) => self.discard.push_back(card),
                None => break,
            }
            milled += 1;
        }
        milled
    }

    /// Start-of-turn regeneration.
    ///
    /// Base mana grows up to the cap; a pool already above the cap is left
    /// alone. Every character, reserve included, regains energy.
    pub fn regenerate(&mut self, config: &BattleConfig) {
        if self.base_mana < config.mana_cap {
            self.base_mana = (self.base_mana + config.mana_regen).min(config.mana_cap);
        }
        for state in self.lineup.iter_mut() {
            state.regen_energy(config.energy_regen);
        }
    }

    #[must_use]
    pub fn is_defeated(&self) -> bool {
        self.base_health <= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{ContentRegistry, Element, Rarity};
    use crate::deck::DeckMode;

    fn mage(id: &str, health: i32, energy: i32) -> Arc<Character> {
        Arc::new(Character::new(id, id, Element::Water, health, energy))
    }

    fn fighter(id: &str, health: i32) -> Arc<Character> {
        Arc::new(Character::new(id, id, Element::Physical, health, 10))
    }

    #[test]
    fn test_initial_energy_rounds_up() {
        let state = PlayerCharacterState::new(mage("m", 20, 15));
        assert_eq!(state.health(), 20);
        assert_eq!(state.energy(), 8);
    }

    #[test]
    fn test_regen_caps_at_max() {
        let mut state = PlayerCharacterState::new(mage("m", 20, 10));
        state.regen_energy(5);
        assert_eq!(state.energy(), 10);
        state.regen_energy(5);
        assert_eq!(state.energy(), 10);
    }

    #[test]
    fn test_magic_damage_drains_energy_first() {
        let mut lineup = Lineup::new([mage("a", 20, 10), mage("b", 20, 10)]);
        let hit = lineup.take_damage(0, 8, true).unwrap();

        assert_eq!(hit.absorbed, 5);
        assert_eq!(hit.health_lost, 3);
        assert_eq!(lineup.front(0).unwrap().energy(), 0);
        assert_eq!(lineup.front(0).unwrap().health(), 17);
    }

    #[test]
    fn test_physical_damage_skips_energy() {
        let mut lineup = Lineup::new([mage("a", 20, 10)]);
        let hit = lineup.take_damage(0, 4, false).unwrap();
        assert_eq!(hit.absorbed, 0);
        assert_eq!(lineup.front(0).unwrap().health(), 16);
    }

    #[test]
    fn test_fighters_do_not_absorb() {
        let mut lineup = Lineup::new([fighter("f", 10)]);
        let hit = lineup.take_damage(0, 4, true).unwrap();
        assert_eq!(hit.absorbed, 0);
        assert_eq!(hit.health_lost, 4);
    }

    #[test]
    fn test_defeat_promotes_reserve() {
        let mut lineup = Lineup::new([fighter("a", 5), fighter("b", 5), fighter("c", 5)]);
        let hit = lineup.take_damage(0, 7, false).unwrap();

        assert!(hit.defeated);
        assert!(hit.promoted);
        assert_eq!(hit.overflow, 2);
        assert_eq!(hit.health_lost, 5);
        assert_eq!(lineup.front(0).unwrap().character().id, "c");
        assert!(lineup.reserve().is_none());
        assert_eq!(lineup.len(), 2);
    }

    #[test]
    fn test_defeat_without_reserve_leaves_slot_empty() {
        let mut lineup = Lineup::new([fighter("a", 5), fighter("b", 5)]);
        let hit = lineup.take_damage(1, 5, false).unwrap();

        assert!(hit.defeated);
        assert!(!hit.promoted);
        assert_eq!(hit.overflow, 0);
        assert!(lineup.front(1).is_none());
        assert!(lineup.front(0).is_some());
        assert!(lineup.take_damage(1, 3, false).is_none());
    }

    fn content() -> ContentRegistry {
        let mut registry = ContentRegistry::new();
        for i in 0..5 {
            registry.register_card(Card::new(format!("k{i}"), "K", Element::Fire, i, Rarity::Common));
        }
        for id in ["a", "b", "c"] {
            registry.register_character(Character::new(id, id, Element::Fire, 20, 10));
        }
        registry
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_build_deals_opening_hand() {
        let registry = content();
        let mut deck = Deck::new("D", DeckMode::Casual);
        for card in registry.all_cards() {
            deck.add_card(&card).unwrap();
        }

        let player = PlayerState::build(
            "P",
            &deck,
            &ids(&["a", "b", "c"]),
            &registry,
            &EffectRegistry::new(),
            &mut GameRng::new(1),
            &BattleConfig::default(),
        )
        .unwrap();

        assert_eq!(player.hand.len(), 3);
        assert_eq!(player.deck.len(), 2);
        assert_eq!(player.lineup.len(), 3);
        assert_eq!(player.base_health, 50);
        assert_eq!(player.base_mana, 30);
    }

    #[test]
    fn test_build_falls_back_to_catalog() {
        let registry = content();
        let deck = Deck::new("Empty", DeckMode::Casual);

        let player = PlayerState::build(
            "P",
            &deck,
            &ids(&["a", "b", "c"]),
            &registry,
            &EffectRegistry::new(),
            &mut GameRng::new(1),
            &BattleConfig::default(),
        )
        .unwrap();
        assert_eq!(player.deck.len() + player.hand.len(), 5);
    }

    #[test]
    fn test_build_rejects_bad_roster() {
        let registry = content();
        let deck = Deck::new("D", DeckMode::Casual);
        let effects = EffectRegistry::new();
        let config = BattleConfig::default();

        let err = PlayerState::build("P", &deck, &ids(&["a", "b"]), &registry, &effects, &mut GameRng::new(1), &config);
        assert_eq!(err.unwrap_err(), BattleSetupError::WrongCharacterCount(2));

        let err = PlayerState::build("P", &deck, &ids(&["a", "b", "z"]), &registry, &effects, &mut GameRng::new(1), &config);
        assert_eq!(err.unwrap_err(), BattleSetupError::UnknownCharacter("z".into()));
    }

    #[test]
    fn test_empty_deck_without_fallback() {
        let registry = content();
        let deck = Deck::new("D", DeckMode::Casual);
        let config = BattleConfig::default().fallback_to_catalog(false);

        let err = PlayerState::build("P", &deck, &ids(&["a", "b", "c"]), &registry, &EffectRegistry::new(), &mut GameRng::new(1), &config);
        assert_eq!(err.unwrap_err(), BattleSetupError::EmptyDeck("P".into()));
    }

    #[test]
    fn test_mill_and_regen() {
        let config = BattleConfig::default();
        let mut player = PlayerState::new("P", &config);
        let registry = content();
        let effects = EffectRegistry::new();
        player.deck = registry
            .all_cards()
            .into_iter()
            .map(|c| BattleCard::bind(c, &effects))
            .collect();

        assert_eq!(player.mill_top(2), 2);
        assert_eq!(player.mill_bottom(2), 2);
        assert_eq!(player.deck.len(), 1);
        assert_eq!(player.deck[0].id(), "k2");
        assert_eq!(player.discard.len(), 4);

        player.base_mana = 28;
        player.regenerate(&config);
        assert_eq!(player.base_mana, 30);

        player.base_mana = 1030;
        player.regenerate(&config);
        assert_eq!(player.base_mana, 1030);
    }
}
