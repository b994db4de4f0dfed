//! Deck identity: what a deck code carries.
//!
//! A `Deck` stores ids, not definitions. Definitions are re-resolved through
//! a `ContentIndex` when a battle is built, so a deck survives content
//! updates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cards::{Card, Character, ContentIndex, Element, Rarity};

/// Default number of cards a deck may hold.
pub const DEFAULT_MAX_CARDS: usize = 20;

/// Cards a deck needs before it can enter a battle.
pub const MIN_BATTLE_CARDS: usize = 20;

/// Characters a deck holds at most, and exactly at battle start.
pub const BATTLE_CHARACTERS: usize = 3;

/// Deck mode, stored in the code as a small integer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeckMode {
    /// No Funny cards.
    Standard,
    /// Anything goes.
    #[default]
    Casual,
}

impl DeckMode {
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            DeckMode::Standard => 0,
            DeckMode::Casual => 1,
        }
    }

    /// `0` is Standard; every other value, or garbage, is Casual.
    #[must_use]
    pub fn from_code(raw: &str) -> Self {
        match raw.trim().parse::<i64>() {
            Ok(0) => DeckMode::Standard,
            _ => DeckMode::Casual,
        }
    }

    #[must_use]
    pub fn allows(self, rarity: Rarity) -> bool {
        !(self == DeckMode::Standard && rarity == Rarity::Funny)
    }
}

/// Reasons a card or character was refused while building.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeckBuildError {
    #[error("standard decks cannot hold Funny cards ({0})")]
    FunnyInStandard(String),
    #[error("deck already holds its maximum of {0} cards")]
    DeckFull(usize),
    #[error("deck already holds 3 characters")]
    TooManyCharacters,
}

/// A deck's identity: name, mode, character ids, card ids, card limit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    name: String,
    mode: DeckMode,
    character_ids: Vec<String>,
    card_ids: Vec<String>,
    max_cards: usize,
}

impl Default for Deck {
    fn default() -> Self {
        Self::new("", DeckMode::default())
    }
}

impl Deck {
    /// Create an empty deck.
    ///
    /// `;` is the code's field separator, so it is stripped from the name.
    #[must_use]
    pub fn new(name: impl Into<String>, mode: DeckMode) -> Self {
        Self {
            name: sanitize_name(name.into()),
            mode,
            character_ids: Vec::new(),
            card_ids: Vec::new(),
            max_cards: DEFAULT_MAX_CARDS,
        }
    }

    #[must_use]
    pub fn with_max_cards(mut self, max_cards: usize) -> Self {
        self.max_cards = max_cards;
        self
    }

    /// Rebuild a deck from decoded fields without applying build rules.
    pub(crate) fn from_parts(
        name: String,
        mode: DeckMode,
        character_ids: Vec<String>,
        card_ids: Vec<String>,
        max_cards: usize,
    ) -> Self {
        Self {
            name: sanitize_name(name),
            mode,
            character_ids,
            card_ids,
            max_cards,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = sanitize_name(name.into());
    }

    #[must_use]
    pub fn mode(&self) -> DeckMode {
        self.mode
    }

    #[must_use]
    pub fn character_ids(&self) -> &[String] {
        &self.character_ids
    }

    #[must_use]
    pub fn card_ids(&self) -> &[String] {
        &self.card_ids
    }

    #[must_use]
    pub fn max_cards(&self) -> usize {
        self.max_cards
    }

    /// Add a card, enforcing the mode and the card limit.
    pub fn add_card(&mut self, card: &Card) -> Result<(), DeckBuildError> {
        if !self.mode.allows(card.rarity) {
            return Err(DeckBuildError::FunnyInStandard(card.id.clone()));
        }
        if self.card_ids.len() >= self.max_cards {
            return Err(DeckBuildError::DeckFull(self.max_cards));
        }
        self.card_ids.push(card.serialize_id().to_string());
        Ok(())
    }

    /// Add a character; a deck holds at most three.
    pub fn add_character(&mut self, character: &Character) -> Result<(), DeckBuildError> {
        if self.character_ids.len() >= BATTLE_CHARACTERS {
            return Err(DeckBuildError::TooManyCharacters);
        }
        self.character_ids.push(character.id.clone());
        Ok(())
    }

    /// Remove the first copy of a card. Returns false if absent.
    pub fn remove_card(&mut self, card_id: &str) -> bool {
        remove_first(&mut self.card_ids, card_id)
    }

    /// Remove a character. Returns false if absent.
    pub fn remove_character(&mut self, character_id: &str) -> bool {
        remove_first(&mut self.character_ids, character_id)
    }

    /// At least twenty cards and exactly three characters.
    #[must_use]
    pub fn is_valid_for_battle(&self) -> bool {
        self.card_ids.len() >= MIN_BATTLE_CARDS && self.character_ids.len() == BATTLE_CHARACTERS
    }

    /// Count of cards per element. Unknown card ids are skipped.
    #[must_use]
    pub fn element_distribution(&self, index: &dyn ContentIndex) -> BTreeMap<Element, usize> {
        let mut distribution = BTreeMap::new();
        for card in self.card_ids.iter().filter_map(|id| index.find_card_by_id(id)) {
            for element in card.elements.iter() {
                *distribution.entry(element).or_insert(0) += 1;
            }
        }
        distribution
    }
}

fn sanitize_name(name: String) -> String {
    if name.contains(';') {
        name.replace(';', "")
    } else {
        name
    }
}

fn remove_first(ids: &mut Vec<String>, id: &str) -> bool {
    match ids.iter().position(|x| x == id) {
        Some(pos) => {
            ids.remove(pos);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::ContentRegistry;

    fn funny() -> Card {
        Card::new("IDontcar", "I Don't Car", Element::Physical, 2, Rarity::Funny)
    }

    fn common(id: &str) -> Card {
        Card::new(id, id, Element::Fire, 1, Rarity::Common)
    }

    #[test]
    fn test_standard_rejects_funny() {
        let mut deck = Deck::new("Strict", DeckMode::Standard);
        assert_eq!(
            deck.add_card(&funny()),
            Err(DeckBuildError::FunnyInStandard("IDontcar".into()))
        );

        let mut casual = Deck::new("Loose", DeckMode::Casual);
        assert!(casual.add_card(&funny()).is_ok());
    }

    #[test]
    fn test_card_limit() {
        let mut deck = Deck::new("Small", DeckMode::Casual).with_max_cards(2);
        deck.add_card(&common("a")).unwrap();
        deck.add_card(&common("b")).unwrap();
        assert_eq!(deck.add_card(&common("c")), Err(DeckBuildError::DeckFull(2)));
        assert_eq!(deck.card_ids().len(), 2);
    }

    #[test]
    fn test_character_limit() {
        let mut deck = Deck::new("Chars", DeckMode::Casual);
        for i in 0..3 {
            let c = Character::new(format!("c{i}"), "C", Element::Water, 10, 10);
            deck.add_character(&c).unwrap();
        }
        let extra = Character::new("c3", "C", Element::Water, 10, 10);
        assert_eq!(deck.add_character(&extra), Err(DeckBuildError::TooManyCharacters));
    }

    #[test]
    fn test_battle_validity() {
        let mut deck = Deck::new("Full", DeckMode::Casual);
        for i in 0..20 {
            deck.add_card(&common(&format!("k{i}"))).unwrap();
        }
        assert!(!deck.is_valid_for_battle());

        for i in 0..3 {
            let c = Character::new(format!("c{i}"), "C", Element::Water, 10, 10);
            deck.add_character(&c).unwrap();
        }
        assert!(deck.is_valid_for_battle());

        assert!(deck.remove_card("k3"));
        assert!(!deck.remove_card("k3"));
        assert!(!deck.is_valid_for_battle());
    }

    #[test]
    fn test_name_is_sanitized() {
        let mut deck = Deck::new("a;b", DeckMode::Casual);
        assert_eq!(deck.name(), "ab");
        deck.rename("x;;y");
        assert_eq!(deck.name(), "xy");
    }

    #[test]
    fn test_mode_codes() {
        assert_eq!(DeckMode::from_code("0"), DeckMode::Standard);
        assert_eq!(DeckMode::from_code("1"), DeckMode::Casual);
        assert_eq!(DeckMode::from_code("junk"), DeckMode::Casual);
        assert_eq!(DeckMode::Standard.code(), 0);
    }

    #[test]
    fn test_element_distribution() {
        let mut registry = ContentRegistry::new();
        registry.register_card(Card::new("ld", "LD", [Element::Light, Element::Dark], 4, Rarity::Rare));
        registry.register_card(Card::new("d", "D", Element::Dark, 2, Rarity::Rare));

        let mut deck = Deck::new("Mix", DeckMode::Casual);
        for id in ["ld", "d", "d"] {
            deck.add_card(&registry.find_card_by_id(id).unwrap()).unwrap();
        }

        let dist = deck.element_distribution(&registry);
        assert_eq!(dist.get(&Element::Dark), Some(&3));
        assert_eq!(dist.get(&Element::Light), Some(&1));
        assert_eq!(dist.get(&Element::Water), None);
    }
}
