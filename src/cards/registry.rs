//! Content lookup by stable identifier.
//!
//! `ContentIndex` is the seam between the battle core and whatever owns the
//! content tables. `ContentRegistry` is the in-memory implementation: it
//! keeps catalog order for `all_cards` and an id map for lookups.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::definition::{Card, Character};

/// Read-only view of the card and character catalogs.
pub trait ContentIndex {
    fn find_card_by_id(&self, id: &str) -> Option<Arc<Card>>;

    fn find_character_by_id(&self, id: &str) -> Option<Arc<Character>>;

    /// Every card in catalog order.
    fn all_cards(&self) -> Vec<Arc<Card>>;

    /// Every character in catalog order.
    fn all_characters(&self) -> Vec<Arc<Character>>;
}

/// In-memory content catalog.
///
/// ## Example
///
/// ```
/// use magicwound::cards::{Card, Character, ContentIndex, ContentRegistry, Element, Rarity};
///
/// let mut registry = ContentRegistry::new();
/// registry.register_card(Card::new("whAt", "What?", Element::Water, 2, Rarity::Rare));
/// registry.register_character(Character::new("neko", "Neko", Element::Wind, 20, 25));
///
/// assert_eq!(registry.find_card_by_id("whAt").unwrap().cost, 2);
/// assert!(registry.find_character_by_id("nobody").is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct ContentRegistry {
    cards: Vec<Arc<Card>>,
    card_ids: FxHashMap<String, usize>,
    characters: Vec<Arc<Character>>,
    character_ids: FxHashMap<String, usize>,
}

impl ContentRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a card definition.
    ///
    /// Panics if a card with the same id already exists.
    pub fn register_card(&mut self, card: Card) {
        if self.card_ids.contains_key(&card.id) {
            panic!("Card with id {:?} already registered", card.id);
        }
        self.card_ids.insert(card.id.clone(), self.cards.len());
        self.cards.push(Arc::new(card));
    }

    /// Register a character definition.
    ///
    /// Panics if a character with the same id already exists.
    pub fn register_character(&mut self, character: Character) {
        if self.character_ids.contains_key(&character.id) {
            panic!("Character with id {:?} already registered", character.id);
        }
        self.character_ids.insert(character.id.clone(), self.characters.len());
        self.characters.push(Arc::new(character));
    }

    /// Find a card by display name.
    #[must_use]
    pub fn find_card_by_name(&self, name: &str) -> Option<Arc<Card>> {
        self.cards.iter().find(|c| c.name == name).cloned()
    }

    /// Find cards matching a predicate.
    pub fn find_cards<F>(&self, predicate: F) -> impl Iterator<Item = &Arc<Card>>
    where
        F: Fn(&Card) -> bool,
    {
        self.cards.iter().filter(move |c| predicate(c))
    }

    #[must_use]
    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn character_count(&self) -> usize {
        self.characters.len()
    }
}

impl ContentIndex for ContentRegistry {
    fn find_card_by_id(&self, id: &str) -> Option<Arc<Card>> {
        self.card_ids.get(id).map(|&i| Arc::clone(&self.cards[i]))
    }

    fn find_character_by_id(&self, id: &str) -> Option<Arc<Character>> {
        self.character_ids
            .get(id)
            .map(|&i| Arc::clone(&self.characters[i]))
    }

    fn all_cards(&self) -> Vec<Arc<Card>> {
        self.cards.clone()
    }

    fn all_characters(&self) -> Vec<Arc<Character>> {
        self.characters.clone()
    }
}
