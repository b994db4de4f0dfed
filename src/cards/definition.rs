//! Card and character definitions - static content.
//!
//! `Card` and `Character` hold the immutable properties loaded from the
//! content tables. Battle-time values (current health, energy) live in
//! `battle::PlayerCharacterState`.

use serde::{Deserialize, Serialize};

use super::element::{Element, ElementSet, Rarity};

/// Attack/defense/health printed on creature cards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatureStats {
    pub attack: u32,
    pub defense: u32,
    pub health: u32,
}

/// Static card definition.
///
/// ## Example
///
/// ```
/// use magicwound::cards::{Card, Element, Rarity};
///
/// let card = Card::new("whAt", "What?", Element::Water, 2, Rarity::Rare)
///     .with_description("Destroy one card in your opponent's deck.");
///
/// assert!(card.is_magic());
/// assert!(!card.is_creature());
/// assert_eq!(card.serialize_id(), "whAt");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Stable identifier; this is what deck codes and the wire carry.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Never empty.
    pub elements: ElementSet,

    /// Mana cost.
    pub cost: u32,

    pub rarity: Rarity,

    /// Rules text.
    pub description: String,

    /// Present on creature cards only.
    pub stats: Option<CreatureStats>,
}

impl Card {
    /// Create a spell card. Use `with_stats` for creatures.
    ///
    /// A card given no elements is tagged Physical.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        elements: impl Into<ElementSet>,
        cost: u32,
        rarity: Rarity,
    ) -> Self {
        let mut elements: ElementSet = elements.into();
        if elements.is_empty() {
            elements.insert(Element::Physical);
        }
        Self {
            id: id.into(),
            name: name.into(),
            elements,
            cost,
            rarity,
            description: String::new(),
            stats: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_stats(mut self, attack: u32, defense: u32, health: u32) -> Self {
        self.stats = Some(CreatureStats { attack, defense, health });
        self
    }

    /// The token a deck code stores for this card.
    #[must_use]
    pub fn serialize_id(&self) -> &str {
        &self.id
    }

    /// True if the card carries the Physical tag. Such cards cost nothing.
    #[must_use]
    pub fn is_physical(&self) -> bool {
        self.elements.contains(Element::Physical)
    }

    /// Damage from a card that is not Physical is magic damage.
    #[must_use]
    pub fn is_magic(&self) -> bool {
        !self.is_physical()
    }

    #[must_use]
    pub fn is_creature(&self) -> bool {
        self.stats.is_some()
    }
}

/// A named ability with its rules text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ability {
    pub name: String,
    pub text: String,
}

impl Ability {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Static character definition.
///
/// A character may carry no elements at all. It is then an untagged
/// non-mage that never gets an elemental match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: String,
    pub name: String,
    pub elements: ElementSet,
    pub max_health: i32,
    pub max_energy: i32,
    pub ability: Ability,
    pub passive: Ability,
}

impl Character {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        elements: impl Into<ElementSet>,
        max_health: i32,
        max_energy: i32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            elements: elements.into(),
            max_health,
            max_energy,
            ability: Ability::default(),
            passive: Ability::default(),
        }
    }

    #[must_use]
    pub fn with_ability(mut self, ability: Ability) -> Self {
        self.ability = ability;
        self
    }

    #[must_use]
    pub fn with_passive(mut self, passive: Ability) -> Self {
        self.passive = passive;
        self
    }

    /// A mage has at least one element beyond Physical.
    ///
    /// Only mages may play magic cards, and only mages absorb magic damage
    /// with their energy.
    #[must_use]
    pub fn is_mage(&self) -> bool {
        self.elements.has_magic()
    }
}
