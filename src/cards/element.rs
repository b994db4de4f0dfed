//! Elemental tags and rarity.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Elemental tag carried by cards and characters.
///
/// `Physical` is the only non-magic element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Element {
    Physical,
    Light,
    Dark,
    Water,
    Fire,
    Earth,
    Wind,
}

impl Element {
    /// Every element, in declaration order.
    pub const ALL: [Element; 7] = [
        Element::Physical,
        Element::Light,
        Element::Dark,
        Element::Water,
        Element::Fire,
        Element::Earth,
        Element::Wind,
    ];

    #[must_use]
    pub const fn is_magic(self) -> bool {
        !matches!(self, Element::Physical)
    }
}

/// Card rarity. `Funny` cards are banned from standard decks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Mythic,
    Funny,
}

/// Small ordered set of elements.
///
/// Most definitions carry one or two elements, so these stay inline.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementSet(SmallVec<[Element; 2]>);

impl ElementSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element, ignoring duplicates.
    pub fn insert(&mut self, element: Element) {
        if !self.contains(element) {
            self.0.push(element);
        }
    }

    #[must_use]
    pub fn contains(&self, element: Element) -> bool {
        self.0.contains(&element)
    }

    /// True if any element is magic.
    #[must_use]
    pub fn has_magic(&self) -> bool {
        self.0.iter().any(|e| e.is_magic())
    }

    /// True if both sets share at least one element.
    #[must_use]
    pub fn intersects(&self, other: &ElementSet) -> bool {
        self.0.iter().any(|e| other.contains(*e))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Element> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Element> for ElementSet {
    fn from_iter<I: IntoIterator<Item = Element>>(iter: I) -> Self {
        let mut set = ElementSet::new();
        for element in iter {
            set.insert(element);
        }
        set
    }
}

impl From<Element> for ElementSet {
    fn from(element: Element) -> Self {
        std::iter::once(element).collect()
    }
}

impl<const N: usize> From<[Element; N]> for ElementSet {
    fn from(elements: [Element; N]) -> Self {
        elements.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physical_is_not_magic() {
        assert!(!Element::Physical.is_magic());
        assert!(Element::ALL.iter().skip(1).all(|e| e.is_magic()));
    }

    #[test]
    fn test_set_dedupes() {
        let set: ElementSet = [Element::Water, Element::Water, Element::Dark].into();
        assert_eq!(set.iter().count(), 2);
    }

    #[test]
    fn test_has_magic() {
        assert!(!ElementSet::from(Element::Physical).has_magic());
        assert!(ElementSet::from([Element::Physical, Element::Fire]).has_magic());
    }

    #[test]
    fn test_intersects() {
        let card: ElementSet = [Element::Light, Element::Dark].into();
        assert!(card.intersects(&Element::Dark.into()));
        assert!(!card.intersects(&Element::Water.into()));
    }
}
