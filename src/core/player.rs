//! Side identification and per-side data storage.
//!
//! ## Side
//!
//! A battle always has exactly two sides. `Side::A` moves first.
//!
//! ## SidePair
//!
//! Per-side storage indexed by `Side`, so engine code never juggles a pair
//! of `&mut` references by hand.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// One of the two sides of a battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// First player; acts on odd turns.
    A,
    /// Second player.
    B,
}

impl Side {
    /// The other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    /// Raw index (A = 0, B = 1).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }

    /// Both sides in turn order.
    pub fn both() -> impl Iterator<Item = Side> {
        [Side::A, Side::B].into_iter()
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::A => write!(f, "Side A"),
            Side::B => write!(f, "Side B"),
        }
    }
}

/// Per-side data storage with O(1) access.
///
/// ## Example
///
/// ```
/// use magicwound::core::{Side, SidePair};
///
/// let mut life = SidePair::with_value(50);
/// life[Side::B] -= 7;
/// assert_eq!(life[Side::A], 50);
/// assert_eq!(life[Side::B], 43);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SidePair<T> {
    data: [T; 2],
}

impl<T> SidePair<T> {
    /// Create from explicit values for A and B.
    pub fn new(a: T, b: T) -> Self {
        Self { data: [a, b] }
    }

    /// Create with both entries set to the same value.
    pub fn with_value(value: T) -> Self
    where
        T: Clone,
    {
        Self::new(value.clone(), value)
    }

    /// Get a reference to one side's data.
    #[must_use]
    pub fn get(&self, side: Side) -> &T {
        &self.data[side.index()]
    }

    /// Get a mutable reference to one side's data.
    pub fn get_mut(&mut self, side: Side) -> &mut T {
        &mut self.data[side.index()]
    }

    /// Borrow the acting side and its opponent mutably at the same time.
    pub fn split_mut(&mut self, acting: Side) -> (&mut T, &mut T) {
        let [a, b] = &mut self.data;
        match acting {
            Side::A => (a, b),
            Side::B => (b, a),
        }
    }

    /// Iterate over (Side, &T) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Side, &T)> {
        Side::both().zip(self.data.iter())
    }
}

impl<T> Index<Side> for SidePair<T> {
    type Output = T;

    fn index(&self, side: Side) -> &Self::Output {
        self.get(side)
    }
}

impl<T> IndexMut<Side> for SidePair<T> {
    fn index_mut(&mut self, side: Side) -> &mut Self::Output {
        self.get_mut(side)
    }
}
