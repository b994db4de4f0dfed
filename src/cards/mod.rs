//! Card system: static definitions and the content index.
//!
//! ## Key Types
//!
//! - `Element`, `ElementSet`, `Rarity`: tags carried by content
//! - `Card`, `Character`: immutable definitions
//! - `ContentIndex`: lookup seam consumed by the battle core
//! - `ContentRegistry`: in-memory `ContentIndex`

pub mod definition;
pub mod element;
pub mod registry;

pub use definition::{Ability, Card, Character, CreatureStats};
pub use element::{Element, ElementSet, Rarity};
pub use registry::{ContentIndex, ContentRegistry};
