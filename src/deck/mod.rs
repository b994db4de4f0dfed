//! Deck identities and deck codes.
//!
//! - `Deck`: name, mode, character ids, card ids, card limit
//! - `DeckCodec`: checksummed token encoding of a `Deck`

mod codec;
mod identity;

pub use codec::{DeckCodec, DeckCodeError};
pub use identity::{
    Deck, DeckBuildError, DeckMode, BATTLE_CHARACTERS, DEFAULT_MAX_CARDS, MIN_BATTLE_CARDS,
};
