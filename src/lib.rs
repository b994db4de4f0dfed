//! # magicwound
//!
//! A two-player card battle engine with deck codes and peer-to-peer play.
//!
//! ## Design Principles
//!
//! 1. **Ids over definitions**: decks and the wire carry stable string ids.
//!    Definitions are looked up through a `ContentIndex`, so old deck codes
//!    keep working after content changes.
//!
//! 2. **Single owner**: the engine task is the only mutator of battle state.
//!    The network receiver only enqueues parsed messages.
//!
//! 3. **Effects as data**: each card id binds to a `CardEffect` variant when
//!    the battle is built.
//!
//! ## Modules
//!
//! - `core`: sides, RNG, configuration
//! - `cards`: card and character definitions, content lookup
//! - `deck`: deck identity and the deck-code codec
//! - `battle`: per-side battle state
//! - `effects`: card effects and their registry
//! - `rules`: the turn engine
//! - `sync`: line protocol and networked matches

pub mod core;
pub mod cards;
pub mod deck;
pub mod battle;
pub mod effects;
pub mod rules;
pub mod sync;

// Re-export commonly used types
pub use crate::core::{BattleConfig, GameRng, Side, SidePair, SyncConfig};

pub use crate::cards::{Card, Character, ContentIndex, ContentRegistry, Element, Rarity};

pub use crate::deck::{Deck, DeckCodec, DeckCodeError, DeckMode};

pub use crate::battle::{BattleSetupError, PlayerState, Target};

pub use crate::effects::{CardEffect, EffectRegistry};

pub use crate::rules::{create_battle, Action, BattleBuilder, EngineEvent, InvalidAction, TurnEngine};

pub use crate::sync::{NetMatch, PeerSession, SyncError, SyncMessage};
