//! Core battle types: sides, RNG, configuration.
//!
//! These are shared by every other module. Nothing here knows about cards
//! or effects.

pub mod player;
pub mod rng;
pub mod config;

pub use player::{Side, SidePair};
pub use rng::GameRng;
pub use config::{BattleConfig, SyncConfig};
