//! Battle rules.
//!
//! - `TurnEngine`: the turn state machine and play resolution
//! - `damage`: cost and damage arithmetic, also used by the network mirror
//! - `BattleBuilder` / `create_battle`: assemble an engine from decks
//!
//! The engine owns both sides' state. Callers drive it one `Action` at a
//! time and read back `EngineEvent`s.

pub mod action;
pub mod builder;
pub mod damage;
pub mod engine;

pub use action::{Action, ActionRecord};
pub use builder::{create_battle, BattleBuilder, SideSetup};
pub use damage::{DamageReport, Payment};
pub use engine::{
    EngineEvent, GameOverCause, InvalidAction, Phase, PlayReport, TurnEngine, TurnReport,
};
