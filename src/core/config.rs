//! Battle and sync configuration.
//!
//! Callers configure the engine at startup by providing:
//! - `BattleConfig`: starting pools, regeneration, opening hand
//! - `SyncConfig`: port and wait intervals for peer play
//!
//! Defaults reproduce the standard rules; tests shorten the waits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Economy and setup parameters for a battle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleConfig {
    /// Base health each side starts with.
    pub starting_base_health: i32,

    /// Base mana each side starts with.
    pub starting_base_mana: i32,

    /// Base mana gained at the start of each of a side's turns.
    pub mana_regen: i32,

    /// Regeneration never pushes base mana above this value.
    pub mana_cap: i32,

    /// Energy every character gains at the start of its side's turn.
    pub energy_regen: i32,

    /// Cards dealt before the first turn.
    pub starting_hand_size: usize,

    /// Substitute the full catalog when a deck resolves to no cards.
    pub fallback_to_catalog: bool,

    /// Treat drawing from an empty deck as a loss.
    pub deck_out_loses: bool,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            starting_base_health: 50,
            starting_base_mana: 30,
            mana_regen: 5,
            mana_cap: 30,
            energy_regen: 5,
            starting_hand_size: 3,
            fallback_to_catalog: true,
            deck_out_loses: false,
        }
    }
}

impl BattleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_base_health(mut self, health: i32) -> Self {
        self.starting_base_health = health;
        self
    }

    pub fn starting_base_mana(mut self, mana: i32) -> Self {
        self.starting_base_mana = mana;
        self
    }

    pub fn starting_hand_size(mut self, size: usize) -> Self {
        self.starting_hand_size = size;
        self
    }

    pub fn fallback_to_catalog(mut self, enabled: bool) -> Self {
        self.fallback_to_catalog = enabled;
        self
    }

    pub fn deck_out_loses(mut self, enabled: bool) -> Self {
        self.deck_out_loses = enabled;
        self
    }
}

/// Network parameters for peer play.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Port used when none is given.
    pub default_port: u16,

    /// Upper bound on a single wait for inbound messages.
    pub poll_interval: Duration,

    /// How long the handshake waits for the opponent's `NAME`.
    pub name_wait: Duration,

    /// How long the handshake waits for the opponent's `CHARS`.
    pub chars_wait: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            default_port: 4000,
            poll_interval: Duration::from_millis(200),
            name_wait: Duration::from_secs(2),
            chars_wait: Duration::from_secs(10),
        }
    }
}

impl SyncConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn name_wait(mut self, wait: Duration) -> Self {
        self.name_wait = wait;
        self
    }

    pub fn chars_wait(mut self, wait: Duration) -> Self {
        self.chars_wait = wait;
        self
    }
}
