//! Player actions and the action log.

use serde::{Deserialize, Serialize};

use crate::battle::Target;
use crate::core::Side;

/// Something the active side asks the engine to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Play the hand card at `hand_index` with the front character at
    /// `actor`, aimed at `target` on the opposing side.
    Play {
        hand_index: usize,
        actor: usize,
        target: Target,
    },
    EndTurn,
    Forfeit,
}

impl Action {
    #[must_use]
    pub fn play(hand_index: usize, actor: usize, target: Target) -> Self {
        Action::Play {
            hand_index,
            actor,
            target,
        }
    }
}

/// An accepted action, as stored in the battle's history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// The side that acted.
    pub side: Side,

    pub action: Action,

    /// Turn number when the action was taken.
    pub turn: u32,

    /// Id of the card played, if any. Hand indices shift, ids do not.
    pub card_id: Option<String>,
}

impl ActionRecord {
    #[must_use]
    pub fn new(side: Side, action: Action, turn: u32) -> Self {
        Self {
            side,
            action,
            turn,
            card_id: None,
        }
    }

    #[must_use]
    pub fn with_card(mut self, card_id: impl Into<String>) -> Self {
        self.card_id = Some(card_id.into());
        self
    }
}
