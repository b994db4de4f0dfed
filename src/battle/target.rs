//! What a play is aimed at.

use serde::{Deserialize, Serialize};

/// Target of a play: the opposing base or one of its two front slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    Base,
    Character(usize),
}

impl Target {
    /// Wire form: `b`, `t0` or `t1`.
    #[must_use]
    pub fn to_wire(self) -> String {
        match self {
            Target::Base => "b".to_string(),
            Target::Character(i) => format!("t{i}"),
        }
    }

    /// Parse the wire form. Case-insensitive; only front slots are accepted.
    #[must_use]
    pub fn from_wire(raw: &str) -> Option<Self> {
        match raw.trim() {
            "b" | "B" => Some(Target::Base),
            "t0" | "T0" => Some(Target::Character(0)),
            "t1" | "T1" => Some(Target::Character(1)),
            _ => None,
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Base => write!(f, "base"),
            Target::Character(i) => write!(f, "front slot {i}"),
        }
    }
}
