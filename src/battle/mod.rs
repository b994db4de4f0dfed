//! Mutable battle state for both sides.

mod state;
mod target;

pub use state::{
    BattleCard, BattleSetupError, Hit, Lineup, PlayerCharacterState, PlayerState, FRONT_SLOTS,
};
pub use target::Target;
