//! Card effects.
//!
//! - `CardEffect`: one variant per kind of card-specific rule
//! - `EffectContext` / `EffectOutcome`: what an effect sees and returns
//! - `EffectRegistry`: card id to effect, consulted when a battle is built
//!
//! Effects run before damage is applied. A faulting effect is logged and
//! treated as a no-op.

mod effect;
mod registry;

pub use effect::{CardEffect, EffectContext, EffectFault, EffectOutcome};
pub use registry::EffectRegistry;
