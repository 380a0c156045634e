//! Conditions on entities and their effect on attack rolls.
mod kinds;
mod resolver;

pub use kinds::{Condition, ConditionKind, ConditionSet};
pub use resolver::{AttackContext, ConditionEffects, resolve_conditions};
