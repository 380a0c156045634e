//! Dice subsystem.
//!
//! - [`DiceFormula`]: parsed `NdM±K` formulas
//! - [`Dice`]: rolls formulas, applies advantage/disadvantage to single d20s
//!   and flags natural 20s and 1s
//! - [`DiceSource`]: where faces come from ([`SeededDice`], [`ScriptedDice`])
//! - [`RollObserver`]: injectable sink for animation/broadcast
mod formula;
mod roller;
mod source;

pub use formula::{DiceError, DiceFormula, MAX_DICE};
pub use roller::{Dice, DiceRoll, RollMode, RollObserver, RollOptions};
pub use source::{DiceSource, ScriptedDice, SeededDice};
