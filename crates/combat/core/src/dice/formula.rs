//! `NdM±K` dice formulas.

use core::fmt;
use core::str::FromStr;

use crate::error::{CombatError, ErrorSeverity};

/// Upper bound on dice in one formula; larger counts are rejected.
pub const MAX_DICE: u32 = 1000;

/// Upper bound on faces per die; larger dice are rejected.
pub const MAX_SIDES: u32 = 1000;

/// Errors produced while parsing a dice formula.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DiceError {
    #[error("empty dice formula")]
    Empty,

    #[error("invalid dice count in {0:?}")]
    InvalidCount(String),

    #[error("invalid die size in {0:?}")]
    InvalidSides(String),

    #[error("invalid modifier in {0:?}")]
    InvalidModifier(String),

    #[error("too many dice: {0} (max {MAX_DICE})")]
    TooManyDice(u32),

    #[error("die too large: d{0} (max d{MAX_SIDES})")]
    DieTooLarge(u32),
}

impl CombatError for DiceError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Empty => "DICE_EMPTY",
            Self::InvalidCount(_) => "DICE_INVALID_COUNT",
            Self::InvalidSides(_) => "DICE_INVALID_SIDES",
            Self::InvalidModifier(_) => "DICE_INVALID_MODIFIER",
            Self::TooManyDice(_) => "DICE_TOO_MANY",
            Self::DieTooLarge(_) => "DICE_DIE_TOO_LARGE",
        }
    }
}

/// A parsed dice formula: `count` dice with `sides` faces plus a flat modifier.
///
/// A flat value (`"4"`) is represented with `count == 0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiceFormula {
    pub count: u32,
    pub sides: u32,
    pub modifier: i32,
}

impl DiceFormula {
    pub const fn new(count: u32, sides: u32, modifier: i32) -> Self {
        Self {
            count,
            sides,
            modifier,
        }
    }

    /// A formula with no dice.
    pub const fn flat(value: i32) -> Self {
        Self::new(0, 0, value)
    }

    pub const fn d20() -> Self {
        Self::new(1, 20, 0)
    }

    /// Parses `NdM`, `dM`, `NdM+K`, `NdM-K` or a bare integer.
    ///
    /// Whitespace is ignored and the `d` is case-insensitive.
    pub fn parse(text: &str) -> Result<Self, DiceError> {
        let compact: String = text
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        if compact.is_empty() {
            return Err(DiceError::Empty);
        }

        let Some((count_part, rest)) = compact.split_once('d') else {
            let value = compact
                .parse::<i32>()
                .map_err(|_| DiceError::InvalidModifier(text.to_string()))?;
            return Ok(Self::flat(value));
        };

        let count = if count_part.is_empty() {
            1
        } else {
            count_part
                .parse::<u32>()
                .map_err(|_| DiceError::InvalidCount(text.to_string()))?
        };
        if count == 0 {
            return Err(DiceError::InvalidCount(text.to_string()));
        }
        if count > MAX_DICE {
            return Err(DiceError::TooManyDice(count));
        }

        let (sides_part, modifier) = match rest.find(['+', '-']) {
            Some(idx) => {
                let (sides, modifier) = rest.split_at(idx);
                let modifier = modifier
                    .parse::<i32>()
                    .map_err(|_| DiceError::InvalidModifier(text.to_string()))?;
                (sides, modifier)
            }
            None => (rest, 0),
        };

        let sides = sides_part
            .parse::<u32>()
            .map_err(|_| DiceError::InvalidSides(text.to_string()))?;
        if sides == 0 {
            return Err(DiceError::InvalidSides(text.to_string()));
        }
        if sides > MAX_SIDES {
            return Err(DiceError::DieTooLarge(sides));
        }

        Ok(Self::new(count, sides, modifier))
    }

    /// True for exactly one d20, the only shape that can roll with advantage
    /// or flag a critical.
    pub const fn is_single_d20(&self) -> bool {
        self.count == 1 && self.sides == 20
    }

    pub const fn has_dice(&self) -> bool {
        self.count > 0 && self.sides > 0
    }

    /// Critical-hit form: twice the dice, same flat modifier.
    #[must_use]
    pub const fn with_doubled_dice(self) -> Self {
        Self::new(self.count.saturating_mul(2), self.sides, self.modifier)
    }

    #[must_use]
    pub const fn with_modifier(self, modifier: i32) -> Self {
        Self::new(self.count, self.sides, modifier)
    }

    /// Smallest possible total, saturating at the `i32` bounds.
    pub fn minimum(&self) -> i32 {
        let dice = if self.has_dice() { i64::from(self.count) } else { 0 };
        saturate(dice + i64::from(self.modifier))
    }

    /// Largest possible total, saturating at the `i32` bounds.
    pub fn maximum(&self) -> i32 {
        saturate(i64::from(self.count) * i64::from(self.sides) + i64::from(self.modifier))
    }
}

/// Clamps a wide total into `i32`.
pub(crate) fn saturate(total: i64) -> i32 {
    total.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

impl FromStr for DiceFormula {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DiceFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.has_dice() {
            return write!(f, "{}", self.modifier);
        }
        write!(f, "{}d{}", self.count, self.sides)?;
        match self.modifier {
            0 => Ok(()),
            m if m > 0 => write!(f, "+{m}"),
            m => write!(f, "{m}"),
        }
    }
}
