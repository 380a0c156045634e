//! Rolling formulas with advantage, disadvantage and crit detection.

use super::formula::{DiceFormula, saturate};
use super::source::{DiceSource, ScriptedDice, SeededDice};

/// How a d20 is rolled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RollMode {
    #[default]
    Normal,
    Advantage,
    Disadvantage,
}

impl RollMode {
    /// Net mode from the presence of advantage and disadvantage sources.
    ///
    /// Any advantage together with any disadvantage cancels to `Normal`,
    /// regardless of how many sources each side has.
    pub const fn from_sources(has_advantage: bool, has_disadvantage: bool) -> Self {
        match (has_advantage, has_disadvantage) {
            (true, false) => Self::Advantage,
            (false, true) => Self::Disadvantage,
            _ => Self::Normal,
        }
    }

    /// Combines two modes with the same cancellation rule.
    #[must_use]
    pub const fn combine(self, other: Self) -> Self {
        let advantage = matches!(self, Self::Advantage) || matches!(other, Self::Advantage);
        let disadvantage =
            matches!(self, Self::Disadvantage) || matches!(other, Self::Disadvantage);
        Self::from_sources(advantage, disadvantage)
    }
}

/// Options for a single roll.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RollOptions {
    pub mode: RollMode,
    /// Display label ("Longsword attack", "Fireball damage", ...).
    pub label: Option<String>,
}

impl RollOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_mode(mut self, mode: RollMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Outcome of one roll.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiceRoll {
    pub formula: DiceFormula,
    pub label: Option<String>,
    /// Mode actually applied; advantage only applies to a single d20.
    pub mode: RollMode,
    /// Faces that count toward the total.
    pub dice: Vec<u32>,
    /// Both raw d20 faces when rolled with advantage or disadvantage.
    pub d20_pair: Option<(u32, u32)>,
    pub total: i32,
    /// Kept d20 face, for single-d20 rolls only.
    pub natural: Option<u32>,
    pub is_critical: bool,
    pub is_fumble: bool,
}

impl DiceRoll {
    /// Zero/no-op roll used when a formula cannot be parsed.
    pub fn zero(label: Option<String>) -> Self {
        Self {
            formula: DiceFormula::flat(0),
            label,
            mode: RollMode::Normal,
            dice: Vec::new(),
            d20_pair: None,
            total: 0,
            natural: None,
            is_critical: false,
            is_fumble: false,
        }
    }

    /// Damage totals never go below zero.
    pub fn damage_total(&self) -> u32 {
        self.total.max(0) as u32
    }

    /// Human-readable breakdown, e.g. `1d20 (8, 15) +5 = 20`.
    pub fn describe(&self) -> String {
        let faces = match self.d20_pair {
            Some((a, b)) => format!("({a}, {b})"),
            None if self.dice.is_empty() => String::new(),
            None => format!(
                "[{}]",
                self.dice
                    .iter()
                    .map(u32::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        };
        format!("{} {} = {}", self.formula, faces, self.total)
    }
}

/// Side-effect hook notified of every completed roll (animation, broadcast).
pub trait RollObserver {
    fn on_roll(&mut self, roll: &DiceRoll);
}

/// Dice roller: a face source plus optional observers.
pub struct Dice {
    source: Box<dyn DiceSource>,
    observers: Vec<Box<dyn RollObserver>>,
}

impl Dice {
    pub fn new(source: impl DiceSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            observers: Vec::new(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(SeededDice::new(seed))
    }

    pub fn scripted(faces: impl IntoIterator<Item = u32>) -> Self {
        Self::new(ScriptedDice::new(faces))
    }

    #[must_use]
    pub fn with_observer(mut self, observer: impl RollObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    /// Parses and rolls `formula`. Malformed formulas degrade to a zero roll.
    pub fn roll(&mut self, formula: &str, options: RollOptions) -> DiceRoll {
        match DiceFormula::parse(formula) {
            Ok(parsed) => self.roll_formula(&parsed, options),
            Err(err) => {
                tracing::debug!("malformed dice formula {:?}: {}", formula, err);
                let roll = DiceRoll::zero(options.label);
                self.notify(&roll);
                roll
            }
        }
    }

    /// Rolls a parsed formula.
    pub fn roll_formula(&mut self, formula: &DiceFormula, options: RollOptions) -> DiceRoll {
        let roll = if formula.is_single_d20() {
            self.roll_d20_formula(formula, options)
        } else {
            let dice: Vec<u32> = (0..formula.count)
                .map(|_| self.source.roll_die(formula.sides))
                .collect();
            let faces: i64 = dice.iter().map(|&d| i64::from(d)).sum();
            let total = saturate(faces + i64::from(formula.modifier));
            DiceRoll {
                formula: *formula,
                label: options.label,
                mode: RollMode::Normal,
                dice,
                d20_pair: None,
                total,
                natural: None,
                is_critical: false,
                is_fumble: false,
            }
        };
        self.notify(&roll);
        roll
    }

    /// Rolls `1d20 + modifier` in the given mode.
    pub fn d20(&mut self, mode: RollMode, modifier: i32, label: impl Into<String>) -> DiceRoll {
        self.roll_formula(
            &DiceFormula::d20().with_modifier(modifier),
            RollOptions::new().with_mode(mode).labeled(label),
        )
    }

    /// Rolls a single die, with no observers notified. Used for riders that
    /// are folded into a larger roll.
    pub fn raw_die(&mut self, sides: u32) -> u32 {
        self.source.roll_die(sides)
    }

    fn roll_d20_formula(&mut self, formula: &DiceFormula, options: RollOptions) -> DiceRoll {
        let first = self.source.roll_die(20);
        let (kept, pair) = match options.mode {
            RollMode::Normal => (first, None),
            RollMode::Advantage => {
                let second = self.source.roll_die(20);
                (first.max(second), Some((first, second)))
            }
            RollMode::Disadvantage => {
                let second = self.source.roll_die(20);
                (first.min(second), Some((first, second)))
            }
        };
        DiceRoll {
            formula: *formula,
            label: options.label,
            mode: options.mode,
            dice: vec![kept],
            d20_pair: pair,
            total: saturate(i64::from(kept) + i64::from(formula.modifier)),
            natural: Some(kept),
            is_critical: kept == 20,
            is_fumble: kept == 1,
        }
    }

    fn notify(&mut self, roll: &DiceRoll) {
        for observer in &mut self.observers {
            observer.on_roll(roll);
        }
    }
}

impl core::fmt::Debug for Dice {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Dice")
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    struct Recorder(Rc<RefCell<Vec<i32>>>);

    impl RollObserver for Recorder {
        fn on_roll(&mut self, roll: &DiceRoll) {
            self.0.borrow_mut().push(roll.total);
        }
    }

    #[test]
    fn advantage_keeps_higher_and_records_both() {
        let mut dice = Dice::scripted([6, 17]);
        let roll = dice.d20(RollMode::Advantage, 2, "attack");
        assert_eq!(roll.natural, Some(17));
        assert_eq!(roll.d20_pair, Some((6, 17)));
        assert_eq!(roll.total, 19);
    }

    #[test]
    fn disadvantage_keeps_lower() {
        let mut dice = Dice::scripted([20, 3]);
        let roll = dice.d20(RollMode::Disadvantage, 0, "attack");
        assert_eq!(roll.natural, Some(3));
        assert!(!roll.is_critical);
    }

    #[test]
    fn crit_and_fumble_only_flag_single_d20() {
        let mut dice = Dice::scripted([20, 1, 20, 20]);
        assert!(dice.d20(RollMode::Normal, 0, "a").is_critical);
        assert!(dice.d20(RollMode::Normal, 0, "b").is_fumble);

        let roll = dice.roll("2d20", RollOptions::new());
        assert_eq!(roll.total, 40);
        assert!(!roll.is_critical);
        assert_eq!(roll.natural, None);
    }

    #[test]
    fn advantage_ignored_for_non_d20_formulas() {
        let mut dice = Dice::scripted([3, 4]);
        let roll = dice.roll(
            "2d6+1",
            RollOptions::new().with_mode(RollMode::Advantage),
        );
        assert_eq!(roll.mode, RollMode::Normal);
        assert_eq!(roll.dice, vec![3, 4]);
        assert_eq!(roll.total, 8);
    }

    #[test]
    fn oversized_formulas_never_overflow() {
        let mut dice = Dice::seeded(7);
        let rejected = dice.roll("1000d10000000", RollOptions::new());
        assert_eq!(rejected.total, 0);

        let largest = dice.roll("1000d1000+2147483647", RollOptions::new());
        assert_eq!(largest.total, i32::MAX);

        let hand_built = DiceFormula::new(3, u32::MAX, i32::MAX);
        let mut max_faces = Dice::scripted([u32::MAX, u32::MAX, u32::MAX]);
        assert_eq!(max_faces.roll_formula(&hand_built, RollOptions::new()).total, i32::MAX);

        let low = Dice::scripted([1]).d20(RollMode::Normal, i32::MIN, "cursed");
        assert_eq!(low.total, i32::MIN + 1);
    }

    #[test]
    fn malformed_formula_is_zero_roll() {
        let mut dice = Dice::scripted([]);
        let roll = dice.roll("banana", RollOptions::new().labeled("oops"));
        assert_eq!(roll.total, 0);
        assert!(roll.dice.is_empty());
        assert_eq!(roll.label.as_deref(), Some("oops"));
    }

    #[test]
    fn observers_see_every_roll() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut dice = Dice::scripted([5, 2]).with_observer(Recorder(seen.clone()));
        dice.roll("1d6", RollOptions::new());
        dice.roll("1d4+1", RollOptions::new());
        dice.roll("nope", RollOptions::new());
        assert_eq!(*seen.borrow(), vec![5, 3, 0]);
    }

    #[test]
    fn mode_cancellation() {
        assert_eq!(RollMode::from_sources(true, true), RollMode::Normal);
        assert_eq!(RollMode::from_sources(true, false), RollMode::Advantage);
        assert_eq!(
            RollMode::Advantage.combine(RollMode::Disadvantage),
            RollMode::Normal
        );
        assert_eq!(
            RollMode::Normal.combine(RollMode::Disadvantage),
            RollMode::Disadvantage
        );
    }
}
