//! Death saving throws for a creature at 0 HP.
//!
//! ```text
//! natural 20  -> counters reset, 1 HP, Revived
//! natural 1   -> +2 failures
//! 10..=19     -> +1 success
//! otherwise   -> +1 failure
//! 3 successes -> Stabilized      3 failures -> Dead
//! ```

use crate::dice::{Dice, DiceRoll, RollMode};

/// Result of one death-save event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeathSaveOutcome {
    Success { successes: u8 },
    Failure { failures: u8 },
    /// Back to 1 HP and conscious.
    Revived,
    Stabilized,
    Dead,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeathSaveState {
    pub successes: u8,
    pub failures: u8,
    pub stable: bool,
    pub dead: bool,
}

impl DeathSaveState {
    const LIMIT: u8 = 3;

    pub fn new() -> Self {
        Self::default()
    }

    /// Rolls a death save.
    pub fn roll(&mut self, dice: &mut Dice) -> (DiceRoll, DeathSaveOutcome) {
        let roll = dice.d20(RollMode::Normal, 0, "Death save");
        let outcome = self.record(roll.natural.unwrap_or(1));
        (roll, outcome)
    }

    /// Applies a death save with the given natural d20 face.
    pub fn record(&mut self, natural: u32) -> DeathSaveOutcome {
        if self.dead {
            return DeathSaveOutcome::Dead;
        }
        match natural {
            20 => {
                *self = Self::new();
                DeathSaveOutcome::Revived
            }
            1 => self.add_failures(2),
            10..=19 => {
                self.successes = (self.successes + 1).min(Self::LIMIT);
                if self.successes >= Self::LIMIT {
                    self.successes = 0;
                    self.failures = 0;
                    self.stable = true;
                    DeathSaveOutcome::Stabilized
                } else {
                    DeathSaveOutcome::Success {
                        successes: self.successes,
                    }
                }
            }
            _ => self.add_failures(1),
        }
    }

    /// Damage taken while at 0 HP.
    ///
    /// One failure, two on a critical hit. Damage of at least the
    /// creature's HP maximum kills outright with three failures.
    pub fn take_damage(&mut self, damage: u32, max_hp: u32, critical: bool) -> DeathSaveOutcome {
        if damage >= max_hp {
            self.successes = 0;
            self.stable = false;
            self.failures = Self::LIMIT;
            self.dead = true;
            return DeathSaveOutcome::Dead;
        }
        self.stable = false;
        self.add_failures(if critical { 2 } else { 1 })
    }

    /// Any healing ends the dying state.
    pub fn heal(&mut self) {
        if !self.dead {
            *self = Self::new();
        }
    }

    fn add_failures(&mut self, count: u8) -> DeathSaveOutcome {
        self.failures = (self.failures + count).min(Self::LIMIT);
        if self.failures >= Self::LIMIT {
            self.dead = true;
            DeathSaveOutcome::Dead
        } else {
            DeathSaveOutcome::Failure {
                failures: self.failures,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_twenty_revives_and_clears() {
        let mut state = DeathSaveState {
            successes: 1,
            failures: 2,
            ..DeathSaveState::new()
        };
        assert_eq!(state.record(20), DeathSaveOutcome::Revived);
        assert_eq!((state.successes, state.failures), (0, 0));
    }

    #[test]
    fn natural_one_counts_twice() {
        let mut state = DeathSaveState::new();
        assert_eq!(state.record(1), DeathSaveOutcome::Failure { failures: 2 });
        assert_eq!(state.record(5), DeathSaveOutcome::Dead);
        assert!(state.dead);
        assert_eq!(state.record(20), DeathSaveOutcome::Dead);
    }

    #[test]
    fn three_successes_stabilize() {
        let mut state = DeathSaveState::new();
        let mut dice = Dice::scripted([10, 15]);
        assert_eq!(dice_outcome(&mut state, &mut dice), DeathSaveOutcome::Success { successes: 1 });
        assert_eq!(dice_outcome(&mut state, &mut dice), DeathSaveOutcome::Success { successes: 2 });
        assert_eq!(state.record(19), DeathSaveOutcome::Stabilized);
        assert!(state.stable);
    }

    fn dice_outcome(state: &mut DeathSaveState, dice: &mut Dice) -> DeathSaveOutcome {
        state.roll(dice).1
    }

    #[test]
    fn damage_at_zero_adds_failures_or_kills() {
        let mut state = DeathSaveState::new();
        assert_eq!(state.take_damage(3, 20, true), DeathSaveOutcome::Failure { failures: 2 });
        assert_eq!(state.take_damage(3, 20, false), DeathSaveOutcome::Dead);

        let mut fresh = DeathSaveState::new();
        assert_eq!(fresh.take_damage(20, 20, false), DeathSaveOutcome::Dead);
        assert_eq!(fresh.failures, 3);
        assert!(fresh.dead);
    }

    #[test]
    fn massive_damage_kills_even_a_stable_creature() {
        let mut state = DeathSaveState {
            successes: 2,
            stable: true,
            ..DeathSaveState::new()
        };
        assert_eq!(state.take_damage(45, 30, false), DeathSaveOutcome::Dead);
        assert_eq!(
            state,
            DeathSaveState {
                successes: 0,
                failures: 3,
                stable: false,
                dead: true,
            }
        );
    }

    #[test]
    fn healing_resets_counters() {
        let mut state = DeathSaveState::new();
        state.record(4);
        state.heal();
        assert_eq!(state, DeathSaveState::new());
    }
}
