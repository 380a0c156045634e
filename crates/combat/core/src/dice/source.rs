//! Sources of raw die faces.
//!
//! A [`DiceSource`] only answers "what face came up on a die with N sides".
//! Everything else (advantage, modifiers, crit flags) lives in
//! [`Dice`](super::Dice), so hosts can swap in a networked or replayed source
//! without touching the rules.

use std::collections::VecDeque;

/// Supplies raw die faces in `1..=sides`.
pub trait DiceSource {
    fn roll_die(&mut self, sides: u32) -> u32;
}

/// Deterministic PCG stream (PCG-XSH-RR, 64-bit state, 32-bit output).
///
/// The same seed always produces the same sequence of faces, which keeps
/// replays and synchronized tables reproducible.
#[derive(Clone, Copy, Debug)]
pub struct SeededDice {
    state: u64,
}

impl SeededDice {
    /// PCG multiplier constant.
    const MULTIPLIER: u64 = 6364136223846793005;

    /// PCG increment constant.
    const INCREMENT: u64 = 1442695040888963407;

    pub const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Advances the stream and returns the next 32-bit output.
    pub fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT);

        let xorshifted = (((self.state >> 18) ^ self.state) >> 27) as u32;
        let rot = (self.state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl DiceSource for SeededDice {
    fn roll_die(&mut self, sides: u32) -> u32 {
        if sides == 0 {
            return 0;
        }
        (self.next_u32() % sides) + 1
    }
}

/// Replays predetermined faces in order.
///
/// Used to apply rolls made elsewhere (a player's physical dice, a peer's
/// synchronized roll) and to drive deterministic tests. Faces are clamped to
/// the die being rolled; an exhausted queue yields 1.
#[derive(Clone, Debug, Default)]
pub struct ScriptedDice {
    faces: VecDeque<u32>,
}

impl ScriptedDice {
    pub fn new(faces: impl IntoIterator<Item = u32>) -> Self {
        Self {
            faces: faces.into_iter().collect(),
        }
    }

    pub fn push(&mut self, face: u32) {
        self.faces.push_back(face);
    }

    pub fn remaining(&self) -> usize {
        self.faces.len()
    }
}

impl DiceSource for ScriptedDice {
    fn roll_die(&mut self, sides: u32) -> u32 {
        if sides == 0 {
            return 0;
        }
        match self.faces.pop_front() {
            Some(face) => face.clamp(1, sides),
            None => {
                tracing::warn!("scripted dice exhausted while rolling d{}, using 1", sides);
                1
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_dice_are_deterministic_and_in_range() {
        let mut a = SeededDice::new(42);
        let mut b = SeededDice::new(42);
        for _ in 0..200 {
            let face = a.roll_die(20);
            assert_eq!(face, b.roll_die(20));
            assert!((1..=20).contains(&face));
        }
    }

    #[test]
    fn scripted_dice_clamp_and_fall_back() {
        let mut dice = ScriptedDice::new([25, 0, 4]);
        assert_eq!(dice.roll_die(20), 20);
        assert_eq!(dice.roll_die(6), 1);
        assert_eq!(dice.roll_die(6), 4);
        assert_eq!(dice.remaining(), 0);
        assert_eq!(dice.roll_die(8), 1);
    }
}
