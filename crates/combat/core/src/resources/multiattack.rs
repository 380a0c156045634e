use crate::features::FeatureSet;

use super::ResourceError;

/// Attacks per Attack action for one turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MultiAttackState {
    pub used: u8,
    pub budget: u8,
}

impl MultiAttackState {
    pub const fn new(budget: u8) -> Self {
        Self { used: 0, budget }
    }

    /// Budget from Extra Attack or Multiattack features.
    pub fn for_features(features: &FeatureSet) -> Self {
        Self::new(features.attacks_per_action())
    }

    /// Records one attack. Returns how many remain.
    pub fn record_attack(&mut self) -> Result<u8, ResourceError> {
        if self.used >= self.budget {
            return Err(ResourceError::AttacksExhausted(self.budget));
        }
        self.used += 1;
        Ok(self.remaining())
    }

    pub const fn remaining(&self) -> u8 {
        self.budget.saturating_sub(self.used)
    }

    pub fn begin_turn(&mut self) {
        self.used = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extra_attack_allows_two() {
        let mut state = MultiAttackState::for_features(&FeatureSet::from_names(["Extra Attack"]));
        assert_eq!(state.record_attack(), Ok(1));
        assert_eq!(state.record_attack(), Ok(0));
        assert_eq!(state.record_attack(), Err(ResourceError::AttacksExhausted(2)));
        state.begin_turn();
        assert_eq!(state.remaining(), 2);
    }
}
