use super::ResourceError;

/// Legendary actions and legendary resistances of one creature.
///
/// Neither counter replenishes on its own: actions come back at the start
/// of the creature's turn and resistances per day, both through explicit
/// resets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LegendaryState {
    pub actions_remaining: u8,
    pub actions_max: u8,
    pub resistances_remaining: u8,
    pub resistances_max: u8,
}

impl LegendaryState {
    pub const fn new(actions: u8, resistances: u8) -> Self {
        Self {
            actions_remaining: actions,
            actions_max: actions,
            resistances_remaining: resistances,
            resistances_max: resistances,
        }
    }

    /// Spends `cost` legendary actions. Returns what remains.
    pub fn spend(&mut self, cost: u8) -> Result<u8, ResourceError> {
        if self.actions_remaining < cost {
            return Err(ResourceError::LegendaryActionsExhausted {
                cost,
                remaining: self.actions_remaining,
            });
        }
        self.actions_remaining -= cost;
        Ok(self.actions_remaining)
    }

    /// Spends one legendary resistance to turn a failed save into a success.
    pub fn spend_resistance(&mut self) -> Result<u8, ResourceError> {
        if self.resistances_remaining == 0 {
            return Err(ResourceError::LegendaryResistanceExhausted);
        }
        self.resistances_remaining -= 1;
        Ok(self.resistances_remaining)
    }

    pub fn reset_actions(&mut self) {
        self.actions_remaining = self.actions_max;
    }

    pub fn reset_resistances(&mut self) {
        self.resistances_remaining = self.resistances_max;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_need_enough_budget() {
        let mut dragon = LegendaryState::new(3, 3);
        assert_eq!(dragon.spend(2), Ok(1));
        assert_eq!(
            dragon.spend(2),
            Err(ResourceError::LegendaryActionsExhausted { cost: 2, remaining: 1 })
        );
        assert_eq!(dragon.actions_remaining, 1);
        dragon.reset_actions();
        assert_eq!(dragon.actions_remaining, 3);
    }

    #[test]
    fn resistance_decrements_until_empty() {
        let mut lich = LegendaryState::new(0, 1);
        assert_eq!(lich.spend_resistance(), Ok(0));
        assert_eq!(lich.spend_resistance(), Err(ResourceError::LegendaryResistanceExhausted));
        assert_eq!(lich.resistances_remaining, 0);
        lich.reset_resistances();
        assert_eq!(lich.resistances_remaining, 1);
    }
}
