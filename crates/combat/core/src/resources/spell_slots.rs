use crate::tables::{CasterProgression, RulesTables};

use super::ResourceError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlotPool {
    pub current: u8,
    pub max: u8,
}

/// Warlock pact slots: all the same level, restored on a short rest.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PactPool {
    pub current: u8,
    pub max: u8,
    pub slot_level: u8,
}

/// Spell slots by level (index 0 is 1st level) plus an optional pact pool.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpellSlotState {
    pools: [SlotPool; 9],
    pact: Option<PactPool>,
}

impl SpellSlotState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full slots for a class level under a progression.
    pub fn from_progression(tables: &RulesTables, progression: CasterProgression, level: u8) -> Self {
        let mut state = Self::new();
        for (pool, &max) in state.pools.iter_mut().zip(tables.slots(progression, level)) {
            *pool = SlotPool { current: max, max };
        }
        if progression == CasterProgression::Pact {
            state = state.with_pact(tables, level);
        }
        state
    }

    /// Adds pact magic for a warlock level, e.g. for a multiclass caster.
    #[must_use]
    pub fn with_pact(mut self, tables: &RulesTables, warlock_level: u8) -> Self {
        self.pact = tables.pact_slots(warlock_level).map(|row| PactPool {
            current: row.slots,
            max: row.slots,
            slot_level: row.slot_level,
        });
        self
    }

    /// Sets a pool directly.
    #[must_use]
    pub fn with_slots(mut self, level: u8, max: u8) -> Self {
        if let Some(pool) = self.pool_mut(level) {
            *pool = SlotPool { current: max, max };
        }
        self
    }

    pub fn pool(&self, level: u8) -> Option<SlotPool> {
        level
            .checked_sub(1)
            .and_then(|idx| self.pools.get(usize::from(idx)))
            .copied()
    }

    pub fn pact(&self) -> Option<PactPool> {
        self.pact
    }

    /// Spends one slot of `level`.
    ///
    /// Level 0 (a cantrip) always succeeds without touching any pool. With
    /// `use_pact` the pact pool is spent instead; its slots cast at their own
    /// level, so any `level` up to that is accepted.
    pub fn expend(&mut self, level: u8, use_pact: bool) -> Result<(), ResourceError> {
        if level == 0 {
            return Ok(());
        }
        if level > 9 {
            return Err(ResourceError::InvalidSlotLevel(level));
        }

        if use_pact {
            return match self.pact.as_mut() {
                Some(pact) if pact.current > 0 && level <= pact.slot_level => {
                    pact.current -= 1;
                    Ok(())
                }
                _ => Err(ResourceError::NoPactSlot(level)),
            };
        }

        match self.pool_mut(level) {
            Some(pool) if pool.current > 0 => {
                pool.current -= 1;
                Ok(())
            }
            _ => Err(ResourceError::NoSlot(level)),
        }
    }

    /// Long rest.
    pub fn restore_all(&mut self) {
        for pool in &mut self.pools {
            pool.current = pool.max;
        }
        self.restore_pact();
    }

    /// Short rest.
    pub fn restore_pact(&mut self) {
        if let Some(pact) = self.pact.as_mut() {
            pact.current = pact.max;
        }
    }

    /// Highest slot level with at least one slot left, 0 when none.
    pub fn highest_available(&self) -> u8 {
        let regular = self
            .pools
            .iter()
            .rposition(|pool| pool.current > 0)
            .map_or(0, |idx| idx as u8 + 1);
        let pact = self
            .pact
            .filter(|p| p.current > 0)
            .map_or(0, |p| p.slot_level);
        regular.max(pact)
    }

    fn pool_mut(&mut self, level: u8) -> Option<&mut SlotPool> {
        level
            .checked_sub(1)
            .and_then(|idx| self.pools.get_mut(usize::from(idx)))
    }
}
