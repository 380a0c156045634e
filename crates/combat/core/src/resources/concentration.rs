//! Concentration on a spell.

use crate::dice::{Dice, DiceRoll, RollMode};
use crate::state::EntityId;

/// External record of who concentrates on what. The host implements it;
/// the engine only reports endings.
pub trait ConcentrationRegistry {
    fn concentration_ended(&mut self, entity: EntityId, spell: &str);
}

/// Save DC to keep concentrating after taking `damage`:
/// `max(10, floor(damage / 2))`, capped at `cap`.
pub fn concentration_dc(damage: u32, cap: u32) -> u32 {
    (damage / 2).max(10).min(cap.max(10))
}

/// Result of a concentration save.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConcentrationCheck {
    pub dc: u32,
    pub roll: DiceRoll,
    pub maintained: bool,
    /// Spell that ended on a failed save.
    pub ended: Option<String>,
}

/// The spell one creature is concentrating on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConcentrationState {
    pub entity: EntityId,
    pub spell: Option<String>,
}

impl ConcentrationState {
    pub fn new(entity: EntityId) -> Self {
        Self {
            entity,
            spell: None,
        }
    }

    pub fn is_concentrating(&self) -> bool {
        self.spell.is_some()
    }

    /// Starts concentrating on `spell`, ending and reporting any previous one.
    pub fn start(
        &mut self,
        spell: impl Into<String>,
        registry: &mut (impl ConcentrationRegistry + ?Sized),
    ) -> Option<String> {
        let previous = self.spell.replace(spell.into());
        if let Some(old) = &previous {
            registry.concentration_ended(self.entity, old);
        }
        previous
    }

    /// Ends concentration voluntarily.
    pub fn end(&mut self, registry: &mut (impl ConcentrationRegistry + ?Sized)) -> Option<String> {
        let ended = self.spell.take();
        if let Some(spell) = &ended {
            registry.concentration_ended(self.entity, spell);
        }
        ended
    }

    /// Constitution save after taking damage. Without an active spell the
    /// save is still rolled and always maintained.
    pub fn check(
        &mut self,
        damage: u32,
        con_save_modifier: i32,
        mode: RollMode,
        dc_cap: u32,
        dice: &mut Dice,
        registry: &mut (impl ConcentrationRegistry + ?Sized),
    ) -> ConcentrationCheck {
        let dc = concentration_dc(damage, dc_cap);
        let roll = dice.d20(mode, con_save_modifier, "Concentration save");
        let maintained = roll.total >= dc as i32;
        tracing::debug!("concentration save {} vs DC {}", roll.total, dc);

        let ended = if maintained { None } else { self.end(registry) };
        ConcentrationCheck {
            dc,
            roll,
            maintained,
            ended,
        }
    }
}
