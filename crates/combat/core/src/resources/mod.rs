//! Per-entity resource ledgers.
//!
//! Each ledger is mutated in place by its owner's calls and never
//! replenishes on its own; resets are explicit and driven by the host's
//! rest and turn bookkeeping.
mod concentration;
mod death_saves;
mod legendary;
mod multiattack;
mod spell_slots;

pub use concentration::{
    ConcentrationCheck, ConcentrationRegistry, ConcentrationState, concentration_dc,
};
pub use death_saves::{DeathSaveOutcome, DeathSaveState};
pub use legendary::LegendaryState;
pub use multiattack::MultiAttackState;
pub use spell_slots::{PactPool, SlotPool, SpellSlotState};

use crate::error::{CombatError, ErrorSeverity};

/// A spend request the ledger cannot satisfy. The ledger is unchanged.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ResourceError {
    #[error("no level {0} spell slot available")]
    NoSlot(u8),

    #[error("spell slot level {0} is outside 1..=9")]
    InvalidSlotLevel(u8),

    #[error("no pact magic slot available for level {0}")]
    NoPactSlot(u8),

    #[error("legendary action costs {cost} but only {remaining} remain")]
    LegendaryActionsExhausted { cost: u8, remaining: u8 },

    #[error("no legendary resistance remaining")]
    LegendaryResistanceExhausted,

    #[error("attack budget of {0} already used this turn")]
    AttacksExhausted(u8),
}

impl CombatError for ResourceError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvalidSlotLevel(_) => ErrorSeverity::Validation,
            _ => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NoSlot(_) => "RESOURCE_NO_SLOT",
            Self::InvalidSlotLevel(_) => "RESOURCE_INVALID_SLOT_LEVEL",
            Self::NoPactSlot(_) => "RESOURCE_NO_PACT_SLOT",
            Self::LegendaryActionsExhausted { .. } => "RESOURCE_LEGENDARY_ACTIONS",
            Self::LegendaryResistanceExhausted => "RESOURCE_LEGENDARY_RESISTANCE",
            Self::AttacksExhausted(_) => "RESOURCE_ATTACKS_EXHAUSTED",
        }
    }
}
