//! Supplemental effects that ride on an attack: weapon mastery and
//! damage-type feats.
mod feats;
mod mastery;

pub use feats::{FeatContext, resolve_feats};
pub use mastery::{MasteryContext, WeaponMastery, resolve_mastery};

use crate::conditions::Condition;
use crate::damage::DamageType;
use crate::state::EntityId;

/// One supplemental effect produced by a rider.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RiderEffect {
    /// Condition to add on the host.
    Condition(Condition),
    /// Move the target straight away from the attacker.
    Push { target: EntityId, feet: u32 },
    /// Damage added to the hit, resolved with the rest of the damage.
    ExtraDamage { amount: u32, damage_type: DamageType },
    /// Damage dealt on a miss, resolved on its own.
    Graze { amount: u32, damage_type: DamageType },
    /// An additional attack the attacker may make.
    BonusAttack { note: String },
    /// Informational outcome (a resisted save, a skipped rider).
    Note(String),
}

impl RiderEffect {
    pub fn describe(&self) -> String {
        match self {
            Self::Condition(condition) => format!("{} {}", condition.entity, condition.kind),
            Self::Push { target, feet } => format!("{target} pushed {feet} ft"),
            Self::ExtraDamage {
                amount,
                damage_type,
            } => format!("+{amount} {damage_type}"),
            Self::Graze {
                amount,
                damage_type,
            } => format!("graze {amount} {damage_type}"),
            Self::BonusAttack { note } | Self::Note(note) => note.clone(),
        }
    }
}
