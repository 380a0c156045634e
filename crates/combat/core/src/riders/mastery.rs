use crate::conditions::{Condition, ConditionKind};
use crate::damage::DamageType;
use crate::dice::{Dice, RollMode};
use crate::geometry::CreatureSize;
use crate::state::Token;

use super::RiderEffect;

/// Weapon mastery property.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::EnumIter,
)]
#[strum(ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WeaponMastery {
    Cleave,
    Graze,
    Nick,
    Push,
    Sap,
    Slow,
    Topple,
    Vex,
}

/// Inputs a mastery rider needs.
#[derive(Clone, Copy, Debug)]
pub struct MasteryContext<'a> {
    pub attacker: &'a Token,
    pub target: &'a Token,
    /// Modifier of the ability used for the attack.
    pub ability_modifier: i32,
    pub damage_type: DamageType,
    pub round: u32,
}

/// Effects of a mastery for a hit or a miss.
///
/// Only Graze triggers on a miss; every other mastery needs a hit.
pub fn resolve_mastery(
    mastery: WeaponMastery,
    hit: bool,
    ctx: &MasteryContext<'_>,
    dice: &mut Dice,
) -> Vec<RiderEffect> {
    let attacker = ctx.attacker;
    let target = ctx.target;
    let mark = |kind: ConditionKind| {
        RiderEffect::Condition(
            Condition::new(target.id, kind)
                .from_source(attacker.id)
                .lasting(1)
                .applied_in(ctx.round),
        )
    };

    match (mastery, hit) {
        (WeaponMastery::Graze, false) if ctx.ability_modifier > 0 => vec![RiderEffect::Graze {
            amount: ctx.ability_modifier as u32,
            damage_type: ctx.damage_type,
        }],
        (WeaponMastery::Graze, _) | (_, false) => Vec::new(),

        (WeaponMastery::Cleave, true) => vec![RiderEffect::BonusAttack {
            note: "Cleave: attack a second creature within 5 ft of the target".to_string(),
        }],
        (WeaponMastery::Nick, true) => vec![RiderEffect::BonusAttack {
            note: "Nick: light-weapon attack as part of the Attack action".to_string(),
        }],
        (WeaponMastery::Push, true) => {
            if target.size <= CreatureSize::Large {
                vec![RiderEffect::Push {
                    target: target.id,
                    feet: 10,
                }]
            } else {
                vec![RiderEffect::Note(format!("{} is too large to push", target.name))]
            }
        }
        (WeaponMastery::Sap, true) => vec![mark(ConditionKind::Sapped)],
        (WeaponMastery::Slow, true) => vec![mark(ConditionKind::Slowed)],
        (WeaponMastery::Vex, true) => vec![mark(ConditionKind::Vexed)],
        (WeaponMastery::Topple, true) => {
            let dc = 8 + ctx.ability_modifier + attacker.proficiency_bonus;
            let save = dice.d20(RollMode::Normal, target.abilities.con, "Topple save");
            tracing::debug!("topple save {} vs DC {}", save.total, dc);
            if save.total >= dc {
                vec![RiderEffect::Note(format!(
                    "{} resists Topple ({} vs DC {dc})",
                    target.name, save.total
                ))]
            } else {
                vec![mark(ConditionKind::Prone)]
            }
        }
    }
}
