//! Damage-type feats: Piercer, Crusher and Slasher.

use crate::conditions::{Condition, ConditionKind};
use crate::damage::DamageType;
use crate::dice::Dice;
use crate::features::Feature;
use crate::state::Token;

use super::RiderEffect;

#[derive(Clone, Copy, Debug)]
pub struct FeatContext<'a> {
    pub attacker: &'a Token,
    pub target: &'a Token,
    /// Damage type of the weapon's base damage.
    pub damage_type: DamageType,
    /// Die size of the weapon's base damage, for Piercer's extra die.
    pub damage_die: u32,
    pub is_critical: bool,
    pub round: u32,
}

/// Feat effects for a hit. Misses never trigger these feats.
pub fn resolve_feats(ctx: &FeatContext<'_>, dice: &mut Dice) -> Vec<RiderEffect> {
    let features = &ctx.attacker.features;
    let mut effects = Vec::new();
    let mark = |kind: ConditionKind| {
        RiderEffect::Condition(
            Condition::new(ctx.target.id, kind)
                .from_source(ctx.attacker.id)
                .lasting(1)
                .applied_in(ctx.round),
        )
    };

    match ctx.damage_type {
        DamageType::Piercing if features.contains(&Feature::Piercer) => {
            if ctx.is_critical && ctx.damage_die > 0 {
                let amount = dice.raw_die(ctx.damage_die);
                effects.push(RiderEffect::ExtraDamage {
                    amount,
                    damage_type: DamageType::Piercing,
                });
            }
        }
        DamageType::Bludgeoning if features.contains(&Feature::Crusher) => {
            if ctx.target.size.rank() <= ctx.attacker.size.rank() + 1 {
                effects.push(RiderEffect::Push {
                    target: ctx.target.id,
                    feet: 5,
                });
            }
            if ctx.is_critical {
                effects.push(mark(ConditionKind::Exposed));
            }
        }
        DamageType::Slashing if features.contains(&Feature::Slasher) => {
            effects.push(mark(ConditionKind::Slowed));
            if ctx.is_critical {
                effects.push(mark(ConditionKind::Hamstrung));
            }
        }
        _ => {}
    }

    effects
}
