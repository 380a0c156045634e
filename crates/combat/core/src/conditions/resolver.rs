//! Pure combination of conditions and situation into a roll mode.

use super::{ConditionKind, ConditionSet};
use crate::config::EngineConfig;
use crate::damage::DamageType;
use crate::dice::RollMode;
use crate::state::EntityId;

/// Situational facts about one attack.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AttackContext {
    pub attacker: EntityId,
    pub is_ranged: bool,
    /// Attacker and target are within 5 ft of each other.
    pub is_within_5ft: bool,
    /// A hostile creature stands within 5 ft of the attacker.
    pub any_enemy_within_5ft_of_attacker: bool,
    pub target_is_dodging: bool,
    pub is_underwater: bool,
    pub weapon_damage_type: Option<DamageType>,
    pub attacker_has_swim: bool,
    /// An ally of the attacker stands opposite the target (optional rule).
    pub flanking_ally: bool,
}

impl AttackContext {
    pub fn melee(attacker: EntityId) -> Self {
        Self {
            attacker,
            is_within_5ft: true,
            ..Self::default()
        }
    }

    pub fn ranged(attacker: EntityId) -> Self {
        Self {
            attacker,
            is_ranged: true,
            ..Self::default()
        }
    }
}

/// Net effect of every condition on one attack roll.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConditionEffects {
    pub advantage_sources: Vec<String>,
    pub disadvantage_sources: Vec<String>,
    pub roll_mode: RollMode,
    /// Any hit becomes a critical hit.
    pub auto_crit: bool,
    pub attacker_cannot_act: bool,
    /// Subtracted from the d20 total.
    pub exhaustion_penalty: i32,
}

impl ConditionEffects {
    /// Recomputes the mode after extra sources were pushed.
    pub fn refresh_mode(&mut self) {
        self.roll_mode = RollMode::from_sources(
            !self.advantage_sources.is_empty(),
            !self.disadvantage_sources.is_empty(),
        );
    }
}

/// Combines attacker and target conditions with the attack's situation.
pub fn resolve_conditions(
    attacker: &ConditionSet,
    target: &ConditionSet,
    ctx: &AttackContext,
    config: &EngineConfig,
) -> ConditionEffects {
    let mut effects = ConditionEffects {
        attacker_cannot_act: attacker.cannot_act(),
        exhaustion_penalty: config.exhaustion_penalty_per_level
            * i32::from(attacker.exhaustion_level()),
        ..ConditionEffects::default()
    };
    if effects.attacker_cannot_act {
        return effects;
    }

    let adv = &mut effects.advantage_sources;
    let dis = &mut effects.disadvantage_sources;
    let close_melee = !ctx.is_ranged && ctx.is_within_5ft;

    // Attacker side.
    for (kind, label) in [
        (ConditionKind::Blinded, "attacker blinded"),
        (ConditionKind::Frightened, "attacker frightened"),
        (ConditionKind::Poisoned, "attacker poisoned"),
        (ConditionKind::Prone, "attacker prone"),
        (ConditionKind::Restrained, "attacker restrained"),
        (ConditionKind::Sapped, "sapped"),
        (ConditionKind::Hamstrung, "hamstrung"),
    ] {
        if attacker.has(&kind) {
            dis.push(label.to_string());
        }
    }
    if attacker.has(&ConditionKind::Invisible) {
        adv.push("attacker invisible".to_string());
    }
    if ctx.is_ranged && ctx.any_enemy_within_5ft_of_attacker {
        dis.push("ranged attack with an enemy adjacent".to_string());
    }
    if ctx.is_underwater {
        let piercing = ctx.weapon_damage_type == Some(DamageType::Piercing);
        if ctx.is_ranged && !piercing {
            dis.push("underwater ranged attack".to_string());
        } else if !ctx.is_ranged && !ctx.attacker_has_swim && !piercing {
            dis.push("underwater melee without swim speed".to_string());
        }
    }

    // Target side.
    for (kind, label) in [
        (ConditionKind::Blinded, "target blinded"),
        (ConditionKind::Paralyzed, "target paralyzed"),
        (ConditionKind::Stunned, "target stunned"),
        (ConditionKind::Unconscious, "target unconscious"),
        (ConditionKind::Petrified, "target petrified"),
        (ConditionKind::Restrained, "target restrained"),
        (ConditionKind::Exposed, "target exposed"),
    ] {
        if target.has(&kind) {
            adv.push(label.to_string());
        }
    }
    if target.has_from(&ConditionKind::Vexed, ctx.attacker) {
        adv.push("vexed".to_string());
    }
    if target.has(&ConditionKind::Prone) {
        if close_melee {
            adv.push("target prone".to_string());
        } else {
            dis.push("target prone at range".to_string());
        }
    }
    if config.flanking && ctx.flanking_ally && !ctx.is_ranged {
        adv.push("flanking".to_string());
    }
    if target.has(&ConditionKind::Invisible) {
        dis.push("target invisible".to_string());
    }
    if ctx.target_is_dodging && !target.cannot_act() {
        dis.push("target dodging".to_string());
    }

    effects.auto_crit = close_melee
        && (target.has(&ConditionKind::Paralyzed) || target.has(&ConditionKind::Unconscious));
    effects.refresh_mode();
    effects
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(kinds: impl IntoIterator<Item = ConditionKind>) -> ConditionSet {
        ConditionSet::from_kinds(kinds)
    }

    fn resolve(attacker: &ConditionSet, target: &ConditionSet, ctx: &AttackContext) -> ConditionEffects {
        resolve_conditions(attacker, target, ctx, &EngineConfig::default())
    }

    #[test]
    fn no_conditions_is_normal() {
        let fx = resolve(&set([]), &set([]), &AttackContext::melee(EntityId(1)));
        assert_eq!(fx.roll_mode, RollMode::Normal);
        assert!(fx.advantage_sources.is_empty());
        assert!(!fx.auto_crit);
    }

    #[test]
    fn stunned_attacker_cannot_act() {
        let fx = resolve(
            &set([ConditionKind::Stunned]),
            &set([ConditionKind::Blinded]),
            &AttackContext::melee(EntityId(1)),
        );
        assert!(fx.attacker_cannot_act);
        assert!(fx.advantage_sources.is_empty());
    }

    #[test]
    fn mixed_sources_cancel() {
        let fx = resolve(
            &set([ConditionKind::Poisoned]),
            &set([ConditionKind::Restrained, ConditionKind::Stunned]),
            &AttackContext::melee(EntityId(1)),
        );
        assert_eq!(fx.advantage_sources.len(), 2);
        assert_eq!(fx.disadvantage_sources.len(), 1);
        assert_eq!(fx.roll_mode, RollMode::Normal);
    }

    #[test]
    fn prone_target_depends_on_distance() {
        let prone = set([ConditionKind::Prone]);
        let close = resolve(&set([]), &prone, &AttackContext::melee(EntityId(1)));
        assert_eq!(close.roll_mode, RollMode::Advantage);

        let far = resolve(&set([]), &prone, &AttackContext::ranged(EntityId(1)));
        assert_eq!(far.roll_mode, RollMode::Disadvantage);
    }

    #[test]
    fn paralyzed_target_is_auto_crit_in_melee_only() {
        let paralyzed = set([ConditionKind::Paralyzed]);
        assert!(resolve(&set([]), &paralyzed, &AttackContext::melee(EntityId(1))).auto_crit);
        assert!(!resolve(&set([]), &paralyzed, &AttackContext::ranged(EntityId(1))).auto_crit);
    }

    #[test]
    fn vex_only_helps_its_source() {
        let mut target = ConditionSet::new();
        target.insert(ConditionKind::Vexed, Some(EntityId(1)));

        let own = resolve(&set([]), &target, &AttackContext::melee(EntityId(1)));
        assert_eq!(own.roll_mode, RollMode::Advantage);
        let other = resolve(&set([]), &target, &AttackContext::melee(EntityId(9)));
        assert_eq!(other.roll_mode, RollMode::Normal);
    }

    #[test]
    fn dodging_ignored_when_target_cannot_act() {
        let ctx = AttackContext {
            target_is_dodging: true,
            ..AttackContext::melee(EntityId(1))
        };
        assert_eq!(resolve(&set([]), &set([]), &ctx).roll_mode, RollMode::Disadvantage);
        // Stunned grants advantage and cancels the dodge.
        let stunned = resolve(&set([]), &set([ConditionKind::Stunned]), &ctx);
        assert_eq!(stunned.roll_mode, RollMode::Advantage);
    }

    #[test]
    fn underwater_piercing_is_unhampered() {
        let ctx = AttackContext {
            is_underwater: true,
            weapon_damage_type: Some(DamageType::Slashing),
            ..AttackContext::melee(EntityId(1))
        };
        assert_eq!(resolve(&set([]), &set([]), &ctx).roll_mode, RollMode::Disadvantage);

        let spear = AttackContext {
            weapon_damage_type: Some(DamageType::Piercing),
            ..ctx
        };
        assert_eq!(resolve(&set([]), &set([]), &spear).roll_mode, RollMode::Normal);

        let swimmer = AttackContext {
            attacker_has_swim: true,
            ..ctx
        };
        assert_eq!(resolve(&set([]), &set([]), &swimmer).roll_mode, RollMode::Normal);
    }

    #[test]
    fn flanking_requires_config() {
        let ctx = AttackContext {
            flanking_ally: true,
            ..AttackContext::melee(EntityId(1))
        };
        assert_eq!(resolve(&set([]), &set([]), &ctx).roll_mode, RollMode::Normal);
        let config = EngineConfig::new().with_flanking(true);
        let fx = resolve_conditions(&set([]), &set([]), &ctx, &config);
        assert_eq!(fx.roll_mode, RollMode::Advantage);
    }

    #[test]
    fn exhaustion_scales_penalty() {
        let fx = resolve(
            &set([ConditionKind::Exhaustion(3)]),
            &set([]),
            &AttackContext::melee(EntityId(1)),
        );
        assert_eq!(fx.exhaustion_penalty, 6);
    }
}
