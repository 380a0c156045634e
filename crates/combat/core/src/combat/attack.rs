//! Attack resolution.
//!
//! ```text
//! 1. tokens exist, attacker can act
//! 2. reach or range band (long range adds disadvantage)
//! 3. cover; total cover aborts, otherwise its bonus raises AC
//! 4. roll mode from conditions, long range and situational sources
//! 5. d20: natural 20 hits and crits, natural 1 misses, else total >= AC
//! 6. damage on a hit; a crit doubles dice, never flat modifiers
//! 7. weapon mastery riders (Graze on a miss)
//! 8. damage-type feats
//! 9. HP change, conditions, pushes, log lines, broadcast
//! ```

use crate::conditions::{AttackContext, ConditionEffects, resolve_conditions};
use crate::config::EngineConfig;
use crate::damage::{DamageApplication, DamageSummary, DamageType, resolve_damage};
use crate::dice::{Dice, DiceFormula, DiceRoll, RollOptions};
use crate::env::SceneOracle;
use crate::geometry::{CoverReport, Footprint, resolve_cover};
use crate::host::{Broadcast, Effects, LogEntry, LogKind};
use crate::reactions::{ReactionPrompt, ReactionTracker, ReactionTrigger};
use crate::riders::{FeatContext, MasteryContext, RiderEffect, WeaponMastery, resolve_feats, resolve_mastery};
use crate::state::{EntityId, Token};

use super::{
    ActionOutcome, BlockReason, Reactor, cell_size, damage_context, hp_change, push_destination,
};

/// Melee reach or ranged bands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttackRange {
    /// `None` uses the attacker's own reach.
    Melee { reach_ft: Option<u32> },
    /// Beyond `normal_ft` and up to `long_ft` the attack has disadvantage.
    Ranged { normal_ft: u32, long_ft: u32 },
}

impl AttackRange {
    pub const fn is_ranged(&self) -> bool {
        matches!(self, Self::Ranged { .. })
    }
}

/// One attack to resolve.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackRequest {
    pub attacker: EntityId,
    pub target: EntityId,
    /// Weapon or attack name, used in log lines.
    pub label: String,
    pub attack_bonus: i32,
    pub damage: DiceFormula,
    pub damage_type: DamageType,
    /// Extra damage dice on a hit (Sneak Attack, Divine Smite, ...).
    pub bonus_damage: Vec<(DiceFormula, DamageType)>,
    pub range: AttackRange,
    pub is_magical: bool,
    pub is_silvered: bool,
    pub mastery: Option<WeaponMastery>,
    /// Modifier of the attack ability, for Graze and Topple.
    pub ability_modifier: i32,
    pub advantage: Vec<String>,
    pub disadvantage: Vec<String>,
    pub flanking_ally: bool,
}

impl AttackRequest {
    pub fn new(
        attacker: EntityId,
        target: EntityId,
        label: impl Into<String>,
        attack_bonus: i32,
        damage: DiceFormula,
        damage_type: DamageType,
    ) -> Self {
        Self {
            attacker,
            target,
            label: label.into(),
            attack_bonus,
            damage,
            damage_type,
            bonus_damage: Vec::new(),
            range: AttackRange::Melee { reach_ft: None },
            is_magical: false,
            is_silvered: false,
            mastery: None,
            ability_modifier: 0,
            advantage: Vec::new(),
            disadvantage: Vec::new(),
            flanking_ally: false,
        }
    }

    /// Unarmed strike: STR + proficiency to hit, `1 + STR` bludgeoning.
    pub fn unarmed_strike(attacker: &Token, target: EntityId) -> Self {
        let str_mod = attacker.abilities.str;
        Self::new(
            attacker.id,
            target,
            "Unarmed Strike",
            str_mod + attacker.proficiency_bonus,
            DiceFormula::flat((1 + str_mod).max(0)),
            DamageType::Bludgeoning,
        )
        .with_ability_modifier(str_mod)
    }

    #[must_use]
    pub fn ranged(mut self, normal_ft: u32, long_ft: u32) -> Self {
        self.range = AttackRange::Ranged { normal_ft, long_ft };
        self
    }

    #[must_use]
    pub fn with_reach(mut self, reach_ft: u32) -> Self {
        self.range = AttackRange::Melee {
            reach_ft: Some(reach_ft),
        };
        self
    }

    #[must_use]
    pub fn with_bonus_damage(mut self, formula: DiceFormula, damage_type: DamageType) -> Self {
        self.bonus_damage.push((formula, damage_type));
        self
    }

    #[must_use]
    pub fn magical(mut self, is_magical: bool) -> Self {
        self.is_magical = is_magical;
        self
    }

    #[must_use]
    pub fn silvered(mut self, is_silvered: bool) -> Self {
        self.is_silvered = is_silvered;
        self
    }

    #[must_use]
    pub fn with_mastery(mut self, mastery: WeaponMastery) -> Self {
        self.mastery = Some(mastery);
        self
    }

    #[must_use]
    pub fn with_ability_modifier(mut self, modifier: i32) -> Self {
        self.ability_modifier = modifier;
        self
    }

    #[must_use]
    pub fn with_advantage(mut self, source: impl Into<String>) -> Self {
        self.advantage.push(source.into());
        self
    }

    #[must_use]
    pub fn with_disadvantage(mut self, source: impl Into<String>) -> Self {
        self.disadvantage.push(source.into());
        self
    }

    #[must_use]
    pub fn with_flanking_ally(mut self, flanking_ally: bool) -> Self {
        self.flanking_ally = flanking_ally;
        self
    }

    fn application(&self, raw: u32, damage_type: DamageType) -> DamageApplication {
        DamageApplication::new(raw, damage_type)
            .magical(self.is_magical)
            .silvered(self.is_silvered)
    }
}

/// A resolved attack.
#[derive(Clone, Debug, PartialEq)]
pub struct AttackReport {
    pub attacker: EntityId,
    pub target: EntityId,
    pub roll: DiceRoll,
    /// Target AC including the cover bonus.
    pub target_ac: i32,
    pub cover: CoverReport,
    pub conditions: ConditionEffects,
    pub long_range: bool,
    pub hit: bool,
    pub critical: bool,
    /// Target was at 0 HP before the attack; the host feeds
    /// [`DeathSaveState::take_damage`](crate::resources::DeathSaveState::take_damage).
    pub target_was_down: bool,
    pub damage_rolls: Vec<DiceRoll>,
    pub damage: DamageSummary,
    /// Graze damage on a miss, resolved on its own.
    pub graze: Option<DamageSummary>,
    pub riders: Vec<RiderEffect>,
    /// Shield, Hellish Rebuke or Absorb Elements offers for the target.
    pub reaction_prompts: Vec<ReactionPrompt>,
    pub effects: Effects,
}

impl AttackReport {
    /// Damage dealt including graze.
    pub fn total_damage(&self) -> u32 {
        self.damage.total_final + self.graze.as_ref().map_or(0, |g| g.total_final)
    }
}

/// Resolves one attack against the scene snapshot.
pub fn resolve_attack(
    scene: &(impl SceneOracle + ?Sized),
    request: &AttackRequest,
    config: &EngineConfig,
    tracker: &ReactionTracker,
    dice: &mut Dice,
    now_ms: u64,
) -> ActionOutcome<AttackReport> {
    // 1. Participants.
    let (Some(attacker), Some(target)) = (scene.token(request.attacker), scene.token(request.target))
    else {
        return ActionOutcome::blocked(
            BlockReason::MissingToken,
            format!(
                "attacker {} or target {} is not on the map",
                request.attacker, request.target
            ),
        );
    };
    let attacker_conditions = scene.conditions_of(attacker.id);
    if let Some(blocker) = attacker_conditions.action_blocker() {
        return ActionOutcome::blocked(
            BlockReason::AttackerCannotAct,
            format!("{} is {}", attacker.name, blocker),
        );
    }

    // 2. Range.
    let cell_ft = cell_size(scene, config);
    let distance = attacker.footprint().distance_ft(&target.footprint(), cell_ft);
    let attacker_underwater = scene.is_underwater(attacker.id);
    let long_range = match request.range {
        AttackRange::Melee { reach_ft } => {
            let reach = f64::from(reach_ft.unwrap_or(attacker.reach_ft));
            if distance > reach {
                return ActionOutcome::blocked(
                    BlockReason::OutOfRange,
                    format!("{} is {distance} ft away, reach is {reach} ft", target.name),
                );
            }
            false
        }
        AttackRange::Ranged { normal_ft, long_ft } => {
            let normal = f64::from(normal_ft);
            let long = f64::from(long_ft.max(normal_ft));
            if distance <= normal {
                false
            } else if distance <= long && !attacker_underwater {
                true
            } else {
                return ActionOutcome::blocked(
                    BlockReason::OutOfRange,
                    format!("{} is {distance} ft away, range is {normal_ft}/{long_ft}", target.name),
                );
            }
        }
    };

    // 3. Cover.
    let bystanders: Vec<Footprint> = scene
        .tokens()
        .into_iter()
        .filter(|t| t.id != attacker.id && t.id != target.id)
        .map(|t| t.footprint())
        .collect();
    let cover = resolve_cover(&attacker.footprint(), &target.footprint(), scene.walls(), &bystanders);
    tracing::debug!("cover {} ({} blocked lines)", cover.level, cover.blocked_lines);
    if cover.level.is_total() {
        return ActionOutcome::blocked(
            BlockReason::TotalCover,
            format!("{} has total cover from {}", target.name, attacker.name),
        );
    }

    // 4. Roll mode and bonus.
    let target_conditions = scene.conditions_of(target.id);
    let enemy_adjacent = scene.tokens().into_iter().any(|t| {
        t.id != attacker.id
            && t.is_hostile_to(attacker)
            && !t.is_down()
            && !scene.conditions_of(t.id).cannot_act()
            && t.footprint().distance_ft(&attacker.footprint(), cell_ft) <= EngineConfig::CLOSE_RANGE_FT
    });
    let ctx = AttackContext {
        attacker: attacker.id,
        is_ranged: request.range.is_ranged(),
        is_within_5ft: distance <= EngineConfig::CLOSE_RANGE_FT,
        any_enemy_within_5ft_of_attacker: enemy_adjacent,
        target_is_dodging: scene.turn_state(target.id).is_dodging(),
        is_underwater: attacker_underwater,
        weapon_damage_type: Some(request.damage_type),
        attacker_has_swim: attacker.speeds.swim > 0,
        flanking_ally: request.flanking_ally,
    };
    let mut conditions = resolve_conditions(&attacker_conditions, &target_conditions, &ctx, config);
    if long_range {
        conditions.disadvantage_sources.push("long range".to_string());
    }
    conditions.advantage_sources.extend(request.advantage.iter().cloned());
    conditions.disadvantage_sources.extend(request.disadvantage.iter().cloned());
    conditions.refresh_mode();
    let bonus = request.attack_bonus - conditions.exhaustion_penalty;

    // 5. Attack roll.
    let roll = dice.d20(conditions.roll_mode, bonus, format!("{} attack", request.label));
    let target_ac = target.ac + cover.level.ac_bonus();
    let hit = match roll.natural {
        Some(20) => true,
        Some(1) => false,
        _ => roll.total >= target_ac,
    };
    let critical = hit && (roll.is_critical || conditions.auto_crit);
    tracing::debug!(
        "{} attack roll {} vs AC {}: hit={} crit={}",
        attacker.name,
        roll.total,
        target_ac,
        hit,
        critical
    );

    // 6. Damage dice.
    let mut damage_rolls = Vec::new();
    let mut applications = Vec::new();
    if hit {
        let components =
            std::iter::once((request.damage, request.damage_type)).chain(request.bonus_damage.iter().copied());
        for (formula, damage_type) in components {
            let formula = if critical { formula.with_doubled_dice() } else { formula };
            let rolled = dice.roll_formula(
                &formula,
                RollOptions::new().labeled(format!("{} damage", request.label)),
            );
            applications.push(request.application(rolled.damage_total(), damage_type));
            damage_rolls.push(rolled);
        }
    }

    // 7-8. Riders.
    let round = scene.round();
    let mut riders = Vec::new();
    if let Some(mastery) = request.mastery {
        let ctx = MasteryContext {
            attacker,
            target,
            ability_modifier: request.ability_modifier,
            damage_type: request.damage_type,
            round,
        };
        riders.extend(resolve_mastery(mastery, hit, &ctx, dice));
    }
    if hit {
        let ctx = FeatContext {
            attacker,
            target,
            damage_type: request.damage_type,
            damage_die: request.damage.sides,
            is_critical: critical,
            round,
        };
        riders.extend(resolve_feats(&ctx, dice));
    }

    let damage_ctx = damage_context(scene, target);
    applications.extend(riders.iter().filter_map(|rider| match rider {
        RiderEffect::ExtraDamage {
            amount,
            damage_type,
        } => Some(request.application(*amount, *damage_type)),
        _ => None,
    }));
    let damage = resolve_damage(&applications, &damage_ctx);
    let graze = riders.iter().find_map(|rider| match rider {
        RiderEffect::Graze {
            amount,
            damage_type,
        } => Some(resolve_damage(&[request.application(*amount, *damage_type)], &damage_ctx)),
        _ => None,
    });

    // 9. Effects.
    let mut report = AttackReport {
        attacker: attacker.id,
        target: target.id,
        roll,
        target_ac,
        cover,
        conditions,
        long_range,
        hit,
        critical,
        target_was_down: target.is_down(),
        damage_rolls,
        damage,
        graze,
        riders,
        reaction_prompts: Vec::new(),
        effects: Effects::default(),
    };
    report.effects = build_effects(&report, attacker, target, &request.label, cell_ft);
    report.reaction_prompts = target_reactions(scene, &report, attacker, target, tracker, now_ms);
    ActionOutcome::Resolved(report)
}

fn build_effects(report: &AttackReport, attacker: &Token, target: &Token, label: &str, cell_ft: f64) -> Effects {
    let mut effects = Effects::default();
    let dealt = report.total_damage();
    if dealt > 0 {
        effects.hp_changes.push(hp_change(target, dealt));
    }

    let verdict = match (report.hit, report.critical) {
        (true, true) => "critical hit",
        (true, false) => "hit",
        (false, _) => "miss",
    };
    effects.log.push(
        LogEntry::new(
            LogKind::Attack,
            format!(
                "{} attacks {} with {}: {} vs AC {} ({verdict})",
                attacker.name,
                target.name,
                label,
                report.roll.describe(),
                report.target_ac
            ),
        )
        .source(attacker)
        .target(target)
        .value(report.roll.total),
    );

    let summary = report.graze.as_ref().unwrap_or(&report.damage);
    if dealt > 0 || !summary.is_empty() {
        let reasons: Vec<&str> = summary
            .components
            .iter()
            .map(|c| c.reason.as_str())
            .filter(|r| !r.is_empty())
            .collect();
        let suffix = if reasons.is_empty() {
            String::new()
        } else {
            format!(" ({})", reasons.join("; "))
        };
        effects.log.push(
            LogEntry::new(
                LogKind::Damage,
                format!("{} takes {dealt} damage{suffix}", target.name),
            )
            .source(attacker)
            .target(target)
            .value(dealt as i32)
            .damage_type(summary.primary_type()),
        );
    }

    for rider in &report.riders {
        match rider {
            RiderEffect::Condition(condition) => effects.conditions.push(condition.clone()),
            RiderEffect::Push { target: id, feet } if *id == target.id => {
                effects
                    .moves
                    .push((*id, push_destination(attacker, target, *feet, cell_ft)));
            }
            _ => {}
        }
        effects.log.push(
            LogEntry::new(LogKind::Condition, rider.describe())
                .source(attacker)
                .target(target),
        );
    }

    let headline = if report.hit {
        format!("{} {}s {} for {dealt}", attacker.name, verdict, target.name)
    } else if dealt > 0 {
        format!("{} grazes {} for {dealt}", attacker.name, target.name)
    } else {
        format!("{} misses {}", attacker.name, target.name)
    };
    effects.broadcast = Some(Broadcast::public(headline));
    effects
}

/// Reactions the target could take in response to this attack.
fn target_reactions(
    scene: &(impl SceneOracle + ?Sized),
    report: &AttackReport,
    attacker: &Token,
    target: &Token,
    tracker: &ReactionTracker,
    now_ms: u64,
) -> Vec<ReactionPrompt> {
    let reactor = Reactor::load(scene, target);
    let candidate = reactor.candidate();
    let mut prompts = Vec::new();

    // Shield's +5 AC can only turn a non-natural-20 hit that beats AC by less than 5.
    if report.hit && report.roll.natural != Some(20) && report.roll.total < report.target_ac + 5 {
        prompts.extend(tracker.check_reactive_spell(
            ReactionTrigger::HitByAttack,
            &candidate,
            attacker.id,
            format!("{} hits {}", attacker.name, target.name),
            now_ms,
        ));
    }
    let elemental = report.damage.components.iter().any(|c| {
        c.final_damage > 0
            && matches!(
                c.application.damage_type,
                DamageType::Acid | DamageType::Cold | DamageType::Fire | DamageType::Lightning | DamageType::Thunder
            )
    });
    if elemental {
        prompts.extend(tracker.check_reactive_spell(
            ReactionTrigger::ElementalDamage,
            &candidate,
            attacker.id,
            format!("{} takes elemental damage", target.name),
            now_ms,
        ));
    }
    if report.total_damage() > 0 {
        prompts.extend(tracker.check_reactive_spell(
            ReactionTrigger::Damaged,
            &candidate,
            attacker.id,
            format!("{} damages {}", attacker.name, target.name),
            now_ms,
        ));
    }
    prompts
}
