//! Saving throw resolution.

use crate::conditions::{Condition, ConditionKind, ConditionSet};
use crate::config::EngineConfig;
use crate::damage::{DamageApplication, DamageSummary, DamageType, resolve_damage};
use crate::dice::{Dice, DiceFormula, DiceRoll, RollMode, RollOptions};
use crate::env::SceneOracle;
use crate::geometry::{CoverLevel, CoverReport, Footprint, resolve_cover};
use crate::host::{Broadcast, Effects, LogEntry, LogKind};
use crate::reactions::ReactionTracker;
use crate::resources::LegendaryState;
use crate::state::{Ability, EntityId, Token};

use super::{ActionOutcome, BlockReason, Reactor, cell_size, damage_context, hp_change};

/// A saving throw forced on one target.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SaveRequest {
    /// Creature forcing the save; `None` for traps and hazards.
    pub source: Option<EntityId>,
    pub target: EntityId,
    pub ability: Ability,
    pub dc: i32,
    /// Target's full save modifier (ability + proficiency, if any).
    pub save_modifier: i32,
    pub mode: RollMode,
    pub damage: Option<DiceFormula>,
    pub damage_type: DamageType,
    pub half_on_success: bool,
    /// Condition name applied only on a failed save ("Prone", "Frightened").
    pub failure_effect: Option<String>,
    pub use_legendary_resistance: bool,
    /// Spell that forces the save. Named spells open a Counterspell window.
    pub spell_name: Option<String>,
    /// Set on the first call; cleared when re-invoking after the window.
    pub reaction_window_open: bool,
    /// The GM keeps the DC hidden; only the GM sees the summary.
    pub hidden_dc: bool,
}

impl SaveRequest {
    pub fn new(target: EntityId, ability: Ability, dc: i32, save_modifier: i32) -> Self {
        Self {
            source: None,
            target,
            ability,
            dc,
            save_modifier,
            mode: RollMode::Normal,
            damage: None,
            damage_type: DamageType::Force,
            half_on_success: false,
            failure_effect: None,
            use_legendary_resistance: false,
            spell_name: None,
            reaction_window_open: false,
            hidden_dc: false,
        }
    }

    #[must_use]
    pub fn from_source(mut self, source: EntityId) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: RollMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_damage(mut self, formula: DiceFormula, damage_type: DamageType, half_on_success: bool) -> Self {
        self.damage = Some(formula);
        self.damage_type = damage_type;
        self.half_on_success = half_on_success;
        self
    }

    #[must_use]
    pub fn with_failure_effect(mut self, effect: impl Into<String>) -> Self {
        self.failure_effect = Some(effect.into());
        self
    }

    #[must_use]
    pub fn with_legendary_resistance(mut self, allowed: bool) -> Self {
        self.use_legendary_resistance = allowed;
        self
    }

    /// Marks the save as forced by `spell`, opening a reaction window.
    #[must_use]
    pub fn spell(mut self, spell: impl Into<String>) -> Self {
        self.spell_name = Some(spell.into());
        self.reaction_window_open = true;
        self
    }

    #[must_use]
    pub fn with_hidden_dc(mut self) -> Self {
        self.hidden_dc = true;
        self
    }

    /// Re-invocation after the reaction window closed.
    #[must_use]
    pub fn window_closed(mut self) -> Self {
        self.reaction_window_open = false;
        self
    }
}

/// A resolved saving throw.
#[derive(Clone, Debug, PartialEq)]
pub struct SaveReport {
    pub target: EntityId,
    pub source: Option<EntityId>,
    /// `None` when the save failed automatically.
    pub roll: Option<DiceRoll>,
    pub dc: i32,
    pub cover: CoverReport,
    pub auto_failed: bool,
    pub success: bool,
    /// A failed save was turned into a success.
    pub legendary_resistance_used: bool,
    pub damage_roll: Option<DiceRoll>,
    pub damage: DamageSummary,
    /// Condition from a recognized failure effect.
    pub condition: Option<Condition>,
    pub effects: Effects,
}

/// Conditions that fail Strength and Dexterity saves outright.
fn auto_fails(ability: Ability, conditions: &ConditionSet) -> Option<ConditionKind> {
    if !matches!(ability, Ability::Strength | Ability::Dexterity) {
        return None;
    }
    [
        ConditionKind::Paralyzed,
        ConditionKind::Stunned,
        ConditionKind::Unconscious,
        ConditionKind::Petrified,
    ]
    .into_iter()
    .find(|kind| conditions.has(kind))
}

/// Resolves a saving throw.
///
/// With the reaction window open and a named spell, nearby hostiles able to
/// Counterspell are returned as [`ActionOutcome::Pending`] and nothing is
/// rolled. `legendary` is the target's ledger when it has one.
pub fn resolve_save(
    scene: &(impl SceneOracle + ?Sized),
    request: &SaveRequest,
    config: &EngineConfig,
    tracker: &ReactionTracker,
    dice: &mut Dice,
    legendary: Option<&mut LegendaryState>,
    now_ms: u64,
) -> ActionOutcome<SaveReport> {
    let Some(target) = scene.token(request.target) else {
        return ActionOutcome::blocked(
            BlockReason::MissingToken,
            format!("save target {} is not on the map", request.target),
        );
    };
    let source = match request.source {
        Some(id) => match scene.token(id) {
            Some(token) => Some(token),
            None => {
                return ActionOutcome::blocked(
                    BlockReason::MissingToken,
                    format!("save source {id} is not on the map"),
                );
            }
        },
        None => None,
    };
    let cell_ft = cell_size(scene, config);

    // Counterspell window.
    if let (Some(caster), Some(spell), true) = (source, &request.spell_name, request.reaction_window_open) {
        let reactors = Reactor::hostiles_of(scene, caster);
        let candidates: Vec<_> = reactors.iter().map(Reactor::candidate).collect();
        let prompts = tracker.check_counterspell(caster, caster.position, &candidates, cell_ft, now_ms);
        if !prompts.is_empty() {
            tracing::debug!("{} casting {}: {} counterspell prompt(s)", caster.name, spell, prompts.len());
            return ActionOutcome::Pending(prompts);
        }
    }

    // Cover only helps Dexterity saves against a creature's effect.
    let cover = match source {
        Some(caster) if request.ability == Ability::Dexterity => {
            let bystanders: Vec<Footprint> = scene
                .tokens()
                .into_iter()
                .filter(|t| t.id != caster.id && t.id != target.id)
                .map(|t| t.footprint())
                .collect();
            resolve_cover(&caster.footprint(), &target.footprint(), scene.walls(), &bystanders)
        }
        _ => CoverReport {
            level: CoverLevel::None,
            blocked_lines: 0,
            vantage_corner: 0,
        },
    };
    if cover.level.is_total() {
        return ActionOutcome::blocked(
            BlockReason::TotalCover,
            format!("{} has total cover from the effect", target.name),
        );
    }

    let conditions = scene.conditions_of(target.id);
    let auto_fail = auto_fails(request.ability, &conditions);
    let mut mode = request.mode;
    if request.ability == Ability::Dexterity && conditions.has(&ConditionKind::Restrained) {
        mode = mode.combine(RollMode::Disadvantage);
    }
    let penalty = config.exhaustion_penalty_per_level * i32::from(conditions.exhaustion_level());
    let modifier = request.save_modifier + cover.level.ac_bonus() - penalty;

    let roll = match &auto_fail {
        Some(kind) => {
            tracing::debug!("{} automatically fails the {} save ({})", target.name, request.ability, kind);
            None
        }
        None => Some(dice.d20(mode, modifier, format!("{} save", request.ability))),
    };
    let rolled_success = roll.as_ref().is_some_and(|r| r.total >= request.dc);

    let mut legendary_resistance_used = false;
    if !rolled_success && request.use_legendary_resistance {
        if let Some(ledger) = legendary {
            match ledger.spend_resistance() {
                Ok(remaining) => {
                    tracing::debug!("{} uses legendary resistance ({} left)", target.name, remaining);
                    legendary_resistance_used = true;
                }
                Err(err) => tracing::debug!("{}: {}", target.name, err),
            }
        }
    }
    let success = rolled_success || legendary_resistance_used;

    let (damage_roll, damage) = match request.damage {
        Some(formula) => {
            let rolled = dice.roll_formula(
                &formula,
                RollOptions::new().labeled(
                    request
                        .spell_name
                        .clone()
                        .unwrap_or_else(|| "Save damage".to_string()),
                ),
            );
            let raw = match (success, request.half_on_success) {
                (false, _) => rolled.damage_total(),
                (true, true) => rolled.damage_total() / 2,
                (true, false) => 0,
            };
            let application = DamageApplication::new(raw, request.damage_type)
                .magical(request.spell_name.is_some());
            let summary = if raw > 0 {
                resolve_damage(&[application], &damage_context(scene, target))
            } else {
                DamageSummary::default()
            };
            (Some(rolled), summary)
        }
        None => (None, DamageSummary::default()),
    };

    let condition = match (&request.failure_effect, success) {
        (Some(effect), false) => match ConditionKind::parse(effect) {
            ConditionKind::Custom(_) => None,
            kind => {
                let condition = Condition::new(target.id, kind).applied_in(scene.round());
                Some(match source {
                    Some(caster) => condition.from_source(caster.id),
                    None => condition,
                })
            }
        },
        _ => None,
    };

    let mut report = SaveReport {
        target: target.id,
        source: source.map(|s| s.id),
        roll,
        dc: request.dc,
        cover,
        auto_failed: auto_fail.is_some(),
        success,
        legendary_resistance_used,
        damage_roll,
        damage,
        condition,
        effects: Effects::default(),
    };
    report.effects = build_effects(&report, request, source, target);
    ActionOutcome::Resolved(report)
}

fn build_effects(report: &SaveReport, request: &SaveRequest, source: Option<&Token>, target: &Token) -> Effects {
    let mut effects = Effects::default();
    let dealt = report.damage.total_final;
    if dealt > 0 {
        effects.hp_changes.push(hp_change(target, dealt));
    }

    let verdict = match (report.success, report.legendary_resistance_used, report.auto_failed) {
        (true, true, _) => "success (legendary resistance)",
        (true, false, _) => "success",
        (false, _, true) => "automatic failure",
        (false, _, false) => "failure",
    };
    let rolled = report
        .roll
        .as_ref()
        .map_or_else(|| "no roll".to_string(), DiceRoll::describe);
    let mut save_line = LogEntry::new(
        LogKind::Save,
        format!(
            "{} {} save: {} vs DC {} ({verdict})",
            target.name, request.ability, rolled, report.dc
        ),
    )
    .target(target);
    if let Some(roll) = &report.roll {
        save_line = save_line.value(roll.total);
    }
    if let Some(caster) = source {
        save_line = save_line.source(caster);
    }
    effects.log.push(save_line);

    if !report.damage.is_empty() {
        let mut line = LogEntry::new(LogKind::Damage, format!("{} takes {dealt} damage", target.name))
            .target(target)
            .value(dealt as i32)
            .damage_type(report.damage.primary_type());
        if let Some(caster) = source {
            line = line.source(caster);
        }
        effects.log.push(line);
    }

    match (&request.failure_effect, report.success) {
        (Some(_), true) | (None, _) => {}
        (Some(effect), false) => {
            if let Some(condition) = &report.condition {
                effects.conditions.push(condition.clone());
            }
            effects.log.push(
                LogEntry::new(LogKind::Condition, format!("{} suffers {effect}", target.name)).target(target),
            );
        }
    }

    let headline = match &request.spell_name {
        Some(spell) => format!("{} {} against {spell}", target.name, verdict),
        None => format!("{} {} on a {} save", target.name, verdict, request.ability),
    };
    effects.broadcast = Some(if request.hidden_dc {
        Broadcast::secret(headline)
    } else {
        Broadcast::public(headline)
    });
    effects
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Scene;
    use crate::geometry::{Point, Wall};
    use crate::resources::SpellSlotState;

    fn mage() -> Token {
        Token::new(EntityId(1), "Mage", Point::new(0.0, 0.0)).with_team(1)
    }

    fn ogre() -> Token {
        Token::new(EntityId(2), "Ogre", Point::new(4.0, 0.0))
            .with_team(2)
            .with_hp(59, 59)
    }

    fn fireball() -> SaveRequest {
        SaveRequest::new(EntityId(2), Ability::Dexterity, 15, 1)
            .from_source(EntityId(1))
            .with_damage(DiceFormula::new(8, 6, 0), DamageType::Fire, true)
    }

    fn resolve(
        scene: &Scene,
        request: &SaveRequest,
        faces: &[u32],
        legendary: Option<&mut LegendaryState>,
    ) -> ActionOutcome<SaveReport> {
        let config = EngineConfig::default();
        let tracker = ReactionTracker::new(&config);
        let mut dice = Dice::scripted(faces.to_vec());
        resolve_save(scene, request, &config, &tracker, &mut dice, legendary, 0)
    }

    #[test]
    fn failed_save_takes_full_damage() {
        let scene = Scene::default().with_token(mage()).with_token(ogre());
        let report = resolve(&scene, &fireball(), &[5, 3, 3, 3, 3, 3, 3, 3, 3], None)
            .resolved()
            .unwrap();
        assert!(!report.success);
        assert_eq!(report.damage.total_final, 24);
        assert_eq!(report.effects.hp_changes[0].current, 35);
    }

    #[test]
    fn success_halves_rounding_down() {
        let scene = Scene::default().with_token(mage()).with_token(ogre());
        let report = resolve(&scene, &fireball(), &[18, 3, 3, 3, 3, 3, 3, 3, 4], None)
            .resolved()
            .unwrap();
        assert!(report.success);
        assert_eq!(report.damage.total_final, 12);
    }

    #[test]
    fn success_without_half_takes_nothing() {
        let scene = Scene::default().with_token(mage()).with_token(ogre());
        let request = SaveRequest::new(EntityId(2), Ability::Constitution, 13, 3)
            .with_damage(DiceFormula::new(2, 8, 0), DamageType::Poison, false)
            .with_failure_effect("Poisoned");
        let report = resolve(&scene, &request, &[12, 8, 8], None).resolved().unwrap();
        assert!(report.success);
        assert_eq!(report.damage.total_final, 0);
        assert!(report.effects.hp_changes.is_empty());
        assert!(report.effects.conditions.is_empty());
    }

    #[test]
    fn failure_effect_applies_known_condition() {
        let scene = Scene::default().with_token(mage()).with_token(ogre());
        let request = SaveRequest::new(EntityId(2), Ability::Wisdom, 14, 0)
            .from_source(EntityId(1))
            .with_failure_effect("frightened");
        let report = resolve(&scene, &request, &[9], None).resolved().unwrap();
        let condition = report.condition.unwrap();
        assert_eq!(condition.kind, ConditionKind::Frightened);
        assert_eq!(condition.source, Some(EntityId(1)));
        assert_eq!(report.effects.conditions.len(), 1);
    }

    #[test]
    fn stunned_target_fails_dex_save_without_rolling() {
        let scene = Scene::default()
            .with_token(mage())
            .with_token(ogre())
            .with_condition(Condition::new(EntityId(2), ConditionKind::Stunned));
        let report = resolve(&scene, &fireball(), &[2, 2, 2, 2, 2, 2, 2, 2], None)
            .resolved()
            .unwrap();
        assert!(report.auto_failed);
        assert!(report.roll.is_none());
        assert_eq!(report.damage.total_final, 16);
    }

    #[test]
    fn legendary_resistance_turns_failure_into_success() {
        let scene = Scene::default().with_token(mage()).with_token(ogre());
        let mut ledger = LegendaryState::new(3, 1);
        let request = fireball().with_legendary_resistance(true);
        let report = resolve(&scene, &request, &[2, 4, 4, 4, 4, 4, 4, 4, 4], Some(&mut ledger))
            .resolved()
            .unwrap();
        assert!(report.success && report.legendary_resistance_used);
        assert_eq!(report.damage.total_final, 16);
        assert_eq!(ledger.resistances_remaining, 0);

        let again = resolve(&scene, &request, &[2, 4, 4, 4, 4, 4, 4, 4, 4], Some(&mut ledger))
            .resolved()
            .unwrap();
        assert!(!again.success);
        assert_eq!(again.damage.total_final, 32);
    }

    #[test]
    fn half_cover_adds_to_dex_saves() {
        let scene = Scene::default()
            .with_token(mage())
            .with_token(ogre())
            .with_wall(Wall::solid(Point::new(2.5, -5.0), Point::new(2.5, 0.55)));
        // 12 + 1 + 2 cover = 15 meets DC 15.
        let report = resolve(&scene, &fireball(), &[12, 1, 1, 1, 1, 1, 1, 1, 1], None)
            .resolved()
            .unwrap();
        assert_eq!(report.cover.level, CoverLevel::Half);
        assert!(report.success);
        assert_eq!(report.damage.total_final, 4);
    }

    #[test]
    fn named_spell_opens_counterspell_window() {
        let wizard = Token::new(EntityId(3), "Wizard", Point::new(6.0, 0.0))
            .with_team(2)
            .with_known_abilities(["Counterspell"]);
        let scene = Scene::default()
            .with_token(mage())
            .with_token(ogre())
            .with_token(wizard)
            .with_spell_slots(EntityId(3), SpellSlotState::new().with_slots(3, 1));
        let request = fireball().spell("Fireball");

        let pending = resolve(&scene, &request, &[], None);
        assert!(pending.is_pending());
        assert_eq!(pending.prompts()[0].entity, EntityId(3));

        let resolved = resolve(&scene, &request.window_closed(), &[20, 1, 1, 1, 1, 1, 1, 1, 1], None);
        assert!(resolved.resolved().unwrap().success);
    }

    #[test]
    fn hidden_dc_keeps_the_summary_for_the_gm() {
        let scene = Scene::default().with_token(ogre());
        let trap = SaveRequest::new(EntityId(2), Ability::Wisdom, 17, 0)
            .with_failure_effect("Charmed")
            .with_hidden_dc();
        let report = resolve(&scene, &trap, &[11], None).resolved().unwrap();
        assert!(report.effects.broadcast.as_ref().is_some_and(|b| b.secret));

        let open = SaveRequest::new(EntityId(2), Ability::Wisdom, 17, 0);
        let report = resolve(&scene, &open, &[11], None).resolved().unwrap();
        assert!(report.effects.broadcast.as_ref().is_some_and(|b| !b.secret));
    }

    #[test]
    fn missing_source_is_blocked() {
        let scene = Scene::default().with_token(ogre());
        let outcome = resolve(&scene, &fireball(), &[], None);
        assert_eq!(outcome.blocked_reason(), Some(BlockReason::MissingToken));
    }
}
