//! Grapple and shove.
//!
//! Both use the unarmed-strike DC `8 + STR + proficiency`. The target saves
//! with its better of STR and DEX, which the caller supplies. Ties go to
//! the target.

use crate::conditions::{Condition, ConditionKind};
use crate::config::EngineConfig;
use crate::dice::{Dice, DiceRoll, RollMode};
use crate::env::SceneOracle;
use crate::geometry::Point;
use crate::host::{Broadcast, Effects, LogEntry, LogKind};
use crate::state::{EntityId, Token};

use super::{ActionOutcome, BlockReason, cell_size, push_destination};

/// Distance a successful shove pushes the target.
const SHOVE_PUSH_FT: u32 = 5;

/// What a successful shove does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShoveChoice {
    Prone,
    Push,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GrappleKind {
    Grapple,
    Shove(ShoveChoice),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GrappleRequest {
    pub attacker: EntityId,
    pub target: EntityId,
    pub kind: GrappleKind,
    /// Target's better STR or DEX save modifier.
    pub target_save_modifier: i32,
    pub target_mode: RollMode,
}

impl GrappleRequest {
    pub fn grapple(attacker: EntityId, target: EntityId, target_save_modifier: i32) -> Self {
        Self {
            attacker,
            target,
            kind: GrappleKind::Grapple,
            target_save_modifier,
            target_mode: RollMode::Normal,
        }
    }

    pub fn shove(attacker: EntityId, target: EntityId, choice: ShoveChoice, target_save_modifier: i32) -> Self {
        Self {
            kind: GrappleKind::Shove(choice),
            ..Self::grapple(attacker, target, target_save_modifier)
        }
    }

    #[must_use]
    pub fn with_target_mode(mut self, mode: RollMode) -> Self {
        self.target_mode = mode;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GrappleReport {
    pub attacker: EntityId,
    pub target: EntityId,
    pub kind: GrappleKind,
    pub dc: i32,
    pub save: DiceRoll,
    pub success: bool,
    pub condition: Option<Condition>,
    pub pushed_to: Option<Point>,
    pub effects: Effects,
}

/// Resolves a grapple or shove attempt.
pub fn resolve_grapple(
    scene: &(impl SceneOracle + ?Sized),
    request: &GrappleRequest,
    config: &EngineConfig,
    dice: &mut Dice,
) -> ActionOutcome<GrappleReport> {
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
    if let Some(blocker) = scene.conditions_of(attacker.id).action_blocker() {
        return ActionOutcome::blocked(
            BlockReason::AttackerCannotAct,
            format!("{} is {}", attacker.name, blocker),
        );
    }
    if target.size.rank() > attacker.size.rank() + 1 {
        return ActionOutcome::blocked(
            BlockReason::SizeMismatch,
            format!("{} ({}) is too large for {} ({})", target.name, target.size, attacker.name, attacker.size),
        );
    }
    let cell_ft = cell_size(scene, config);
    let distance = attacker.footprint().distance_ft(&target.footprint(), cell_ft);
    if distance > f64::from(attacker.reach_ft) {
        return ActionOutcome::blocked(
            BlockReason::OutOfRange,
            format!("{} is {distance} ft away, reach is {} ft", target.name, attacker.reach_ft),
        );
    }

    let dc = 8 + attacker.abilities.str + attacker.proficiency_bonus;
    let save = dice.d20(request.target_mode, request.target_save_modifier, "Grapple save");
    let success = save.total < dc;
    tracing::debug!("{} escape save {} vs DC {}: attacker wins={}", target.name, save.total, dc, success);

    let round = scene.round();
    let (condition, pushed_to) = match (success, request.kind) {
        (false, _) => (None, None),
        (true, GrappleKind::Grapple) => (
            Some(
                Condition::new(target.id, ConditionKind::Grappled)
                    .from_source(attacker.id)
                    .applied_in(round),
            ),
            None,
        ),
        (true, GrappleKind::Shove(ShoveChoice::Prone)) => (
            Some(
                Condition::new(target.id, ConditionKind::Prone)
                    .from_source(attacker.id)
                    .applied_in(round),
            ),
            None,
        ),
        (true, GrappleKind::Shove(ShoveChoice::Push)) => {
            (None, Some(push_destination(attacker, target, SHOVE_PUSH_FT, cell_ft)))
        }
    };

    let mut report = GrappleReport {
        attacker: attacker.id,
        target: target.id,
        kind: request.kind,
        dc,
        save,
        success,
        condition,
        pushed_to,
        effects: Effects::default(),
    };
    report.effects = build_effects(&report, attacker, target);
    ActionOutcome::Resolved(report)
}

fn build_effects(report: &GrappleReport, attacker: &Token, target: &Token) -> Effects {
    let action = match report.kind {
        GrappleKind::Grapple => "grapple".to_string(),
        GrappleKind::Shove(choice) => format!("shove ({choice})"),
    };
    let mut effects = Effects::default();
    effects.log.push(
        LogEntry::new(
            LogKind::Save,
            format!(
                "{} resists {}'s {action}: {} vs DC {}",
                target.name,
                attacker.name,
                report.save.describe(),
                report.dc
            ),
        )
        .source(attacker)
        .target(target)
        .value(report.save.total),
    );
    if let Some(condition) = &report.condition {
        effects.conditions.push(condition.clone());
        effects.log.push(
            LogEntry::new(LogKind::Condition, format!("{} is {}", target.name, condition.kind))
                .source(attacker)
                .target(target),
        );
    }
    if let Some(to) = report.pushed_to {
        effects.moves.push((target.id, to));
    }
    let headline = if report.success {
        format!("{} succeeds at a {action} against {}", attacker.name, target.name)
    } else {
        format!("{} escapes {}'s {action}", target.name, attacker.name)
    };
    effects.broadcast = Some(Broadcast::public(headline));
    effects
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Scene;
    use crate::geometry::CreatureSize;
    use crate::state::AbilityModifiers;

    fn wrestler() -> Token {
        Token::new(EntityId(1), "Wrestler", Point::new(0.0, 0.0))
            .with_abilities(AbilityModifiers::from_scores([16, 10, 10, 10, 10, 10]))
            .with_proficiency_bonus(2)
    }

    fn scene_with(target: Token) -> Scene {
        Scene::default().with_token(wrestler()).with_token(target)
    }

    #[test]
    fn grapple_succeeds_below_dc() {
        let scene = scene_with(Token::new(EntityId(2), "Bandit", Point::new(1.0, 0.0)));
        let request = GrappleRequest::grapple(EntityId(1), EntityId(2), 1);
        let report = resolve_grapple(&scene, &request, &EngineConfig::default(), &mut Dice::scripted([10])).resolved().unwrap();
        assert_eq!(report.dc, 13);
        assert!(report.success);
        let condition = report.condition.unwrap();
        assert_eq!(condition.kind, ConditionKind::Grappled);
        assert_eq!(condition.source, Some(EntityId(1)));
    }

    #[test]
    fn tie_goes_to_target() {
        let scene = scene_with(Token::new(EntityId(2), "Bandit", Point::new(1.0, 0.0)));
        let request = GrappleRequest::grapple(EntityId(1), EntityId(2), 1);
        let report = resolve_grapple(&scene, &request, &EngineConfig::default(), &mut Dice::scripted([12])).resolved().unwrap();
        assert!(!report.success);
        assert!(report.effects.conditions.is_empty());
    }

    #[test]
    fn shove_push_moves_five_feet() {
        let scene = scene_with(Token::new(EntityId(2), "Bandit", Point::new(1.0, 0.0)));
        let request = GrappleRequest::shove(EntityId(1), EntityId(2), ShoveChoice::Push, 0);
        let report = resolve_grapple(&scene, &request, &EngineConfig::default(), &mut Dice::scripted([3])).resolved().unwrap();
        assert_eq!(report.pushed_to, Some(Point::new(2.0, 0.0)));
        assert_eq!(report.effects.moves, vec![(EntityId(2), Point::new(2.0, 0.0))]);
    }

    #[test]
    fn shove_prone_applies_condition() {
        let scene = scene_with(Token::new(EntityId(2), "Bandit", Point::new(1.0, 0.0)));
        let request = GrappleRequest::shove(EntityId(1), EntityId(2), ShoveChoice::Prone, 0);
        let report = resolve_grapple(&scene, &request, &EngineConfig::default(), &mut Dice::scripted([3])).resolved().unwrap();
        assert_eq!(report.condition.map(|c| c.kind), Some(ConditionKind::Prone));
    }

    #[test]
    fn huge_target_is_too_large_for_medium() {
        let giant = Token::new(EntityId(2), "Giant", Point::new(1.0, 0.0)).with_size(CreatureSize::Huge);
        let scene = scene_with(giant);
        let request = GrappleRequest::grapple(EntityId(1), EntityId(2), 0);
        let outcome = resolve_grapple(&scene, &request, &EngineConfig::default(), &mut Dice::scripted([]));
        assert_eq!(outcome.blocked_reason(), Some(BlockReason::SizeMismatch));
    }

    #[test]
    fn target_out_of_reach_is_blocked() {
        let scene = scene_with(Token::new(EntityId(2), "Bandit", Point::new(3.0, 0.0)));
        let request = GrappleRequest::grapple(EntityId(1), EntityId(2), 0);
        let outcome = resolve_grapple(&scene, &request, &EngineConfig::default(), &mut Dice::scripted([]));
        assert_eq!(outcome.blocked_reason(), Some(BlockReason::OutOfRange));
    }
}
