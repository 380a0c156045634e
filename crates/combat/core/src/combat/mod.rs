//! Orchestrators that compose the resolvers into one action.
//!
//! Every orchestrator reads a snapshot through [`SceneOracle`], runs its
//! stages in a fixed order and returns an [`ActionOutcome`]. Any stage can
//! stop early with [`ActionOutcome::blocked`]; nothing is rolled after that
//! point and no effects exist. Resolved reports carry [`Effects`] for
//! [`commit`](crate::host::commit).
mod attack;
mod death_save;
mod grapple;
mod outcome;
mod save;

pub use attack::{AttackRange, AttackReport, AttackRequest, resolve_attack};
pub use death_save::{DeathSaveReport, resolve_death_save};
pub use grapple::{GrappleKind, GrappleReport, GrappleRequest, ShoveChoice, resolve_grapple};
pub use outcome::{ActionOutcome, BlockReason, Blocked};
pub use save::{SaveReport, SaveRequest, resolve_save};

use crate::conditions::ConditionSet;
use crate::config::EngineConfig;
use crate::damage::{DamageContext, FlatReduction};
use crate::env::SceneOracle;
use crate::features::Feature;
use crate::geometry::Point;
use crate::host::HpChange;
use crate::reactions::ReactionCandidate;
use crate::state::{Token, TurnState};

/// Feet per grid cell: the map's own scale, else the configured one.
pub(crate) fn cell_size(scene: &(impl SceneOracle + ?Sized), config: &EngineConfig) -> f64 {
    scene
        .cell_size_ft()
        .filter(|ft| ft.is_finite() && *ft > 0.0)
        .unwrap_or(config.cell_size_ft)
}

/// Pipeline inputs for damage dealt to `target`.
fn damage_context<'a>(scene: &(impl SceneOracle + ?Sized), target: &'a Token) -> DamageContext<'a> {
    let reduction = (target.wears_heavy_armor
        && target.features.contains(&Feature::HeavyArmorMaster))
    .then(|| FlatReduction::heavy_armor_master(target.proficiency_bonus));
    DamageContext::new(&target.defenses)
        .with_flat_reduction(reduction)
        .underwater(scene.is_underwater(target.id))
}

fn hp_change(target: &Token, damage: u32) -> HpChange {
    HpChange {
        token: target.id,
        previous: target.hp.current,
        current: target.hp.clamp(i64::from(target.hp.current) - i64::from(damage)),
    }
}

/// Where `target` ends up when pushed `feet` straight away from `from`.
///
/// Moves whole cells along each axis on which the target is offset, so a
/// diagonal push stays on the grid.
fn push_destination(from: &Token, target: &Token, feet: u32, cell_ft: f64) -> Point {
    let cells = (f64::from(feet) / cell_ft).floor();
    let (a, t) = (from.footprint().center(), target.footprint().center());
    let step = |delta: f64| if delta.abs() < 1e-9 { 0.0 } else { delta.signum() };
    Point::new(
        target.position.x + step(t.x - a.x) * cells,
        target.position.y + step(t.y - a.y) * cells,
    )
}

/// Owned snapshot behind a [`ReactionCandidate`].
pub(crate) struct Reactor<'a> {
    token: &'a Token,
    turn: TurnState,
    conditions: ConditionSet,
    highest_slot: u8,
}

impl<'a> Reactor<'a> {
    pub(crate) fn load(scene: &(impl SceneOracle + ?Sized), token: &'a Token) -> Self {
        Self {
            token,
            turn: scene.turn_state(token.id),
            conditions: scene.conditions_of(token.id),
            highest_slot: scene.highest_spell_slot(token.id),
        }
    }

    /// Snapshots of every creature hostile to `actor`.
    pub(crate) fn hostiles_of(scene: &'a (impl SceneOracle + ?Sized), actor: &Token) -> Vec<Self> {
        scene
            .tokens()
            .into_iter()
            .filter(|t| t.id != actor.id && t.is_hostile_to(actor))
            .map(|t| Self::load(scene, t))
            .collect()
    }

    pub(crate) fn candidate(&self) -> ReactionCandidate<'_> {
        ReactionCandidate {
            token: self.token,
            turn: &self.turn,
            conditions: &self.conditions,
            highest_slot: self.highest_slot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::EntityId;

    #[test]
    fn push_moves_away_along_offset_axes() {
        let fighter = Token::new(EntityId(1), "Fighter", Point::new(0.0, 0.0));
        let east = Token::new(EntityId(2), "Orc", Point::new(1.0, 0.0));
        let diagonal = Token::new(EntityId(3), "Goblin", Point::new(1.0, 1.0));

        assert_eq!(push_destination(&fighter, &east, 10, 5.0), Point::new(3.0, 0.0));
        assert_eq!(push_destination(&fighter, &diagonal, 5, 5.0), Point::new(2.0, 2.0));
    }

    #[test]
    fn hp_change_clamps_at_zero() {
        let orc = Token::new(EntityId(2), "Orc", Point::default()).with_hp(5, 15);
        let change = hp_change(&orc, 9);
        assert_eq!((change.previous, change.current), (5, 0));
    }
}
