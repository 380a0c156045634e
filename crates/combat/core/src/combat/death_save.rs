//! Death saves rolled for a token at 0 HP.
//!
//! The ledger itself lives in [`DeathSaveState`]; this wraps it with the
//! scene lookup and the effects a revive produces.

use crate::dice::{Dice, DiceRoll};
use crate::env::SceneOracle;
use crate::host::{Broadcast, Effects, HpChange, LogEntry, LogKind};
use crate::resources::{DeathSaveOutcome, DeathSaveState};
use crate::state::{EntityId, Token};

use super::{ActionOutcome, BlockReason};

#[derive(Clone, Debug, PartialEq)]
pub struct DeathSaveReport {
    pub token: EntityId,
    pub roll: DiceRoll,
    pub outcome: DeathSaveOutcome,
    pub effects: Effects,
}

/// Rolls one death save for `token` and updates its ledger.
///
/// A natural 20 brings the token back to 1 HP through the returned effects.
pub fn resolve_death_save(
    scene: &(impl SceneOracle + ?Sized),
    token: EntityId,
    state: &mut DeathSaveState,
    dice: &mut Dice,
) -> ActionOutcome<DeathSaveReport> {
    let Some(dying) = scene.token(token) else {
        return ActionOutcome::blocked(
            BlockReason::MissingToken,
            format!("dying token {token} is not on the map"),
        );
    };
    if !dying.is_down() {
        return ActionOutcome::blocked(
            BlockReason::NotDying,
            format!("{} has {} HP", dying.name, dying.hp.current),
        );
    }

    let (roll, outcome) = state.roll(dice);
    tracing::debug!("{} death save {}: {:?}", dying.name, roll.total, outcome);
    let effects = build_effects(dying, &roll, outcome);
    ActionOutcome::Resolved(DeathSaveReport {
        token,
        roll,
        outcome,
        effects,
    })
}

fn build_effects(dying: &Token, roll: &DiceRoll, outcome: DeathSaveOutcome) -> Effects {
    let verdict = match outcome {
        DeathSaveOutcome::Success { successes } => format!("success ({successes}/3)"),
        DeathSaveOutcome::Failure { failures } => format!("failure ({failures}/3)"),
        DeathSaveOutcome::Revived => "natural 20, back on their feet".to_string(),
        DeathSaveOutcome::Stabilized => "stabilized".to_string(),
        DeathSaveOutcome::Dead => "dead".to_string(),
    };

    let mut effects = Effects::default();
    effects.log.push(
        LogEntry::new(
            LogKind::Save,
            format!("{} death save: {} ({verdict})", dying.name, roll.describe()),
        )
        .target(dying)
        .value(roll.total),
    );
    if outcome == DeathSaveOutcome::Revived {
        let current = dying.hp.clamp(1);
        effects.hp_changes.push(HpChange {
            token: dying.id,
            previous: dying.hp.current,
            current,
        });
        effects.log.push(
            LogEntry::new(LogKind::Resource, format!("{} regains 1 HP", dying.name))
                .target(dying)
                .value(current as i32),
        );
    }
    effects.broadcast = Some(Broadcast::public(format!("{} death save: {verdict}", dying.name)));
    effects
}
