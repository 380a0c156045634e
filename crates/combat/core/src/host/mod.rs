//! Write side of the host boundary.
//!
//! Resolvers never mutate the scene. They return [`Effects`] describing the
//! HP change, conditions, pushes, log lines and broadcast of one resolution,
//! and [`commit`] forwards them to a [`CombatHost`].
mod log;

pub use log::{Broadcast, LogEntry, LogKind};

use crate::conditions::Condition;
use crate::error::{CombatError, HostError};
use crate::geometry::Point;
use crate::resources::ConcentrationRegistry;
use crate::state::EntityId;

/// New HP for a token, already clamped to `[0, max]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HpChange {
    pub token: EntityId,
    pub previous: u32,
    pub current: u32,
}

/// Described mutations of one resolution.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Effects {
    pub hp_changes: Vec<HpChange>,
    pub conditions: Vec<Condition>,
    pub moves: Vec<(EntityId, Point)>,
    pub log: Vec<LogEntry>,
    pub broadcast: Option<Broadcast>,
}

impl Effects {
    pub fn is_empty(&self) -> bool {
        self.hp_changes.is_empty()
            && self.conditions.is_empty()
            && self.moves.is_empty()
            && self.log.is_empty()
            && self.broadcast.is_none()
    }
}

/// Mutations the engine asks the host to perform.
pub trait CombatHost: ConcentrationRegistry {
    fn apply_hp(&mut self, token: EntityId, current: u32) -> Result<(), HostError>;

    fn add_condition(&mut self, condition: Condition) -> Result<(), HostError>;

    fn move_token(&mut self, token: EntityId, to: Point) -> Result<(), HostError>;

    fn append_log(&mut self, entry: LogEntry);

    fn broadcast(&mut self, message: Broadcast);
}

/// Forwards effects to the host in order: HP, conditions, moves, log,
/// broadcast. A failed mutation is logged and skipped; the rest still apply.
/// Returns how many mutations were skipped.
pub fn commit(effects: &Effects, host: &mut (impl CombatHost + ?Sized)) -> usize {
    let mut skipped = 0;
    let mut report = |what: &str, err: HostError| {
        tracing::warn!("skipping {}: {} [{}]", what, err, err.error_code());
        skipped += 1;
    };

    for change in &effects.hp_changes {
        if let Err(err) = host.apply_hp(change.token, change.current) {
            report("hp change", err);
        }
    }
    for condition in &effects.conditions {
        if let Err(err) = host.add_condition(condition.clone()) {
            report("condition", err);
        }
    }
    for (token, to) in &effects.moves {
        if let Err(err) = host.move_token(*token, *to) {
            report("move", err);
        }
    }
    for entry in &effects.log {
        host.append_log(entry.clone());
    }
    if let Some(message) = &effects.broadcast {
        host.broadcast(message.clone());
    }
    skipped
}
