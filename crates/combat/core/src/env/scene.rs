use std::collections::{HashMap, HashSet};

use crate::conditions::{Condition, ConditionSet};
use crate::error::HostError;
use crate::geometry::{Point, Wall};
use crate::host::{Broadcast, CombatHost, LogEntry};
use crate::resources::{ConcentrationRegistry, SpellSlotState};
use crate::state::{EntityId, Token, TurnState};

use super::SceneOracle;

/// In-memory scene that also records every host mutation.
///
/// Useful for tests, replays and single-process hosts.
#[derive(Clone, Debug)]
pub struct Scene {
    tokens: Vec<Token>,
    conditions: Vec<Condition>,
    walls: Vec<Wall>,
    turns: HashMap<EntityId, TurnState>,
    slots: HashMap<EntityId, SpellSlotState>,
    underwater: HashSet<EntityId>,
    cell_size_ft: Option<f64>,
    round: u32,
    map_loaded: bool,
    log: Vec<LogEntry>,
    broadcasts: Vec<Broadcast>,
    ended_concentration: Vec<(EntityId, String)>,
}

impl Scene {
    /// A scene whose map has its own grid scale.
    pub fn new(cell_size_ft: f64) -> Self {
        Self {
            cell_size_ft: Some(cell_size_ft),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: Token) -> Self {
        self.tokens.push(token);
        self
    }

    #[must_use]
    pub fn with_wall(mut self, wall: Wall) -> Self {
        self.walls.push(wall);
        self
    }

    #[must_use]
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    #[must_use]
    pub fn with_turn_state(mut self, id: EntityId, turn: TurnState) -> Self {
        self.turns.insert(id, turn);
        self
    }

    #[must_use]
    pub fn with_spell_slots(mut self, id: EntityId, slots: SpellSlotState) -> Self {
        self.slots.insert(id, slots);
        self
    }

    #[must_use]
    pub fn with_round(mut self, round: u32) -> Self {
        self.round = round;
        self
    }

    #[must_use]
    pub fn with_underwater(mut self, id: EntityId) -> Self {
        self.underwater.insert(id);
        self
    }

    /// Simulates a host with no active map: every mutation fails.
    #[must_use]
    pub fn without_map(mut self) -> Self {
        self.map_loaded = false;
        self
    }

    pub fn token_mut(&mut self, id: EntityId) -> Option<&mut Token> {
        self.tokens.iter_mut().find(|t| t.id == id)
    }

    pub fn turn_state_mut(&mut self, id: EntityId) -> &mut TurnState {
        let speed = self.token(id).map_or(0, |t| t.speeds.walk);
        self.turns.entry(id).or_insert_with(|| TurnState::new(speed))
    }

    pub fn spell_slots_mut(&mut self, id: EntityId) -> &mut SpellSlotState {
        self.slots.entry(id).or_default()
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    pub fn broadcasts(&self) -> &[Broadcast] {
        &self.broadcasts
    }

    pub fn ended_concentration(&self) -> &[(EntityId, String)] {
        &self.ended_concentration
    }

    fn require_map(&self) -> Result<(), HostError> {
        if self.map_loaded {
            Ok(())
        } else {
            Err(HostError::MapNotAvailable)
        }
    }
}

impl Default for Scene {
    /// A scene using the engine's configured grid scale.
    fn default() -> Self {
        Self {
            tokens: Vec::new(),
            conditions: Vec::new(),
            walls: Vec::new(),
            turns: HashMap::new(),
            slots: HashMap::new(),
            underwater: HashSet::new(),
            cell_size_ft: None,
            round: 1,
            map_loaded: true,
            log: Vec::new(),
            broadcasts: Vec::new(),
            ended_concentration: Vec::new(),
        }
    }
}

impl SceneOracle for Scene {
    fn token(&self, id: EntityId) -> Option<&Token> {
        self.tokens.iter().find(|t| t.id == id)
    }

    fn tokens(&self) -> Vec<&Token> {
        self.tokens.iter().collect()
    }

    fn conditions_of(&self, id: EntityId) -> ConditionSet {
        ConditionSet::for_entity(id, &self.conditions)
    }

    fn walls(&self) -> &[Wall] {
        &self.walls
    }

    fn turn_state(&self, id: EntityId) -> TurnState {
        self.turns.get(&id).copied().unwrap_or_else(|| {
            TurnState::new(self.token(id).map_or(0, |t| t.speeds.walk))
        })
    }

    fn cell_size_ft(&self) -> Option<f64> {
        self.cell_size_ft
    }

    fn round(&self) -> u32 {
        self.round
    }

    fn highest_spell_slot(&self, id: EntityId) -> u8 {
        self.slots.get(&id).map_or(0, SpellSlotState::highest_available)
    }

    fn is_underwater(&self, id: EntityId) -> bool {
        self.underwater.contains(&id)
    }
}

impl ConcentrationRegistry for Scene {
    fn concentration_ended(&mut self, entity: EntityId, spell: &str) {
        self.ended_concentration.push((entity, spell.to_string()));
    }
}

impl CombatHost for Scene {
    fn apply_hp(&mut self, token: EntityId, current: u32) -> Result<(), HostError> {
        self.require_map()?;
        let target = self.token_mut(token).ok_or(HostError::TokenNotFound(token))?;
        target.hp.current = current.min(target.hp.max);
        Ok(())
    }

    fn add_condition(&mut self, condition: Condition) -> Result<(), HostError> {
        self.require_map()?;
        if self.token(condition.entity).is_none() {
            return Err(HostError::TokenNotFound(condition.entity));
        }
        self.conditions.push(condition);
        Ok(())
    }

    fn move_token(&mut self, token: EntityId, to: Point) -> Result<(), HostError> {
        self.require_map()?;
        let target = self.token_mut(token).ok_or(HostError::TokenNotFound(token))?;
        target.position = to;
        Ok(())
    }

    fn append_log(&mut self, entry: LogEntry) {
        self.log.push(entry);
    }

    fn broadcast(&mut self, message: Broadcast) {
        self.broadcasts.push(message);
    }
}
