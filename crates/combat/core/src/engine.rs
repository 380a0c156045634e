//! Entry point that bundles configuration with the orchestrators.
//!
//! The [`CombatEngine`] holds no scene state. Every call reads a fresh
//! snapshot through [`SceneOracle`] and returns a result value; mutations
//! reach the host only through [`commit`](crate::host::commit).

use crate::combat::{
    ActionOutcome, AttackReport, AttackRequest, DeathSaveReport, GrappleReport, GrappleRequest,
    Reactor, SaveReport, SaveRequest, cell_size,
};
use crate::config::{ConfigError, EngineConfig};
use crate::dice::{Dice, RollMode};
use crate::env::SceneOracle;
use crate::geometry::Point;
use crate::reactions::{ReactionPrompt, ReactionTracker};
use crate::resources::{
    ConcentrationCheck, ConcentrationRegistry, ConcentrationState, DeathSaveState, LegendaryState,
    SpellSlotState,
};
use crate::state::EntityId;
use crate::tables::{CasterProgression, RulesTables};

/// Combat rules engine configured once per session.
#[derive(Clone, Debug)]
pub struct CombatEngine {
    config: EngineConfig,
    tables: RulesTables,
    tracker: ReactionTracker,
}

impl CombatEngine {
    /// Creates an engine after validating both inputs.
    pub fn new(config: EngineConfig, tables: RulesTables) -> Result<Self, ConfigError> {
        config.validate()?;
        tables.validate()?;
        let tracker = ReactionTracker::new(&config);
        Ok(Self {
            config,
            tables,
            tracker,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn tables(&self) -> &RulesTables {
        &self.tables
    }

    pub fn tracker(&self) -> &ReactionTracker {
        &self.tracker
    }

    pub fn resolve_attack(
        &self,
        scene: &(impl SceneOracle + ?Sized),
        request: &AttackRequest,
        dice: &mut Dice,
        now_ms: u64,
    ) -> ActionOutcome<AttackReport> {
        crate::combat::resolve_attack(scene, request, &self.config, &self.tracker, dice, now_ms)
    }

    /// See [`resolve_save`](crate::combat::resolve_save).
    pub fn resolve_save(
        &self,
        scene: &(impl SceneOracle + ?Sized),
        request: &SaveRequest,
        dice: &mut Dice,
        legendary: Option<&mut LegendaryState>,
        now_ms: u64,
    ) -> ActionOutcome<SaveReport> {
        crate::combat::resolve_save(
            scene,
            request,
            &self.config,
            &self.tracker,
            dice,
            legendary,
            now_ms,
        )
    }

    pub fn resolve_grapple(
        &self,
        scene: &(impl SceneOracle + ?Sized),
        request: &GrappleRequest,
        dice: &mut Dice,
    ) -> ActionOutcome<GrappleReport> {
        crate::combat::resolve_grapple(scene, request, &self.config, dice)
    }

    /// Rolls a death save for a token at 0 HP. A natural 20 comes back with
    /// the 1 HP change in its effects.
    pub fn resolve_death_save(
        &self,
        scene: &(impl SceneOracle + ?Sized),
        token: EntityId,
        state: &mut DeathSaveState,
        dice: &mut Dice,
    ) -> ActionOutcome<DeathSaveReport> {
        crate::combat::resolve_death_save(scene, token, state, dice)
    }

    /// Opportunity-attack prompts for `mover` moving `from -> to`.
    ///
    /// Returns nothing when the mover is not on the map.
    pub fn check_opportunity_attacks(
        &self,
        scene: &(impl SceneOracle + ?Sized),
        mover: EntityId,
        from: Point,
        to: Point,
        now_ms: u64,
    ) -> Vec<ReactionPrompt> {
        let Some(mover) = scene.token(mover) else {
            tracing::debug!("opportunity check for missing token {}", mover);
            return Vec::new();
        };
        let reactors = Reactor::hostiles_of(scene, mover);
        let candidates: Vec<_> = reactors.iter().map(Reactor::candidate).collect();
        self.tracker.check_opportunity_attack(
            mover,
            from,
            to,
            &candidates,
            cell_size(scene, &self.config),
            now_ms,
        )
    }

    /// Counterspell prompts for a spell `caster` is about to cast.
    pub fn check_counterspell(
        &self,
        scene: &(impl SceneOracle + ?Sized),
        caster: EntityId,
        now_ms: u64,
    ) -> Vec<ReactionPrompt> {
        let Some(caster) = scene.token(caster) else {
            tracing::debug!("counterspell check for missing token {}", caster);
            return Vec::new();
        };
        let reactors = Reactor::hostiles_of(scene, caster);
        let candidates: Vec<_> = reactors.iter().map(Reactor::candidate).collect();
        self.tracker.check_counterspell(
            caster,
            caster.position,
            &candidates,
            cell_size(scene, &self.config),
            now_ms,
        )
    }

    /// Concentration save after `damage`, using the configured DC cap.
    pub fn concentration_check(
        &self,
        state: &mut ConcentrationState,
        damage: u32,
        con_save_modifier: i32,
        mode: RollMode,
        dice: &mut Dice,
        registry: &mut (impl ConcentrationRegistry + ?Sized),
    ) -> ConcentrationCheck {
        state.check(
            damage,
            con_save_modifier,
            mode,
            self.config.concentration_dc_cap,
            dice,
            registry,
        )
    }

    /// Fresh slot ledger for a caster of `progression` at `level`.
    pub fn spell_slots_for(&self, progression: CasterProgression, level: u8) -> SpellSlotState {
        SpellSlotState::from_progression(&self.tables, progression, level)
    }
}

impl Default for CombatEngine {
    fn default() -> Self {
        let config = EngineConfig::default();
        Self {
            tracker: ReactionTracker::new(&config),
            config,
            tables: RulesTables::standard(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Scene;
    use crate::state::Token;

    #[test]
    fn rejects_invalid_config() {
        let config = EngineConfig::new().with_cell_size(-5.0);
        assert!(CombatEngine::new(config, RulesTables::standard()).is_err());
    }

    #[test]
    fn slots_follow_tables() {
        let engine = CombatEngine::default();
        let slots = engine.spell_slots_for(CasterProgression::Full, 5);
        assert_eq!(slots.highest_available(), 3);
    }

    #[test]
    fn configured_cell_size_applies_unless_the_map_has_its_own() {
        let engine =
            CombatEngine::new(EngineConfig::new().with_cell_size(10.0), RulesTables::standard()).unwrap();
        let cultist = Token::new(EntityId(1), "Cultist", Point::default()).with_team(2);
        let wizard = Token::new(EntityId(2), "Wizard", Point::new(7.0, 0.0))
            .with_team(1)
            .with_known_abilities(["Counterspell"]);
        let slots = SpellSlotState::new().with_slots(3, 1);

        // Seven cells at 10 ft is 70 ft, beyond Counterspell.
        let unscaled = Scene::default()
            .with_token(cultist.clone())
            .with_token(wizard.clone())
            .with_spell_slots(EntityId(2), slots.clone());
        assert!(engine.check_counterspell(&unscaled, EntityId(1), 0).is_empty());

        // The map's own 5 ft grid puts the wizard at 35 ft.
        let five_ft_map = Scene::new(5.0)
            .with_token(cultist)
            .with_token(wizard)
            .with_spell_slots(EntityId(2), slots);
        assert_eq!(engine.check_counterspell(&five_ft_map, EntityId(1), 0).len(), 1);
    }

    #[test]
    fn opportunity_attack_for_missing_mover_is_empty() {
        let engine = CombatEngine::default();
        let scene = Scene::default().with_token(Token::new(EntityId(2), "Guard", Point::default()));
        let prompts =
            engine.check_opportunity_attacks(&scene, EntityId(9), Point::default(), Point::new(3.0, 0.0), 0);
        assert!(prompts.is_empty());
    }
}
