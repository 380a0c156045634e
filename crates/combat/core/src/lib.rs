//! Combat resolution rules for grid-based tabletop encounters.
//!
//! `combat-core` turns an action request plus a read-only scene snapshot
//! into a result value: attack rolls, saving throws, grapples, reaction
//! prompts and resource bookkeeping. Resolvers never mutate the scene; they
//! describe mutations as [`host::Effects`] and [`host::commit`] forwards
//! them to the embedding [`host::CombatHost`]. [`engine::CombatEngine`]
//! bundles the injected configuration with every orchestrator.
pub mod combat;
pub mod conditions;
pub mod config;
pub mod damage;
pub mod dice;
pub mod engine;
pub mod env;
pub mod error;
pub mod features;
pub mod geometry;
pub mod host;
pub mod reactions;
pub mod resources;
pub mod riders;
pub mod state;
pub mod tables;

pub use combat::{
    ActionOutcome, AttackRange, AttackReport, AttackRequest, BlockReason, Blocked,
    DeathSaveReport, GrappleKind, GrappleReport, GrappleRequest, SaveReport, SaveRequest,
    ShoveChoice,
};
pub use conditions::{AttackContext, Condition, ConditionEffects, ConditionKind, ConditionSet};
pub use config::{ConfigError, EngineConfig};
pub use damage::{
    DamageApplication, DamageContext, DamageSummary, DamageType, DefensePhrase, Defenses,
    resolve_damage,
};
pub use dice::{Dice, DiceError, DiceFormula, DiceRoll, DiceSource, RollMode, RollOptions};
pub use engine::CombatEngine;
pub use env::{Scene, SceneOracle};
pub use error::{CombatError, ErrorSeverity, HostError};
pub use features::{Feature, FeatureSet};
pub use geometry::{CoverLevel, CoverReport, CreatureSize, Footprint, Point, Wall, WallKind};
pub use host::{Broadcast, CombatHost, Effects, HpChange, LogEntry, LogKind, commit};
pub use reactions::{
    ReactionCandidate, ReactionError, ReactionKind, ReactionPrompt, ReactionTracker,
    ReactionTrigger,
};
pub use resources::{
    ConcentrationCheck, ConcentrationRegistry, ConcentrationState, DeathSaveOutcome,
    DeathSaveState, LegendaryState, MultiAttackState, ResourceError, SpellSlotState,
};
pub use riders::{RiderEffect, WeaponMastery};
pub use state::{Ability, AbilityModifiers, EntityId, HitPoints, Speeds, Token, TurnFlags, TurnState};
pub use tables::{CasterProgression, RulesTables, RulesTablesPatch};
