//! Data-driven configuration for the combat engine.
//!
//! Reads `engine.toml` and `tables.toml` from a data directory into the
//! [`EngineConfig`](combat_core::EngineConfig) and
//! [`RulesTables`](combat_core::RulesTables) that hosts inject into
//! [`CombatEngine::new`](combat_core::CombatEngine::new). Content never
//! appears in combat state.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentFactory, LoadResult, TablesLoader};
