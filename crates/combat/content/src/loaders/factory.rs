//! Content factory for building engine inputs from a data directory.

use std::path::{Path, PathBuf};

use combat_core::{CombatEngine, EngineConfig, RulesTables};

use crate::loaders::{ConfigLoader, LoadResult, TablesLoader};

/// Loads engine content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── engine.toml
/// └── tables.toml
/// ```
///
/// Either file may be absent; the defaults are used in its place.
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Loads `engine.toml`.
    pub fn load_config(&self) -> LoadResult<EngineConfig> {
        let path = self.data_dir.join("engine.toml");
        if !path.exists() {
            tracing::debug!("{} not found, using default engine config", path.display());
            return Ok(EngineConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Loads `tables.toml` over the standard tables.
    pub fn load_tables(&self) -> LoadResult<RulesTables> {
        let path = self.data_dir.join("tables.toml");
        if !path.exists() {
            tracing::debug!("{} not found, using standard rules tables", path.display());
            return Ok(RulesTables::standard());
        }
        TablesLoader::load(&path)
    }

    /// Builds an engine from both files.
    pub fn build_engine(&self) -> LoadResult<CombatEngine> {
        let engine = CombatEngine::new(self.load_config()?, self.load_tables()?)
            .map_err(|e| anyhow::anyhow!("Invalid engine content: {}", e))?;
        Ok(engine)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
