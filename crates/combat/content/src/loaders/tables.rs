//! Rules tables loader.
//!
//! A tables file lists only the rows a table wants to change; everything
//! else keeps the built-in 2024 progressions.
//!
//! ```toml
//! [[full]]
//! level = 1
//! slots = [3]
//!
//! [[pact]]
//! level = 1
//! slots = 2
//! slot_level = 1
//!
//! [[cantrips.artificer]]
//! level = 1
//! known = 2
//! ```

use std::path::Path;

use combat_core::{RulesTables, RulesTablesPatch};

use crate::loaders::{LoadResult, read_file};

/// Loader for [`RulesTables`] overlays.
pub struct TablesLoader;

impl TablesLoader {
    /// Loads a patch file and applies it over [`RulesTables::standard`].
    pub fn load(path: &Path) -> LoadResult<RulesTables> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<RulesTables> {
        let patch: RulesTablesPatch = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse tables TOML: {}", e))?;
        let rows = patch.full.len() + patch.half.len() + patch.third.len() + patch.pact.len();
        let tables = RulesTables::standard()
            .patched(&patch)
            .map_err(|e| anyhow::anyhow!("Invalid rules tables: {}", e))?;
        tracing::debug!("applied {} slot row override(s), {} cantrip table(s)", rows, patch.cantrips.len());
        Ok(tables)
    }
}
