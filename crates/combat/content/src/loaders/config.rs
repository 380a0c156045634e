//! Engine configuration loader.

use std::path::Path;

use combat_core::EngineConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for [`EngineConfig`] from TOML files.
///
/// Missing keys fall back to the defaults, so an empty file is a valid
/// configuration.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads and validates a config file.
    pub fn load(path: &Path) -> LoadResult<EngineConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parses and validates TOML text.
    pub fn parse(content: &str) -> LoadResult<EngineConfig> {
        let config: EngineConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse engine config TOML: {}", e))?;
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid engine config: {}", e))?;
        tracing::debug!(
            "loaded engine config: cell {} ft, prompt timeout {} ms",
            config.cell_size_ft,
            config.prompt_timeout_ms
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_default() {
        assert_eq!(ConfigLoader::parse("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn overrides_only_given_keys() {
        let config = ConfigLoader::parse("cell_size_ft = 10.0\nflanking = true\n").unwrap();
        assert_eq!(config.cell_size_ft, 10.0);
        assert!(config.flanking);
        assert_eq!(config.prompt_timeout_ms, EngineConfig::DEFAULT_PROMPT_TIMEOUT_MS);
    }

    #[test]
    fn rejects_invalid_values() {
        let err = ConfigLoader::parse("concentration_dc_cap = 5").unwrap_err();
        assert!(err.to_string().contains("Invalid engine config"));
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(ConfigLoader::parse("cell_size_ft = \"wide\"").is_err());
    }
}
