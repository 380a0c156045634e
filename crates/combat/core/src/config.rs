/// Engine configuration constants and tunable parameters.
///
/// Constructed once by the host (usually via `combat-content`'s
/// `ConfigLoader`) and injected into [`CombatEngine`](crate::engine::CombatEngine).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Feet per grid cell.
    pub cell_size_ft: f64,
    /// How long a reaction prompt stays open.
    pub prompt_timeout_ms: u64,
    /// Radius in which Counterspell reactors are surfaced.
    pub counterspell_radius_ft: f64,
    /// Optional flanking rule: an ally opposite the target grants advantage.
    pub flanking: bool,
    /// d20 penalty per exhaustion level.
    pub exhaustion_penalty_per_level: i32,
    /// Upper bound for the concentration save DC.
    pub concentration_dc_cap: u32,
}

impl EngineConfig {
    // ===== runtime-tunable defaults =====
    pub const DEFAULT_CELL_SIZE_FT: f64 = 5.0;
    pub const DEFAULT_PROMPT_TIMEOUT_MS: u64 = 15_000;
    pub const DEFAULT_COUNTERSPELL_RADIUS_FT: f64 = 60.0;
    pub const DEFAULT_EXHAUSTION_PENALTY: i32 = 2;
    pub const DEFAULT_CONCENTRATION_DC_CAP: u32 = 30;

    // ===== fixed rules constants =====
    /// Reach within which an adjacent enemy hampers ranged attacks.
    pub const CLOSE_RANGE_FT: f64 = 5.0;
    /// Minimum concentration save DC.
    pub const CONCENTRATION_DC_FLOOR: u32 = 10;
    /// Lowest spell slot that can cast Counterspell.
    pub const COUNTERSPELL_MIN_SLOT: u8 = 3;

    pub fn new() -> Self {
        Self {
            cell_size_ft: Self::DEFAULT_CELL_SIZE_FT,
            prompt_timeout_ms: Self::DEFAULT_PROMPT_TIMEOUT_MS,
            counterspell_radius_ft: Self::DEFAULT_COUNTERSPELL_RADIUS_FT,
            flanking: false,
            exhaustion_penalty_per_level: Self::DEFAULT_EXHAUSTION_PENALTY,
            concentration_dc_cap: Self::DEFAULT_CONCENTRATION_DC_CAP,
        }
    }

    #[must_use]
    pub fn with_cell_size(mut self, cell_size_ft: f64) -> Self {
        self.cell_size_ft = cell_size_ft;
        self
    }

    #[must_use]
    pub fn with_prompt_timeout(mut self, prompt_timeout_ms: u64) -> Self {
        self.prompt_timeout_ms = prompt_timeout_ms;
        self
    }

    #[must_use]
    pub fn with_flanking(mut self, flanking: bool) -> Self {
        self.flanking = flanking;
        self
    }

    /// Checks values a loaded file could have broken.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.cell_size_ft.is_finite() && self.cell_size_ft > 0.0) {
            return Err(ConfigError::InvalidCellSize(self.cell_size_ft));
        }
        if self.counterspell_radius_ft < 0.0 {
            return Err(ConfigError::InvalidRadius(self.counterspell_radius_ft));
        }
        if self.concentration_dc_cap < Self::CONCENTRATION_DC_FLOOR {
            return Err(ConfigError::InvalidDcCap(self.concentration_dc_cap));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors raised while validating configuration and rules tables.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("cell size must be positive, got {0}")]
    InvalidCellSize(f64),

    #[error("counterspell radius must not be negative, got {0}")]
    InvalidRadius(f64),

    #[error("concentration DC cap {0} is below the DC floor")]
    InvalidDcCap(u32),

    #[error("{table} progression has {rows} rows, expected 20")]
    WrongRowCount { table: &'static str, rows: usize },

    #[error("{table} progression row for level {level} has {slots} slot levels, max 9")]
    TooManySlotLevels {
        table: &'static str,
        level: usize,
        slots: usize,
    },

    #[error("pact magic slot level {level} at character level {at} is outside 1..=5")]
    InvalidPactLevel { level: u8, at: usize },

    #[error("cantrip table for {class:?} is empty or not sorted by level")]
    InvalidCantripTable { class: String },
}

impl crate::error::CombatError for ConfigError {
    fn severity(&self) -> crate::error::ErrorSeverity {
        crate::error::ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCellSize(_) => "CONFIG_CELL_SIZE",
            Self::InvalidRadius(_) => "CONFIG_RADIUS",
            Self::InvalidDcCap(_) => "CONFIG_DC_CAP",
            Self::WrongRowCount { .. } => "TABLES_ROW_COUNT",
            Self::TooManySlotLevels { .. } => "TABLES_SLOT_LEVELS",
            Self::InvalidPactLevel { .. } => "TABLES_PACT_LEVEL",
            Self::InvalidCantripTable { .. } => "TABLES_CANTRIPS",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert_eq!(config.cell_size_ft, 5.0);
        assert_eq!(config.prompt_timeout_ms, 15_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_cell_size() {
        let config = EngineConfig::new().with_cell_size(0.0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidCellSize(0.0)));
    }
}
