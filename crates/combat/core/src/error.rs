//! Common error infrastructure for combat-core.
//!
//! The resolvers themselves are total: unsatisfiable requests come back as
//! [`ActionOutcome::Blocked`](crate::combat::ActionOutcome) values rather than
//! errors. Errors only exist at the few fallible boundaries:
//!
//! - parsing dice formulas ([`DiceError`](crate::dice::DiceError))
//! - validating configuration tables ([`ConfigError`](crate::config::ConfigError))
//! - spending ledger resources ([`ResourceError`](crate::resources::ResourceError),
//!   [`ReactionError`](crate::reactions::ReactionError))
//! - forwarding mutations to the host ([`HostError`])
//!
//! Each of them implements [`CombatError`] so callers can classify failures
//! uniformly.

use crate::state::EntityId;

/// How a caller should treat a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// The caller can retry or offer an alternative.
    ///
    /// Examples: no active map to apply HP against, token despawned mid-turn
    Recoverable,

    /// The input was wrong; retrying unchanged fails again.
    ///
    /// Examples: malformed dice formula, spell-slot table with 21 rows
    Validation,

    /// A broken engine invariant.
    Internal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    /// Whether a retry can succeed.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

/// Implemented by every error enum in combat-core, all of which derive
/// `thiserror::Error`. Severity follows recoverability.
pub trait CombatError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Stable identifier such as `HOST_REJECTED`.
    fn error_code(&self) -> &'static str;
}

/// Failures reported by a [`CombatHost`](crate::host::CombatHost) while
/// applying a mutation.
///
/// The engine never propagates these: commit logs a warning and skips the
/// mutation, leaving everything else consistent.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HostError {
    /// No active map is loaded to apply the mutation against.
    #[error("no active map")]
    MapNotAvailable,

    /// The token vanished between resolution and commit.
    #[error("token {0} not found")]
    TokenNotFound(EntityId),

    /// The host refused the mutation (permissions, sync conflict, ...).
    #[error("mutation rejected: {0}")]
    Rejected(String),
}

impl CombatError for HostError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::MapNotAvailable | Self::TokenNotFound(_) => ErrorSeverity::Recoverable,
            Self::Rejected(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::MapNotAvailable => "HOST_MAP_NOT_AVAILABLE",
            Self::TokenNotFound(_) => "HOST_TOKEN_NOT_FOUND",
            Self::Rejected(_) => "HOST_REJECTED",
        }
    }
}
