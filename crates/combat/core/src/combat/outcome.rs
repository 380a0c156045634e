use crate::reactions::ReactionPrompt;

/// Why an action produced no effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BlockReason {
    /// Attacker or target is not on the map.
    MissingToken,
    /// The attacker is incapacitated, stunned, paralyzed, unconscious or petrified.
    AttackerCannotAct,
    OutOfRange,
    TotalCover,
    /// The target is more than one size larger than the attacker.
    SizeMismatch,
    /// A death save was asked for a token above 0 HP.
    NotDying,
}

impl BlockReason {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingToken => "MISSING_TOKEN",
            Self::AttackerCannotAct => "ATTACKER_CANNOT_ACT",
            Self::OutOfRange => "OUT_OF_RANGE",
            Self::TotalCover => "TOTAL_COVER",
            Self::SizeMismatch => "SIZE_MISMATCH",
            Self::NotDying => "NOT_DYING",
        }
    }
}

/// The canonical zero-effect result.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Blocked {
    pub reason: BlockReason,
    pub detail: String,
}

/// Result of an orchestrated action.
#[derive(Clone, Debug, PartialEq)]
pub enum ActionOutcome<T> {
    Resolved(T),
    /// Nothing happened; no dice were rolled and no effects exist.
    Blocked(Blocked),
    /// A reaction window is open. Nothing was rolled; call again once the
    /// prompts are answered or expired.
    Pending(Vec<ReactionPrompt>),
}

impl<T> ActionOutcome<T> {
    /// The only constructor for blocked outcomes.
    pub fn blocked(reason: BlockReason, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        tracing::debug!("action blocked [{}]: {}", reason.code(), detail);
        Self::Blocked(Blocked { reason, detail })
    }

    pub fn resolved(self) -> Option<T> {
        match self {
            Self::Resolved(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_resolved(&self) -> Option<&T> {
        match self {
            Self::Resolved(value) => Some(value),
            _ => None,
        }
    }

    pub fn blocked_reason(&self) -> Option<BlockReason> {
        match self {
            Self::Blocked(blocked) => Some(blocked.reason),
            _ => None,
        }
    }

    pub fn prompts(&self) -> &[ReactionPrompt] {
        match self {
            Self::Pending(prompts) => prompts,
            _ => &[],
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocked_factory_carries_reason() {
        let outcome: ActionOutcome<()> = ActionOutcome::blocked(BlockReason::TotalCover, "wall");
        assert_eq!(outcome.blocked_reason(), Some(BlockReason::TotalCover));
        assert_eq!(BlockReason::TotalCover.code(), "TOTAL_COVER");
        assert!(outcome.prompts().is_empty());
        assert!(outcome.resolved().is_none());
    }
}
