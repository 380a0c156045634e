//! Condition kinds and per-entity condition sets.

use core::fmt;

use crate::state::EntityId;

/// Recognized condition kinds.
///
/// Standard conditions plus the short-lived markers left by weapon masteries
/// and feats. Anything unrecognized is kept verbatim as [`ConditionKind::Custom`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConditionKind {
    Blinded,
    Charmed,
    Deafened,
    /// Exhaustion with its level (1-6).
    Exhaustion(u8),
    Frightened,
    Grappled,
    Incapacitated,
    Invisible,
    Paralyzed,
    Petrified,
    Poisoned,
    Prone,
    Restrained,
    Stunned,
    Unconscious,
    /// Sap mastery: disadvantage on the next attack roll.
    Sapped,
    /// Vex mastery: the source has advantage on its next attack against this creature.
    Vexed,
    /// Crusher critical: attack rolls against this creature have advantage.
    Exposed,
    /// Slasher critical: disadvantage on attack rolls.
    Hamstrung,
    /// Slow mastery or Slasher: speed reduced by 10 ft.
    Slowed,
    Custom(String),
}

impl ConditionKind {
    /// Parses a condition name, case-insensitively.
    ///
    /// `"Exhaustion 3"` yields level 3; bare `"Exhaustion"` yields level 1.
    pub fn parse(name: &str) -> Self {
        let normalized = name.trim().to_ascii_lowercase();
        if let Some(rest) = normalized.strip_prefix("exhaustion") {
            let level = rest
                .trim()
                .trim_start_matches(['(', ':'])
                .trim_end_matches(')')
                .trim()
                .parse::<u8>()
                .unwrap_or(1);
            return Self::Exhaustion(level.clamp(1, 6));
        }
        match normalized.as_str() {
            "blinded" => Self::Blinded,
            "charmed" => Self::Charmed,
            "deafened" => Self::Deafened,
            "frightened" => Self::Frightened,
            "grappled" => Self::Grappled,
            "incapacitated" => Self::Incapacitated,
            "invisible" => Self::Invisible,
            "paralyzed" => Self::Paralyzed,
            "petrified" => Self::Petrified,
            "poisoned" => Self::Poisoned,
            "prone" => Self::Prone,
            "restrained" => Self::Restrained,
            "stunned" => Self::Stunned,
            "unconscious" => Self::Unconscious,
            "sapped" => Self::Sapped,
            "vexed" => Self::Vexed,
            "exposed" => Self::Exposed,
            "hamstrung" => Self::Hamstrung,
            "slowed" => Self::Slowed,
            _ => Self::Custom(name.trim().to_string()),
        }
    }

    /// Conditions that stop a creature from taking actions (and attacking).
    pub const fn prevents_actions(&self) -> bool {
        matches!(
            self,
            Self::Incapacitated | Self::Stunned | Self::Paralyzed | Self::Unconscious | Self::Petrified
        )
    }

    /// Conditions that stop a creature from taking reactions. Petrified
    /// counts because it includes Incapacitated.
    pub const fn prevents_reactions(&self) -> bool {
        self.prevents_actions()
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhaustion(level) => write!(f, "Exhaustion {level}"),
            Self::Custom(name) => f.write_str(name),
            other => write!(f, "{other:?}"),
        }
    }
}

/// A condition instance on an entity, as recorded by the host.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Condition {
    pub entity: EntityId,
    pub kind: ConditionKind,
    /// Remaining duration in rounds; `None` until removed.
    pub duration_rounds: Option<u32>,
    pub source: Option<EntityId>,
    pub round_applied: u32,
}

impl Condition {
    pub fn new(entity: EntityId, kind: ConditionKind) -> Self {
        Self {
            entity,
            kind,
            duration_rounds: None,
            source: None,
            round_applied: 0,
        }
    }

    #[must_use]
    pub fn from_source(mut self, source: EntityId) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub fn lasting(mut self, rounds: u32) -> Self {
        self.duration_rounds = Some(rounds);
        self
    }

    #[must_use]
    pub fn applied_in(mut self, round: u32) -> Self {
        self.round_applied = round;
        self
    }
}

/// The conditions active on one entity at call time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConditionSet {
    entries: Vec<(ConditionKind, Option<EntityId>)>,
}

impl ConditionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects the conditions recorded for `entity`.
    pub fn for_entity<'a>(entity: EntityId, conditions: impl IntoIterator<Item = &'a Condition>) -> Self {
        Self {
            entries: conditions
                .into_iter()
                .filter(|c| c.entity == entity)
                .map(|c| (c.kind.clone(), c.source))
                .collect(),
        }
    }

    /// Builds a set from bare kinds, without sources.
    pub fn from_kinds(kinds: impl IntoIterator<Item = ConditionKind>) -> Self {
        Self {
            entries: kinds.into_iter().map(|k| (k, None)).collect(),
        }
    }

    pub fn insert(&mut self, kind: ConditionKind, source: Option<EntityId>) {
        self.entries.push((kind, source));
    }

    pub fn has(&self, kind: &ConditionKind) -> bool {
        self.entries.iter().any(|(k, _)| k == kind)
    }

    /// True if `kind` is present and was applied by `source`.
    pub fn has_from(&self, kind: &ConditionKind, source: EntityId) -> bool {
        self.entries
            .iter()
            .any(|(k, s)| k == kind && *s == Some(source))
    }

    /// Highest exhaustion level present, 0 if none.
    pub fn exhaustion_level(&self) -> u8 {
        self.entries
            .iter()
            .filter_map(|(k, _)| match k {
                ConditionKind::Exhaustion(level) => Some(*level),
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// First condition that prevents actions, if any.
    pub fn action_blocker(&self) -> Option<&ConditionKind> {
        self.entries
            .iter()
            .map(|(k, _)| k)
            .find(|k| k.prevents_actions())
    }

    pub fn cannot_act(&self) -> bool {
        self.action_blocker().is_some()
    }

    pub fn cannot_react(&self) -> bool {
        self.entries.iter().any(|(k, _)| k.prevents_reactions())
    }

    pub fn kinds(&self) -> impl Iterator<Item = &ConditionKind> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
