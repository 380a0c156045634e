use crate::damage::DamageType;
use crate::state::{EntityId, Token};

/// Category of a combat log line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LogKind {
    Attack,
    Damage,
    Save,
    Condition,
    Reaction,
    Resource,
    System,
}

/// One combat log line.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogEntry {
    pub kind: LogKind,
    pub source_id: Option<EntityId>,
    pub source_name: Option<String>,
    pub target_id: Option<EntityId>,
    pub target_name: Option<String>,
    pub value: Option<i32>,
    pub damage_type: Option<DamageType>,
    pub description: String,
}

impl LogEntry {
    pub fn new(kind: LogKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            source_id: None,
            source_name: None,
            target_id: None,
            target_name: None,
            value: None,
            damage_type: None,
            description: description.into(),
        }
    }

    #[must_use]
    pub fn source(mut self, token: &Token) -> Self {
        self.source_id = Some(token.id);
        self.source_name = Some(token.name.clone());
        self
    }

    #[must_use]
    pub fn target(mut self, token: &Token) -> Self {
        self.target_id = Some(token.id);
        self.target_name = Some(token.name.clone());
        self
    }

    #[must_use]
    pub fn value(mut self, value: i32) -> Self {
        self.value = Some(value);
        self
    }

    #[must_use]
    pub fn damage_type(mut self, damage_type: Option<DamageType>) -> Self {
        self.damage_type = damage_type;
        self
    }
}

/// Summary pushed to every connected client.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Broadcast {
    pub summary: String,
    /// Only the GM sees secret broadcasts.
    pub secret: bool,
}

impl Broadcast {
    pub fn public(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            secret: false,
        }
    }

    pub fn secret(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            secret: true,
        }
    }
}
