//! Resistance, immunity and vulnerability phrases.
//!
//! Stat blocks list defenses as free text:
//!
//! ```text
//! fire
//! bludgeoning, piercing, and slashing from nonmagical attacks
//! piercing from nonmagical attacks not made with silvered weapons
//! all
//! ```
//!
//! Each phrase is parsed once into a [`DefensePhrase`]; matching against a
//! damage component is then a plain set lookup.

use std::collections::BTreeSet;
use std::str::FromStr;

use super::DamageType;

/// Which damage types a phrase covers.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PhraseTypes {
    All,
    Only(BTreeSet<DamageType>),
}

/// One parsed defense entry.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DefensePhrase {
    pub types: PhraseTypes,
    /// Applies only to damage from nonmagical attacks.
    pub nonmagical_only: bool,
    /// Applies only to weapons that are not silvered.
    pub unsilvered_only: bool,
}

impl DefensePhrase {
    /// Parses a phrase, case-insensitively. Returns `None` when no damage
    /// type (and no "all") is recognized.
    pub fn parse(text: &str) -> Option<Self> {
        let lower = text.to_ascii_lowercase();
        let nonmagical_only = lower.contains("nonmagical") || lower.contains("non-magical");
        let unsilvered_only = lower.contains("silvered");

        let head = lower.split(" from ").next().unwrap_or_default();

        let words = head
            .split(|c: char| c == ',' || c.is_whitespace())
            .map(str::trim)
            .filter(|w| !w.is_empty() && *w != "and" && *w != "or");

        let mut types = BTreeSet::new();
        let mut all = false;
        for word in words {
            if word == "all" {
                all = true;
            } else if let Ok(kind) = DamageType::from_str(word) {
                types.insert(kind);
            }
        }

        let types = match (all, types.is_empty()) {
            (true, _) => PhraseTypes::All,
            (false, false) => PhraseTypes::Only(types),
            (false, true) => return None,
        };

        Some(Self {
            types,
            nonmagical_only,
            unsilvered_only,
        })
    }

    /// True when this phrase covers the given component.
    pub fn applies_to(&self, damage_type: DamageType, is_magical: bool, is_silvered: bool) -> bool {
        let type_matches = match &self.types {
            PhraseTypes::All => true,
            PhraseTypes::Only(set) => set.contains(&damage_type),
        };
        if !type_matches {
            return false;
        }
        if self.nonmagical_only && is_magical {
            return false;
        }
        if self.unsilvered_only && is_silvered {
            return false;
        }
        true
    }
}

/// A target's parsed defenses.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Defenses {
    pub resistances: Vec<DefensePhrase>,
    pub immunities: Vec<DefensePhrase>,
    pub vulnerabilities: Vec<DefensePhrase>,
}

impl Defenses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the three phrase lists of a stat block. Unrecognized phrases
    /// are dropped with a debug log.
    pub fn from_phrases<'a>(
        resistances: impl IntoIterator<Item = &'a str>,
        immunities: impl IntoIterator<Item = &'a str>,
        vulnerabilities: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self {
            resistances: parse_all(resistances),
            immunities: parse_all(immunities),
            vulnerabilities: parse_all(vulnerabilities),
        }
    }

    pub fn resists(&self, damage_type: DamageType, is_magical: bool, is_silvered: bool) -> bool {
        any_applies(&self.resistances, damage_type, is_magical, is_silvered)
    }

    pub fn is_immune(&self, damage_type: DamageType, is_magical: bool, is_silvered: bool) -> bool {
        any_applies(&self.immunities, damage_type, is_magical, is_silvered)
    }

    pub fn is_vulnerable(&self, damage_type: DamageType, is_magical: bool, is_silvered: bool) -> bool {
        any_applies(&self.vulnerabilities, damage_type, is_magical, is_silvered)
    }
}

fn parse_all<'a>(phrases: impl IntoIterator<Item = &'a str>) -> Vec<DefensePhrase> {
    phrases
        .into_iter()
        .filter_map(|text| {
            let parsed = DefensePhrase::parse(text);
            if parsed.is_none() {
                tracing::debug!("ignoring unrecognized defense phrase {:?}", text);
            }
            parsed
        })
        .collect()
}

fn any_applies(
    phrases: &[DefensePhrase],
    damage_type: DamageType,
    is_magical: bool,
    is_silvered: bool,
) -> bool {
    phrases
        .iter()
        .any(|p| p.applies_to(damage_type, is_magical, is_silvered))
}
