//! Rules tables injected into the engine.
//!
//! Spell-slot progressions and cantrips-known counts. The built-in values
//! follow the 2024 rules; `combat-content` overlays file data on top of them
//! with [`RulesTablesPatch`]. Tables are validated once when built and then
//! shared read-only.

use std::collections::BTreeMap;

use crate::config::ConfigError;

/// Slot layout for one character level: index 0 is 1st-level slots.
pub type SlotRow = Vec<u8>;

/// Caster progression a class follows.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::EnumIter,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CasterProgression {
    #[default]
    None,
    Full,
    Half,
    Third,
    Pact,
}

/// Pact magic at one warlock level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PactRow {
    pub slots: u8,
    pub slot_level: u8,
}

/// Cantrips known from a given class level onward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CantripStep {
    pub level: u8,
    pub known: u8,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RulesTables {
    full: Vec<SlotRow>,
    half: Vec<SlotRow>,
    third: Vec<SlotRow>,
    pact: Vec<PactRow>,
    cantrips: BTreeMap<String, Vec<CantripStep>>,
}

const FULL_CASTER: [&[u8]; 20] = [
    &[2],
    &[3],
    &[4, 2],
    &[4, 3],
    &[4, 3, 2],
    &[4, 3, 3],
    &[4, 3, 3, 1],
    &[4, 3, 3, 2],
    &[4, 3, 3, 3, 1],
    &[4, 3, 3, 3, 2],
    &[4, 3, 3, 3, 2, 1],
    &[4, 3, 3, 3, 2, 1],
    &[4, 3, 3, 3, 2, 1, 1],
    &[4, 3, 3, 3, 2, 1, 1],
    &[4, 3, 3, 3, 2, 1, 1, 1],
    &[4, 3, 3, 3, 2, 1, 1, 1],
    &[4, 3, 3, 3, 2, 1, 1, 1, 1],
    &[4, 3, 3, 3, 3, 1, 1, 1, 1],
    &[4, 3, 3, 3, 3, 2, 1, 1, 1],
    &[4, 3, 3, 3, 3, 2, 2, 1, 1],
];

const HALF_CASTER: [&[u8]; 20] = [
    &[2],
    &[2],
    &[3],
    &[3],
    &[4, 2],
    &[4, 2],
    &[4, 3],
    &[4, 3],
    &[4, 3, 2],
    &[4, 3, 2],
    &[4, 3, 3],
    &[4, 3, 3],
    &[4, 3, 3, 1],
    &[4, 3, 3, 1],
    &[4, 3, 3, 2],
    &[4, 3, 3, 2],
    &[4, 3, 3, 3, 1],
    &[4, 3, 3, 3, 1],
    &[4, 3, 3, 3, 2],
    &[4, 3, 3, 3, 2],
];

const THIRD_CASTER: [&[u8]; 20] = [
    &[],
    &[],
    &[2],
    &[3],
    &[3],
    &[3],
    &[4, 2],
    &[4, 2],
    &[4, 2],
    &[4, 3],
    &[4, 3],
    &[4, 3],
    &[4, 3, 2],
    &[4, 3, 2],
    &[4, 3, 2],
    &[4, 3, 3],
    &[4, 3, 3],
    &[4, 3, 3],
    &[4, 3, 3, 1],
    &[4, 3, 3, 1],
];

/// (slots, slot level) per warlock level.
const PACT_MAGIC: [(u8, u8); 20] = [
    (1, 1),
    (2, 1),
    (2, 2),
    (2, 2),
    (2, 3),
    (2, 3),
    (2, 4),
    (2, 4),
    (2, 5),
    (2, 5),
    (3, 5),
    (3, 5),
    (3, 5),
    (3, 5),
    (3, 5),
    (3, 5),
    (4, 5),
    (4, 5),
    (4, 5),
    (4, 5),
];

/// (class, [(level, known)]) with steps at levels 1, 4 and 10.
const CANTRIPS: [(&str, [u8; 3]); 6] = [
    ("bard", [2, 3, 4]),
    ("cleric", [3, 4, 5]),
    ("druid", [2, 3, 4]),
    ("sorcerer", [4, 5, 6]),
    ("warlock", [2, 3, 4]),
    ("wizard", [3, 4, 5]),
];

impl RulesTables {
    pub const MAX_LEVEL: usize = 20;
    pub const MAX_SLOT_LEVEL: usize = 9;

    /// Built-in 2024 tables.
    pub fn standard() -> Self {
        let rows = |table: &[&[u8]; 20]| table.iter().map(|row| row.to_vec()).collect::<Vec<_>>();
        Self {
            full: rows(&FULL_CASTER),
            half: rows(&HALF_CASTER),
            third: rows(&THIRD_CASTER),
            pact: PACT_MAGIC
                .iter()
                .map(|&(slots, slot_level)| PactRow { slots, slot_level })
                .collect(),
            cantrips: CANTRIPS
                .iter()
                .map(|(class, known)| {
                    let steps = [1u8, 4, 10]
                        .iter()
                        .zip(known)
                        .map(|(&level, &known)| CantripStep { level, known })
                        .collect();
                    ((*class).to_string(), steps)
                })
                .collect(),
        }
    }

    /// Slot counts for a character level under a progression. Pact magic is
    /// not included here; see [`RulesTables::pact_slots`].
    pub fn slots(&self, progression: CasterProgression, level: u8) -> &[u8] {
        let table = match progression {
            CasterProgression::Full => &self.full,
            CasterProgression::Half => &self.half,
            CasterProgression::Third => &self.third,
            CasterProgression::None | CasterProgression::Pact => return &[],
        };
        row_index(level)
            .and_then(|idx| table.get(idx))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn pact_slots(&self, level: u8) -> Option<PactRow> {
        row_index(level).and_then(|idx| self.pact.get(idx)).copied()
    }

    /// Cantrips known by a class at a level; 0 for non-casting classes.
    pub fn cantrips_known(&self, class: &str, level: u8) -> u8 {
        self.cantrips
            .get(&class.to_ascii_lowercase())
            .and_then(|steps| steps.iter().rev().find(|s| s.level <= level))
            .map_or(0, |s| s.known)
    }

    /// Checks table shapes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (table, rows) in [("full", &self.full), ("half", &self.half), ("third", &self.third)] {
            if rows.len() != Self::MAX_LEVEL {
                return Err(ConfigError::WrongRowCount {
                    table,
                    rows: rows.len(),
                });
            }
            if let Some((idx, row)) = rows
                .iter()
                .enumerate()
                .find(|(_, row)| row.len() > Self::MAX_SLOT_LEVEL)
            {
                return Err(ConfigError::TooManySlotLevels {
                    table,
                    level: idx + 1,
                    slots: row.len(),
                });
            }
        }

        if self.pact.len() != Self::MAX_LEVEL {
            return Err(ConfigError::WrongRowCount {
                table: "pact",
                rows: self.pact.len(),
            });
        }
        if let Some((idx, row)) = self
            .pact
            .iter()
            .enumerate()
            .find(|(_, row)| !(1..=5).contains(&row.slot_level))
        {
            return Err(ConfigError::InvalidPactLevel {
                level: row.slot_level,
                at: idx + 1,
            });
        }

        for (class, steps) in &self.cantrips {
            let sorted = steps.windows(2).all(|w| w[0].level < w[1].level);
            if steps.is_empty() || !sorted {
                return Err(ConfigError::InvalidCantripTable {
                    class: class.clone(),
                });
            }
        }
        Ok(())
    }

    /// Applies an overlay and validates the result.
    pub fn patched(mut self, patch: &RulesTablesPatch) -> Result<Self, ConfigError> {
        for (rows, overrides) in [
            (&mut self.full, &patch.full),
            (&mut self.half, &patch.half),
            (&mut self.third, &patch.third),
        ] {
            for entry in overrides {
                if let Some(row) = row_index(entry.level).and_then(|idx| rows.get_mut(idx)) {
                    row.clone_from(&entry.slots);
                } else {
                    tracing::warn!("ignoring slot row for out-of-range level {}", entry.level);
                }
            }
        }
        for entry in &patch.pact {
            if let Some(row) = row_index(entry.level).and_then(|idx| self.pact.get_mut(idx)) {
                *row = PactRow {
                    slots: entry.slots,
                    slot_level: entry.slot_level,
                };
            } else {
                tracing::warn!("ignoring pact row for out-of-range level {}", entry.level);
            }
        }
        for (class, steps) in &patch.cantrips {
            self.cantrips.insert(class.to_ascii_lowercase(), steps.clone());
        }

        self.validate()?;
        Ok(self)
    }
}

impl Default for RulesTables {
    fn default() -> Self {
        Self::standard()
    }
}

fn row_index(level: u8) -> Option<usize> {
    (1..=RulesTables::MAX_LEVEL as u8)
        .contains(&level)
        .then(|| usize::from(level) - 1)
}

/// Replacement slot row for one level.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlotRowPatch {
    pub level: u8,
    pub slots: SlotRow,
}

/// Replacement pact row for one level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PactRowPatch {
    pub level: u8,
    pub slots: u8,
    pub slot_level: u8,
}

/// Partial tables read from a data file. Only listed rows replace defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RulesTablesPatch {
    pub full: Vec<SlotRowPatch>,
    pub half: Vec<SlotRowPatch>,
    pub third: Vec<SlotRowPatch>,
    pub pact: Vec<PactRowPatch>,
    pub cantrips: BTreeMap<String, Vec<CantripStep>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_tables_are_valid() {
        let tables = RulesTables::standard();
        assert!(tables.validate().is_ok());
        assert_eq!(tables.slots(CasterProgression::Full, 5), &[4, 3, 2]);
        assert_eq!(tables.slots(CasterProgression::Half, 1), &[2]);
        assert!(tables.slots(CasterProgression::Third, 2).is_empty());
        assert!(tables.slots(CasterProgression::Full, 21).is_empty());
        assert_eq!(
            tables.pact_slots(11),
            Some(PactRow {
                slots: 3,
                slot_level: 5
            })
        );
    }

    #[test]
    fn cantrips_step_up_with_level() {
        let tables = RulesTables::standard();
        assert_eq!(tables.cantrips_known("Wizard", 1), 3);
        assert_eq!(tables.cantrips_known("wizard", 9), 4);
        assert_eq!(tables.cantrips_known("wizard", 10), 5);
        assert_eq!(tables.cantrips_known("fighter", 10), 0);
    }

    #[test]
    fn patch_replaces_only_listed_rows() {
        let patch = RulesTablesPatch {
            full: vec![SlotRowPatch {
                level: 1,
                slots: vec![3],
            }],
            ..RulesTablesPatch::default()
        };
        let tables = RulesTables::standard().patched(&patch).unwrap();
        assert_eq!(tables.slots(CasterProgression::Full, 1), &[3]);
        assert_eq!(tables.slots(CasterProgression::Full, 2), &[3]);
    }

    #[test]
    fn patch_with_bad_pact_level_is_rejected() {
        let patch = RulesTablesPatch {
            pact: vec![PactRowPatch {
                level: 3,
                slots: 2,
                slot_level: 7,
            }],
            ..RulesTablesPatch::default()
        };
        assert_eq!(
            RulesTables::standard().patched(&patch),
            Err(ConfigError::InvalidPactLevel { level: 7, at: 3 })
        );
    }
}
