//! Class features, feats and known reactive spells.
//!
//! Stat blocks carry these as free-form names. They are collapsed into a
//! closed [`Feature`] enum once, so lookups never compare strings.

use core::fmt;

/// A named feature, feat or spell the engine reacts to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Feature {
    Shield,
    Counterspell,
    AbsorbElements,
    HellishRebuke,
    Sentinel,
    WarCaster,
    HeavyArmorMaster,
    Piercer,
    Crusher,
    Slasher,
    /// Attacks per Attack action (Extra Attack tiers: 2, 3, 4).
    ExtraAttack(u8),
    /// Monster Multiattack with its attack count.
    Multiattack(u8),
    Custom(String),
}

impl Feature {
    /// Parses a name, ignoring case, spaces, hyphens and apostrophes.
    ///
    /// `"Extra Attack"` is two attacks; `"Extra Attack (2)"` means two extra,
    /// three in total. `"Multiattack 3"` is three attacks.
    pub fn parse(name: &str) -> Self {
        let key: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        let (word, digits) = split_trailing_number(&key);
        match (word, digits) {
            ("extraattack", None) => Self::ExtraAttack(2),
            ("extraattack", Some(extra)) => Self::ExtraAttack(extra.saturating_add(1).min(4)),
            ("multiattack", n) => Self::Multiattack(n.unwrap_or(2).max(1)),
            ("shield", None) => Self::Shield,
            ("counterspell", None) => Self::Counterspell,
            ("absorbelements", None) => Self::AbsorbElements,
            ("hellishrebuke", None) => Self::HellishRebuke,
            ("sentinel", None) => Self::Sentinel,
            ("warcaster", None) => Self::WarCaster,
            ("heavyarmormaster", None) => Self::HeavyArmorMaster,
            ("piercer", None) => Self::Piercer,
            ("crusher", None) => Self::Crusher,
            ("slasher", None) => Self::Slasher,
            _ => Self::Custom(name.trim().to_string()),
        }
    }
}

fn split_trailing_number(key: &str) -> (&str, Option<u8>) {
    let split = key
        .char_indices()
        .find(|(_, c)| c.is_ascii_digit())
        .map_or(key.len(), |(idx, _)| idx);
    let (word, digits) = key.split_at(split);
    (word, digits.parse().ok())
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AbsorbElements => f.write_str("Absorb Elements"),
            Self::HellishRebuke => f.write_str("Hellish Rebuke"),
            Self::WarCaster => f.write_str("War Caster"),
            Self::HeavyArmorMaster => f.write_str("Heavy Armor Master"),
            Self::ExtraAttack(n) => write!(f, "Extra Attack ({n} attacks)"),
            Self::Multiattack(n) => write!(f, "Multiattack ({n})"),
            Self::Custom(name) => f.write_str(name),
            other => write!(f, "{other:?}"),
        }
    }
}

/// A token's parsed feature list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeatureSet {
    features: Vec<Feature>,
}

impl FeatureSet {
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            features: names.into_iter().map(Feature::parse).collect(),
        }
    }

    pub fn contains(&self, feature: &Feature) -> bool {
        self.features.contains(feature)
    }

    pub fn insert(&mut self, feature: Feature) {
        if !self.contains(&feature) {
            self.features.push(feature);
        }
    }

    /// Attacks granted per Attack action: the best Extra Attack or
    /// Multiattack entry, or 1.
    pub fn attacks_per_action(&self) -> u8 {
        self.features
            .iter()
            .filter_map(|f| match f {
                Feature::ExtraAttack(n) | Feature::Multiattack(n) => Some(*n),
                _ => None,
            })
            .max()
            .unwrap_or(1)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }
}
