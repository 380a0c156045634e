use crate::damage::Defenses;
use crate::features::FeatureSet;
use crate::geometry::{CreatureSize, Footprint, Point};

use super::EntityId;

/// The six abilities used for checks and saving throws.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::EnumIter,
)]
#[strum(ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Ability {
    #[strum(to_string = "Strength", serialize = "str")]
    Strength,
    #[strum(to_string = "Dexterity", serialize = "dex")]
    Dexterity,
    #[strum(to_string = "Constitution", serialize = "con")]
    Constitution,
    #[strum(to_string = "Intelligence", serialize = "int")]
    Intelligence,
    #[strum(to_string = "Wisdom", serialize = "wis")]
    Wisdom,
    #[strum(to_string = "Charisma", serialize = "cha")]
    Charisma,
}

/// Ability modifiers taken from the external stat block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityModifiers {
    pub str: i32,
    pub dex: i32,
    pub con: i32,
    pub int: i32,
    pub wis: i32,
    pub cha: i32,
}

impl AbilityModifiers {
    /// Modifier for an ability score, `floor((score - 10) / 2)`.
    pub const fn from_score(score: i32) -> i32 {
        (score - 10).div_euclid(2)
    }

    /// Builds modifiers from raw ability scores in STR/DEX/CON/INT/WIS/CHA order.
    pub const fn from_scores(scores: [i32; 6]) -> Self {
        Self {
            str: Self::from_score(scores[0]),
            dex: Self::from_score(scores[1]),
            con: Self::from_score(scores[2]),
            int: Self::from_score(scores[3]),
            wis: Self::from_score(scores[4]),
            cha: Self::from_score(scores[5]),
        }
    }

    pub const fn get(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Strength => self.str,
            Ability::Dexterity => self.dex,
            Ability::Constitution => self.con,
            Ability::Intelligence => self.int,
            Ability::Wisdom => self.wis,
            Ability::Charisma => self.cha,
        }
    }
}

/// Movement speeds in feet. Zero means the mode is unavailable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Speeds {
    pub walk: u32,
    pub swim: u32,
    pub fly: u32,
    pub climb: u32,
}

impl Default for Speeds {
    fn default() -> Self {
        Self {
            walk: 30,
            swim: 0,
            fly: 0,
            climb: 0,
        }
    }
}

/// Current and maximum hit points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HitPoints {
    pub current: u32,
    pub max: u32,
}

impl HitPoints {
    pub const fn full(max: u32) -> Self {
        Self { current: max, max }
    }

    /// HP after taking `damage`, clamped at 0.
    pub const fn after_damage(&self, damage: u32) -> u32 {
        self.current.saturating_sub(damage)
    }

    /// Clamps an arbitrary value into `[0, max]`.
    pub fn clamp(&self, value: i64) -> u32 {
        value.clamp(0, self.max as i64) as u32
    }
}

/// A positioned combatant.
///
/// Tokens are snapshots of the host's state at call time. The engine treats
/// them as read-only; every change is described in the resolver's effects.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Token {
    pub id: EntityId,
    pub name: String,
    /// Tokens on different teams are hostile to each other.
    pub team: u32,
    /// Top-left corner of the footprint, in grid cells.
    pub position: Point,
    pub size: CreatureSize,
    pub ac: i32,
    pub hp: HitPoints,
    pub abilities: AbilityModifiers,
    pub proficiency_bonus: i32,
    pub speeds: Speeds,
    /// Melee reach in feet.
    pub reach_ft: u32,
    pub defenses: Defenses,
    /// Class features and feats (Sentinel, Heavy Armor Master, Extra Attack, ...).
    pub features: FeatureSet,
    /// Known or prepared spells (Shield, Counterspell, ...).
    pub known_abilities: FeatureSet,
    pub wears_heavy_armor: bool,
}

impl Token {
    /// Creates a Medium token with 10 in every ability and default speeds.
    pub fn new(id: EntityId, name: impl Into<String>, position: Point) -> Self {
        Self {
            id,
            name: name.into(),
            team: 0,
            position,
            size: CreatureSize::Medium,
            ac: 10,
            hp: HitPoints::full(10),
            abilities: AbilityModifiers::default(),
            proficiency_bonus: 2,
            speeds: Speeds::default(),
            reach_ft: 5,
            defenses: Defenses::default(),
            features: FeatureSet::default(),
            known_abilities: FeatureSet::default(),
            wears_heavy_armor: false,
        }
    }

    #[must_use]
    pub fn with_team(mut self, team: u32) -> Self {
        self.team = team;
        self
    }

    #[must_use]
    pub fn with_size(mut self, size: CreatureSize) -> Self {
        self.size = size;
        self
    }

    #[must_use]
    pub fn with_ac(mut self, ac: i32) -> Self {
        self.ac = ac;
        self
    }

    #[must_use]
    pub fn with_hp(mut self, current: u32, max: u32) -> Self {
        self.hp = HitPoints {
            current: current.min(max),
            max,
        };
        self
    }

    #[must_use]
    pub fn with_abilities(mut self, abilities: AbilityModifiers) -> Self {
        self.abilities = abilities;
        self
    }

    #[must_use]
    pub fn with_proficiency_bonus(mut self, bonus: i32) -> Self {
        self.proficiency_bonus = bonus;
        self
    }

    #[must_use]
    pub fn with_speeds(mut self, speeds: Speeds) -> Self {
        self.speeds = speeds;
        self
    }

    #[must_use]
    pub fn with_reach(mut self, reach_ft: u32) -> Self {
        self.reach_ft = reach_ft;
        self
    }

    #[must_use]
    pub fn with_defenses(mut self, defenses: Defenses) -> Self {
        self.defenses = defenses;
        self
    }

    #[must_use]
    pub fn with_features<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.features = FeatureSet::from_names(names);
        self
    }

    #[must_use]
    pub fn with_known_abilities<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.known_abilities = FeatureSet::from_names(names);
        self
    }

    #[must_use]
    pub fn with_heavy_armor(mut self, wears_heavy_armor: bool) -> Self {
        self.wears_heavy_armor = wears_heavy_armor;
        self
    }

    /// Footprint at the token's current position.
    pub fn footprint(&self) -> Footprint {
        Footprint::new(self.position, self.size)
    }

    /// Footprint the token would occupy at `position`.
    pub fn footprint_at(&self, position: Point) -> Footprint {
        Footprint::new(position, self.size)
    }

    pub fn is_hostile_to(&self, other: &Token) -> bool {
        self.team != other.team
    }

    pub const fn is_down(&self) -> bool {
        self.hp.current == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ability_modifiers_floor_toward_negative() {
        assert_eq!(AbilityModifiers::from_score(16), 3);
        assert_eq!(AbilityModifiers::from_score(10), 0);
        assert_eq!(AbilityModifiers::from_score(9), -1);
        assert_eq!(AbilityModifiers::from_score(1), -5);
    }

    #[test]
    fn ability_parses_short_and_long_names() {
        assert_eq!("dex".parse::<Ability>().unwrap(), Ability::Dexterity);
        assert_eq!("CONSTITUTION".parse::<Ability>().unwrap(), Ability::Constitution);
    }

    #[test]
    fn hit_points_clamp_to_bounds() {
        let hp = HitPoints { current: 4, max: 20 };
        assert_eq!(hp.after_damage(9), 0);
        assert_eq!(hp.clamp(-3), 0);
        assert_eq!(hp.clamp(35), 20);
    }
}
