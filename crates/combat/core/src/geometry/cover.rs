//! Cover classification from corner-to-corner sight lines.
//!
//! For each of the attacker's four corners, the four lines to the target's
//! corners are tested against blocking walls and other creatures' bodies. The
//! attacker picks the corner with the fewest blocked lines.
//!
//! ```text
//! blocked lines   cover            bonus
//! 0               none             +0
//! 1               half             +2 AC / DEX saves
//! 2-3             three-quarters   +5
//! 4               total            attack aborts before rolling
//! ```
//!
//! A single creature contributes at most one blocked line per attacker
//! corner, so creatures grant half cover at most; only walls (or several
//! creatures) reach three-quarters or total.

use super::shape::{Footprint, Segment, Wall};

/// Degree of cover a target has against an attacker.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CoverLevel {
    #[default]
    None,
    Half,
    ThreeQuarters,
    Total,
}

impl CoverLevel {
    /// Classification for the best corner's blocked-line count.
    pub const fn from_blocked_lines(blocked: usize) -> Self {
        match blocked {
            0 => Self::None,
            1 => Self::Half,
            2 | 3 => Self::ThreeQuarters,
            _ => Self::Total,
        }
    }

    /// Bonus to AC and Dexterity saving throws.
    pub const fn ac_bonus(&self) -> i32 {
        match self {
            Self::None | Self::Total => 0,
            Self::Half => 2,
            Self::ThreeQuarters => 5,
        }
    }

    pub const fn is_total(&self) -> bool {
        matches!(self, Self::Total)
    }
}

/// Result of a cover query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoverReport {
    pub level: CoverLevel,
    /// Blocked lines from the chosen corner.
    pub blocked_lines: usize,
    /// Index into [`Footprint::corners`] of the attacker's chosen corner.
    pub vantage_corner: usize,
}

/// Classifies cover between two footprints.
///
/// # Arguments
///
/// * `attacker` - Attacker's footprint
/// * `target` - Target's footprint
/// * `walls` - Map wall segments (non-blocking ones are ignored)
/// * `creatures` - Footprints of every other creature on the map, excluding
///   the attacker and the target
pub fn resolve_cover(
    attacker: &Footprint,
    target: &Footprint,
    walls: &[Wall],
    creatures: &[Footprint],
) -> CoverReport {
    let target_corners = target.corners();

    let (vantage_corner, blocked_lines) = attacker
        .corners()
        .iter()
        .enumerate()
        .map(|(idx, from)| {
            let lines = target_corners.map(|to| Segment::new(*from, to));
            (idx, blocked_from_corner(&lines, walls, creatures))
        })
        .min_by_key(|&(idx, blocked)| (blocked, idx))
        .unwrap_or((0, 0));

    CoverReport {
        level: CoverLevel::from_blocked_lines(blocked_lines),
        blocked_lines,
        vantage_corner,
    }
}

/// Counts blocked lines from one attacker corner.
///
/// Wall-blocked lines always count. A line blocked only by creatures counts
/// if at least one of those creatures has not already been credited for
/// another line from this corner.
fn blocked_from_corner(lines: &[Segment; 4], walls: &[Wall], creatures: &[Footprint]) -> usize {
    let mut credited = vec![false; creatures.len()];
    let mut blocked = 0;

    for line in lines {
        if walls.iter().any(|wall| wall.blocks(line)) {
            blocked += 1;
            continue;
        }

        let uncredited = creatures
            .iter()
            .enumerate()
            .find(|(idx, body)| !credited[*idx] && body.blocks(line));
        if let Some((idx, _)) = uncredited {
            credited[idx] = true;
            blocked += 1;
        }
    }

    blocked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{CreatureSize, Point};

    fn medium(x: f64, y: f64) -> Footprint {
        Footprint::new(Point::new(x, y), CreatureSize::Medium)
    }

    /// Vertical wall at x = 2.5 running from y = -5 down to `bottom`.
    fn wall_to(bottom: f64) -> Wall {
        Wall::solid(Point::new(2.5, -5.0), Point::new(2.5, bottom))
    }

    #[test]
    fn clear_line_is_no_cover() {
        let report = resolve_cover(&medium(0.0, 0.0), &medium(4.0, 0.0), &[], &[]);
        assert_eq!(report.level, CoverLevel::None);
        assert_eq!(report.level.ac_bonus(), 0);
    }

    #[test]
    fn short_wall_below_every_best_line_is_no_cover() {
        let report = resolve_cover(&medium(0.0, 0.0), &medium(4.0, 0.0), &[wall_to(0.45)], &[]);
        assert_eq!(report.blocked_lines, 0);
    }

    #[test]
    fn one_blocked_line_is_half_cover() {
        let report = resolve_cover(&medium(0.0, 0.0), &medium(4.0, 0.0), &[wall_to(0.55)], &[]);
        assert_eq!(report.blocked_lines, 1);
        assert_eq!(report.level, CoverLevel::Half);
        assert_eq!(report.level.ac_bonus(), 2);
    }

    #[test]
    fn two_blocked_lines_is_three_quarters() {
        let report = resolve_cover(&medium(0.0, 0.0), &medium(4.0, 0.0), &[wall_to(0.8)], &[]);
        assert_eq!(report.blocked_lines, 2);
        assert_eq!(report.level, CoverLevel::ThreeQuarters);
        assert_eq!(report.level.ac_bonus(), 5);
    }

    #[test]
    fn full_wall_is_total_cover() {
        let report = resolve_cover(&medium(0.0, 0.0), &medium(4.0, 0.0), &[wall_to(5.0)], &[]);
        assert_eq!(report.blocked_lines, 4);
        assert!(report.level.is_total());
    }

    #[test]
    fn open_door_does_not_block() {
        let door = Wall::door(Point::new(2.5, -5.0), Point::new(2.5, 5.0), true);
        let report = resolve_cover(&medium(0.0, 0.0), &medium(4.0, 0.0), &[door], &[]);
        assert_eq!(report.level, CoverLevel::None);

        let closed = Wall::window(Point::new(2.5, -5.0), Point::new(2.5, 5.0), false);
        let report = resolve_cover(&medium(0.0, 0.0), &medium(4.0, 0.0), &[closed], &[]);
        assert_eq!(report.level, CoverLevel::Total);
    }

    #[test]
    fn single_creature_caps_at_half_cover() {
        // A bystander squarely between the two blocks several lines from
        // every corner, but only one line counts per creature.
        let bystander = medium(2.0, 0.0);
        let report = resolve_cover(&medium(0.0, 0.0), &medium(4.0, 0.0), &[], &[bystander]);
        assert_eq!(report.blocked_lines, 1);
        assert_eq!(report.level, CoverLevel::Half);
    }

    #[test]
    fn two_creatures_can_reach_three_quarters() {
        // A Large creature spanning the gap plus a second body in the same lane.
        let large = Footprint::new(Point::new(1.5, -0.5), CreatureSize::Large);
        let second = Footprint::new(Point::new(2.8, -0.5), CreatureSize::Large);
        let report = resolve_cover(
            &medium(0.0, 0.0),
            &medium(5.0, 0.0),
            &[],
            &[large, second],
        );
        assert_eq!(report.level, CoverLevel::ThreeQuarters);
    }
}
