//! Points, segments, footprints and walls in grid-cell coordinates.

/// Tolerance for orientation tests.
const EPSILON: f64 = 1e-9;

/// A point in grid-cell units (one unit = one cell).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// A line segment between two points.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// True when the two segments properly cross.
    ///
    /// Touching at an endpoint or running collinear along each other does not
    /// count; a sight line that grazes a corner is not obstructed.
    pub fn crosses(&self, other: &Segment) -> bool {
        let o1 = orientation(&self.start, &self.end, &other.start);
        let o2 = orientation(&self.start, &self.end, &other.end);
        let o3 = orientation(&other.start, &other.end, &self.start);
        let o4 = orientation(&other.start, &other.end, &self.end);
        o1 * o2 < 0.0 && o3 * o4 < 0.0
    }
}

/// Sign of the cross product (b - a) x (c - a), snapped to zero within EPSILON.
fn orientation(a: &Point, b: &Point, c: &Point) -> f64 {
    let cross = (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x);
    if cross.abs() < EPSILON { 0.0 } else { cross.signum() }
}

/// Creature size category, which determines the footprint.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CreatureSize {
    Tiny,
    Small,
    #[default]
    Medium,
    Large,
    Huge,
    Gargantuan,
}

impl CreatureSize {
    /// Side length of the footprint in cells.
    pub const fn cells(&self) -> f64 {
        match self {
            Self::Tiny | Self::Small | Self::Medium => 1.0,
            Self::Large => 2.0,
            Self::Huge => 3.0,
            Self::Gargantuan => 4.0,
        }
    }

    /// Ordinal rank, Tiny = 0 .. Gargantuan = 5.
    pub const fn rank(&self) -> u8 {
        match self {
            Self::Tiny => 0,
            Self::Small => 1,
            Self::Medium => 2,
            Self::Large => 3,
            Self::Huge => 4,
            Self::Gargantuan => 5,
        }
    }
}

/// Axis-aligned square occupied by a creature.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Footprint {
    /// Top-left corner.
    pub origin: Point,
    /// Side length in cells.
    pub side: f64,
}

impl Footprint {
    pub const fn new(origin: Point, size: CreatureSize) -> Self {
        Self {
            origin,
            side: size.cells(),
        }
    }

    /// Corners in clockwise order starting at the top-left.
    pub fn corners(&self) -> [Point; 4] {
        let Point { x, y } = self.origin;
        let s = self.side;
        [
            Point::new(x, y),
            Point::new(x + s, y),
            Point::new(x + s, y + s),
            Point::new(x, y + s),
        ]
    }

    pub fn edges(&self) -> [Segment; 4] {
        let [a, b, c, d] = self.corners();
        [
            Segment::new(a, b),
            Segment::new(b, c),
            Segment::new(c, d),
            Segment::new(d, a),
        ]
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.side / 2.0,
            self.origin.y + self.side / 2.0,
        )
    }

    /// True if any of this footprint's edges properly crosses `line`.
    pub fn blocks(&self, line: &Segment) -> bool {
        self.edges().iter().any(|edge| edge.crosses(line))
    }

    /// Grid distance in feet.
    ///
    /// Counts the cells needed to reach the other footprint, diagonals
    /// counting as one cell: `(max(gap_x, gap_y) + 1) * cell_ft`. Adjacent
    /// footprints are `cell_ft` apart; overlapping ones are 0.
    pub fn distance_ft(&self, other: &Footprint, cell_ft: f64) -> f64 {
        let gap_x = axis_gap(self.origin.x, self.side, other.origin.x, other.side);
        let gap_y = axis_gap(self.origin.y, self.side, other.origin.y, other.side);
        match (gap_x, gap_y) {
            (None, None) => 0.0,
            _ => (gap_x.unwrap_or(0.0).max(gap_y.unwrap_or(0.0)) + 1.0) * cell_ft,
        }
    }
}

/// Empty space between two intervals, or `None` when they overlap.
fn axis_gap(a_start: f64, a_len: f64, b_start: f64, b_len: f64) -> Option<f64> {
    let gap = (b_start - (a_start + a_len)).max(a_start - (b_start + b_len));
    if gap < -EPSILON { None } else { Some(gap.max(0.0)) }
}

/// Kind of wall segment drawn in the map editor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum WallKind {
    #[default]
    Wall,
    Window,
    Door,
}

/// Wall segment from the external map geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Wall {
    pub segment: Segment,
    pub kind: WallKind,
    pub open: bool,
}

impl Wall {
    pub const fn solid(start: Point, end: Point) -> Self {
        Self {
            segment: Segment::new(start, end),
            kind: WallKind::Wall,
            open: false,
        }
    }

    pub const fn door(start: Point, end: Point, open: bool) -> Self {
        Self {
            segment: Segment::new(start, end),
            kind: WallKind::Door,
            open,
        }
    }

    pub const fn window(start: Point, end: Point, open: bool) -> Self {
        Self {
            segment: Segment::new(start, end),
            kind: WallKind::Window,
            open,
        }
    }

    /// Solid walls always block; doors and windows only while closed.
    pub const fn is_blocking(&self) -> bool {
        match self.kind {
            WallKind::Wall => true,
            WallKind::Door | WallKind::Window => !self.open,
        }
    }

    pub fn blocks(&self, line: &Segment) -> bool {
        self.is_blocking() && self.segment.crosses(line)
    }
}
