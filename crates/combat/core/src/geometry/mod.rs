//! 2D grid geometry: footprints, wall segments, distances and cover.
//!
//! All coordinates are in grid cells; the map's `cell_size_ft` converts them
//! to feet. The map editor owns the wall data; this module only reads it.
mod cover;
mod shape;

pub use cover::{CoverLevel, CoverReport, resolve_cover};
pub use shape::{CreatureSize, Footprint, Point, Segment, Wall, WallKind};
