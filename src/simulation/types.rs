//! Core types for the metro simulation
//!
//! Identifiers, coordinates and colours shared by every other module.

/// A wrapper type for station IDs
///
/// Stations are never removed, so the wrapped value is also the index of the
/// station in the network's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StationId(pub usize);

/// A wrapper type for line IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineId(pub usize);

/// A wrapper type for train IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TrainId(pub usize);

/// An integer position on the simulation grid
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Straight-line distance in grid units
    pub fn euclidean(&self, other: &GridPos) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        dx.hypot(dy)
    }
}

/// A continuous 2D position in world units
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Largest per-axis difference between two positions
    pub fn chebyshev(&self, other: &Position) -> f64 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

/// An RGBA colour identifying a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl LineColor {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Alpha shared by the default palette
const LINE_ALPHA: u8 = 200;

/// Default line colours. The palette length is also the maximum number of lines.
pub const DEFAULT_PALETTE: [LineColor; 8] = [
    LineColor::rgba(255, 203, 12, LINE_ALPHA),
    LineColor::rgba(22, 167, 83, LINE_ALPHA),
    LineColor::rgba(31, 153, 213, LINE_ALPHA),
    LineColor::rgba(179, 32, 120, LINE_ALPHA),
    LineColor::rgba(248, 112, 5, LINE_ALPHA),
    LineColor::rgba(136, 136, 136, LINE_ALPHA),
    LineColor::rgba(149, 216, 163, LINE_ALPHA),
    LineColor::rgba(239, 115, 171, LINE_ALPHA),
];

/// Orientation of a polyline segment, as seen by a train travelling it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heading {
    Horizontal,
    Vertical,
    /// Both axes change with the same sign
    DiagonalRising,
    /// Axes change with opposite signs
    DiagonalFalling,
}

/// Crowding state of a station's waiting queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrowdingState {
    Normal,
    Warning,
    Overcrowded,
}
