//! Metro-map geometry
//!
//! Lines only ever run horizontally, vertically or at 45 degrees. These
//! helpers implement the distance metric and bend-point rule that follow
//! from that restriction.

use std::f64::consts::SQRT_2;

use super::types::{GridPos, Heading, Position};

/// Length of the shortest horizontal/vertical/diagonal route between two cells
pub fn metro_distance(a: GridPos, b: GridPos) -> f64 {
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    let longer = f64::from(dx.max(dy));
    let shorter = f64::from(dx.min(dy));
    longer - shorter + shorter * SQRT_2
}

/// Bend point needed to join two cells with one diagonal leg followed by
/// one orthogonal leg, or `None` when they already lie on a common
/// horizontal, vertical or diagonal.
pub fn bend_point(from: GridPos, to: GridPos) -> Option<GridPos> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if dx == 0 || dy == 0 || dx.abs() == dy.abs() {
        return None;
    }
    let diagonal = dx.abs().min(dy.abs());
    Some(GridPos::new(
        from.x + diagonal * dx.signum(),
        from.y + diagonal * dy.signum(),
    ))
}

/// Same rule as [`bend_point`], for an arbitrary continuous end point
pub fn bend_point_world(from: Position, to: Position) -> Option<Position> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if dx == 0.0 || dy == 0.0 || dx.abs() == dy.abs() {
        return None;
    }
    let diagonal = dx.abs().min(dy.abs());
    Some(Position::new(
        from.x + diagonal * dx.signum(),
        from.y + diagonal * dy.signum(),
    ))
}

/// Heading of the segment `from -> to`. Degenerate segments count as horizontal.
pub fn heading(from: Position, to: Position) -> Heading {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if dy == 0.0 {
        Heading::Horizontal
    } else if dx == 0.0 {
        Heading::Vertical
    } else if dx * dy > 0.0 {
        Heading::DiagonalRising
    } else {
        Heading::DiagonalFalling
    }
}
