//! Lines under construction
//!
//! A draft collects stations as the operator drags across them. It is
//! either a brand new line or an extension of an existing line starting
//! from one of its termini, and is turned into (or merged into) a committed
//! [`Line`](super::line::Line) when finalized.

use super::geometry::{bend_point, bend_point_world};
use super::grid::CoordinateGrid;
use super::line::Line;
use super::types::{GridPos, LineColor, LineId, Position, StationId};

/// What a draft becomes when finalized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftTarget {
    NewLine,
    Extension(LineId),
}

/// Effect of toggling a station on a draft
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
    Unchanged,
}

/// An uncommitted line edit
#[derive(Debug, Clone)]
pub struct DraftLine {
    target: DraftTarget,
    color: LineColor,
    /// Stations already on the line being extended
    extending_stations: Vec<StationId>,
    stations: Vec<StationId>,
    points: Vec<GridPos>,
    /// Index into `points` of each station in `stations`
    station_points: Vec<usize>,
    /// Preview from the last point to the cursor; never committed
    free_end: Vec<Position>,
}

impl DraftLine {
    /// Start a new line at `start`
    pub fn new_line(color: LineColor, start: StationId, start_position: GridPos) -> Self {
        Self::starting_at(DraftTarget::NewLine, color, Vec::new(), start, start_position)
    }

    /// Start extending `line` from `start`, which should be one of its termini
    pub fn extension(line: &Line, start: StationId, start_position: GridPos) -> Self {
        Self::starting_at(
            DraftTarget::Extension(line.id()),
            line.color(),
            line.stations().to_vec(),
            start,
            start_position,
        )
    }

    fn starting_at(
        target: DraftTarget,
        color: LineColor,
        extending_stations: Vec<StationId>,
        start: StationId,
        start_position: GridPos,
    ) -> Self {
        Self {
            target,
            color,
            extending_stations,
            stations: vec![start],
            points: vec![start_position],
            station_points: vec![0],
            free_end: Vec::new(),
        }
    }

    pub fn target(&self) -> DraftTarget {
        self.target
    }

    pub fn extending_line(&self) -> Option<LineId> {
        match self.target {
            DraftTarget::Extension(line) => Some(line),
            DraftTarget::NewLine => None,
        }
    }

    pub fn color(&self) -> LineColor {
        self.color
    }

    pub fn stations(&self) -> &[StationId] {
        &self.stations
    }

    pub fn points(&self) -> &[GridPos] {
        &self.points
    }

    pub fn free_end(&self) -> &[Position] {
        &self.free_end
    }

    pub fn has_multiple_stations(&self) -> bool {
        self.stations.len() > 1
    }

    /// Add or remove a station
    ///
    /// The last station is removed (with its bend point) when toggled again,
    /// as long as it is not the only one. Stations already on the draft, or
    /// on the line being extended, are ignored. Anything else is appended,
    /// with a bend point when needed to keep every segment horizontal,
    /// vertical or diagonal.
    pub fn toggle_station(&mut self, station: StationId, position: GridPos) -> ToggleOutcome {
        if self.stations.len() > 1 && self.stations.last() == Some(&station) {
            self.stations.pop();
            self.station_points.pop();
            if let Some(&last_point) = self.station_points.last() {
                self.points.truncate(last_point + 1);
            }
            self.free_end.clear();
            return ToggleOutcome::Removed;
        }

        if self.extending_stations.contains(&station) || self.stations.contains(&station) {
            return ToggleOutcome::Unchanged;
        }

        if let Some(&previous) = self.points.last() {
            if let Some(bend) = bend_point(previous, position) {
                self.points.push(bend);
            }
        }
        self.points.push(position);
        self.stations.push(station);
        self.station_points.push(self.points.len() - 1);
        self.free_end.clear();
        ToggleOutcome::Added
    }

    /// Recompute the preview segment from the last point to `cursor`
    pub fn update_free_end(&mut self, cursor: Position, grid: &CoordinateGrid) {
        self.free_end.clear();
        let Some(&last) = self.points.last() else {
            return;
        };
        let from = grid.to_world(last);
        self.free_end.push(from);
        if let Some(bend) = bend_point_world(from, cursor) {
            self.free_end.push(bend);
        }
        self.free_end.push(cursor);
    }

    pub fn clear_free_end(&mut self) {
        self.free_end.clear();
    }

    /// Committed part of the draft in world coordinates
    pub fn polyline(&self, grid: &CoordinateGrid) -> Vec<Position> {
        self.points.iter().map(|&p| grid.to_world(p)).collect()
    }
}
