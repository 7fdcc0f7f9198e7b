//! Committed metro lines

use super::draft::DraftLine;
use super::grid::CoordinateGrid;
use super::types::{GridPos, LineColor, LineId, Position, StationId, TrainId};

/// Result of merging a draft into a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extension {
    /// Added after the last terminus
    Appended { stations: usize, points: usize },
    /// Added before the first terminus; existing indices moved up by these counts
    Prepended { stations: usize, points: usize },
    /// Draft too short or not starting at a terminus; nothing changed
    Rejected,
}

/// A committed line: ordered stations, the polyline through them and its trains
#[derive(Debug, Clone)]
pub struct Line {
    id: LineId,
    color: LineColor,
    stations: Vec<StationId>,
    /// Stations plus bend points, in travel order
    points: Vec<GridPos>,
    trains: Vec<TrainId>,
}

impl Line {
    /// Commit a draft as a new line
    ///
    /// Returns `None` for a draft with fewer than two stations.
    pub fn from_draft(id: LineId, draft: &DraftLine) -> Option<Self> {
        if !draft.has_multiple_stations() {
            return None;
        }
        Some(Self {
            id,
            color: draft.color(),
            stations: draft.stations().to_vec(),
            points: draft.points().to_vec(),
            trains: Vec::new(),
        })
    }

    pub fn id(&self) -> LineId {
        self.id
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

    pub fn trains(&self) -> &[TrainId] {
        &self.trains
    }

    pub fn add_train(&mut self, train: TrainId) {
        self.trains.push(train);
    }

    pub fn first_station(&self) -> Option<StationId> {
        self.stations.first().copied()
    }

    pub fn last_station(&self) -> Option<StationId> {
        self.stations.last().copied()
    }

    pub fn is_terminus(&self, station: StationId) -> bool {
        self.first_station() == Some(station) || self.last_station() == Some(station)
    }

    pub fn contains(&self, station: StationId) -> bool {
        self.stations.contains(&station)
    }

    pub fn polyline(&self, grid: &CoordinateGrid) -> Vec<Position> {
        self.points.iter().map(|&p| grid.to_world(p)).collect()
    }

    /// Merge a draft that starts at one of this line's termini
    ///
    /// The draft's first station is already on the line and is skipped. From
    /// the last terminus the rest is appended as is; from the first terminus
    /// it is reversed and prepended, which shifts every existing index.
    pub fn extend(&mut self, draft: &DraftLine) -> Extension {
        if !draft.has_multiple_stations() {
            return Extension::Rejected;
        }
        let Some(&shared) = draft.stations().first() else {
            return Extension::Rejected;
        };
        let new_stations = &draft.stations()[1..];
        let new_points = &draft.points()[1..];

        if self.last_station() == Some(shared) {
            self.stations.extend_from_slice(new_stations);
            self.points.extend_from_slice(new_points);
            Extension::Appended {
                stations: new_stations.len(),
                points: new_points.len(),
            }
        } else if self.first_station() == Some(shared) {
            self.stations = new_stations
                .iter()
                .rev()
                .chain(self.stations.iter())
                .copied()
                .collect();
            self.points = new_points
                .iter()
                .rev()
                .chain(self.points.iter())
                .copied()
                .collect();
            Extension::Prepended {
                stations: new_stations.len(),
                points: new_points.len(),
            }
        } else {
            Extension::Rejected
        }
    }
}
