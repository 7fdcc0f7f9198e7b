//! Train movement along a line
//!
//! A train shuttles between the termini of its line forever. It moves at a
//! constant speed along the line's polyline, snaps to each point it reaches,
//! and dwells for a fixed number of ticks at every station, exchanging
//! passengers with it.

use anyhow::{Context, Result};
use std::f64::consts::FRAC_1_SQRT_2;

use super::config::SimConfig;
use super::geometry::heading;
use super::grid::CoordinateGrid;
use super::line::Line;
use super::passenger::Passenger;
use super::station::Station;
use super::types::{Heading, LineId, Position, StationId, TrainId};

/// Per-axis speed factor on a diagonal segment
pub const COS_45: f64 = FRAC_1_SQRT_2;

/// Movement state of a train
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainState {
    Moving,
    /// Stopped at a station with this many ticks left
    Dwelling(u32),
}

/// Result of a train update indicating what happened this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainUpdateResult {
    Moving,
    Dwelling,
    /// Arrived at a station this tick
    Stopped { station: StationId, delivered: usize },
}

/// Fixed train parameters derived from the session config
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainParams {
    pub capacity: usize,
    /// World units travelled per tick
    pub step: f64,
    pub dwell_ticks: u32,
}

impl TrainParams {
    pub fn from_config(config: &SimConfig, grid: &CoordinateGrid) -> Self {
        Self {
            capacity: config.train_capacity,
            step: config.train_speed * grid.cell_size() / f64::from(config.tick_rate),
            dwell_ticks: config.dwell_ticks,
        }
    }
}

/// A train running on one line
#[derive(Debug, Clone)]
pub struct Train {
    id: TrainId,
    line: LineId,
    params: TrainParams,
    position: Position,
    /// +1 towards the end of the line's point list, -1 towards its start
    direction: isize,
    next_point_index: usize,
    next_station_index: usize,
    next_station: StationId,
    heading: Heading,
    /// Per-tick displacement along the current segment
    velocity: (f64, f64),
    state: TrainState,
    passengers: Vec<Passenger>,
}

impl Train {
    /// Place a new train at the first station of `line`, heading towards the other end
    ///
    /// The train immediately stops at that station, so passengers already
    /// waiting there for this line board right away.
    pub fn spawn(
        id: TrainId,
        line: &Line,
        stations: &mut [Station],
        grid: &CoordinateGrid,
        params: TrainParams,
    ) -> Result<Self> {
        let first_station = line.first_station().context("Line has no stations")?;
        let start = stations
            .get(first_station.0)
            .context("First station of line not found")?
            .position();
        let start_point = line
            .points()
            .iter()
            .position(|&p| p == start)
            .context("First station is not on the line's polyline")?;

        let mut train = Self {
            id,
            line: line.id(),
            params,
            position: grid.to_world(start),
            direction: 1,
            next_point_index: start_point,
            next_station_index: 0,
            next_station: first_station,
            heading: Heading::Horizontal,
            velocity: (0.0, 0.0),
            state: TrainState::Moving,
            passengers: Vec::new(),
        };
        train.arrive(line, stations, grid)?;
        Ok(train)
    }

    pub fn id(&self) -> TrainId {
        self.id
    }

    pub fn line(&self) -> LineId {
        self.line
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn heading(&self) -> Heading {
        self.heading
    }

    /// +1 or -1 along the line's point order
    pub fn direction(&self) -> isize {
        self.direction
    }

    pub fn state(&self) -> TrainState {
        self.state
    }

    pub fn is_dwelling(&self) -> bool {
        matches!(self.state, TrainState::Dwelling(_))
    }

    /// Station the train is heading to; while dwelling this is already the next one
    pub fn next_station(&self) -> StationId {
        self.next_station
    }

    pub fn next_point_index(&self) -> usize {
        self.next_point_index
    }

    pub fn next_station_index(&self) -> usize {
        self.next_station_index
    }

    pub fn passengers(&self) -> &[Passenger] {
        &self.passengers
    }

    pub fn passenger_count(&self) -> usize {
        self.passengers.len()
    }

    pub fn capacity(&self) -> usize {
        self.params.capacity
    }

    pub fn is_full(&self) -> bool {
        self.passengers.len() >= self.params.capacity
    }

    pub(crate) fn passengers_mut(&mut self) -> &mut Vec<Passenger> {
        &mut self.passengers
    }

    pub(crate) fn board(&mut self, passenger: Passenger) {
        debug_assert!(!self.is_full(), "boarding a full train");
        self.passengers.push(passenger);
    }

    /// Keep indices pointing at the same places after the line grew at its start
    pub fn shift_indices(&mut self, points_added: usize, stations_added: usize) {
        self.next_point_index += points_added;
        self.next_station_index += stations_added;
    }

    /// Advance the train by one tick
    pub fn update(
        &mut self,
        line: &Line,
        stations: &mut [Station],
        grid: &CoordinateGrid,
    ) -> Result<TrainUpdateResult> {
        let mut result = TrainUpdateResult::Moving;

        if self.state == TrainState::Moving && self.reached_next_point(line, grid)? {
            if let Some((station, delivered)) = self.arrive(line, stations, grid)? {
                result = TrainUpdateResult::Stopped { station, delivered };
            }
        }

        match self.state {
            TrainState::Dwelling(remaining) => {
                self.state = if remaining > 1 {
                    TrainState::Dwelling(remaining - 1)
                } else {
                    TrainState::Moving
                };
                if result == TrainUpdateResult::Moving {
                    result = TrainUpdateResult::Dwelling;
                }
            }
            TrainState::Moving => {
                self.position.x += self.velocity.0;
                self.position.y += self.velocity.1;
            }
        }

        Ok(result)
    }

    /// Whether the train is within half a step of its next point, or past it
    fn reached_next_point(&self, line: &Line, grid: &CoordinateGrid) -> Result<bool> {
        let target = line
            .points()
            .get(self.next_point_index)
            .map(|&p| grid.to_world(p))
            .context("Next point index outside the line")?;
        let remaining = ((target.x - self.position.x) * self.velocity.0
            + (target.y - self.position.y) * self.velocity.1)
            / self.params.step;
        Ok(remaining <= self.params.step / 2.0)
    }

    /// Handle reaching the next point: snap, turn around at termini, pick
    /// the new segment and stop if the point is the upcoming station
    fn arrive(
        &mut self,
        line: &Line,
        stations: &mut [Station],
        grid: &CoordinateGrid,
    ) -> Result<Option<(StationId, usize)>> {
        let points = line.points();
        let reached_index = self.next_point_index;
        let reached = *points
            .get(reached_index)
            .context("Reached point outside the line")?;

        if reached_index == 0 {
            self.direction = 1;
        } else if reached_index == points.len() - 1 {
            self.direction = -1;
        }

        self.next_point_index = reached_index
            .checked_add_signed(self.direction)
            .context("Train ran off the start of its line")?;
        let next = *points
            .get(self.next_point_index)
            .context("Train ran off the end of its line")?;

        let from = grid.to_world(reached);
        let to = grid.to_world(next);
        self.position = from;
        self.heading = heading(from, to);
        self.velocity = velocity(self.heading, from, to, self.params.step);

        let upcoming = *line
            .stations()
            .get(self.next_station_index)
            .context("Next station index outside the line")?;
        let upcoming_position = stations
            .get(upcoming.0)
            .context("Upcoming station not found")?
            .position();
        if reached != upcoming_position {
            return Ok(None);
        }

        if self.params.dwell_ticks > 0 {
            self.state = TrainState::Dwelling(self.params.dwell_ticks);
        }
        self.next_station_index = self
            .next_station_index
            .checked_add_signed(self.direction)
            .context("Next station index ran off the line")?;
        self.next_station = *line
            .stations()
            .get(self.next_station_index)
            .context("Next station index outside the line")?;

        for passenger in &mut self.passengers {
            passenger.advance();
        }
        let delivered = stations[upcoming.0].board_and_alight(self);

        Ok(Some((upcoming, delivered)))
    }
}

fn velocity(heading: Heading, from: Position, to: Position, step: f64) -> (f64, f64) {
    let sx = (to.x - from.x).signum();
    let sy = (to.y - from.y).signum();
    match heading {
        Heading::Horizontal => (step * sx, 0.0),
        Heading::Vertical => (0.0, step * sy),
        Heading::DiagonalRising | Heading::DiagonalFalling => (step * sx * COS_45, step * sy * COS_45),
    }
}
