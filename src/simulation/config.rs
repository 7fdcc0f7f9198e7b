//! Session configuration
//!
//! Everything here is fixed when a [`SimNetwork`](super::SimNetwork) is
//! created. Defaults reproduce the tuning of the original game running at
//! 50 ticks per second on a 1920x1080 viewport.

use anyhow::{bail, Result};
use rand::Rng;

use super::types::{LineColor, DEFAULT_PALETTE};

/// Simulation ticks per simulated second
pub const DEFAULT_TICK_RATE: u32 = 50;

/// Stations present when a session starts
pub const INITIAL_STATIONS: usize = 3;

/// Grid density; higher is denser
pub const GRID_DENSITY: u32 = 36;

/// Empty cells left around the edge of the viewport
pub const GRID_EDGE_BUFFER: u32 = 2;

/// Percent chance per second that a new station appears
pub const STATION_GENERATION_RATE: f64 = 20.0;

/// Percent chance per second that a passenger appears at any one station
pub const PASSENGER_GENERATION_RATE: f64 = 5.0;

/// Added to the passenger rate every tick once stations stop appearing
pub const PASSENGER_RATE_ESCALATION: f64 = 1.0;

/// Waiting passengers at which a station is drawn as crowded
pub const OVERCROWDING_WARNING: usize = 15;

/// Waiting passengers at which the session ends
pub const OVERCROWDING_LIMIT: usize = 20;

/// Passengers a single train can carry
pub const TRAIN_CAPACITY: usize = 9;

/// Train speed in grid cells per second
pub const TRAIN_SPEED: f64 = 3.0;

/// Samples tried around one anchor before it is excluded
pub const PLACEMENT_ATTEMPTS: u32 = 5;

/// Spacing used once the station count exceeds `above_stations`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpacingStage {
    pub above_stations: usize,
    pub min: f64,
    pub max: f64,
}

impl SpacingStage {
    pub const fn new(above_stations: usize, min: f64, max: f64) -> Self {
        Self {
            above_stations,
            min,
            max,
        }
    }
}

/// Seeds for each independent random stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimSeeds {
    pub placement: u64,
    pub station_rolls: u64,
    pub passenger_rolls: u64,
    pub destinations: u64,
}

impl SimSeeds {
    /// Derive all four streams from one seed
    pub fn from_master(seed: u64) -> Self {
        Self {
            placement: seed,
            station_rolls: seed.wrapping_add(1),
            passenger_rolls: seed.wrapping_add(2),
            destinations: seed.wrapping_add(3),
        }
    }

    pub fn random() -> Self {
        Self::from_master(rand::rng().random())
    }
}

/// Configuration of one simulation session
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    pub tick_rate: u32,
    pub initial_stations: usize,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub grid_density: u32,
    pub edge_buffer: u32,
    /// Line colours; also bounds the number of lines
    pub palette: Vec<LineColor>,
    pub min_spacing: f64,
    pub max_spacing: f64,
    /// Spacing stages, applied as the station count grows
    pub spacing_schedule: Vec<SpacingStage>,
    /// Percent per second
    pub station_generation_rate: f64,
    /// Percent per second, per station
    pub passenger_generation_rate: f64,
    pub passenger_rate_escalation: f64,
    pub overcrowding_warning: usize,
    pub overcrowding_limit: usize,
    pub train_capacity: usize,
    /// Grid cells per second
    pub train_speed: f64,
    pub dwell_ticks: u32,
    pub placement_attempts: u32,
    /// `None` draws fresh seeds at session start
    pub seeds: Option<SimSeeds>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_rate: DEFAULT_TICK_RATE,
            initial_stations: INITIAL_STATIONS,
            viewport_width: 1920.0,
            viewport_height: 1080.0,
            grid_density: GRID_DENSITY,
            edge_buffer: GRID_EDGE_BUFFER,
            palette: DEFAULT_PALETTE.to_vec(),
            min_spacing: 2.1,
            max_spacing: 3.5,
            spacing_schedule: vec![
                SpacingStage::new(9, 2.5, 3.5),
                SpacingStage::new(20, 4.0, 5.5),
                SpacingStage::new(30, 4.0, 7.0),
            ],
            station_generation_rate: STATION_GENERATION_RATE,
            passenger_generation_rate: PASSENGER_GENERATION_RATE,
            passenger_rate_escalation: PASSENGER_RATE_ESCALATION,
            overcrowding_warning: OVERCROWDING_WARNING,
            overcrowding_limit: OVERCROWDING_LIMIT,
            train_capacity: TRAIN_CAPACITY,
            train_speed: TRAIN_SPEED,
            dwell_ticks: DEFAULT_TICK_RATE * 3 / 4,
            placement_attempts: PLACEMENT_ATTEMPTS,
            seeds: None,
        }
    }
}

impl SimConfig {
    /// Default configuration with every random stream derived from `seed`
    pub fn seeded(seed: u64) -> Self {
        Self {
            seeds: Some(SimSeeds::from_master(seed)),
            ..Self::default()
        }
    }

    /// Reject configurations the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.tick_rate == 0 {
            bail!("tick rate must be at least 1");
        }
        if self.initial_stations == 0 {
            bail!("at least one initial station is required");
        }
        if self.palette.is_empty() {
            bail!("line palette must contain at least one colour");
        }
        check_spacing(self.min_spacing, self.max_spacing)?;
        for stage in &self.spacing_schedule {
            check_spacing(stage.min, stage.max)?;
        }
        for rate in [
            self.station_generation_rate,
            self.passenger_generation_rate,
            self.passenger_rate_escalation,
        ] {
            if !(rate.is_finite() && rate >= 0.0) {
                bail!("generation rates must be finite and non-negative, got {}", rate);
            }
        }
        if self.overcrowding_warning > self.overcrowding_limit {
            bail!(
                "overcrowding warning ({}) exceeds the limit ({})",
                self.overcrowding_warning,
                self.overcrowding_limit
            );
        }
        if self.overcrowding_limit == 0 {
            bail!("overcrowding limit must be at least 1");
        }
        if self.train_capacity == 0 {
            bail!("train capacity must be at least 1");
        }
        if !(self.train_speed.is_finite() && self.train_speed > 0.0) {
            bail!("train speed must be positive, got {}", self.train_speed);
        }
        if self.placement_attempts == 0 {
            bail!("placement needs at least one attempt per anchor");
        }
        Ok(())
    }

    /// Convert a percent-per-second rate to a per-tick probability
    pub fn per_tick_probability(&self, percent_per_second: f64) -> f64 {
        (percent_per_second / 100.0 / f64::from(self.tick_rate)).clamp(0.0, 1.0)
    }

    /// Maximum number of lines, bounded by the palette
    pub fn max_lines(&self) -> usize {
        self.palette.len()
    }

    /// Spacing for a given station count
    pub fn spacing_for(&self, station_count: usize) -> (f64, f64) {
        self.spacing_schedule
            .iter()
            .filter(|stage| station_count > stage.above_stations)
            .max_by_key(|stage| stage.above_stations)
            .map(|stage| (stage.min, stage.max))
            .unwrap_or((self.min_spacing, self.max_spacing))
    }
}

fn check_spacing(min: f64, max: f64) -> Result<()> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && min <= max) {
        bail!("invalid station spacing {}..{}", min, max);
    }
    Ok(())
}
