//! Procedural station placement
//!
//! A Poisson disc sampler: new stations are proposed in an annulus around a
//! randomly chosen anchor (an earlier placement) and kept only when no
//! existing station is closer than the minimum spacing. Anchors that keep
//! failing are retired; once none are left the network is full.

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::TAU;

use super::grid::CoordinateGrid;
use super::types::GridPos;

/// Spacing-constrained random sampler for station positions
#[derive(Debug, Clone)]
pub struct StationPlacement {
    /// Anchors new samples may be drawn around
    active: Vec<GridPos>,
    min_spacing: f64,
    max_spacing: f64,
    attempts: u32,
    rng: StdRng,
}

impl StationPlacement {
    pub fn new(min_spacing: f64, max_spacing: f64, attempts: u32, seed: u64) -> Self {
        Self {
            active: Vec::new(),
            min_spacing,
            max_spacing,
            attempts,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Register a position (usually the first station) as an anchor
    pub fn add_active_sample(&mut self, pos: GridPos) {
        self.active.push(pos);
    }

    /// Change the annulus used from the next proposal on
    pub fn set_spacing(&mut self, min_spacing: f64, max_spacing: f64) {
        self.min_spacing = min_spacing;
        self.max_spacing = max_spacing;
    }

    pub fn spacing(&self) -> (f64, f64) {
        (self.min_spacing, self.max_spacing)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.active.is_empty()
    }

    /// Propose a position for a new station
    ///
    /// `existing` are the positions of every station already placed. The
    /// accepted position becomes an anchor itself. Returns `None` once every
    /// anchor has been retired.
    pub fn propose(&mut self, existing: &[GridPos], grid: &CoordinateGrid) -> Option<GridPos> {
        while !self.active.is_empty() {
            let anchor_index = self.rng.random_range(0..self.active.len());
            let anchor = self.active[anchor_index];

            for _ in 0..self.attempts {
                let candidate = self.sample_around(anchor);
                if grid.contains(candidate)
                    && existing
                        .iter()
                        .all(|station| station.euclidean(&candidate) >= self.min_spacing)
                {
                    self.active.push(candidate);
                    return Some(candidate);
                }
            }

            self.active.remove(anchor_index);
            debug!(
                "Retired placement anchor ({}, {}), {} left",
                anchor.x,
                anchor.y,
                self.active.len()
            );
        }
        None
    }

    /// Uniform sample over the annulus around `anchor`, rounded to the grid
    fn sample_around(&mut self, anchor: GridPos) -> GridPos {
        let u: f64 = self.rng.random();
        let v: f64 = self.rng.random();
        let radius = u.sqrt() * (self.max_spacing - self.min_spacing) + self.min_spacing;
        let angle = TAU * v;
        GridPos::new(
            (f64::from(anchor.x) + radius * angle.cos()).round() as i32,
            (f64::from(anchor.y) + radius * angle.sin()).round() as i32,
        )
    }
}
