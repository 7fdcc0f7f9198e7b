//! A scripted operator for headless runs
//!
//! Periodically connects the lowest unconnected station to the network,
//! either by opening a new line to its nearest neighbour or by extending
//! the line whose terminus is closest. Drives the same commands a human
//! operator would.

use anyhow::Result;
use log::debug;

use super::draft::ToggleOutcome;
use super::geometry::metro_distance;
use super::network::{FinalizeOutcome, SimNetwork};
use super::types::{LineId, StationId};

/// What the operator did on one turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorAction {
    OpenedLine { line: LineId, from: StationId, to: StationId },
    ExtendedLine { line: LineId, from: StationId, to: StationId },
}

/// Builds lines on a fixed cadence
#[derive(Debug, Clone)]
pub struct ScriptedOperator {
    /// Ticks between turns
    interval: u64,
    /// Stations per line before another line is opened
    stations_per_line: usize,
    ticks_since_turn: u64,
}

impl ScriptedOperator {
    pub fn new(interval: u64) -> Self {
        Self {
            interval: interval.max(1),
            stations_per_line: 4,
            ticks_since_turn: 0,
        }
    }

    /// Call once per tick; acts every `interval` ticks
    pub fn on_tick(&mut self, network: &mut SimNetwork) -> Result<Option<OperatorAction>> {
        self.ticks_since_turn += 1;
        if self.ticks_since_turn < self.interval {
            return Ok(None);
        }
        self.ticks_since_turn = 0;
        self.act(network)
    }

    /// Connect one unconnected station, if there is any
    pub fn act(&mut self, network: &mut SimNetwork) -> Result<Option<OperatorAction>> {
        let Some(target) = network
            .stations()
            .iter()
            .find(|s| !s.is_connected())
            .map(|s| s.id())
        else {
            return Ok(None);
        };

        let lines = network.lines().len();
        let room_for_line = lines < network.config().max_lines();
        let wants_line = lines == 0 || lines * self.stations_per_line < network.stations().len();

        if room_for_line && wants_line {
            if let Some(neighbour) = self.nearest_station(network, target) {
                return self.open_line(network, target, neighbour);
            }
        }
        match self.nearest_terminus(network, target) {
            Some((line, terminus)) => self.extend_line(network, line, terminus, target),
            None => Ok(None),
        }
    }

    fn open_line(
        &self,
        network: &mut SimNetwork,
        from: StationId,
        to: StationId,
    ) -> Result<Option<OperatorAction>> {
        if !network.start_draft(from, None)? {
            return Ok(None);
        }
        network.toggle_draft_station(to)?;
        match network.finalize_draft()? {
            FinalizeOutcome::Created { line, .. } => {
                debug!("Operator opened line {:?} from {:?} to {:?}", line.0, from.0, to.0);
                Ok(Some(OperatorAction::OpenedLine { line, from, to }))
            }
            _ => Ok(None),
        }
    }

    fn extend_line(
        &self,
        network: &mut SimNetwork,
        line: LineId,
        from: StationId,
        to: StationId,
    ) -> Result<Option<OperatorAction>> {
        network.start_draft(from, Some(line))?;
        if network.toggle_draft_station(to)? != ToggleOutcome::Added {
            network.cancel_draft();
            return Ok(None);
        }
        match network.finalize_draft()? {
            FinalizeOutcome::Extended { line, .. } => {
                debug!("Operator extended line {:?} from {:?} to {:?}", line.0, from.0, to.0);
                Ok(Some(OperatorAction::ExtendedLine { line, from, to }))
            }
            _ => Ok(None),
        }
    }

    fn nearest_station(&self, network: &SimNetwork, target: StationId) -> Option<StationId> {
        let origin = network.station(target)?.position();
        network
            .stations()
            .iter()
            .filter(|s| s.id() != target)
            .min_by(|a, b| {
                metro_distance(origin, a.position()).total_cmp(&metro_distance(origin, b.position()))
            })
            .map(|s| s.id())
    }

    /// Line terminus closest to `target`
    fn nearest_terminus(&self, network: &SimNetwork, target: StationId) -> Option<(LineId, StationId)> {
        let origin = network.station(target)?.position();
        network
            .lines()
            .iter()
            .flat_map(|line| {
                [line.first_station(), line.last_station()]
                    .into_iter()
                    .flatten()
                    .map(move |terminus| (line.id(), terminus))
            })
            .filter_map(|(line, terminus)| {
                let pos = network.station(terminus)?.position();
                Some((line, terminus, metro_distance(origin, pos)))
            })
            .min_by(|a, b| a.2.total_cmp(&b.2))
            .map(|(line, terminus, _)| (line, terminus))
    }
}
