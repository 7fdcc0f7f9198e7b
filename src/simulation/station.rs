//! Stations: graph nodes with waiting passengers
//!
//! A station knows its grid position, the passengers queued on it and the
//! stations it is directly connected to. Operations that need to look at
//! the whole graph (routing new passengers) take the station arena.

use rand::Rng;
use std::collections::BTreeMap;

use super::geometry::metro_distance;
use super::passenger::Passenger;
use super::train::Train;
use super::types::{CrowdingState, GridPos, StationId};

/// Queue sizes at which a station is crowded and overcrowded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrowdingThresholds {
    pub warning: usize,
    pub limit: usize,
}

/// A station in the metro network
#[derive(Debug, Clone)]
pub struct Station {
    id: StationId,
    position: GridPos,
    /// Waiting passengers in arrival order
    waiting: Vec<Passenger>,
    /// Adjacent stations and the metro-map distance to each
    connections: BTreeMap<StationId, f64>,
    thresholds: CrowdingThresholds,
}

impl Station {
    pub fn new(id: StationId, position: GridPos, thresholds: CrowdingThresholds) -> Self {
        Self {
            id,
            position,
            waiting: Vec::new(),
            connections: BTreeMap::new(),
            thresholds,
        }
    }

    pub fn id(&self) -> StationId {
        self.id
    }

    pub fn position(&self) -> GridPos {
        self.position
    }

    pub fn waiting(&self) -> &[Passenger] {
        &self.waiting
    }

    pub fn waiting_count(&self) -> usize {
        self.waiting.len()
    }

    /// Add a passenger to the back of the queue
    pub fn enqueue(&mut self, passenger: Passenger) {
        self.waiting.push(passenger);
    }

    /// Record a connection to another station
    ///
    /// Only this side of the edge is recorded; the caller connects the other
    /// station as well. Connecting twice leaves the weight unchanged.
    pub fn add_connection(&mut self, other: StationId, other_position: GridPos) {
        if other == self.id {
            return;
        }
        let weight = metro_distance(self.position, other_position);
        self.connections.entry(other).or_insert(weight);
    }

    /// Adjacent stations in ascending id order
    pub fn connections(&self) -> impl Iterator<Item = (&StationId, &f64)> {
        self.connections.iter()
    }

    pub fn connection_weight(&self, other: StationId) -> Option<f64> {
        self.connections.get(&other).copied()
    }

    pub fn is_connected(&self) -> bool {
        !self.connections.is_empty()
    }

    pub fn approaching_overcrowding(&self) -> bool {
        self.waiting.len() >= self.thresholds.warning
    }

    pub fn is_overcrowded(&self) -> bool {
        self.waiting.len() >= self.thresholds.limit
    }

    pub fn crowding(&self) -> CrowdingState {
        if self.is_overcrowded() {
            CrowdingState::Overcrowded
        } else if self.approaching_overcrowding() {
            CrowdingState::Warning
        } else {
            CrowdingState::Normal
        }
    }

    /// Exchange passengers with a train dwelling here
    ///
    /// Passengers on board are visited newest first: those at the end of
    /// their route leave the system, those whose next stop is not where the
    /// train is heading wait here to transfer. Waiting passengers are then
    /// visited newest first and board while the train has room and is
    /// heading to their next stop.
    ///
    /// Returns the number of passengers delivered to their destination.
    pub fn board_and_alight(&mut self, train: &mut Train) -> usize {
        let heading_to = train.next_station();
        let mut delivered = 0;

        let aboard = train.passengers_mut();
        for i in (0..aboard.len()).rev() {
            match aboard[i].next_stop() {
                None => {
                    aboard.remove(i);
                    delivered += 1;
                }
                Some(next) if next != heading_to => {
                    let passenger = aboard.remove(i);
                    self.waiting.push(passenger);
                }
                Some(_) => {}
            }
        }

        for i in (0..self.waiting.len()).rev() {
            if train.is_full() {
                break;
            }
            if self.waiting[i].next_stop() == Some(heading_to) {
                let passenger = self.waiting.remove(i);
                train.board(passenger);
            }
        }

        delivered
    }

    /// Roll for a new passenger at `at`
    ///
    /// With the given per-tick probability a passenger appears, picks a
    /// random destination among the other stations and looks up a route. No
    /// passenger appears while `at` is the only station. Returns whether a
    /// passenger was added.
    pub fn generate_passenger<R1, R2>(
        stations: &mut [Station],
        at: StationId,
        probability: f64,
        rolls: &mut R1,
        destinations: &mut R2,
    ) -> bool
    where
        R1: Rng + ?Sized,
        R2: Rng + ?Sized,
    {
        if at.0 >= stations.len() || !rolls.random_bool(probability.clamp(0.0, 1.0)) {
            return false;
        }
        let Some(mut passenger) = Passenger::with_random_destination(at, stations.len(), destinations)
        else {
            return false;
        };
        passenger.find_path(stations);
        stations[at.0].enqueue(passenger);
        true
    }

    /// Retry route lookup for every passenger waiting at `at` without a route
    ///
    /// Returns how many of them found a route.
    pub fn reattempt_routing(stations: &mut [Station], at: StationId) -> usize {
        let Some(station) = stations.get_mut(at.0) else {
            return 0;
        };
        let mut waiting = std::mem::take(&mut station.waiting);
        let mut routed = 0;
        for passenger in waiting.iter_mut().filter(|p| !p.has_route()) {
            if passenger.find_path(stations) {
                routed += 1;
            }
        }
        stations[at.0].waiting = waiting;
        routed
    }
}
