//! Passengers travelling through the network

use rand::Rng;

use super::pathfinder::shortest_path;
use super::station::Station;
use super::types::StationId;

/// A passenger with a fixed origin and destination
///
/// The route is cached when found and never refreshed automatically. A
/// passenger is always owned by exactly one station queue or train.
#[derive(Debug, Clone, PartialEq)]
pub struct Passenger {
    origin: StationId,
    destination: StationId,
    route: Option<Vec<StationId>>,
    index: usize,
}

impl Passenger {
    /// Create an unrouted passenger
    pub fn new(origin: StationId, destination: StationId) -> Self {
        Self {
            origin,
            destination,
            route: None,
            index: 0,
        }
    }

    /// Create a passenger at `origin` heading to a uniformly chosen other station
    ///
    /// Returns `None` when `origin` is the only station.
    pub fn with_random_destination<R: Rng + ?Sized>(
        origin: StationId,
        station_count: usize,
        rng: &mut R,
    ) -> Option<Self> {
        if station_count <= 1 || origin.0 >= station_count {
            return None;
        }
        let mut pick = rng.random_range(0..station_count - 1);
        if pick >= origin.0 {
            pick += 1;
        }
        Some(Self::new(origin, StationId(pick)))
    }

    pub fn origin(&self) -> StationId {
        self.origin
    }

    pub fn destination(&self) -> StationId {
        self.destination
    }

    pub fn route(&self) -> Option<&[StationId]> {
        self.route.as_deref()
    }

    pub fn route_index(&self) -> usize {
        self.index
    }

    pub fn has_route(&self) -> bool {
        self.route.is_some()
    }

    /// Look up a route from origin to destination
    ///
    /// Leaves the passenger unrouted if the stations are not connected.
    /// Returns whether a route is now known.
    pub fn find_path(&mut self, stations: &[Station]) -> bool {
        self.route = shortest_path(stations, self.origin, self.destination);
        self.index = 0;
        self.route.is_some()
    }

    /// Next station on the route, or `None` at the destination or when unrouted
    pub fn next_stop(&self) -> Option<StationId> {
        self.route.as_ref()?.get(self.index + 1).copied()
    }

    /// Record that the passenger reached the next station on their route
    pub fn advance(&mut self) {
        self.index += 1;
    }
}
