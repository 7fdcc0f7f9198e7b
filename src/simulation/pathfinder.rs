//! Passenger route finding
//!
//! Label-setting Dijkstra over the station adjacency maps. The search stops
//! as soon as the destination is settled. Among stations with equal
//! tentative distance the lowest [`StationId`] is settled first, and a
//! predecessor is only replaced by a strictly shorter route, so results are
//! stable for a given graph.

use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

use super::station::Station;
use super::types::StationId;

/// Least-cost route from `start` to `end`, both included
///
/// Returns `None` when either station is unknown or `end` is not reachable.
/// Station state is only read.
pub fn shortest_path(stations: &[Station], start: StationId, end: StationId) -> Option<Vec<StationId>> {
    let count = stations.len();
    if start.0 >= count || end.0 >= count {
        return None;
    }

    let mut distances = vec![f64::INFINITY; count];
    let mut settled = vec![false; count];
    let mut previous: Vec<Option<StationId>> = vec![None; count];
    let mut frontier = BinaryHeap::new();

    distances[start.0] = 0.0;
    frontier.push(Reverse((OrderedFloat(0.0), start)));

    while let Some(Reverse((OrderedFloat(distance), current))) = frontier.pop() {
        if settled[current.0] {
            continue;
        }
        settled[current.0] = true;

        if current == end {
            return reconstruct(&previous, start, end);
        }

        for (&neighbor, &weight) in stations[current.0].connections() {
            if neighbor.0 >= count || settled[neighbor.0] {
                continue;
            }
            let candidate = distance + weight;
            if candidate < distances[neighbor.0] {
                distances[neighbor.0] = candidate;
                previous[neighbor.0] = Some(current);
                frontier.push(Reverse((OrderedFloat(candidate), neighbor)));
            }
        }
    }

    None
}

/// Walk the predecessor chain back from `end`
fn reconstruct(previous: &[Option<StationId>], start: StationId, end: StationId) -> Option<Vec<StationId>> {
    let mut path = vec![end];
    let mut current = end;
    while current != start {
        current = previous[current.0]?;
        path.push(current);
    }
    path.reverse();
    Some(path)
}

/// Total edge weight along a route, or `None` if two consecutive stations are not connected
pub fn route_cost(stations: &[Station], route: &[StationId]) -> Option<f64> {
    route.windows(2).try_fold(0.0, |total, pair| {
        stations
            .get(pair[0].0)?
            .connection_weight(pair[1])
            .map(|weight| total + weight)
    })
}
