use metro_sim::simulation::{
    route_cost, shortest_path, CrowdingThresholds, GridPos, Passenger, Station, StationId,
};
use petgraph::algo::dijkstra;
use petgraph::graph::{NodeIndex, UnGraph};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

const THRESHOLDS: CrowdingThresholds = CrowdingThresholds {
    warning: 15,
    limit: 20,
};

fn stations_at(positions: &[(i32, i32)]) -> Vec<Station> {
    positions
        .iter()
        .enumerate()
        .map(|(i, &(x, y))| Station::new(StationId(i), GridPos::new(x, y), THRESHOLDS))
        .collect()
}

fn connect(stations: &mut [Station], a: usize, b: usize) {
    let a_pos = stations[a].position();
    let b_pos = stations[b].position();
    stations[a].add_connection(StationId(b), b_pos);
    stations[b].add_connection(StationId(a), a_pos);
}

#[test]
fn test_prefers_cheaper_detour_over_fewer_hops() {
    // 0 -> 3 -> 4 costs 10 + 1 in two hops, 0 -> 1 -> 2 -> 4 costs 3 + 3 + 3
    let mut stations = stations_at(&[(0, 0), (3, 0), (6, 0), (10, 0), (9, 0)]);
    connect(&mut stations, 0, 3);
    connect(&mut stations, 3, 4);
    connect(&mut stations, 0, 1);
    connect(&mut stations, 1, 2);
    connect(&mut stations, 2, 4);

    let route = shortest_path(&stations, StationId(0), StationId(4)).unwrap();
    assert_eq!(route, vec![StationId(0), StationId(1), StationId(2), StationId(4)]);
    assert_eq!(route_cost(&stations, &route), Some(9.0));
}

#[test]
fn test_disconnected_stations_have_no_path_until_joined() {
    let mut stations = stations_at(&[(0, 0), (2, 0), (5, 5), (7, 5)]);
    connect(&mut stations, 0, 1);
    connect(&mut stations, 2, 3);

    assert_eq!(shortest_path(&stations, StationId(0), StationId(3)), None);

    connect(&mut stations, 1, 2);
    let route = shortest_path(&stations, StationId(0), StationId(3)).unwrap();
    assert_eq!(route.first(), Some(&StationId(0)));
    assert_eq!(route.last(), Some(&StationId(3)));
    assert!(route_cost(&stations, &route).is_some());
}

#[test]
fn test_same_start_and_end_is_single_station_route() {
    let stations = stations_at(&[(0, 0), (1, 1)]);
    assert_eq!(
        shortest_path(&stations, StationId(1), StationId(1)),
        Some(vec![StationId(1)])
    );
}

#[test]
fn test_unknown_station_has_no_path() {
    let stations = stations_at(&[(0, 0), (1, 1)]);
    assert_eq!(shortest_path(&stations, StationId(0), StationId(9)), None);
    assert_eq!(shortest_path(&stations, StationId(9), StationId(0)), None);
}

#[test]
fn test_equal_cost_routes_settle_lowest_station_first() {
    // Two routes of cost 4 from 0 to 3: via 1 and via 2
    let mut stations = stations_at(&[(0, 0), (2, 0), (0, 2), (2, 2)]);
    connect(&mut stations, 0, 2);
    connect(&mut stations, 0, 1);
    connect(&mut stations, 2, 3);
    connect(&mut stations, 1, 3);

    let route = shortest_path(&stations, StationId(0), StationId(3)).unwrap();
    assert_eq!(route, vec![StationId(0), StationId(1), StationId(3)]);
}

#[test]
fn test_matches_petgraph_on_random_graphs() {
    let mut rng = StdRng::seed_from_u64(2024);

    for _ in 0..50 {
        let count = rng.random_range(2..25);
        let positions: Vec<(i32, i32)> = (0..count)
            .map(|_| (rng.random_range(0..40), rng.random_range(0..40)))
            .collect();
        let mut stations = stations_at(&positions);

        let mut graph = UnGraph::<usize, f64>::new_undirected();
        let nodes: Vec<NodeIndex> = (0..count).map(|i| graph.add_node(i)).collect();
        let mut edges = HashSet::new();
        for _ in 0..count * 2 {
            let a = rng.random_range(0..count);
            let b = rng.random_range(0..count);
            if a == b || !edges.insert((a.min(b), a.max(b))) {
                continue;
            }
            connect(&mut stations, a, b);
            let weight = stations[a].connection_weight(StationId(b)).unwrap();
            graph.add_edge(nodes[a], nodes[b], weight);
        }

        let start = rng.random_range(0..count);
        let end = rng.random_range(0..count);
        let expected = dijkstra(&graph, nodes[start], Some(nodes[end]), |e| *e.weight());
        let route = shortest_path(&stations, StationId(start), StationId(end));

        match (route, expected.get(&nodes[end])) {
            (Some(route), Some(&best)) => {
                let cost = route_cost(&stations, &route).expect("route uses existing edges");
                assert!(
                    (cost - best).abs() < 1e-9,
                    "route cost {} differs from optimum {}",
                    cost,
                    best
                );
                let unique: HashSet<_> = route.iter().collect();
                assert_eq!(unique.len(), route.len(), "route repeats a station");
                assert_eq!(route.first(), Some(&StationId(start)));
                assert_eq!(route.last(), Some(&StationId(end)));
            }
            (None, None) => {}
            (route, best) => panic!("reachability disagrees: {:?} vs {:?}", route, best),
        }
    }
}

#[test]
fn test_passenger_walks_route_with_next_stop() {
    let mut stations = stations_at(&[(0, 0), (2, 0), (4, 0)]);
    connect(&mut stations, 0, 1);
    connect(&mut stations, 1, 2);

    let mut passenger = Passenger::new(StationId(0), StationId(2));
    assert_eq!(passenger.next_stop(), None);
    assert!(passenger.find_path(&stations));

    assert_eq!(passenger.next_stop(), Some(StationId(1)));
    passenger.advance();
    assert_eq!(passenger.next_stop(), Some(StationId(2)));
    passenger.advance();
    assert_eq!(passenger.next_stop(), None);
}

#[test]
fn test_random_destination_never_picks_origin() {
    let mut rng = StdRng::seed_from_u64(11);
    assert!(Passenger::with_random_destination(StationId(0), 1, &mut rng).is_none());

    let mut seen = HashSet::new();
    for _ in 0..200 {
        let passenger = Passenger::with_random_destination(StationId(2), 5, &mut rng).unwrap();
        assert_ne!(passenger.destination(), StationId(2));
        assert!(passenger.destination().0 < 5);
        seen.insert(passenger.destination());
    }
    assert_eq!(seen.len(), 4);
}
