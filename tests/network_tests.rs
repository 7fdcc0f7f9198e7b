use metro_sim::simulation::{
    AlertDuration, CrowdingState, DraftTarget, Extension, FinalizeOutcome, GridPos, LineId,
    NetworkEvent, OperatorAction, Position, ScriptedOperator, SimConfig, SimNetwork, SimSeeds,
    StationId, ToggleOutcome, LINE_LIMIT_MESSAGE,
};

/// A network with only the centre station, no random growth and no random passengers
fn quiet_config() -> SimConfig {
    SimConfig {
        initial_stations: 1,
        station_generation_rate: 0.0,
        passenger_generation_rate: 0.0,
        seeds: Some(SimSeeds::from_master(7)),
        ..SimConfig::default()
    }
}

/// Stations along row 11: the centre (22, 11) plus one per extra column
fn quiet_network(columns: &[i32]) -> SimNetwork {
    let mut network = SimNetwork::new(quiet_config()).unwrap();
    for &x in columns {
        network.add_station(GridPos::new(x, 11)).unwrap();
    }
    network
}

fn open_line(network: &mut SimNetwork, stations: &[usize]) -> LineId {
    assert!(network.start_draft(StationId(stations[0]), None).unwrap());
    for &s in &stations[1..] {
        assert_eq!(
            network.toggle_draft_station(StationId(s)).unwrap(),
            ToggleOutcome::Added
        );
    }
    match network.finalize_draft().unwrap() {
        FinalizeOutcome::Created { line, .. } => line,
        other => panic!("line not created: {:?}", other),
    }
}

fn extend_line(network: &mut SimNetwork, line: LineId, from: usize, to: usize) -> FinalizeOutcome {
    assert!(network.start_draft(StationId(from), Some(line)).unwrap());
    network.toggle_draft_station(StationId(to)).unwrap();
    network.finalize_draft().unwrap()
}

#[test]
fn test_new_network_places_initial_stations_around_centre() {
    let network = SimNetwork::with_seed(42).unwrap();

    assert_eq!(network.stations().len(), 3);
    assert_eq!(network.stations()[0].position(), network.grid().center());
    assert_eq!(network.grid().center(), GridPos::new(22, 11));
    for (i, a) in network.stations().iter().enumerate() {
        assert!(network.grid().contains(a.position()));
        for b in &network.stations()[i + 1..] {
            assert!(a.position().euclidean(&b.position()) >= 2.1);
        }
    }
}

#[test]
fn test_same_seed_builds_same_network() {
    let mut a = SimNetwork::with_seed(5).unwrap();
    let mut b = SimNetwork::with_seed(5).unwrap();
    for _ in 0..500 {
        a.tick();
        b.tick();
    }
    assert_eq!(a.station_views(), b.station_views());
    assert_eq!(a.game_state().ticks, 500);
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = SimConfig {
        tick_rate: 0,
        ..SimConfig::default()
    };
    assert!(SimNetwork::new(config).is_err());

    let mut network = quiet_network(&[25]);
    assert!(network.add_station(GridPos::new(25, 11)).is_err());
    assert!(network.add_station(GridPos::new(99, 11)).is_err());
    assert!(network.start_draft(StationId(9), None).is_err());
    assert!(network.start_draft(StationId(0), Some(LineId(3))).is_err());
}

#[test]
fn test_crowding_thresholds_follow_queue_size() {
    let mut network = quiet_network(&[25]);
    for _ in 0..14 {
        network.spawn_passenger(StationId(0), StationId(1)).unwrap();
    }
    assert_eq!(network.stations()[0].crowding(), CrowdingState::Normal);
    network.spawn_passenger(StationId(0), StationId(1)).unwrap();
    assert_eq!(network.stations()[0].crowding(), CrowdingState::Warning);
    assert_eq!(network.station_views()[0].crowding, CrowdingState::Warning);
}

#[test]
fn test_game_over_exactly_when_queue_reaches_limit() {
    let mut network = quiet_network(&[25]);
    for _ in 0..19 {
        network.spawn_passenger(StationId(0), StationId(1)).unwrap();
    }
    network.tick();
    assert!(!network.is_game_over());
    assert!(network.drain_events().is_empty());

    network.spawn_passenger(StationId(0), StationId(1)).unwrap();
    network.tick();
    assert!(network.is_game_over());

    let events = network.drain_events();
    assert!(events.contains(&NetworkEvent::GameOver { final_score: 0 }));
    let alert = network.active_alert().unwrap();
    assert_eq!(alert.message, "Game Over. Score: 0");
    assert_eq!(alert.duration, AlertDuration::Permanent);

    // Nothing moves once the game is over
    network.tick();
    assert_eq!(network.game_state().ticks, 2);
    assert!(network.drain_events().is_empty());
    assert!(network.active_alert().is_some());
}

#[test]
fn test_each_delivery_scores_one_point() {
    let mut network = quiet_network(&[25]);
    for _ in 0..3 {
        assert!(!network.spawn_passenger(StationId(0), StationId(1)).unwrap());
    }
    open_line(&mut network, &[0, 1]);

    // Routed on finalize and boarded by the new train at station 0
    assert_eq!(network.trains()[0].passenger_count(), 3);
    assert_eq!(network.stations()[0].waiting_count(), 0);

    for _ in 0..500 {
        network.tick();
        if network.score() == 3 {
            break;
        }
    }
    assert_eq!(network.score(), 3);
    let scores: Vec<u64> = network
        .drain_events()
        .into_iter()
        .filter_map(|e| match e {
            NetworkEvent::ScoreIncremented { score } => Some(score),
            _ => None,
        })
        .collect();
    assert_eq!(scores, vec![1, 2, 3]);
}

#[test]
fn test_train_never_exceeds_capacity() {
    let config = SimConfig {
        train_capacity: 2,
        ..quiet_config()
    };
    let mut network = SimNetwork::new(config).unwrap();
    network.add_station(GridPos::new(25, 11)).unwrap();
    for _ in 0..5 {
        network.spawn_passenger(StationId(0), StationId(1)).unwrap();
    }
    open_line(&mut network, &[0, 1]);

    for _ in 0..3000 {
        network.tick();
        assert!(network.trains()[0].passenger_count() <= 2);
        if network.score() == 5 {
            break;
        }
    }
    assert_eq!(network.score(), 5);
}

#[test]
fn test_line_limit_raises_timed_alert() {
    let config = SimConfig {
        palette: SimConfig::default().palette[..1].to_vec(),
        ..quiet_config()
    };
    let mut network = SimNetwork::new(config).unwrap();
    network.add_station(GridPos::new(25, 11)).unwrap();
    network.add_station(GridPos::new(28, 11)).unwrap();
    open_line(&mut network, &[0, 1]);

    assert!(!network.start_draft(StationId(2), None).unwrap());
    assert!(network.draft().is_none());
    let alert = network.active_alert().unwrap();
    assert_eq!(alert.message, LINE_LIMIT_MESSAGE);
    assert_eq!(alert.duration, AlertDuration::Ticks(50));
    assert!(network
        .drain_events()
        .iter()
        .any(|e| matches!(e, NetworkEvent::Alert(a) if a.message == LINE_LIMIT_MESSAGE)));

    // Extending the existing line is still allowed
    assert!(network.start_draft(StationId(1), Some(LineId(0))).unwrap());
    network.cancel_draft();

    for _ in 0..49 {
        network.tick();
    }
    assert!(network.active_alert().is_some());
    network.tick();
    assert!(network.active_alert().is_none());
}

#[test]
fn test_front_extension_shifts_running_trains() {
    let mut network = quiet_network(&[25, 19]);
    let line = open_line(&mut network, &[0, 1]);
    let train = &network.trains()[0];
    let (point, station, heading_to) = (
        train.next_point_index(),
        train.next_station_index(),
        train.next_station(),
    );

    let outcome = extend_line(&mut network, line, 0, 2);
    assert_eq!(
        outcome,
        FinalizeOutcome::Extended {
            line,
            extension: Extension::Prepended {
                stations: 1,
                points: 1
            }
        }
    );

    let line_ref = network.line(line).unwrap();
    assert_eq!(line_ref.stations(), &[StationId(2), StationId(0), StationId(1)]);
    let train = &network.trains()[0];
    assert_eq!(train.next_point_index(), point + 1);
    assert_eq!(train.next_station_index(), station + 1);
    assert_eq!(train.next_station(), heading_to);
    assert_eq!(line_ref.stations()[train.next_station_index()], heading_to);

    assert_eq!(network.lines_terminating_at(StationId(2)), vec![line]);
    assert!(network.lines_terminating_at(StationId(0)).is_empty());
    assert!(network.stations()[2].connection_weight(StationId(0)).is_some());

    // The train eventually serves the new terminus
    let mut reached_new_terminus = false;
    for _ in 0..2000 {
        network.tick();
        if network.trains()[0].next_station() == StationId(2) {
            reached_new_terminus = true;
            break;
        }
    }
    assert!(reached_new_terminus);
}

#[test]
fn test_back_extension_and_rejected_extension() {
    let mut network = quiet_network(&[25, 28]);
    network.add_station(GridPos::new(22, 14)).unwrap();
    let line = open_line(&mut network, &[0, 1]);

    assert_eq!(
        extend_line(&mut network, line, 1, 2),
        FinalizeOutcome::Extended {
            line,
            extension: Extension::Appended {
                stations: 1,
                points: 1
            }
        }
    );

    // Station 1 is no longer a terminus
    assert_eq!(extend_line(&mut network, line, 1, 3), FinalizeOutcome::Discarded);
    assert_eq!(
        network.line(line).unwrap().stations(),
        &[StationId(0), StationId(1), StationId(2)]
    );
    assert!(!network.stations()[3].is_connected());
}

#[test]
fn test_invalid_drafts_are_discarded() {
    let mut network = quiet_network(&[25]);
    assert_eq!(network.finalize_draft().unwrap(), FinalizeOutcome::NoDraft);

    network.start_draft(StationId(0), None).unwrap();
    assert_eq!(network.finalize_draft().unwrap(), FinalizeOutcome::Discarded);
    assert!(network.lines().is_empty());

    network.start_draft(StationId(0), None).unwrap();
    network.toggle_draft_station(StationId(1)).unwrap();
    network.cancel_draft();
    assert!(network.draft().is_none());
    assert!(network.lines().is_empty());
    assert!(!network.stations()[0].is_connected());
}

#[test]
fn test_waiting_passengers_are_rerouted_when_network_grows() {
    let mut network = quiet_network(&[25, 19]);
    let line = open_line(&mut network, &[1, 0]);
    assert!(!network.spawn_passenger(StationId(2), StationId(1)).unwrap());

    extend_line(&mut network, line, 0, 2);
    let waiting = &network.stations()[2].waiting()[0];
    assert_eq!(
        waiting.route(),
        Some(&[StationId(2), StationId(0), StationId(1)][..])
    );
}

#[test]
fn test_draft_view_tracks_free_end() {
    let mut network = quiet_network(&[25]);
    network.start_draft(StationId(0), None).unwrap();
    let start = network.grid().to_world(GridPos::new(22, 11));
    network.update_draft_free_end(Position::new(start.x + 100.0, start.y));

    let view = network.draft_view().unwrap();
    assert_eq!(view.target, DraftTarget::NewLine);
    assert_eq!(view.polyline, vec![start]);
    assert_eq!(view.free_end.len(), 2);

    network.toggle_draft_station(StationId(1)).unwrap();
    let view = network.draft_view().unwrap();
    assert!(view.free_end.is_empty());
    assert_eq!(view.stations, vec![StationId(0), StationId(1)]);
}

#[test]
fn test_station_hit_test_uses_marker_radius() {
    let network = quiet_network(&[25]);
    let centre = network.grid().to_world(GridPos::new(25, 11));

    assert_eq!(network.station_at(centre), Some(StationId(1)));
    assert_eq!(
        network.station_at(Position::new(centre.x + 15.0, centre.y)),
        Some(StationId(1))
    );
    assert_eq!(network.station_at(Position::new(centre.x + 20.0, centre.y)), None);
}

#[test]
fn test_passenger_rate_escalates_once_placement_is_exhausted() {
    let config = SimConfig {
        station_generation_rate: 5000.0,
        passenger_generation_rate: 0.0,
        seeds: Some(SimSeeds::from_master(3)),
        ..SimConfig::default()
    };
    let mut network = SimNetwork::new(config).unwrap();
    for _ in 0..2000 {
        if !network.is_generating_stations() {
            break;
        }
        network.tick();
    }
    assert!(!network.is_generating_stations());
    assert!(network.stations().len() > 10);

    let rate = network.passenger_rate();
    network.tick();
    assert_eq!(network.passenger_rate(), rate + 1.0);
}

#[test]
fn test_scripted_operator_connects_new_stations() {
    let mut network = quiet_network(&[25, 28]);
    let mut operator = ScriptedOperator::new(1);

    assert_eq!(
        operator.act(&mut network).unwrap(),
        Some(OperatorAction::OpenedLine {
            line: LineId(0),
            from: StationId(0),
            to: StationId(1)
        })
    );
    assert_eq!(
        operator.act(&mut network).unwrap(),
        Some(OperatorAction::ExtendedLine {
            line: LineId(0),
            from: StationId(1),
            to: StationId(2)
        })
    );
    assert_eq!(operator.act(&mut network).unwrap(), None);
    assert_eq!(
        network.line(LineId(0)).unwrap().stations(),
        &[StationId(0), StationId(1), StationId(2)]
    );
}

#[test]
fn test_render_map_covers_grid() {
    let mut network = quiet_network(&[25]);
    open_line(&mut network, &[0, 1]);
    let map = network.render_map();
    let rows: Vec<&str> = map.lines().collect();

    assert_eq!(rows.len(), 24);
    assert!(rows.iter().all(|r| r.chars().count() == 45));
    assert!(rows[11].contains('T'));
    assert!(rows[11].contains('O'));
}
