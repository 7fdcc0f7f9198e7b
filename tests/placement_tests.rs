use metro_sim::simulation::{CoordinateGrid, GridPos, StationPlacement};

/// Place stations from a single anchor at the grid centre until the sampler gives up
fn fill(seed: u64, grid: &CoordinateGrid, limit: usize) -> (Vec<GridPos>, StationPlacement) {
    let mut placement = StationPlacement::new(2.1, 3.5, 5, seed);
    let center = grid.center();
    placement.add_active_sample(center);
    let mut placed = vec![center];
    while placed.len() < limit {
        match placement.propose(&placed, grid) {
            Some(pos) => placed.push(pos),
            None => break,
        }
    }
    (placed, placement)
}

fn assert_spacing(placed: &[GridPos], min: f64) {
    for (i, a) in placed.iter().enumerate() {
        for b in &placed[i + 1..] {
            assert!(
                a.euclidean(b) >= min,
                "stations {:?} and {:?} are closer than {}",
                a,
                b,
                min
            );
        }
    }
}

#[test]
fn test_placed_stations_respect_minimum_spacing_and_grid() {
    let grid = CoordinateGrid::new(1.0, 40, 40).unwrap();
    let (placed, _) = fill(99, &grid, 60);

    assert!(placed.len() > 10, "only {} stations placed", placed.len());
    assert_spacing(&placed, 2.1);
    assert!(placed.iter().all(|&p| grid.contains(p)));
}

#[test]
fn test_same_seed_gives_same_sequence() {
    let grid = CoordinateGrid::new(1.0, 40, 40).unwrap();
    let (first, _) = fill(1234, &grid, 30);
    let (second, _) = fill(1234, &grid, 30);
    let (other, _) = fill(4321, &grid, 30);

    assert_eq!(first, second);
    assert_ne!(first, other);
}

#[test]
fn test_small_grid_exhausts_all_anchors() {
    let grid = CoordinateGrid::new(1.0, 4, 4).unwrap();
    let (placed, mut placement) = fill(5, &grid, usize::MAX);

    assert!(placement.is_exhausted());
    assert_eq!(placement.active_count(), 0);
    assert_eq!(placement.propose(&placed, &grid), None);
    assert_spacing(&placed, 2.1);
}

#[test]
fn test_wider_spacing_applies_to_later_proposals() {
    let grid = CoordinateGrid::new(1.0, 40, 40).unwrap();
    let (mut placed, mut placement) = fill(8, &grid, 5);
    let before = placed.len();

    placement.set_spacing(4.0, 5.5);
    assert_eq!(placement.spacing(), (4.0, 5.5));
    while let Some(pos) = placement.propose(&placed, &grid) {
        for existing in &placed {
            assert!(existing.euclidean(&pos) >= 4.0);
        }
        placed.push(pos);
        if placed.len() > before + 20 {
            break;
        }
    }
}

#[test]
fn test_no_anchor_means_no_location() {
    let grid = CoordinateGrid::new(1.0, 10, 10).unwrap();
    let mut placement = StationPlacement::new(2.1, 3.5, 5, 0);
    assert!(placement.is_exhausted());
    assert_eq!(placement.propose(&[], &grid), None);
}
