//! The metro network that ties everything together
//!
//! [`SimNetwork`] owns every station, line and train, runs the per-tick
//! simulation and accepts the line-editing commands issued by the operator
//! between ticks.

use anyhow::{bail, Context, Result};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::config::{SimConfig, SimSeeds};
use super::draft::{DraftLine, DraftTarget, ToggleOutcome};
use super::events::{Alert, NetworkEvent};
use super::game_state::GameState;
use super::grid::CoordinateGrid;
use super::line::{Extension, Line};
use super::passenger::Passenger;
use super::placement::StationPlacement;
use super::station::{CrowdingThresholds, Station};
use super::train::{Train, TrainParams, TrainUpdateResult};
use super::types::{
    CrowdingState, GridPos, Heading, LineColor, LineId, Position, StationId, TrainId,
};

/// Alert raised when the operator tries to start a line beyond the palette
pub const LINE_LIMIT_MESSAGE: &str = "Maximum number of lines reached";

/// Station marker diameter as a fraction of the cell size
pub const STATION_MARKER_SCALE: f64 = 0.8;

/// What happened to the draft on finalize
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizeOutcome {
    /// A new line was committed with one train
    Created { line: LineId, train: TrainId },
    /// An existing line grew
    Extended { line: LineId, extension: Extension },
    /// The draft was invalid and has been thrown away
    Discarded,
    NoDraft,
}

/// Read-only snapshot of a station for presentation
#[derive(Debug, Clone, PartialEq)]
pub struct StationView {
    pub id: StationId,
    pub grid_position: GridPos,
    pub position: Position,
    pub waiting: usize,
    pub crowding: CrowdingState,
}

/// Read-only snapshot of a line for presentation
#[derive(Debug, Clone, PartialEq)]
pub struct LineView {
    pub id: LineId,
    pub color: LineColor,
    pub stations: Vec<StationId>,
    pub polyline: Vec<Position>,
}

/// Read-only snapshot of a train for presentation
#[derive(Debug, Clone, PartialEq)]
pub struct TrainView {
    pub id: TrainId,
    pub line: LineId,
    pub color: LineColor,
    pub position: Position,
    pub heading: Heading,
    pub passengers: usize,
    pub dwelling: bool,
}

/// Read-only snapshot of the draft for presentation
#[derive(Debug, Clone, PartialEq)]
pub struct DraftView {
    pub target: DraftTarget,
    pub color: LineColor,
    pub stations: Vec<StationId>,
    pub polyline: Vec<Position>,
    pub free_end: Vec<Position>,
}

/// The metro network simulation
pub struct SimNetwork {
    config: SimConfig,
    grid: CoordinateGrid,
    train_params: TrainParams,

    /// All stations, indexed by `StationId`
    stations: Vec<Station>,

    /// All committed lines, indexed by `LineId`
    lines: Vec<Line>,

    /// All trains, indexed by `TrainId`
    trains: Vec<Train>,

    /// Line currently being drawn, if any
    draft: Option<DraftLine>,

    placement: StationPlacement,
    station_rng: StdRng,
    passenger_rng: StdRng,
    destination_rng: StdRng,

    /// Cleared for good once placement runs out of room
    generating_stations: bool,

    /// Current passenger generation rate in percent per second
    passenger_rate: f64,

    game_state: GameState,
    alert: Option<Alert>,
    events: Vec<NetworkEvent>,
}

impl SimNetwork {
    /// Create a network with its initial stations
    ///
    /// The first station sits at the centre of the grid; the rest are
    /// placed by the sampler around it.
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate().context("Invalid simulation config")?;
        let grid = CoordinateGrid::for_viewport(
            config.viewport_width,
            config.viewport_height,
            config.grid_density,
            config.edge_buffer,
        )
        .context("Failed to build the coordinate grid")?;
        let seeds = config.seeds.unwrap_or_else(SimSeeds::random);
        debug!("Starting network with seeds {:?}", seeds);

        let mut network = Self {
            train_params: TrainParams::from_config(&config, &grid),
            placement: StationPlacement::new(
                config.min_spacing,
                config.max_spacing,
                config.placement_attempts,
                seeds.placement,
            ),
            station_rng: StdRng::seed_from_u64(seeds.station_rolls),
            passenger_rng: StdRng::seed_from_u64(seeds.passenger_rolls),
            destination_rng: StdRng::seed_from_u64(seeds.destinations),
            stations: Vec::new(),
            lines: Vec::new(),
            trains: Vec::new(),
            draft: None,
            generating_stations: true,
            passenger_rate: config.passenger_generation_rate,
            game_state: GameState::new(),
            alert: None,
            events: Vec::new(),
            grid,
            config,
        };

        let center = network.grid.center();
        network.push_station(center);
        network.placement.add_active_sample(center);
        for _ in 1..network.config.initial_stations {
            if network.place_station().is_none() {
                info!("No room for the initial stations; station generation disabled");
                network.generating_stations = false;
                break;
            }
        }

        Ok(network)
    }

    /// Create a network with every random stream derived from `seed`
    pub fn with_seed(seed: u64) -> Result<Self> {
        Self::new(SimConfig::seeded(seed))
    }

    fn push_station(&mut self, position: GridPos) -> StationId {
        let id = StationId(self.stations.len());
        let thresholds = CrowdingThresholds {
            warning: self.config.overcrowding_warning,
            limit: self.config.overcrowding_limit,
        };
        self.stations.push(Station::new(id, position, thresholds));
        debug!("Added station {:?} at ({}, {})", id.0, position.x, position.y);
        id
    }

    /// Ask the sampler for a new station position and build the station there
    fn place_station(&mut self) -> Option<StationId> {
        let existing: Vec<GridPos> = self.stations.iter().map(Station::position).collect();
        let position = self.placement.propose(&existing, &self.grid)?;
        Some(self.push_station(position))
    }

    /// Add a station at a chosen position
    ///
    /// The position becomes a placement anchor like any generated station.
    pub fn add_station(&mut self, position: GridPos) -> Result<StationId> {
        if !self.grid.contains(position) {
            bail!(
                "Station position ({}, {}) is outside the {}x{} grid",
                position.x,
                position.y,
                self.grid.width(),
                self.grid.height()
            );
        }
        if self.stations.iter().any(|s| s.position() == position) {
            bail!("A station already exists at ({}, {})", position.x, position.y);
        }
        self.placement.add_active_sample(position);
        Ok(self.push_station(position))
    }

    /// Queue a passenger at `origin` travelling to `destination`
    ///
    /// The passenger looks up a route straight away. Returns whether one was found.
    pub fn spawn_passenger(&mut self, origin: StationId, destination: StationId) -> Result<bool> {
        self.station(origin).context("Origin station not found")?;
        self.station(destination)
            .context("Destination station not found")?;
        if origin == destination {
            bail!("Passenger origin and destination are both {:?}", origin);
        }
        let mut passenger = Passenger::new(origin, destination);
        let routed = passenger.find_path(&self.stations);
        self.stations[origin.0].enqueue(passenger);
        Ok(routed)
    }

    /// Advance the simulation by one tick
    ///
    /// Does nothing once the game-over event has been emitted.
    pub fn tick(&mut self) {
        if self.game_state.over_announced {
            return;
        }
        self.game_state.update();

        self.generate_stations();
        self.apply_spacing_schedule();
        if !self.generating_stations {
            self.passenger_rate += self.config.passenger_rate_escalation;
        }
        self.generate_passengers();
        self.update_trains();
        self.age_alert();

        if self.game_state.is_over && !self.game_state.over_announced {
            self.announce_game_over();
        }
    }

    fn generate_stations(&mut self) {
        if !self.generating_stations {
            return;
        }
        let probability = self
            .config
            .per_tick_probability(self.config.station_generation_rate);
        if !self.station_rng.random_bool(probability) {
            return;
        }
        if self.place_station().is_none() {
            info!(
                "No room left for stations after {} placed; passenger rate now escalates",
                self.stations.len()
            );
            self.generating_stations = false;
        }
    }

    fn apply_spacing_schedule(&mut self) {
        let (min, max) = self.config.spacing_for(self.stations.len());
        if self.placement.spacing() != (min, max) {
            debug!(
                "Station spacing now {}..{} with {} stations",
                min,
                max,
                self.stations.len()
            );
            self.placement.set_spacing(min, max);
        }
    }

    fn generate_passengers(&mut self) {
        let probability = self.config.per_tick_probability(self.passenger_rate);
        for index in 0..self.stations.len() {
            let id = StationId(index);
            Station::generate_passenger(
                &mut self.stations,
                id,
                probability,
                &mut self.passenger_rng,
                &mut self.destination_rng,
            );
            if self.stations[index].is_overcrowded() && !self.game_state.is_over {
                info!(
                    "Station {:?} overcrowded with {} passengers",
                    index,
                    self.stations[index].waiting_count()
                );
                self.game_state.end();
            }
        }
    }

    /// Update all trains in creation order
    fn update_trains(&mut self) {
        for train in &mut self.trains {
            let Some(line) = self.lines.get(train.line().0) else {
                warn!("Train {:?} runs on unknown line {:?}", train.id().0, train.line().0);
                continue;
            };
            match train.update(line, &mut self.stations, &self.grid) {
                Ok(TrainUpdateResult::Stopped { delivered, .. }) => {
                    for _ in 0..delivered {
                        let score = self.game_state.record_delivery();
                        self.events.push(NetworkEvent::ScoreIncremented { score });
                    }
                }
                Ok(_) => {}
                Err(err) => warn!("Train {:?} could not advance: {:#}", train.id().0, err),
            }
        }
    }

    fn age_alert(&mut self) {
        if let Some(alert) = &mut self.alert {
            if !alert.age() {
                self.alert = None;
            }
        }
    }

    /// Show an alert unless a permanent one is already up
    fn raise_alert(&mut self, alert: Alert) {
        if self.alert.as_ref().is_some_and(Alert::is_permanent) {
            return;
        }
        self.events.push(NetworkEvent::Alert(alert.clone()));
        self.alert = Some(alert);
    }

    fn announce_game_over(&mut self) {
        let final_score = self.game_state.score;
        info!(
            "Game over after {} ticks with score {}",
            self.game_state.ticks, final_score
        );
        self.events.push(NetworkEvent::GameOver { final_score });
        self.raise_alert(Alert::permanent(format!("Game Over. Score: {}", final_score)));
        self.game_state.over_announced = true;
    }

    /// Start drawing a line from `station`
    ///
    /// With `extend` set the draft extends that line, otherwise it becomes a
    /// new line in the next palette colour. Any previous draft is replaced.
    /// Returns false when the line limit prevents a new line.
    pub fn start_draft(&mut self, station: StationId, extend: Option<LineId>) -> Result<bool> {
        let position = self
            .station(station)
            .context("Draft start station not found")?
            .position();

        let draft = match extend {
            Some(line_id) => {
                let line = self.line(line_id).context("Line to extend not found")?;
                DraftLine::extension(line, station, position)
            }
            None => {
                let Some(&color) = self.config.palette.get(self.lines.len()) else {
                    self.draft = None;
                    debug!("Refused new line: {} lines already exist", self.lines.len());
                    if !self.game_state.is_over {
                        self.raise_alert(Alert::timed(LINE_LIMIT_MESSAGE, self.config.tick_rate));
                    }
                    return Ok(false);
                };
                DraftLine::new_line(color, station, position)
            }
        };

        self.draft = Some(draft);
        Ok(true)
    }

    /// Add `station` to the draft, or remove it if it is the draft's last station
    pub fn toggle_draft_station(&mut self, station: StationId) -> Result<ToggleOutcome> {
        let position = self
            .station(station)
            .context("Draft station not found")?
            .position();
        Ok(match &mut self.draft {
            Some(draft) => draft.toggle_station(station, position),
            None => ToggleOutcome::Unchanged,
        })
    }

    /// Move the draft's preview end to a world position
    pub fn update_draft_free_end(&mut self, cursor: Position) {
        if let Some(draft) = &mut self.draft {
            draft.update_free_end(cursor, &self.grid);
        }
    }

    /// Commit the draft
    ///
    /// New lines get one train at their first station. The draft's stations
    /// are connected pairwise and every waiting passenger without a route
    /// tries again.
    pub fn finalize_draft(&mut self) -> Result<FinalizeOutcome> {
        let Some(mut draft) = self.draft.take() else {
            return Ok(FinalizeOutcome::NoDraft);
        };
        draft.clear_free_end();
        if !draft.has_multiple_stations() {
            debug!("Discarded draft with a single station");
            return Ok(FinalizeOutcome::Discarded);
        }

        if let DraftTarget::Extension(line_id) = draft.target() {
            let line = self
                .lines
                .get_mut(line_id.0)
                .context("Extended line not found")?;
            let extension = line.extend(&draft);
            match extension {
                Extension::Rejected => {
                    warn!(
                        "Discarded extension of line {:?}: draft does not start at a terminus",
                        line_id.0
                    );
                    return Ok(FinalizeOutcome::Discarded);
                }
                Extension::Prepended { stations, points } => {
                    for train_id in line.trains() {
                        if let Some(train) = self.trains.get_mut(train_id.0) {
                            train.shift_indices(points, stations);
                        }
                    }
                }
                Extension::Appended { .. } => {}
            }
            debug!("Extended line {:?}: {:?}", line_id.0, extension);
            self.connect_draft_stations(&draft)?;
            self.reattempt_routing();
            return Ok(FinalizeOutcome::Extended {
                line: line_id,
                extension,
            });
        }

        let line_id = LineId(self.lines.len());
        let mut line = Line::from_draft(line_id, &draft).context("Draft too short for a line")?;
        self.connect_draft_stations(&draft)?;
        self.reattempt_routing();

        let train_id = TrainId(self.trains.len());
        let train = Train::spawn(train_id, &line, &mut self.stations, &self.grid, self.train_params)
            .with_context(|| format!("Failed to start a train on line {:?}", line_id.0))?;
        line.add_train(train_id);
        debug!(
            "Created line {:?} through {} stations",
            line_id.0,
            line.stations().len()
        );
        self.lines.push(line);
        self.trains.push(train);

        Ok(FinalizeOutcome::Created {
            line: line_id,
            train: train_id,
        })
    }

    /// Throw the draft away
    pub fn cancel_draft(&mut self) {
        self.draft = None;
    }

    fn connect_draft_stations(&mut self, draft: &DraftLine) -> Result<()> {
        for pair in draft.stations().windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let a_pos = self.station(a).context("Draft station not found")?.position();
            let b_pos = self.station(b).context("Draft station not found")?.position();
            self.stations[a.0].add_connection(b, b_pos);
            self.stations[b.0].add_connection(a, a_pos);
        }
        Ok(())
    }

    fn reattempt_routing(&mut self) {
        let mut routed = 0;
        for index in 0..self.stations.len() {
            routed += Station::reattempt_routing(&mut self.stations, StationId(index));
        }
        if routed > 0 {
            debug!("Routed {} waiting passengers after a network change", routed);
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn grid(&self) -> &CoordinateGrid {
        &self.grid
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn station(&self, id: StationId) -> Option<&Station> {
        self.stations.get(id.0)
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn line(&self, id: LineId) -> Option<&Line> {
        self.lines.get(id.0)
    }

    pub fn trains(&self) -> &[Train] {
        &self.trains
    }

    pub fn train(&self, id: TrainId) -> Option<&Train> {
        self.trains.get(id.0)
    }

    pub fn draft(&self) -> Option<&DraftLine> {
        self.draft.as_ref()
    }

    pub fn score(&self) -> u64 {
        self.game_state.score
    }

    pub fn is_game_over(&self) -> bool {
        self.game_state.is_over
    }

    pub fn game_state(&self) -> &GameState {
        &self.game_state
    }

    pub fn active_alert(&self) -> Option<&Alert> {
        self.alert.as_ref()
    }

    pub fn is_generating_stations(&self) -> bool {
        self.generating_stations
    }

    /// Current passenger generation rate in percent per second
    pub fn passenger_rate(&self) -> f64 {
        self.passenger_rate
    }

    /// Hand pending events to the caller
    pub fn drain_events(&mut self) -> Vec<NetworkEvent> {
        std::mem::take(&mut self.events)
    }

    /// Lines that start or end at `station`, in creation order
    pub fn lines_terminating_at(&self, station: StationId) -> Vec<LineId> {
        self.lines
            .iter()
            .filter(|line| line.is_terminus(station))
            .map(Line::id)
            .collect()
    }

    /// Station whose marker covers a world position
    pub fn station_at(&self, point: Position) -> Option<StationId> {
        let radius = (self.grid.cell_size() * STATION_MARKER_SCALE).round() / 2.0;
        self.stations
            .iter()
            .find(|s| self.grid.to_world(s.position()).distance(&point) < radius)
            .map(Station::id)
    }

    pub fn station_views(&self) -> Vec<StationView> {
        self.stations
            .iter()
            .map(|s| StationView {
                id: s.id(),
                grid_position: s.position(),
                position: self.grid.to_world(s.position()),
                waiting: s.waiting_count(),
                crowding: s.crowding(),
            })
            .collect()
    }

    pub fn line_views(&self) -> Vec<LineView> {
        self.lines
            .iter()
            .map(|l| LineView {
                id: l.id(),
                color: l.color(),
                stations: l.stations().to_vec(),
                polyline: l.polyline(&self.grid),
            })
            .collect()
    }

    pub fn train_views(&self) -> Vec<TrainView> {
        self.trains
            .iter()
            .map(|t| TrainView {
                id: t.id(),
                line: t.line(),
                color: self
                    .line(t.line())
                    .map(Line::color)
                    .unwrap_or(LineColor::rgba(0, 0, 0, 255)),
                position: t.position(),
                heading: t.heading(),
                passengers: t.passenger_count(),
                dwelling: t.is_dwelling(),
            })
            .collect()
    }

    pub fn draft_view(&self) -> Option<DraftView> {
        self.draft.as_ref().map(|d| DraftView {
            target: d.target(),
            color: d.color(),
            stations: d.stations().to_vec(),
            polyline: d.polyline(&self.grid),
            free_end: d.free_end().to_vec(),
        })
    }

    /// Print a summary of the network state
    pub fn print_summary(&self) {
        println!("=== Metro Simulation Summary ===");
        println!("{}", self.game_state.summary(self.config.tick_rate));
        println!(
            "Stations: {}, Lines: {}, Trains: {}",
            self.stations.len(),
            self.lines.len(),
            self.trains.len()
        );
        println!(
            "Passenger rate: {:.1}%/s{}",
            self.passenger_rate,
            if self.generating_stations {
                ""
            } else {
                " (station generation stopped)"
            }
        );
        if let Some(alert) = &self.alert {
            println!("Alert: {}", alert.message);
        }
        println!();

        println!("--- Stations ---");
        for station in &self.stations {
            let pos = station.position();
            println!(
                "  Station {:?} at ({}, {}): waiting={}{}",
                station.id().0,
                pos.x,
                pos.y,
                station.waiting_count(),
                match station.crowding() {
                    CrowdingState::Normal => "",
                    CrowdingState::Warning => " [crowded]",
                    CrowdingState::Overcrowded => " [OVERCROWDED]",
                }
            );
        }

        if !self.lines.is_empty() {
            println!("--- Lines ---");
            for line in &self.lines {
                let stops: Vec<String> = line.stations().iter().map(|s| s.0.to_string()).collect();
                println!("  Line {:?}: {}", line.id().0, stops.join(" - "));
            }
        }

        if !self.trains.is_empty() {
            println!("--- Trains ---");
            for train in &self.trains {
                println!(
                    "  Train {:?} on line {:?}: passengers={}/{}, position=({:.1}, {:.1}), {}",
                    train.id().0,
                    train.line().0,
                    train.passenger_count(),
                    train.capacity(),
                    train.position().x,
                    train.position().y,
                    if train.is_dwelling() { "dwelling" } else { "moving" }
                );
            }
        }
    }

    /// Draw the network on the terminal, one character per grid cell
    ///
    /// Lines are drawn with the digit of their id, stations with `O` (or `!`
    /// when crowded) and trains with `T`.
    pub fn draw_map(&self) {
        println!("{}", self.render_map());
    }

    /// The map printed by [`draw_map`](Self::draw_map)
    pub fn render_map(&self) -> String {
        let width = (self.grid.width() + 1) as usize;
        let height = (self.grid.height() + 1) as usize;
        let mut cells = vec![vec!['.'; width]; height];

        let mut plot = |pos: GridPos, c: char| {
            if self.grid.contains(pos) {
                cells[pos.y as usize][pos.x as usize] = c;
            }
        };

        for line in &self.lines {
            let mark = std::char::from_digit((line.id().0 % 10) as u32, 10).unwrap_or('#');
            for segment in line.points().windows(2) {
                let (from, to) = (segment[0], segment[1]);
                let steps = (to.x - from.x).abs().max((to.y - from.y).abs());
                for step in 0..=steps {
                    plot(
                        GridPos::new(
                            from.x + step * (to.x - from.x).signum(),
                            from.y + step * (to.y - from.y).signum(),
                        ),
                        mark,
                    );
                }
            }
        }

        for station in &self.stations {
            let mark = match station.crowding() {
                CrowdingState::Normal => 'O',
                CrowdingState::Warning | CrowdingState::Overcrowded => '!',
            };
            plot(station.position(), mark);
        }

        for train in &self.trains {
            plot(self.grid.to_grid(train.position()), 'T');
        }

        cells
            .into_iter()
            .map(|row| row.into_iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
