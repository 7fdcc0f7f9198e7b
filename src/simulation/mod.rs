//! Standalone metro network simulation
//!
//! This module contains all the core simulation logic: station placement,
//! line editing, passenger routing and train movement. Presentation is left
//! to whoever consumes the snapshots and events of [`SimNetwork`].

mod config;
mod draft;
mod events;
mod game_state;
mod geometry;
mod grid;
mod line;
mod network;
mod operator;
mod passenger;
mod pathfinder;
mod placement;
mod station;
mod train;
mod types;

// Re-export public types for external use
// These may not be used within this crate but are part of the public API
#[allow(unused_imports)]
pub use config::{
    SimConfig, SimSeeds, SpacingStage, DEFAULT_TICK_RATE, GRID_DENSITY, GRID_EDGE_BUFFER,
    INITIAL_STATIONS, OVERCROWDING_LIMIT, OVERCROWDING_WARNING, PASSENGER_GENERATION_RATE,
    PASSENGER_RATE_ESCALATION, PLACEMENT_ATTEMPTS, STATION_GENERATION_RATE, TRAIN_CAPACITY,
    TRAIN_SPEED,
};
#[allow(unused_imports)]
pub use draft::{DraftLine, DraftTarget, ToggleOutcome};
#[allow(unused_imports)]
pub use events::{Alert, AlertDuration, NetworkEvent};
#[allow(unused_imports)]
pub use game_state::GameState;
#[allow(unused_imports)]
pub use geometry::{bend_point, bend_point_world, heading, metro_distance};
#[allow(unused_imports)]
pub use grid::CoordinateGrid;
#[allow(unused_imports)]
pub use line::{Extension, Line};
#[allow(unused_imports)]
pub use network::{
    DraftView, FinalizeOutcome, LineView, StationView, TrainView, LINE_LIMIT_MESSAGE,
    STATION_MARKER_SCALE,
};
#[allow(unused_imports)]
pub use operator::{OperatorAction, ScriptedOperator};
#[allow(unused_imports)]
pub use passenger::Passenger;
#[allow(unused_imports)]
pub use pathfinder::{route_cost, shortest_path};
#[allow(unused_imports)]
pub use placement::StationPlacement;
#[allow(unused_imports)]
pub use station::{CrowdingThresholds, Station};
#[allow(unused_imports)]
pub use train::{Train, TrainParams, TrainState, TrainUpdateResult, COS_45};
#[allow(unused_imports)]
pub use types::{
    CrowdingState, GridPos, Heading, LineColor, LineId, Position, StationId, TrainId,
    DEFAULT_PALETTE,
};
pub use network::SimNetwork;
