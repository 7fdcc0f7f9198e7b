use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use metro_sim::simulation::{NetworkEvent, OperatorAction, ScriptedOperator, SimConfig, SimNetwork};

#[derive(Parser)]
#[command(name = "metro_sim")]
#[command(about = "Headless metro network simulation")]
struct Cli {
    /// Number of simulation ticks to run
    #[arg(long, default_value = "3000")]
    ticks: u64,

    /// Seed for every random stream; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Simulation ticks per simulated second
    #[arg(long, default_value = "50")]
    tick_rate: u32,

    /// Stations present at the start
    #[arg(long, default_value = "3")]
    initial_stations: usize,

    /// Maximum number of lines (at most the palette size)
    #[arg(long, default_value = "8")]
    max_lines: usize,

    /// Passengers a single train can carry
    #[arg(long, default_value = "9")]
    train_capacity: usize,

    /// Ticks between summaries
    #[arg(long, default_value = "500")]
    report_every: u64,

    /// Do not build any lines
    #[arg(long)]
    no_operator: bool,

    /// Print the map with every summary
    #[arg(long)]
    map: bool,
}

impl Cli {
    fn config(&self) -> SimConfig {
        let mut config = match self.seed {
            Some(seed) => SimConfig::seeded(seed),
            None => SimConfig::default(),
        };
        config.tick_rate = self.tick_rate;
        config.dwell_ticks = self.tick_rate * 3 / 4;
        config.initial_stations = self.initial_stations;
        config.train_capacity = self.train_capacity;
        if self.max_lines > config.palette.len() {
            warn!(
                "Only {} line colours available; capping lines at that",
                config.palette.len()
            );
        }
        config.palette.truncate(self.max_lines);
        config
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let network = SimNetwork::new(cli.config()).context("Failed to start the simulation")?;
    let operator = (!cli.no_operator).then(|| ScriptedOperator::new(u64::from(cli.tick_rate) * 2));
    run_headless(network, operator, &cli)
}

/// Run the simulation without graphics, printing periodic summaries
fn run_headless(mut network: SimNetwork, mut operator: Option<ScriptedOperator>, cli: &Cli) -> Result<()> {
    println!("Running metro simulation in headless mode...");
    println!(
        "Ticks: {}, Tick rate: {}/s, Grid: {}x{}",
        cli.ticks,
        network.config().tick_rate,
        network.grid().width(),
        network.grid().height()
    );
    println!();

    println!("Initial state:");
    network.print_summary();
    if cli.map {
        network.draw_map();
    }
    println!();

    let report_every = cli.report_every.max(1);
    for tick in 1..=cli.ticks {
        network.tick();

        if let Some(operator) = operator.as_mut() {
            match operator.on_tick(&mut network)? {
                Some(OperatorAction::OpenedLine { line, from, to }) => {
                    info!("Opened line {} between stations {} and {}", line.0, from.0, to.0)
                }
                Some(OperatorAction::ExtendedLine { line, from, to }) => {
                    info!("Extended line {} from station {} to {}", line.0, from.0, to.0)
                }
                None => {}
            }
        }

        for event in network.drain_events() {
            match event {
                NetworkEvent::GameOver { final_score } => {
                    println!("*** Game over at tick {} with score {} ***", tick, final_score)
                }
                NetworkEvent::Alert(alert) => println!("Alert: {}", alert.message),
                NetworkEvent::ScoreIncremented { .. } => {}
            }
        }

        if network.is_game_over() {
            break;
        }

        if tick % report_every == 0 {
            println!("--- After tick {} ---", tick);
            network.print_summary();
            if cli.map {
                network.draw_map();
            }
            println!();
        }
    }

    println!("=== Final State ===");
    network.print_summary();
    network.draw_map();
    Ok(())
}
