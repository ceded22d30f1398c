use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use flexi_logger::{detailed_format, Logger};
use fleet_sim::{DispatchConfig, Dispatcher, Fleet, QueueMatcher, RoadMap, VehicleState};
use log::info;
use rand_distr::{Distribution, Exp};

/// The pause between two rounds of passenger matching.
const MATCH_INTERVAL: Duration = Duration::from_millis(50);

/// Simulates a fleet of autonomous vehicles picking up and dropping off passengers
/// on a grid of roads.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Number of vehicles in the fleet.
    #[arg(long, default_value_t = 10)]
    vehicles: usize,
    /// Number of road nodes along each side of the grid.
    #[arg(long, default_value_t = 20)]
    grid_size: usize,
    /// Distance between neighbouring road nodes.
    #[arg(long, default_value_t = 0.001)]
    spacing: f64,
    /// Milliseconds between two ticks of the dispatch loop.
    #[arg(long, default_value_t = 10)]
    tick_ms: u64,
    /// Fraction of the map's height a vehicle covers in one tick.
    #[arg(long, default_value_t = 0.001)]
    distance_fraction: f64,
    /// Mean number of new passengers per second.
    #[arg(long, default_value_t = 2.0)]
    passenger_rate: f64,
    /// How long to run the simulation for, in seconds.
    #[arg(long, default_value_t = 30)]
    seconds: u64,
    /// Seed for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,
    /// Log level, used when `RUST_LOG` is not set.
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _logger = Logger::try_with_env_or_str(&args.log_level)
        .context("parse log level")?
        .format(detailed_format)
        .start()
        .context("start logger")?;

    let config = DispatchConfig {
        fleet_size: args.vehicles,
        tick_interval: Duration::from_millis(args.tick_ms),
        distance_fraction: args.distance_fraction,
        seed: args.seed,
    };
    info!("Config is: {config:?}");

    let map = Arc::new(RoadMap::grid(args.grid_size, args.grid_size, args.spacing));
    let mut rng = config.rng();
    let fleet = Arc::new(Fleet::new(map.clone(), &config, &mut rng).context("create fleet")?);
    let matcher = Arc::new(QueueMatcher::new(fleet.clone()));

    let mut dispatcher = Dispatcher::new(fleet.clone(), Box::new(map), &config);
    dispatcher.set_ride_matcher(matcher.clone());
    let dispatch = dispatcher.spawn();

    let arrivals = Exp::new(args.passenger_rate).context("invalid passenger rate")?;
    let start = Instant::now();
    let end = start + Duration::from_secs(args.seconds);
    let mut next_passenger = start;
    while Instant::now() < end && !dispatch.is_finished() {
        while next_passenger <= Instant::now() {
            matcher.add_random_passenger(&mut rng);
            next_passenger += Duration::from_secs_f64(arrivals.sample(&mut rng));
        }
        matcher.step();
        thread::sleep(MATCH_INTERVAL);
    }

    let dispatcher = dispatch.stop();
    let carrying = fleet
        .vehicles()
        .iter()
        .filter(|v| v.state() == VehicleState::DrivingPassenger)
        .count();
    info!(
        "Simulated {} ticks: {} rides started, {} vehicles carrying passengers, {} passengers waiting.",
        dispatcher.frame(),
        matcher.rides(),
        carrying,
        matcher.waiting_passengers()
    );
    Ok(())
}
