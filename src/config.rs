use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

/// The default number of vehicles in a fleet.
const DEFAULT_FLEET_SIZE: usize = 10;

/// The default pause between two ticks of the dispatch loop.
const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(10);

/// The default fraction of the map's latitude span a vehicle covers in one tick.
const DEFAULT_DISTANCE_FRACTION: f64 = 1.0 / 1000.0;

/// The parameters of a dispatch simulation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DispatchConfig {
    /// The number of vehicles created when the fleet is built.
    pub fleet_size: usize,
    /// How long the dispatch loop sleeps before each tick.
    pub tick_interval: Duration,
    /// The fraction of the map's latitude span a vehicle may travel per tick.
    pub distance_fraction: f64,
    /// Seeds the dispatcher's random number generator, for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            fleet_size: DEFAULT_FLEET_SIZE,
            tick_interval: DEFAULT_TICK_INTERVAL,
            distance_fraction: DEFAULT_DISTANCE_FRACTION,
            seed: None,
        }
    }
}

impl DispatchConfig {
    /// Creates a random number generator, seeded from [Self::seed] if it is set.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}
