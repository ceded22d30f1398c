//! A fleet dispatch simulation.
//!
//! A [Fleet] of vehicles roams a road map. Each vehicle asks a [RideMatcher] for a passenger,
//! drives to the pickup point, waits to be boarded, carries the passenger to their drop-off point
//! and starts over. The [Dispatcher] advances every vehicle once per tick on its own thread while
//! the matcher calls back into the fleet from its own context.

pub use cgmath;
pub use config::DispatchConfig;
pub use dispatch::{DispatchHandle, Dispatcher};
pub use error::DispatchError;
pub use fleet::{DestinationReset, Fleet};
pub use map::MapModel;
pub use matcher::{QueueMatcher, RideMatcher};
pub use passenger::Passenger;
pub use planner::RoutePlanner;
pub use road::RoadMap;
use slotmap::new_key_type;
pub use util::Interval;
pub use vehicle::{Vehicle, VehicleState};

mod config;
mod dispatch;
mod error;
mod fleet;
mod map;
mod matcher;
pub mod math;
mod passenger;
mod planner;
mod road;
mod util;
mod vehicle;

new_key_type! {
    /// Unique ID of a [Passenger].
    pub struct PassengerId;
}

/// Unique ID of a [Vehicle].
///
/// IDs are handed out sequentially from zero when the fleet is created and double as the
/// vehicle's index in the fleet. They are never reused during a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleId(pub usize);

impl VehicleId {
    /// The vehicle's index in the fleet.
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for VehicleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result type for fleet operations.
pub type DispatchResult<T> = Result<T, DispatchError>;
