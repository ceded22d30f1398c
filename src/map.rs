use crate::math::{Bounds, Coordinate};
use rand::RngCore;

/// The road map the fleet drives on.
pub trait MapModel: Send + Sync {
    /// Samples a random position on the map.
    fn random_position(&self, rng: &mut dyn RngCore) -> Coordinate;

    /// Finds the road node closest to `position`.
    fn nearest_road_node(&self, position: Coordinate) -> Coordinate;

    /// The extents of the map.
    fn bounds(&self) -> Bounds;
}
