use crate::math::Coordinate;
use std::sync::Arc;

/// Finds routes across the road map.
/// This can be conceptualised as a vehicle's GPS navigation unit.
pub trait RoutePlanner: Send + Sync {
    /// Finds a route from `from` to `to` as a series of waypoints.
    ///
    /// The route should end exactly at `to`. An empty route means `to` cannot be reached.
    fn find_path(&self, from: Coordinate, to: Coordinate) -> Vec<Coordinate>;
}

impl<T: RoutePlanner + ?Sized> RoutePlanner for Arc<T> {
    fn find_path(&self, from: Coordinate, to: Coordinate) -> Vec<Coordinate> {
        (**self).find_path(from, to)
    }
}
