//! Mathematical structs and functions.

use crate::util::Interval;
use cgmath::{MetricSpace, Point2, Vector2};

/// A position on the map, with `x` the longitude and `y` the latitude.
pub type Coordinate = Point2<f64>;

/// A 2D vector
pub type Vector2d = Vector2<f64>;

/// The extents of a map.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    /// The span of latitudes, i.e. `y` coordinates.
    pub lat: Interval<f64>,
    /// The span of longitudes, i.e. `x` coordinates.
    pub lon: Interval<f64>,
}

impl Bounds {
    /// Creates bounds from their corner latitudes and longitudes.
    pub fn new(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Self {
        Self {
            lat: Interval::new(min_lat, max_lat),
            lon: Interval::new(min_lon, max_lon),
        }
    }

    /// The smallest bounds containing all the given points, or `None` if there are none.
    pub fn enclosing<'a>(points: impl IntoIterator<Item = &'a Coordinate> + Clone) -> Option<Self> {
        Some(Self {
            lat: Interval::enclosing(points.clone().into_iter().map(|p| p.y))?,
            lon: Interval::enclosing(points.into_iter().map(|p| p.x))?,
        })
    }

    /// Returns true if the point lies within the bounds.
    pub fn contains(&self, point: Coordinate) -> bool {
        self.lat.contains(point.y) && self.lon.contains(point.x)
    }

    /// Maps a pair of fractions in `[0, 1]` onto a point within the bounds.
    pub fn lerp(&self, tx: f64, ty: f64) -> Coordinate {
        Coordinate::new(self.lon.lerp(tx), self.lat.lerp(ty))
    }
}

/// The result of a [step_towards] call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Step {
    /// The waypoint was within reach and the position snapped exactly onto it.
    Reached,
    /// The waypoint is still out of reach; this is the intermediate position.
    Moved(Coordinate),
}

/// Moves `pos` at most `max_dist` towards `waypoint`.
///
/// If the waypoint lies within `max_dist` the position snaps onto it exactly, which keeps
/// floating point error from overshooting or oscillating around it. Otherwise the position
/// advances the full `max_dist` along the heading to the waypoint.
pub fn step_towards(pos: Coordinate, waypoint: Coordinate, max_dist: f64) -> Step {
    if pos.distance(waypoint) <= max_dist {
        return Step::Reached;
    }
    let angle = f64::atan2(waypoint.y - pos.y, waypoint.x - pos.x);
    Step::Moved(pos + max_dist * Vector2d::new(angle.cos(), angle.sin()))
}
