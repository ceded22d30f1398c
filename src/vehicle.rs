use crate::math::{step_towards, Coordinate, Step};
use crate::{Passenger, VehicleId};
use std::fmt;
use std::sync::Arc;

/// A simulated vehicle.
#[derive(Clone, Debug)]
pub struct Vehicle {
    /// The vehicle's ID.
    id: VehicleId,
    /// The vehicle's position on the map.
    position: Coordinate,
    /// Where the vehicle is currently driving to.
    destination: Coordinate,
    /// The waypoints of the vehicle's route; empty until the vehicle is routed.
    path: Vec<Coordinate>,
    /// The index of the next waypoint on `path`.
    path_index: usize,
    /// The vehicle's dispatch state.
    state: VehicleState,
    /// The passenger on board, if there is one.
    passenger: Option<Arc<Passenger>>,
    /// The number of times the vehicle could not be routed since its last drop-off.
    failures: u32,
}

/// The dispatch state of a vehicle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VehicleState {
    /// The vehicle has not asked for a passenger yet.
    NoPassengerRequested,
    /// The vehicle has asked for a passenger and roams while it waits for one.
    NoPassengerQueued,
    /// The vehicle has been assigned a passenger and is driving to the pickup point.
    PassengerQueued,
    /// The vehicle is stopped at the pickup point until the passenger boards.
    Waiting,
    /// The vehicle is carrying its passenger to the drop-off point.
    DrivingPassenger,
}

impl fmt::Display for VehicleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoPassengerRequested => "no_passenger_requested",
            Self::NoPassengerQueued => "no_passenger_queued",
            Self::PassengerQueued => "passenger_queued",
            Self::Waiting => "waiting",
            Self::DrivingPassenger => "driving_passenger",
        })
    }
}

impl Vehicle {
    /// Creates a new vehicle which has not yet requested a passenger.
    pub(crate) fn new(id: VehicleId, position: Coordinate, destination: Coordinate) -> Self {
        Self {
            id,
            position,
            destination,
            path: vec![],
            path_index: 0,
            state: VehicleState::NoPassengerRequested,
            passenger: None,
            failures: 0,
        }
    }

    /// Gets the vehicle's ID.
    pub fn id(&self) -> VehicleId {
        self.id
    }

    /// The vehicle's position on the map.
    pub fn position(&self) -> Coordinate {
        self.position
    }

    /// Where the vehicle is currently driving to.
    pub fn destination(&self) -> Coordinate {
        self.destination
    }

    /// The waypoints of the vehicle's route. Empty if the vehicle needs routing.
    pub fn path(&self) -> &[Coordinate] {
        &self.path
    }

    /// The index into [Self::path] of the waypoint the vehicle is driving towards.
    pub fn path_index(&self) -> usize {
        self.path_index
    }

    /// The waypoint the vehicle is driving towards, if it has a route.
    pub fn next_waypoint(&self) -> Option<Coordinate> {
        self.path.get(self.path_index).copied()
    }

    /// The vehicle's dispatch state.
    pub fn state(&self) -> VehicleState {
        self.state
    }

    /// The passenger on board, if there is one.
    pub fn passenger(&self) -> Option<&Arc<Passenger>> {
        self.passenger.as_ref()
    }

    /// The number of times the vehicle could not be routed since its last drop-off.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Whether the vehicle is exactly at its destination.
    pub fn has_arrived(&self) -> bool {
        self.position == self.destination
    }

    /// Moves the vehicle, dragging along its passenger if it has one.
    pub(crate) fn set_position(&mut self, position: Coordinate) {
        self.position = position;
        if let Some(passenger) = &self.passenger {
            passenger.set_position(position);
        }
    }

    /// Sets the vehicle's destination. This also clears the vehicle's route.
    pub(crate) fn set_destination(&mut self, destination: Coordinate) {
        self.destination = destination;
        self.reset_path();
    }

    /// Sets the vehicle's route, starting from its first waypoint.
    pub(crate) fn set_path(&mut self, path: Vec<Coordinate>) {
        self.path = path;
        self.path_index = 0;
    }

    /// Clears the vehicle's route so that it is routed again.
    pub(crate) fn reset_path(&mut self) {
        self.path.clear();
        self.path_index = 0;
    }

    pub(crate) fn set_state(&mut self, state: VehicleState) {
        self.state = state;
    }

    /// Seats a passenger in the vehicle and heads for their drop-off point.
    pub(crate) fn set_passenger(&mut self, passenger: Arc<Passenger>) {
        passenger.set_position(self.position);
        self.set_destination(passenger.drop_off());
        self.passenger = Some(passenger);
    }

    /// Releases the vehicle's passenger, if it has one, and clears its failure count.
    pub(crate) fn drop_off_passenger(&mut self) -> Option<Arc<Passenger>> {
        self.failures = 0;
        self.passenger.take()
    }

    /// Records that the vehicle could not be routed to its destination.
    pub(crate) fn record_failure(&mut self) {
        self.failures += 1;
    }

    /// Advances the vehicle at most `max_dist` along its route.
    ///
    /// On reaching a waypoint the vehicle snaps onto it and moves on to the next one.
    /// Passing the final waypoint completes the route, which is then cleared.
    pub(crate) fn advance(&mut self, max_dist: f64) {
        let Some(waypoint) = self.next_waypoint() else {
            return;
        };
        match step_towards(self.position, waypoint, max_dist) {
            Step::Reached => {
                self.set_position(waypoint);
                self.path_index += 1;
                if self.path_index == self.path.len() {
                    self.reset_path();
                }
            }
            Step::Moved(position) => self.set_position(position),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PassengerId;
    use assert_approx_eq::assert_approx_eq;
    use cgmath::MetricSpace;

    fn vehicle_at(x: f64, y: f64) -> Vehicle {
        Vehicle::new(VehicleId(0), Coordinate::new(x, y), Coordinate::new(x, y))
    }

    #[test]
    fn partial_step_keeps_waypoint() {
        let mut vehicle = vehicle_at(0.0, 0.0);
        vehicle.set_path(vec![Coordinate::new(10.0, 0.0), Coordinate::new(10.0, 5.0)]);
        vehicle.advance(3.0);
        assert_approx_eq!(vehicle.position().x, 3.0);
        assert_approx_eq!(vehicle.position().y, 0.0);
        assert_eq!(vehicle.path_index(), 0);
        assert_approx_eq!(vehicle.position().distance(Coordinate::new(10.0, 0.0)), 7.0);
    }

    #[test]
    fn reaching_waypoint_advances_index() {
        let mut vehicle = vehicle_at(0.0, 0.0);
        vehicle.set_path(vec![Coordinate::new(2.0, 0.0), Coordinate::new(2.0, 5.0)]);
        vehicle.advance(3.0);
        assert_eq!(vehicle.position(), Coordinate::new(2.0, 0.0));
        assert_eq!(vehicle.path_index(), 1);
        assert_eq!(vehicle.next_waypoint(), Some(Coordinate::new(2.0, 5.0)));
    }

    #[test]
    fn completing_route_clears_path() {
        let mut vehicle = vehicle_at(0.0, 0.0);
        vehicle.set_destination(Coordinate::new(1.0, 1.0));
        vehicle.set_path(vec![Coordinate::new(1.0, 1.0)]);
        vehicle.advance(3.0);
        assert!(vehicle.has_arrived());
        assert!(vehicle.path().is_empty());
        assert_eq!(vehicle.path_index(), 0);
    }

    #[test]
    fn destination_change_clears_route() {
        let mut vehicle = vehicle_at(0.0, 0.0);
        vehicle.set_path(vec![Coordinate::new(2.0, 0.0), Coordinate::new(4.0, 0.0)]);
        vehicle.advance(3.0);
        assert_eq!(vehicle.path_index(), 1);

        vehicle.set_destination(Coordinate::new(9.0, 9.0));
        assert!(vehicle.path().is_empty());
        assert_eq!(vehicle.path_index(), 0);
        assert_eq!(vehicle.next_waypoint(), None);
    }

    #[test]
    fn advance_without_route_stays_put() {
        let mut vehicle = vehicle_at(4.0, 2.0);
        vehicle.advance(3.0);
        assert_eq!(vehicle.position(), Coordinate::new(4.0, 2.0));
    }

    #[test]
    fn seated_passenger_follows_vehicle() {
        let mut vehicle = vehicle_at(0.0, 0.0);
        let passenger = Arc::new(Passenger::new(
            PassengerId::default(),
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 8.0),
        ));
        vehicle.set_passenger(passenger.clone());
        assert_eq!(vehicle.destination(), passenger.drop_off());

        vehicle.set_path(vec![Coordinate::new(0.0, 8.0)]);
        vehicle.advance(3.0);
        assert_eq!(passenger.position(), vehicle.position());
        assert_approx_eq!(passenger.position().y, 3.0);

        vehicle.record_failure();
        let released = vehicle.drop_off_passenger().unwrap();
        assert!(Arc::ptr_eq(&released, &passenger));
        assert!(vehicle.passenger().is_none());
        assert_eq!(vehicle.failures(), 0);

        vehicle.set_position(Coordinate::new(5.0, 5.0));
        assert_approx_eq!(passenger.position().y, 3.0);
    }
}
