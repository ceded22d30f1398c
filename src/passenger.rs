use crate::math::Coordinate;
use crate::PassengerId;
use parking_lot::Mutex;

/// A passenger waiting for, or riding in, a vehicle.
///
/// Passengers are shared through an `Arc`: the ride matcher holds them while they wait and hands
/// a reference to a vehicle when they are seated. While seated, the vehicle keeps the passenger's
/// position in step with its own.
#[derive(Debug)]
pub struct Passenger {
    /// The passenger's ID.
    id: PassengerId,
    /// Where the passenger wants to be picked up.
    pickup: Coordinate,
    /// Where the passenger wants to go.
    drop_off: Coordinate,
    /// The passenger's current position.
    position: Mutex<Coordinate>,
}

impl Passenger {
    /// Creates a passenger standing at their pickup point.
    pub fn new(id: PassengerId, pickup: Coordinate, drop_off: Coordinate) -> Self {
        Self {
            id,
            pickup,
            drop_off,
            position: Mutex::new(pickup),
        }
    }

    /// Gets the passenger's ID.
    pub fn id(&self) -> PassengerId {
        self.id
    }

    /// The point where the passenger waits to be picked up.
    pub fn pickup(&self) -> Coordinate {
        self.pickup
    }

    /// The point where the passenger wants to be dropped off.
    pub fn drop_off(&self) -> Coordinate {
        self.drop_off
    }

    /// The passenger's current position.
    pub fn position(&self) -> Coordinate {
        *self.position.lock()
    }

    pub(crate) fn set_position(&self, position: Coordinate) {
        *self.position.lock() = position;
    }
}
