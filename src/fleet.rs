use crate::map::MapModel;
use crate::math::Coordinate;
use crate::{
    DispatchConfig, DispatchError, DispatchResult, Passenger, Vehicle, VehicleId, VehicleState,
};
use log::{debug, info};
use parking_lot::Mutex;
use rand::RngCore;
use slotmap::Key;
use std::sync::Arc;

/// A fixed set of vehicles, each behind its own lock.
///
/// The fleet is shared between the [Dispatcher](crate::Dispatcher), which advances every vehicle
/// once per tick, and the ride matcher, which addresses vehicles by ID from its own context.
/// Every change to a vehicle is applied while holding that vehicle's lock, so neither side ever
/// sees a destination paired with a stale route or state.
pub struct Fleet {
    /// The vehicles, indexed by ID.
    vehicles: Vec<Mutex<Vehicle>>,
    /// The road map.
    map: Arc<dyn MapModel>,
    /// The maximum distance a vehicle travels in one tick.
    distance_per_cycle: f64,
}

/// How [Fleet::reset_destination] picks a vehicle's new destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DestinationReset {
    /// Keep the current destination, aligned to the nearest road node.
    Keep,
    /// Pick a random road node.
    Random,
}

impl Fleet {
    /// Creates a fleet of `config.fleet_size` vehicles, each starting on a random
    /// road node and heading for another.
    pub fn new(
        map: Arc<dyn MapModel>,
        config: &DispatchConfig,
        rng: &mut dyn RngCore,
    ) -> DispatchResult<Self> {
        let routes = (0..config.fleet_size)
            .map(|_| (map.random_position(rng), map.random_position(rng)))
            .collect::<Vec<_>>();
        Self::with_vehicles(map, config, routes)
    }

    /// Creates a fleet with one vehicle per `(start, destination)` pair,
    /// both aligned to their nearest road nodes.
    ///
    /// An empty fleet is valid; the dispatcher simply has nothing to move.
    pub fn with_vehicles(
        map: Arc<dyn MapModel>,
        config: &DispatchConfig,
        routes: impl IntoIterator<Item = (Coordinate, Coordinate)>,
    ) -> DispatchResult<Self> {
        let distance_per_cycle = map.bounds().lat.length().abs() * config.distance_fraction;
        if distance_per_cycle.is_nan() || distance_per_cycle <= 0.0 {
            return Err(DispatchError::DegenerateBounds);
        }

        let vehicles = routes
            .into_iter()
            .enumerate()
            .map(|(idx, (start, destination))| {
                let start = map.nearest_road_node(start);
                let destination = map.nearest_road_node(destination);
                info!(
                    "Vehicle ID#{} now driving from: {}, {}.",
                    idx, start.y, start.x
                );
                Mutex::new(Vehicle::new(VehicleId(idx), start, destination))
            })
            .collect();

        Ok(Self {
            vehicles,
            map,
            distance_per_cycle,
        })
    }

    /// The number of vehicles in the fleet.
    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    /// Whether the fleet has no vehicles.
    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    /// The maximum distance a vehicle travels in one tick.
    pub fn distance_per_cycle(&self) -> f64 {
        self.distance_per_cycle
    }

    /// The road map the fleet drives on.
    pub fn map(&self) -> &Arc<dyn MapModel> {
        &self.map
    }

    /// Gets a copy of the vehicle with the given ID.
    pub fn vehicle(&self, id: VehicleId) -> DispatchResult<Vehicle> {
        Ok(self.slot(id)?.lock().clone())
    }

    /// Gets a copy of every vehicle, in ID order.
    pub fn vehicles(&self) -> Vec<Vehicle> {
        self.vehicles.iter().map(|v| v.lock().clone()).collect()
    }

    /// Sends a vehicle which has requested a passenger to pick one up at `pickup`.
    pub fn assign_passenger(&self, id: VehicleId, pickup: Coordinate) -> DispatchResult<()> {
        let mut vehicle = self.slot(id)?.lock();
        expect_state(&vehicle, VehicleState::NoPassengerQueued, "assign a passenger to")?;
        self.route_to(&mut vehicle, pickup);
        vehicle.set_state(VehicleState::PassengerQueued);
        debug!(
            "Vehicle ID#{} is heading to pick up a passenger at: {}, {}.",
            id,
            vehicle.destination().y,
            vehicle.destination().x
        );
        Ok(())
    }

    /// Seats a passenger in a vehicle waiting at their pickup point.
    /// The vehicle takes a share of the passenger and drives them to their drop-off point.
    pub fn seat_passenger(&self, id: VehicleId, passenger: Arc<Passenger>) -> DispatchResult<()> {
        let mut vehicle = self.slot(id)?.lock();
        expect_state(&vehicle, VehicleState::Waiting, "seat a passenger in")?;
        info!(
            "Passenger ID#{:?} has boarded Vehicle ID#{}.",
            passenger.id().data(),
            id
        );
        vehicle.set_passenger(passenger);
        vehicle.set_state(VehicleState::DrivingPassenger);
        Ok(())
    }

    /// Gives a vehicle a new destination on the nearest road node and clears its route.
    ///
    /// A vehicle carrying a passenger keeps its exact drop-off point under
    /// [DestinationReset::Keep]. [DestinationReset::Random] is refused for any vehicle
    /// heading for a pickup or carrying a passenger.
    pub fn reset_destination(
        &self,
        id: VehicleId,
        reset: DestinationReset,
        rng: &mut dyn RngCore,
    ) -> DispatchResult<()> {
        let mut vehicle = self.slot(id)?.lock();
        match reset {
            DestinationReset::Keep if vehicle.passenger().is_some() => vehicle.reset_path(),
            DestinationReset::Keep => {
                let destination = vehicle.destination();
                self.route_to(&mut vehicle, destination);
            }
            DestinationReset::Random => {
                expect_idle(&vehicle, "send roaming")?;
                self.roam(&mut vehicle, rng);
            }
        }
        Ok(())
    }

    /// Gets the lock guarding the vehicle with the given ID.
    pub(crate) fn slot(&self, id: VehicleId) -> DispatchResult<&Mutex<Vehicle>> {
        self.vehicles
            .get(id.index())
            .ok_or(DispatchError::UnknownVehicle {
                id,
                fleet_size: self.len(),
            })
    }

    /// Returns an iterator over the vehicle locks, in ID order.
    pub(crate) fn slots(&self) -> impl Iterator<Item = &Mutex<Vehicle>> {
        self.vehicles.iter()
    }

    /// Sends the vehicle to the road node nearest `target`.
    pub(crate) fn route_to(&self, vehicle: &mut Vehicle, target: Coordinate) {
        vehicle.set_destination(self.map.nearest_road_node(target));
    }

    /// Sends the vehicle to a random road node.
    pub(crate) fn roam(&self, vehicle: &mut Vehicle, rng: &mut dyn RngCore) {
        let target = self.map.random_position(rng);
        self.route_to(vehicle, target);
    }

    /// Drops off the vehicle's passenger, sends it roaming and makes it ready to request
    /// another passenger. Returns the released passenger.
    ///
    /// # Panics
    /// Panics if the vehicle has no passenger, which means its state has been corrupted.
    pub(crate) fn drop_off(&self, vehicle: &mut Vehicle, rng: &mut dyn RngCore) -> Arc<Passenger> {
        let Some(passenger) = vehicle.drop_off_passenger() else {
            panic!(
                "Vehicle ID#{} reached a drop-off point without a passenger",
                vehicle.id()
            );
        };
        info!(
            "Vehicle ID#{} has dropped off Passenger ID#{:?}.",
            vehicle.id(),
            passenger.id().data()
        );
        self.roam(vehicle, rng);
        vehicle.set_state(VehicleState::NoPassengerRequested);
        passenger
    }
}

/// Checks that the vehicle is in the state the operation transitions from.
fn expect_state(
    vehicle: &Vehicle,
    expected: VehicleState,
    operation: &'static str,
) -> DispatchResult<()> {
    if vehicle.state() == expected {
        Ok(())
    } else {
        Err(DispatchError::UnexpectedState {
            id: vehicle.id(),
            state: vehicle.state(),
            operation,
        })
    }
}

/// Checks that the vehicle has no pickup or passenger it is committed to.
fn expect_idle(vehicle: &Vehicle, operation: &'static str) -> DispatchResult<()> {
    match vehicle.state() {
        VehicleState::NoPassengerRequested => Ok(()),
        _ => expect_state(vehicle, VehicleState::NoPassengerQueued, operation),
    }
}
