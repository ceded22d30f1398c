use crate::fleet::Fleet;
use crate::math::Coordinate;
use crate::{Passenger, PassengerId, VehicleId};
use log::{debug, info, warn};
use parking_lot::Mutex;
use rand::RngCore;
use slotmap::{Key, SlotMap};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Pairs vehicles with waiting passengers.
///
/// The dispatcher calls these methods from its own thread, after it has finished updating the
/// vehicle concerned. The matcher answers through [Fleet::assign_passenger] and
/// [Fleet::seat_passenger], either straight away or later from its own context.
pub trait RideMatcher: Send + Sync {
    /// The vehicle wants to be matched with a passenger.
    fn request_passenger(&self, vehicle: VehicleId);

    /// The vehicle has reached the pickup point of the passenger it was assigned.
    fn arrived_at_pickup(&self, vehicle: VehicleId);
}

/// A first-come, first-served ride matcher.
///
/// Vehicle requests and pickup arrivals are queued as they are reported. Each call to
/// [Self::step] seats passengers in vehicles which have arrived, then pairs waiting passengers
/// with requesting vehicles in the order both arrived.
pub struct QueueMatcher {
    /// The fleet to dispatch passengers to.
    fleet: Arc<Fleet>,
    /// Passengers and outstanding requests.
    queues: Mutex<Queues>,
}

#[derive(Default)]
struct Queues {
    /// Every passenger not yet seated in a vehicle.
    passengers: SlotMap<PassengerId, Arc<Passenger>>,
    /// Passengers not yet assigned to a vehicle, oldest first.
    unassigned: VecDeque<PassengerId>,
    /// Vehicles waiting for a passenger, in the order they asked.
    requests: VecDeque<VehicleId>,
    /// The passenger each vehicle is on its way to pick up.
    assigned: HashMap<VehicleId, PassengerId>,
    /// Vehicles stopped at a pickup point.
    arrivals: VecDeque<VehicleId>,
    /// The number of passengers seated so far.
    rides: usize,
}

impl QueueMatcher {
    /// Creates a matcher for the fleet with no passengers.
    pub fn new(fleet: Arc<Fleet>) -> Self {
        Self {
            fleet,
            queues: Default::default(),
        }
    }

    /// Adds a passenger waiting to travel from `pickup` to `drop_off`.
    /// Both points are aligned to their nearest road nodes.
    pub fn add_passenger(&self, pickup: Coordinate, drop_off: Coordinate) -> PassengerId {
        let map = self.fleet.map();
        let pickup = map.nearest_road_node(pickup);
        let drop_off = map.nearest_road_node(drop_off);

        let mut queues = self.queues.lock();
        let id = queues
            .passengers
            .insert_with_key(|id| Arc::new(Passenger::new(id, pickup, drop_off)));
        queues.unassigned.push_back(id);
        info!(
            "Passenger ID#{:?} is waiting at: {}, {}.",
            id.data(),
            pickup.y,
            pickup.x
        );
        id
    }

    /// Adds a passenger travelling between two random points on the map.
    pub fn add_random_passenger(&self, rng: &mut dyn RngCore) -> PassengerId {
        let map = self.fleet.map();
        let pickup = map.random_position(rng);
        let drop_off = map.random_position(rng);
        self.add_passenger(pickup, drop_off)
    }

    /// Gets a passenger who has not yet been seated.
    pub fn passenger(&self, id: PassengerId) -> Option<Arc<Passenger>> {
        self.queues.lock().passengers.get(id).cloned()
    }

    /// The number of passengers not yet seated in a vehicle.
    pub fn waiting_passengers(&self) -> usize {
        self.queues.lock().passengers.len()
    }

    /// The number of passengers seated so far.
    pub fn rides(&self) -> usize {
        self.queues.lock().rides
    }

    /// Seats passengers in the vehicles waiting for them, then assigns waiting passengers
    /// to vehicles which have asked for one.
    pub fn step(&self) {
        self.seat_arrivals();
        self.assign_requests();
    }

    /// Hands each passenger over to the vehicle stopped at their pickup point.
    fn seat_arrivals(&self) {
        let mut queues = self.queues.lock();
        let arrivals = std::mem::take(&mut queues.arrivals)
            .into_iter()
            .filter_map(|vehicle| {
                let passenger = queues.assigned.get(&vehicle).copied();
                if passenger.is_none() {
                    warn!("Vehicle ID#{vehicle} arrived without an assigned passenger.");
                }
                passenger.map(|id| (vehicle, id, queues.passengers[id].clone()))
            })
            .collect::<Vec<_>>();
        drop(queues);

        for (vehicle, id, passenger) in arrivals {
            match self.fleet.seat_passenger(vehicle, passenger) {
                Ok(()) => {
                    let mut queues = self.queues.lock();
                    queues.assigned.remove(&vehicle);
                    queues.passengers.remove(id);
                    queues.rides += 1;
                }
                Err(err) => warn!("Could not seat Passenger ID#{:?}: {err}", id.data()),
            }
        }
    }

    /// Pairs waiting passengers with requesting vehicles, first come, first served.
    fn assign_requests(&self) {
        let pairs = {
            let mut queues = self.queues.lock();
            let count = usize::min(queues.requests.len(), queues.unassigned.len());
            let vehicles = queues.requests.drain(..count).collect::<Vec<_>>();
            let passengers = queues.unassigned.drain(..count).collect::<Vec<_>>();
            let pairs = vehicles
                .into_iter()
                .zip(passengers)
                .map(|(vehicle, id)| (vehicle, id, queues.passengers[id].pickup()))
                .collect::<Vec<_>>();
            for (vehicle, id, _) in &pairs {
                queues.assigned.insert(*vehicle, *id);
            }
            pairs
        };

        for (vehicle, id, pickup) in pairs {
            match self.fleet.assign_passenger(vehicle, pickup) {
                Ok(()) => debug!(
                    "Passenger ID#{:?} assigned to Vehicle ID#{}.",
                    id.data(),
                    vehicle
                ),
                Err(err) => {
                    warn!("Could not assign Passenger ID#{:?}: {err}", id.data());
                    let mut queues = self.queues.lock();
                    queues.assigned.remove(&vehicle);
                    queues.unassigned.push_front(id);
                }
            }
        }
    }
}

impl RideMatcher for QueueMatcher {
    fn request_passenger(&self, vehicle: VehicleId) {
        self.queues.lock().requests.push_back(vehicle);
    }

    fn arrived_at_pickup(&self, vehicle: VehicleId) {
        self.queues.lock().arrivals.push_back(vehicle);
    }
}
