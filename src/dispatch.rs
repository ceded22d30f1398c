use crate::fleet::Fleet;
use crate::planner::RoutePlanner;
use crate::{DispatchConfig, RideMatcher, Vehicle, VehicleId, VehicleState};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Drives the fleet: routes vehicles, moves them along their routes and steps them
/// through the passenger request, pickup and drop-off cycle.
pub struct Dispatcher {
    /// The vehicles being dispatched.
    fleet: Arc<Fleet>,
    /// Finds routes for vehicles without one.
    planner: Box<dyn RoutePlanner>,
    /// Pairs vehicles with passengers.
    matcher: Option<Arc<dyn RideMatcher>>,
    /// Picks random destinations.
    rng: StdRng,
    /// The pause before each tick of [Self::run].
    tick_interval: Duration,
    /// The number of ticks simulated so far.
    frame: usize,
}

/// A message for the ride matcher, sent once the vehicle's lock has been released.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Notice {
    RequestPassenger,
    ArrivedAtPickup,
}

/// A dispatch loop running on its own thread. See [Dispatcher::spawn].
///
/// Dropping the handle asks the loop to stop without waiting for it.
pub struct DispatchHandle {
    /// Raised to ask the loop to stop.
    stop: Arc<AtomicBool>,
    /// The thread running the loop.
    thread: Option<JoinHandle<Dispatcher>>,
}

impl Dispatcher {
    /// Creates a dispatcher for the fleet. Until a ride matcher is set,
    /// vehicles request passengers but are never assigned one.
    pub fn new(fleet: Arc<Fleet>, planner: Box<dyn RoutePlanner>, config: &DispatchConfig) -> Self {
        Self {
            fleet,
            planner,
            matcher: None,
            rng: config.rng(),
            tick_interval: config.tick_interval,
            frame: 0,
        }
    }

    /// Sets the ride matcher which is told about passenger requests and pickup arrivals.
    pub fn set_ride_matcher(&mut self, matcher: Arc<dyn RideMatcher>) {
        self.matcher = Some(matcher);
    }

    /// The vehicles being dispatched.
    pub fn fleet(&self) -> &Arc<Fleet> {
        &self.fleet
    }

    /// Gets the number of ticks simulated so far.
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Advances every vehicle by one tick, in ID order.
    pub fn tick(&mut self) {
        let fleet = Arc::clone(&self.fleet);
        for slot in fleet.slots() {
            let (id, notice) = {
                let mut vehicle = slot.lock();
                (vehicle.id(), self.update_vehicle(&mut vehicle))
            };
            if let Some(notice) = notice {
                self.notify(id, notice);
            }
        }
        self.frame += 1;
    }

    /// Ticks until `stop` is raised, sleeping for the tick interval before each tick.
    pub fn run(&mut self, stop: &AtomicBool) {
        while !stop.load(Ordering::Acquire) {
            thread::sleep(self.tick_interval);
            self.tick();
        }
    }

    /// Runs the dispatch loop on a new thread.
    pub fn spawn(mut self) -> DispatchHandle {
        let stop = Arc::new(AtomicBool::new(false));
        let thread = {
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                self.run(&stop);
                self
            })
        };
        DispatchHandle {
            stop,
            thread: Some(thread),
        }
    }

    /// Advances one vehicle by one tick. The caller holds the vehicle's lock.
    fn update_vehicle(&mut self, vehicle: &mut Vehicle) -> Option<Notice> {
        // Waiting vehicles are parked and need no route.
        if vehicle.path().is_empty() && vehicle.state() != VehicleState::Waiting {
            let path = self
                .planner
                .find_path(vehicle.position(), vehicle.destination());
            if path.is_empty() {
                vehicle.record_failure();
                match vehicle.state() {
                    VehicleState::NoPassengerRequested | VehicleState::NoPassengerQueued => {
                        warn!(
                            "Vehicle ID#{} cannot reach {}, {}; picking a new destination.",
                            vehicle.id(),
                            vehicle.destination().y,
                            vehicle.destination().x
                        );
                        self.fleet.roam(vehicle, &mut self.rng);
                    }
                    // Keep the pickup or drop-off point and retry.
                    _ => warn!(
                        "Vehicle ID#{} cannot reach {}, {}; retrying next tick.",
                        vehicle.id(),
                        vehicle.destination().y,
                        vehicle.destination().x
                    ),
                }
                return None;
            }
            debug!(
                "Vehicle ID#{} routed via {} waypoints.",
                vehicle.id(),
                path.len()
            );
            vehicle.set_path(path);
        }

        let mut notice = None;
        if vehicle.state() == VehicleState::NoPassengerRequested {
            vehicle.set_state(VehicleState::NoPassengerQueued);
            info!(
                "Vehicle ID#{} has requested to be matched with a passenger.",
                vehicle.id()
            );
            notice = Some(Notice::RequestPassenger);
        }

        if vehicle.state() == VehicleState::Waiting {
            return notice;
        }
        vehicle.advance(self.fleet.distance_per_cycle());

        if vehicle.has_arrived() {
            match vehicle.state() {
                VehicleState::NoPassengerQueued => self.fleet.roam(vehicle, &mut self.rng),
                VehicleState::PassengerQueued => {
                    vehicle.set_state(VehicleState::Waiting);
                    debug!(
                        "Vehicle ID#{} has arrived to pick up its passenger.",
                        vehicle.id()
                    );
                    notice = Some(Notice::ArrivedAtPickup);
                }
                VehicleState::DrivingPassenger => {
                    self.fleet.drop_off(vehicle, &mut self.rng);
                }
                VehicleState::NoPassengerRequested | VehicleState::Waiting => {}
            }
        }
        notice
    }

    /// Passes a notice on to the ride matcher, if there is one.
    fn notify(&self, id: VehicleId, notice: Notice) {
        let Some(matcher) = &self.matcher else {
            return;
        };
        match notice {
            Notice::RequestPassenger => matcher.request_passenger(id),
            Notice::ArrivedAtPickup => matcher.arrived_at_pickup(id),
        }
    }
}

impl DispatchHandle {
    /// Whether the dispatch loop has exited.
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, |t| t.is_finished())
    }

    /// Stops the dispatch loop after its current tick and returns the dispatcher.
    ///
    /// # Panics
    /// Resumes the panic if the dispatch loop panicked.
    pub fn stop(mut self) -> Dispatcher {
        self.stop.store(true, Ordering::Release);
        let Some(thread) = self.thread.take() else {
            unreachable!("dispatch thread joined twice");
        };
        match thread.join() {
            Ok(dispatcher) => dispatcher,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

impl Drop for DispatchHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
    }
}
