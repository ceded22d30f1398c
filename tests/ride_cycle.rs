//! Tests that run the fleet against the road map and the queue matcher.

use fleet_sim::math::Coordinate;
use fleet_sim::{
    DispatchConfig, Dispatcher, Fleet, QueueMatcher, RoadMap, Vehicle, VehicleId, VehicleState,
};
use std::sync::{Arc, Weak};
use std::thread;
use std::time::{Duration, Instant};

struct Scenario {
    fleet: Arc<Fleet>,
    matcher: Arc<QueueMatcher>,
    dispatcher: Dispatcher,
}

/// Three vehicles on a 5 x 5 grid of unit-spaced roads, travelling 0.2 per tick.
fn scenario() -> Scenario {
    let config = DispatchConfig {
        fleet_size: 3,
        tick_interval: Duration::from_millis(1),
        distance_fraction: 0.05,
        seed: Some(42),
    };
    let map = Arc::new(RoadMap::grid(5, 5, 1.0));
    let fleet = Arc::new(Fleet::new(map.clone(), &config, &mut config.rng()).unwrap());
    let matcher = Arc::new(QueueMatcher::new(fleet.clone()));
    let mut dispatcher = Dispatcher::new(fleet.clone(), Box::new(map), &config);
    dispatcher.set_ride_matcher(matcher.clone());
    Scenario {
        fleet,
        matcher,
        dispatcher,
    }
}

fn check_invariants(vehicle: &Vehicle) {
    if let Some(passenger) = vehicle.passenger() {
        assert_eq!(vehicle.destination(), passenger.drop_off());
        assert_eq!(passenger.position(), vehicle.position());
        assert_eq!(vehicle.state(), VehicleState::DrivingPassenger);
    } else {
        assert_ne!(vehicle.state(), VehicleState::DrivingPassenger);
    }
    if vehicle.path().is_empty() {
        assert_eq!(vehicle.path_index(), 0);
    } else {
        assert!(vehicle.path_index() < vehicle.path().len());
    }
}

#[test]
fn every_passenger_delivered() {
    let mut s = scenario();
    let riders: Vec<Weak<_>> = [
        ((0.0, 0.0), (4.0, 4.0)),
        ((4.0, 0.0), (0.0, 4.0)),
        ((2.0, 2.0), (2.0, 2.0)),
        ((1.2, 3.1), (3.0, 0.4)),
        ((0.0, 4.0), (4.0, 0.0)),
    ]
    .into_iter()
    .map(|((px, py), (dx, dy))| {
        let id = s
            .matcher
            .add_passenger(Coordinate::new(px, py), Coordinate::new(dx, dy));
        Arc::downgrade(&s.matcher.passenger(id).unwrap())
    })
    .collect();
    assert_eq!(s.matcher.waiting_passengers(), 5);

    for _ in 0..2000 {
        s.dispatcher.tick();
        s.matcher.step();
        s.fleet.vehicles().iter().for_each(check_invariants);
    }

    assert_eq!(s.matcher.rides(), 5);
    assert_eq!(s.matcher.waiting_passengers(), 0);
    assert!(s.fleet.vehicles().iter().all(|v| v.passenger().is_none()));
    // Dropped-off passengers are released by their vehicles.
    assert!(riders.iter().all(|rider| rider.upgrade().is_none()));
}

#[test]
fn passenger_snapped_to_road() {
    let s = scenario();
    let id = s
        .matcher
        .add_passenger(Coordinate::new(0.9, 2.2), Coordinate::new(3.6, 3.4));
    let passenger = s.matcher.passenger(id).unwrap();
    assert_eq!(passenger.pickup(), Coordinate::new(1.0, 2.0));
    assert_eq!(passenger.drop_off(), Coordinate::new(4.0, 3.0));
    assert_eq!(passenger.position(), passenger.pickup());
}

#[test]
fn vehicles_roam_without_passengers() {
    let mut s = scenario();
    let start = s.fleet.vehicles();
    for _ in 0..200 {
        s.dispatcher.tick();
        s.matcher.step();
    }
    let vehicles = s.fleet.vehicles();
    assert!(vehicles
        .iter()
        .all(|v| v.state() == VehicleState::NoPassengerQueued));
    assert!(vehicles
        .iter()
        .zip(&start)
        .any(|(now, then)| now.position() != then.position()));
    assert_eq!(s.matcher.rides(), 0);
}

#[test]
fn spawned_loop_stops_on_request() {
    let s = scenario();
    let matcher = s.matcher.clone();
    let fleet = s.fleet.clone();
    for _ in 0..4 {
        matcher.add_passenger(Coordinate::new(2.0, 2.0), Coordinate::new(0.0, 0.0));
    }

    let handle = s.dispatcher.spawn();
    let deadline = Instant::now() + Duration::from_secs(20);
    while matcher.rides() < 2 && Instant::now() < deadline {
        matcher.step();
        thread::sleep(Duration::from_millis(1));
    }
    assert!(!handle.is_finished());

    let dispatcher = handle.stop();
    let frame = dispatcher.frame();
    assert!(frame > 0);
    assert!(matcher.rides() >= 2);

    // Nothing moves once the loop has stopped.
    let before = fleet.vehicles();
    thread::sleep(Duration::from_millis(20));
    let after = fleet.vehicles();
    for (a, b) in before.iter().zip(&after) {
        assert_eq!(a.position(), b.position());
    }
    assert_eq!(dispatcher.frame(), frame);
    assert!(fleet.vehicle(VehicleId(2)).is_ok());
}
