use crate::{VehicleId, VehicleState};

/// Errors reported to callers of the fleet's public operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DispatchError {
    /// The vehicle ID does not belong to the fleet.
    #[error("no vehicle with ID#{id} in a fleet of {fleet_size}")]
    UnknownVehicle { id: VehicleId, fleet_size: usize },
    /// The vehicle is not in a state from which the operation is a valid transition.
    /// The vehicle is left untouched.
    #[error("cannot {operation} vehicle ID#{id} while it is {state}")]
    UnexpectedState {
        id: VehicleId,
        state: VehicleState,
        operation: &'static str,
    },
    /// The map is too small to derive a travel distance per tick from.
    #[error("map bounds have no latitude span")]
    DegenerateBounds,
}
