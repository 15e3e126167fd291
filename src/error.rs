use thiserror::Error;
use uuid::Uuid;

use crate::models::vehicle::VehicleStatus;

#[derive(Debug, Error)]
pub enum FleetError {
    #[error("vehicle {vehicle_id}: {violation}")]
    InvariantViolation { vehicle_id: Uuid, violation: Violation },

    #[error(
        "vehicle {vehicle_id} cannot reach package {package_id}: \
         range {range_km:.3} km is short of {distance_km:.3} km"
    )]
    OutOfRange {
        vehicle_id: Uuid,
        package_id: Uuid,
        range_km: f32,
        distance_km: f32,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("scenario error: {0}")]
    Scenario(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl FleetError {
    pub fn violation(&self) -> Option<&Violation> {
        match self {
            FleetError::InvariantViolation { violation, .. } => Some(violation),
            _ => None,
        }
    }
}

/// A rejected vehicle state or transition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Violation {
    #[error("battery level {0} must be between 0 and 100")]
    BatteryOutOfRange(u8),

    #[error("mileage {0} must be finite and non-negative")]
    NegativeMileage(f64),

    #[error("max payload {0} must be finite and non-negative")]
    NegativePayload(f64),

    #[error("location ({lat}, {lng}) has no usable coordinates")]
    InvalidLocation { lat: f64, lng: f64 },

    #[error("a loaded vehicle must have an assigned package")]
    LoadedWithoutPackage,

    #[error("a vehicle in maintenance must not have an assigned package")]
    PackageDuringMaintenance,

    #[error("must be at {location} to {action}")]
    NotAtLocation {
        location: String,
        action: &'static str,
    },

    #[error("must be {required:?} to {action}, but is {actual:?}")]
    WrongStatus {
        required: VehicleStatus,
        actual: VehicleStatus,
        action: &'static str,
    },

    #[error("package weight {weight} exceeds max payload {max_payload}")]
    Overweight { weight: f64, max_payload: f64 },

    #[error("must be empty to load a package")]
    AlreadyLoaded,

    #[error("vehicle is already empty")]
    AlreadyEmpty,

    #[error("needs an assigned package to {action}")]
    MissingPackage { action: &'static str },
}
