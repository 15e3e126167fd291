//! Invariant and guard checks for [`Vehicle`].
//!
//! `validate` is run on every candidate state before a vehicle commits it.
//! The `require_*` guards are checked before a transition is attempted.

use crate::error::Violation;
use crate::models::location::Location;
use crate::models::package::ShippingPackage;
use crate::models::vehicle::{Vehicle, VehicleStatus};

pub fn validate(vehicle: &Vehicle) -> Result<(), Violation> {
    validate_payload(vehicle)?;
    validate_location(vehicle)?;
    validate_battery_and_mileage(vehicle)?;
    validate_status(vehicle)
}

fn validate_payload(vehicle: &Vehicle) -> Result<(), Violation> {
    if !vehicle.max_payload().is_finite() || vehicle.max_payload() < 0.0 {
        return Err(Violation::NegativePayload(vehicle.max_payload()));
    }

    if !vehicle.is_empty() && vehicle.assigned_package().is_none() {
        return Err(Violation::LoadedWithoutPackage);
    }

    Ok(())
}

fn validate_location(vehicle: &Vehicle) -> Result<(), Violation> {
    for location in [vehicle.base(), vehicle.current_location()] {
        if !location.has_valid_coordinates() {
            return Err(Violation::InvalidLocation {
                lat: location.latitude(),
                lng: location.longitude(),
            });
        }
    }

    Ok(())
}

fn validate_battery_and_mileage(vehicle: &Vehicle) -> Result<(), Violation> {
    if vehicle.battery_level() > 100 {
        return Err(Violation::BatteryOutOfRange(vehicle.battery_level()));
    }

    if !vehicle.mileage().is_finite() || vehicle.mileage() < 0.0 {
        return Err(Violation::NegativeMileage(vehicle.mileage()));
    }

    Ok(())
}

fn validate_status(vehicle: &Vehicle) -> Result<(), Violation> {
    if vehicle.status() == VehicleStatus::Maintenance && vehicle.assigned_package().is_some() {
        return Err(Violation::PackageDuringMaintenance);
    }

    Ok(())
}

/// Coordinates are compared, not addresses or identities.
pub fn require_at_location(
    vehicle: &Vehicle,
    location: &Location,
    action: &'static str,
) -> Result<(), Violation> {
    if vehicle.current_location().same_place_as(location) {
        return Ok(());
    }

    Err(Violation::NotAtLocation {
        location: location.formatted_address(),
        action,
    })
}

pub fn require_status(
    vehicle: &Vehicle,
    required: VehicleStatus,
    action: &'static str,
) -> Result<(), Violation> {
    if vehicle.status() == required {
        return Ok(());
    }

    Err(Violation::WrongStatus {
        required,
        actual: vehicle.status(),
        action,
    })
}

pub fn require_loadable(vehicle: &Vehicle, package: &ShippingPackage) -> Result<(), Violation> {
    if package.weight > vehicle.max_payload() {
        return Err(Violation::Overweight {
            weight: package.weight,
            max_payload: vehicle.max_payload(),
        });
    }

    if !vehicle.is_empty() {
        return Err(Violation::AlreadyLoaded);
    }

    Ok(())
}

pub fn require_unloadable(vehicle: &Vehicle) -> Result<(), Violation> {
    if vehicle.is_empty() {
        return Err(Violation::AlreadyEmpty);
    }

    Ok(())
}
