use crate::error::FleetError;
use crate::geo::haversine_km;
use crate::models::base::Base;
use crate::models::location::Location;
use crate::models::package::ShippingPackage;
use crate::models::vehicle::Vehicle;

/// Answers whether a vehicle has the range to reach a delivery address.
///
/// Distances are measured from the fleet's base, not from the vehicle's
/// live position: feasibility is a pre-flight question asked while the
/// vehicle is parked.
#[derive(Debug, Clone)]
pub struct DeliveryManager {
    base: Base,
}

impl DeliveryManager {
    pub fn new(base: Base) -> Self {
        Self { base }
    }

    pub fn base(&self) -> &Base {
        &self.base
    }

    pub fn can_deliver(
        &self,
        vehicle: &Vehicle,
        package: &ShippingPackage,
    ) -> Result<bool, FleetError> {
        let distance = distance_to(&self.base.location, &package.delivery_location)?;
        Ok(remaining_range(vehicle) >= distance)
    }

    /// Like [`DeliveryManager::can_deliver`], but reports the shortfall.
    pub fn ensure_can_deliver(
        &self,
        vehicle: &Vehicle,
        package: &ShippingPackage,
    ) -> Result<(), FleetError> {
        let distance_km = distance_to(&self.base.location, &package.delivery_location)?;
        let range_km = remaining_range(vehicle);
        if range_km >= distance_km {
            return Ok(());
        }

        Err(FleetError::OutOfRange {
            vehicle_id: vehicle.id(),
            package_id: package.id,
            range_km,
            distance_km,
        })
    }
}

/// Great-circle distance in kilometres, computed in `f64` and reported as
/// `f32` so it compares on the same footing as [`remaining_range`].
pub fn distance_to(origin: &Location, destination: &Location) -> Result<f32, FleetError> {
    for location in [origin, destination] {
        if !location.has_valid_coordinates() {
            return Err(FleetError::InvalidInput(format!(
                "location {} has unusable coordinates ({}, {})",
                location.id,
                location.latitude(),
                location.longitude()
            )));
        }
    }

    let distance = haversine_km(&origin.coordinates(), &destination.coordinates());
    Ok(distance as f32)
}

/// Kilometres left on the current charge, assuming range scales linearly
/// with battery percentage.
pub fn remaining_range(vehicle: &Vehicle) -> f32 {
    (f32::from(vehicle.battery_level()) / 100.0) * vehicle.mileage() as f32
}
