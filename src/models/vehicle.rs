use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::engine::validator;
use crate::error::{FleetError, Violation};
use crate::models::account::Account;
use crate::models::base::Base;
use crate::models::location::{Coordinates, Location};
use crate::models::package::{PackageStatus, ShippingPackage};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum VehicleStatus {
    Idle,
    Charging,
    Maintenance,
    InTransit,
}

/// A delivery drone.
///
/// Fields are private: every change goes through an operation or setter
/// that validates the resulting state before committing it, so a rejected
/// call leaves the vehicle exactly as it was.
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    id: Uuid,
    base: Location,
    max_payload: f64,
    is_empty: bool,
    current_location: Location,
    battery_level: u8,
    mileage: f64,
    status: VehicleStatus,
    assigned_package: Option<ShippingPackage>,
}

/// Plain copy of a vehicle's state, for storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VehicleSnapshot {
    pub id: Uuid,
    pub base: Location,
    pub max_payload: f64,
    pub is_empty: bool,
    pub current_location: Location,
    pub battery_level: u8,
    pub mileage: f64,
    pub status: VehicleStatus,
    pub assigned_package: Option<ShippingPackage>,
}

impl Vehicle {
    /// Creates an idle, empty vehicle parked at `base`.
    pub fn new(
        base: &Base,
        max_payload: f64,
        battery_level: u8,
        mileage: f64,
    ) -> Result<Self, FleetError> {
        let vehicle = Self {
            id: Uuid::new_v4(),
            base: base.location.clone(),
            max_payload,
            is_empty: true,
            current_location: base.location.clone(),
            battery_level,
            mileage,
            status: VehicleStatus::Idle,
            assigned_package: None,
        };

        validator::validate(&vehicle).map_err(|violation| vehicle.reject(violation))?;
        Ok(vehicle)
    }

    pub fn restore(snapshot: VehicleSnapshot) -> Result<Self, FleetError> {
        let vehicle = Self {
            id: snapshot.id,
            base: snapshot.base,
            max_payload: snapshot.max_payload,
            is_empty: snapshot.is_empty,
            current_location: snapshot.current_location,
            battery_level: snapshot.battery_level,
            mileage: snapshot.mileage,
            status: snapshot.status,
            assigned_package: snapshot.assigned_package,
        };

        validator::validate(&vehicle).map_err(|violation| vehicle.reject(violation))?;
        Ok(vehicle)
    }

    pub fn snapshot(&self) -> VehicleSnapshot {
        VehicleSnapshot {
            id: self.id,
            base: self.base.clone(),
            max_payload: self.max_payload,
            is_empty: self.is_empty,
            current_location: self.current_location.clone(),
            battery_level: self.battery_level,
            mileage: self.mileage,
            status: self.status,
            assigned_package: self.assigned_package.clone(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn base(&self) -> &Location {
        &self.base
    }

    pub fn max_payload(&self) -> f64 {
        self.max_payload
    }

    pub fn is_empty(&self) -> bool {
        self.is_empty
    }

    pub fn current_location(&self) -> &Location {
        &self.current_location
    }

    pub fn battery_level(&self) -> u8 {
        self.battery_level
    }

    pub fn mileage(&self) -> f64 {
        self.mileage
    }

    pub fn status(&self) -> VehicleStatus {
        self.status
    }

    pub fn assigned_package(&self) -> Option<&ShippingPackage> {
        self.assigned_package.as_ref()
    }

    pub fn is_at_base(&self) -> bool {
        self.current_location.same_place_as(&self.base)
    }

    pub fn set_battery_level(&mut self, battery_level: u8) -> Result<(), FleetError> {
        self.apply(|v| v.battery_level = battery_level)
    }

    pub fn set_mileage(&mut self, mileage: f64) -> Result<(), FleetError> {
        self.apply(|v| v.mileage = mileage)
    }

    pub fn set_status(&mut self, status: VehicleStatus) -> Result<(), FleetError> {
        self.apply(|v| v.status = status)
    }

    pub fn set_empty(&mut self, is_empty: bool) -> Result<(), FleetError> {
        self.apply(|v| v.is_empty = is_empty)
    }

    pub fn set_current_location(&mut self, coordinates: Coordinates) -> Result<(), FleetError> {
        self.apply(|v| v.current_location.set_coordinates(coordinates))
    }

    pub fn set_assigned_package(
        &mut self,
        package: Option<ShippingPackage>,
    ) -> Result<(), FleetError> {
        self.apply(|v| v.assigned_package = package)
    }

    pub fn charge(&mut self) -> Result<(), FleetError> {
        self.guard(validator::require_at_location(self, &self.base, "charge"))?;
        self.apply(|v| v.status = VehicleStatus::Charging)?;

        info!(vehicle_id = %self.id, "vehicle charging");
        Ok(())
    }

    pub fn maintenance(&mut self) -> Result<(), FleetError> {
        self.guard(validator::require_at_location(
            self,
            &self.base,
            "perform maintenance",
        ))?;
        self.apply(|v| v.status = VehicleStatus::Maintenance)?;

        info!(vehicle_id = %self.id, "vehicle under maintenance");
        Ok(())
    }

    pub fn load_package(&mut self, package: ShippingPackage) -> Result<(), FleetError> {
        self.guard(validator::require_at_location(self, &self.base, "load a package"))?;
        self.guard(validator::require_status(self, VehicleStatus::Idle, "load a package"))?;
        self.guard(validator::require_loadable(self, &package))?;

        let package_id = package.id;
        self.apply(|v| {
            v.is_empty = false;
            v.assigned_package = Some(package);
        })?;

        info!(vehicle_id = %self.id, package_id = %package_id, "package loaded");
        Ok(())
    }

    pub fn go_to(&mut self, destination: &Location) -> Result<(), FleetError> {
        self.apply(|v| v.current_location.set_coordinates(destination.coordinates()))?;

        debug!(
            vehicle_id = %self.id,
            lat = destination.latitude(),
            lng = destination.longitude(),
            "vehicle moved"
        );
        Ok(())
    }

    pub fn unload_package(&mut self) -> Result<(), FleetError> {
        let Some(package) = self.assigned_package.as_ref() else {
            self.guard(validator::require_unloadable(self))?;
            return Err(self.reject(Violation::MissingPackage {
                action: "unload a package",
            }));
        };

        let package_id = package.id;
        self.guard(validator::require_at_location(
            self,
            &package.delivery_location,
            "unload a package",
        ))?;
        self.guard(validator::require_status(
            self,
            VehicleStatus::InTransit,
            "unload a package",
        ))?;
        self.guard(validator::require_unloadable(self))?;

        self.apply(|v| {
            v.is_empty = true;
            if let Some(package) = v.assigned_package.as_mut() {
                package.status = PackageStatus::Delivered;
            }
        })?;

        info!(vehicle_id = %self.id, package_id = %package_id, "package unloaded");
        Ok(())
    }

    /// Flies the assigned package to `customer` and returns to base.
    ///
    /// Each step is committed on its own; a failing step leaves the vehicle
    /// in the state the previous step produced. On success the vehicle is
    /// idle, empty and at base, and the delivered package is returned.
    pub fn perform_delivery(&mut self, customer: &Account) -> Result<ShippingPackage, FleetError> {
        self.guard(validator::require_at_location(self, &self.base, "start delivering"))?;
        self.guard(validator::require_status(self, VehicleStatus::Idle, "start delivering"))?;

        let package = self.assigned_package.clone().ok_or_else(|| {
            self.reject(Violation::MissingPackage {
                action: "start delivering",
            })
        })?;
        let destination = customer.address().cloned().ok_or_else(|| {
            FleetError::InvalidInput(format!("customer {} has no delivery address", customer.id))
        })?;

        info!(
            vehicle_id = %self.id,
            package_id = %package.id,
            customer_id = %customer.id,
            "delivery started"
        );

        self.load_package(package)?;
        self.apply(|v| {
            v.status = VehicleStatus::InTransit;
            if let Some(package) = v.assigned_package.as_mut() {
                package.status = PackageStatus::InTransit;
            }
        })?;
        self.go_to(&destination)?;
        self.unload_package()?;

        let base = self.base.clone();
        self.go_to(&base)?;

        self.guard(validator::require_at_location(self, &self.base, "finish delivering"))?;
        self.guard(validator::require_status(
            self,
            VehicleStatus::InTransit,
            "finish delivering",
        ))?;
        let delivered = self.apply(|v| {
            v.status = VehicleStatus::Idle;
            v.assigned_package.take()
        })?;

        let delivered = delivered.ok_or_else(|| {
            self.reject(Violation::MissingPackage {
                action: "finish delivering",
            })
        })?;

        info!(
            vehicle_id = %self.id,
            package_id = %delivered.id,
            customer_id = %customer.id,
            "delivery finished"
        );
        Ok(delivered)
    }

    /// Applies `change` to a copy, validates the copy, and only then commits it.
    fn apply<R>(&mut self, change: impl FnOnce(&mut Vehicle) -> R) -> Result<R, FleetError> {
        let mut next = self.clone();
        let output = change(&mut next);

        validator::validate(&next).map_err(|violation| self.reject(violation))?;
        *self = next;
        Ok(output)
    }

    fn guard(&self, check: Result<(), Violation>) -> Result<(), FleetError> {
        check.map_err(|violation| self.reject(violation))
    }

    fn reject(&self, violation: Violation) -> FleetError {
        warn!(vehicle_id = %self.id, violation = %violation, "vehicle transition rejected");
        FleetError::InvariantViolation {
            vehicle_id: self.id,
            violation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Vehicle, VehicleStatus};
    use crate::error::{FleetError, Violation};
    use crate::models::account::Account;
    use crate::models::base::Base;
    use crate::models::location::{Coordinates, Location};
    use crate::models::package::{PackageStatus, ShippingPackage};

    fn base() -> Base {
        Base::new(
            "base1",
            Location::new("base1", "HannaSt", "Hannover", "NI", "22459", "Germany", 52.3738, 9.7312),
            8,
        )
    }

    fn customer(name: &str, lat: f64, lng: f64) -> Account {
        Account::customer(
            name,
            format!("{name}@example.com"),
            "+49 511 000000",
            Location::new("1 Ring", "", "Hannover", "NI", "30159", "Germany", lat, lng),
        )
    }

    fn package(weight: f64, recipient: &Account) -> ShippingPackage {
        let sender = customer("sender", 52.37, 9.73);
        let pickup = base().location;
        ShippingPackage::new(weight, "parcel", &sender, recipient, pickup).unwrap()
    }

    fn violation(err: FleetError) -> Violation {
        match err {
            FleetError::InvariantViolation { violation, .. } => violation,
            other => panic!("expected invariant violation, got {other:?}"),
        }
    }

    #[test]
    fn new_vehicle_is_idle_empty_and_at_base() {
        let vehicle = Vehicle::new(&base(), 10.0, 80, 30.0).unwrap();

        assert_eq!(vehicle.status(), VehicleStatus::Idle);
        assert!(vehicle.is_empty());
        assert!(vehicle.is_at_base());
        assert!(vehicle.assigned_package().is_none());
    }

    #[test]
    fn construction_rejects_out_of_range_values() {
        let err = Vehicle::new(&base(), 10.0, 101, 30.0).unwrap_err();
        assert_eq!(violation(err), Violation::BatteryOutOfRange(101));

        let err = Vehicle::new(&base(), 10.0, 50, -1.0).unwrap_err();
        assert_eq!(violation(err), Violation::NegativeMileage(-1.0));

        let err = Vehicle::new(&base(), -0.5, 50, 1.0).unwrap_err();
        assert_eq!(violation(err), Violation::NegativePayload(-0.5));
    }

    #[test]
    fn load_within_payload_marks_vehicle_loaded() {
        let mut vehicle = Vehicle::new(&base(), 10.0, 50, 40.0).unwrap();
        let recipient = customer("bo", 52.40, 9.80);
        let parcel = package(5.0, &recipient);

        vehicle.load_package(parcel.clone()).unwrap();

        assert!(!vehicle.is_empty());
        assert_eq!(vehicle.assigned_package(), Some(&parcel));
    }

    #[test]
    fn overweight_package_leaves_vehicle_unchanged() {
        let mut vehicle = Vehicle::new(&base(), 10.0, 50, 40.0).unwrap();
        let before = vehicle.clone();
        let recipient = customer("bo", 52.40, 9.80);

        let err = vehicle.load_package(package(10.5, &recipient)).unwrap_err();

        assert!(matches!(violation(err), Violation::Overweight { .. }));
        assert!(vehicle.is_empty());
        assert_eq!(vehicle, before);
    }

    #[test]
    fn cannot_load_twice() {
        let mut vehicle = Vehicle::new(&base(), 10.0, 50, 40.0).unwrap();
        let recipient = customer("bo", 52.40, 9.80);

        vehicle.load_package(package(1.0, &recipient)).unwrap();
        let err = vehicle.load_package(package(1.0, &recipient)).unwrap_err();

        assert_eq!(violation(err), Violation::AlreadyLoaded);
    }

    #[test]
    fn cannot_load_away_from_base() {
        let mut vehicle = Vehicle::new(&base(), 10.0, 50, 40.0).unwrap();
        let recipient = customer("bo", 52.40, 9.80);
        vehicle.go_to(recipient.address().unwrap()).unwrap();

        let err = vehicle.load_package(package(1.0, &recipient)).unwrap_err();

        assert!(matches!(violation(err), Violation::NotAtLocation { action: "load a package", .. }));
        assert!(vehicle.is_empty());
    }

    #[test]
    fn cannot_load_while_charging() {
        let mut vehicle = Vehicle::new(&base(), 10.0, 50, 40.0).unwrap();
        vehicle.charge().unwrap();
        let recipient = customer("bo", 52.40, 9.80);

        let err = vehicle.load_package(package(1.0, &recipient)).unwrap_err();

        assert_eq!(
            violation(err),
            Violation::WrongStatus {
                required: VehicleStatus::Idle,
                actual: VehicleStatus::Charging,
                action: "load a package",
            }
        );
    }

    #[test]
    fn unload_without_flying_to_recipient_fails() {
        let mut vehicle = Vehicle::new(&base(), 10.0, 50, 40.0).unwrap();
        let recipient = customer("bo", 52.40, 9.80);

        vehicle.load_package(package(1.0, &recipient)).unwrap();
        let err = vehicle.unload_package().unwrap_err();

        assert!(matches!(
            violation(err),
            Violation::NotAtLocation { action: "unload a package", .. }
        ));
        assert!(!vehicle.is_empty());
    }

    #[test]
    fn unload_requires_in_transit_status() {
        let mut vehicle = Vehicle::new(&base(), 10.0, 50, 40.0).unwrap();
        let recipient = customer("bo", 52.40, 9.80);

        vehicle.load_package(package(1.0, &recipient)).unwrap();
        vehicle.go_to(recipient.address().unwrap()).unwrap();
        let err = vehicle.unload_package().unwrap_err();

        assert!(matches!(violation(err), Violation::WrongStatus { .. }));
    }

    #[test]
    fn unload_of_empty_vehicle_fails() {
        let mut vehicle = Vehicle::new(&base(), 10.0, 50, 40.0).unwrap();
        let err = vehicle.unload_package().unwrap_err();
        assert_eq!(violation(err), Violation::AlreadyEmpty);
    }

    #[test]
    fn charge_and_maintenance_require_base() {
        let mut vehicle = Vehicle::new(&base(), 10.0, 50, 40.0).unwrap();
        vehicle
            .set_current_location(Coordinates { lat: 52.0, lng: 9.0 })
            .unwrap();

        assert!(matches!(
            violation(vehicle.charge().unwrap_err()),
            Violation::NotAtLocation { action: "charge", .. }
        ));
        assert!(matches!(
            violation(vehicle.maintenance().unwrap_err()),
            Violation::NotAtLocation { action: "perform maintenance", .. }
        ));
        assert_eq!(vehicle.status(), VehicleStatus::Idle);
    }

    #[test]
    fn maintenance_is_refused_while_a_package_is_assigned() {
        let mut vehicle = Vehicle::new(&base(), 10.0, 50, 40.0).unwrap();
        let recipient = customer("bo", 52.40, 9.80);
        vehicle.load_package(package(1.0, &recipient)).unwrap();

        let err = vehicle.maintenance().unwrap_err();

        assert_eq!(violation(err), Violation::PackageDuringMaintenance);
        assert_eq!(vehicle.status(), VehicleStatus::Idle);
    }

    #[test]
    fn setters_revalidate_and_roll_back() {
        let mut vehicle = Vehicle::new(&base(), 10.0, 50, 40.0).unwrap();

        assert!(vehicle.set_battery_level(150).is_err());
        assert_eq!(vehicle.battery_level(), 50);

        assert!(vehicle.set_empty(false).is_err());
        assert!(vehicle.is_empty());

        assert!(vehicle.set_current_location(Coordinates { lat: 95.0, lng: 0.0 }).is_err());
        assert!(vehicle.is_at_base());

        vehicle.set_mileage(12.5).unwrap();
        assert_eq!(vehicle.mileage(), 12.5);
    }

    #[test]
    fn perform_delivery_round_trip_ends_idle_at_base() {
        let mut vehicle = Vehicle::new(&base(), 10.0, 50, 40.0).unwrap();
        let recipient = customer("bo", 52.40, 9.80);
        let parcel = package(3.0, &recipient);
        vehicle.set_assigned_package(Some(parcel.clone())).unwrap();

        let delivered = vehicle.perform_delivery(&recipient).unwrap();

        assert_eq!(delivered.id, parcel.id);
        assert_eq!(delivered.status, PackageStatus::Delivered);
        assert_eq!(vehicle.status(), VehicleStatus::Idle);
        assert!(vehicle.is_at_base());
        assert!(vehicle.is_empty());
        assert!(vehicle.assigned_package().is_none());
    }

    #[test]
    fn perform_delivery_without_package_fails() {
        let mut vehicle = Vehicle::new(&base(), 10.0, 50, 40.0).unwrap();
        let recipient = customer("bo", 52.40, 9.80);

        let err = vehicle.perform_delivery(&recipient).unwrap_err();

        assert_eq!(
            violation(err),
            Violation::MissingPackage {
                action: "start delivering"
            }
        );
    }

    #[test]
    fn perform_delivery_to_wrong_customer_stops_at_their_door() {
        let mut vehicle = Vehicle::new(&base(), 10.0, 50, 40.0).unwrap();
        let recipient = customer("bo", 52.40, 9.80);
        let stranger = customer("cy", 52.45, 9.60);
        vehicle
            .set_assigned_package(Some(package(3.0, &recipient)))
            .unwrap();

        let err = vehicle.perform_delivery(&stranger).unwrap_err();

        assert!(matches!(
            violation(err),
            Violation::NotAtLocation { action: "unload a package", .. }
        ));
        assert_eq!(vehicle.status(), VehicleStatus::InTransit);
        assert!(!vehicle.is_empty());
        assert!(vehicle.current_location().same_place_as(stranger.address().unwrap()));
    }

    #[test]
    fn snapshot_restore_keeps_state_and_revalidates() {
        let vehicle = Vehicle::new(&base(), 10.0, 50, 40.0).unwrap();
        let snapshot = vehicle.snapshot();

        let restored = Vehicle::restore(snapshot.clone()).unwrap();
        assert_eq!(restored, vehicle);

        let mut broken = snapshot;
        broken.is_empty = false;
        assert!(Vehicle::restore(broken).is_err());
    }
}
