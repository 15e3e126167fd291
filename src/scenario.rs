//! JSON scenario files: a set of customers, vehicles and delivery orders
//! that seed a fleet for a dispatch run.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::engine::dispatch::DeliveryRequest;
use crate::error::FleetError;
use crate::fleet::Fleet;
use crate::models::account::Account;
use crate::models::location::Location;
use crate::models::package::ShippingPackage;
use crate::models::vehicle::Vehicle;

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub customers: Vec<CustomerSpec>,
    pub vehicles: Vec<VehicleSpec>,
    #[serde(default)]
    pub orders: Vec<OrderSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddressSpec {
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub country: String,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerSpec {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: AddressSpec,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VehicleSpec {
    pub max_payload: f64,
    pub battery_level: u8,
    pub mileage: f64,
}

/// Indices refer to the scenario's `customers` and `vehicles` lists.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderSpec {
    pub sender: usize,
    pub recipient: usize,
    pub vehicle: usize,
    pub weight: f64,
    #[serde(default)]
    pub description: String,
}

impl AddressSpec {
    fn to_location(&self) -> Location {
        Location::new(
            self.address_line1.clone(),
            self.address_line2.clone(),
            self.city.clone(),
            self.state.clone(),
            self.zipcode.clone(),
            self.country.clone(),
            self.lat,
            self.lng,
        )
    }
}

impl Scenario {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FleetError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|err| {
            FleetError::Scenario(format!("failed to read {}: {err}", path.display()))
        })?;

        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, FleetError> {
        serde_json::from_str(raw)
            .map_err(|err| FleetError::Scenario(format!("invalid scenario: {err}")))
    }

    /// Registers the scenario's vehicles with `fleet` and turns its orders
    /// into requests, in file order.
    pub fn seed(&self, fleet: &Fleet) -> Result<Vec<DeliveryRequest>, FleetError> {
        let customers: Vec<Account> = self
            .customers
            .iter()
            .map(|spec| {
                Account::customer(
                    spec.name.clone(),
                    spec.email.clone(),
                    spec.phone.clone(),
                    spec.address.to_location(),
                )
            })
            .collect();

        let mut vehicle_ids = Vec::with_capacity(self.vehicles.len());
        for spec in &self.vehicles {
            let vehicle =
                Vehicle::new(fleet.base(), spec.max_payload, spec.battery_level, spec.mileage)?;
            vehicle_ids.push(fleet.register_vehicle(vehicle)?);
        }

        self.orders
            .iter()
            .enumerate()
            .map(|(index, order)| -> Result<DeliveryRequest, FleetError> {
                let sender = lookup(&customers, order.sender, "sender", index)?;
                let recipient = lookup(&customers, order.recipient, "recipient", index)?;
                let vehicle_id = *lookup(&vehicle_ids, order.vehicle, "vehicle", index)?;
                let pickup = sender
                    .address()
                    .cloned()
                    .unwrap_or_else(|| fleet.base().location.clone());

                let package = ShippingPackage::new(
                    order.weight,
                    order.description.clone(),
                    sender,
                    recipient,
                    pickup,
                )?;

                Ok(DeliveryRequest {
                    vehicle_id,
                    package,
                    recipient: recipient.clone(),
                })
            })
            .collect()
    }
}

fn lookup<'a, T>(items: &'a [T], index: usize, role: &str, order: usize) -> Result<&'a T, FleetError> {
    items.get(index).ok_or_else(|| {
        FleetError::Scenario(format!("order {order}: {role} index {index} out of range"))
    })
}
