use std::sync::Mutex;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::{broadcast, mpsc};
use tracing::info;
use uuid::Uuid;

use crate::engine::dispatch::DeliveryRequest;
use crate::engine::feasibility::DeliveryManager;
use crate::error::FleetError;
use crate::models::base::Base;
use crate::models::delivery::Delivery;
use crate::models::package::ShippingPackage;
use crate::models::vehicle::{Vehicle, VehicleSnapshot, VehicleStatus};
use crate::observability::metrics::Metrics;

/// Vehicles, deliveries and channels of one base.
///
/// Each vehicle lives in its own map entry; holding that entry's lock is
/// the only way to mutate it, so two operations never interleave on the
/// same vehicle while different vehicles proceed independently.
pub struct Fleet {
    manager: DeliveryManager,
    vehicles: DashMap<Uuid, Vehicle>,
    deliveries: DashMap<Uuid, Delivery>,
    /// Held across the capacity check and the insert.
    registration: Mutex<()>,
    pub request_tx: mpsc::Sender<DeliveryRequest>,
    pub delivery_events_tx: broadcast::Sender<Delivery>,
    pub metrics: Metrics,
}

impl Fleet {
    pub fn new(
        base: Base,
        request_queue_size: usize,
        event_buffer_size: usize,
    ) -> (Self, mpsc::Receiver<DeliveryRequest>) {
        let (request_tx, request_rx) = mpsc::channel(request_queue_size);
        let (delivery_events_tx, _unused_rx) = broadcast::channel(event_buffer_size);

        (
            Self {
                manager: DeliveryManager::new(base),
                vehicles: DashMap::new(),
                deliveries: DashMap::new(),
                registration: Mutex::new(()),
                request_tx,
                delivery_events_tx,
                metrics: Metrics::new(),
            },
            request_rx,
        )
    }

    pub fn base(&self) -> &Base {
        self.manager.base()
    }

    pub fn manager(&self) -> &DeliveryManager {
        &self.manager
    }

    pub fn register_vehicle(&self, vehicle: Vehicle) -> Result<Uuid, FleetError> {
        let base = self.base();
        if !vehicle.base().same_place_as(&base.location) {
            return Err(FleetError::Conflict(format!(
                "vehicle {} is homed at another base",
                vehicle.id()
            )));
        }

        let _registering = self
            .registration
            .lock()
            .map_err(|_| FleetError::Internal("vehicle registration lock poisoned".into()))?;

        if self.vehicles.len() >= base.capacity {
            return Err(FleetError::Conflict(format!(
                "base {} is full ({} vehicles)",
                base.name, base.capacity
            )));
        }

        let id = vehicle.id();
        match self.vehicles.entry(id) {
            Entry::Occupied(_) => Err(FleetError::Conflict(format!(
                "vehicle {id} is already registered"
            ))),
            Entry::Vacant(slot) => {
                slot.insert(vehicle);
                info!(vehicle_id = %id, base = %base.name, "vehicle registered");
                Ok(id)
            }
        }
    }

    pub fn remove_vehicle(&self, id: Uuid) -> Result<Vehicle, FleetError> {
        let (_, vehicle) = self
            .vehicles
            .remove(&id)
            .ok_or_else(|| FleetError::NotFound(format!("vehicle {id} not found")))?;

        info!(vehicle_id = %id, "vehicle removed");
        Ok(vehicle)
    }

    pub fn vehicle(&self, id: Uuid) -> Result<VehicleSnapshot, FleetError> {
        self.vehicles
            .get(&id)
            .map(|entry| entry.value().snapshot())
            .ok_or_else(|| FleetError::NotFound(format!("vehicle {id} not found")))
    }

    pub fn vehicles(&self) -> Vec<VehicleSnapshot> {
        let mut vehicles: Vec<VehicleSnapshot> = self
            .vehicles
            .iter()
            .map(|entry| entry.value().snapshot())
            .collect();
        vehicles.sort_by_key(|vehicle| vehicle.id);
        vehicles
    }

    /// Runs `operation` with exclusive access to one vehicle. The closure
    /// must not block on other vehicles of this fleet.
    pub fn with_vehicle<R>(
        &self,
        id: Uuid,
        operation: impl FnOnce(&mut Vehicle) -> Result<R, FleetError>,
    ) -> Result<R, FleetError> {
        let mut vehicle = self
            .vehicles
            .get_mut(&id)
            .ok_or_else(|| FleetError::NotFound(format!("vehicle {id} not found")))?;

        operation(vehicle.value_mut())
    }

    pub fn can_deliver(&self, id: Uuid, package: &ShippingPackage) -> Result<bool, FleetError> {
        let deliverable = self.with_vehicle(id, |vehicle| self.manager.can_deliver(vehicle, package))?;
        self.record_feasibility(deliverable);
        Ok(deliverable)
    }

    /// Idle, empty vehicles that can carry `package` and have the range for
    /// it, in id order.
    pub fn feasible_vehicles(&self, package: &ShippingPackage) -> Result<Vec<Uuid>, FleetError> {
        let mut ids = Vec::new();
        for entry in self.vehicles.iter() {
            let vehicle = entry.value();
            let available = vehicle.status() == VehicleStatus::Idle
                && vehicle.is_empty()
                && vehicle.assigned_package().is_none()
                && package.weight <= vehicle.max_payload();

            if !available {
                continue;
            }

            let deliverable = self.manager.can_deliver(vehicle, package)?;
            self.record_feasibility(deliverable);
            if deliverable {
                ids.push(vehicle.id());
            }
        }

        ids.sort();
        Ok(ids)
    }

    pub fn record_delivery(&self, delivery: Delivery) {
        self.deliveries.insert(delivery.id, delivery);
    }

    pub fn delivery(&self, id: Uuid) -> Result<Delivery, FleetError> {
        self.deliveries
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| FleetError::NotFound(format!("delivery {id} not found")))
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        let mut deliveries: Vec<Delivery> = self
            .deliveries
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        deliveries.sort_by_key(|delivery| delivery.start_time);
        deliveries
    }

    pub(crate) fn record_feasibility(&self, deliverable: bool) {
        let result = if deliverable { "deliverable" } else { "out_of_range" };
        self.metrics
            .feasibility_checks_total
            .with_label_values(&[result])
            .inc();
    }
}
