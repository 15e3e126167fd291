use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::engine::validator;
use crate::error::{FleetError, Violation};
use crate::fleet::Fleet;
use crate::models::account::Account;
use crate::models::delivery::{Delivery, DeliveryStatus};
use crate::models::package::ShippingPackage;
use crate::models::vehicle::{Vehicle, VehicleStatus};

/// Ask for one vehicle to carry one package to its recipient.
#[derive(Debug, Clone)]
pub struct DeliveryRequest {
    pub vehicle_id: Uuid,
    pub package: ShippingPackage,
    pub recipient: Account,
}

pub async fn run_dispatch_engine(
    fleet: Arc<Fleet>,
    mut request_rx: mpsc::Receiver<DeliveryRequest>,
) {
    info!("dispatch engine started");

    while let Some(request) = request_rx.recv().await {
        fleet.metrics.requests_in_queue.dec();

        let start = Instant::now();
        let delivery = process_request(&fleet, request);
        let outcome = match delivery.status {
            DeliveryStatus::Completed => "completed",
            DeliveryStatus::Failed => "failed",
            DeliveryStatus::Started => "unfinished",
        };

        fleet
            .metrics
            .delivery_latency_seconds
            .with_label_values(&[outcome])
            .observe(start.elapsed().as_secs_f64());
        fleet
            .metrics
            .deliveries_total
            .with_label_values(&[outcome])
            .inc();

        fleet.record_delivery(delivery.clone());
        let _ = fleet.delivery_events_tx.send(delivery);
    }

    warn!("dispatch engine stopped: request channel closed");
}

/// Runs one request to completion and returns its finished delivery record.
/// Nothing is retried; a failed delivery carries the reason.
pub fn process_request(fleet: &Fleet, request: DeliveryRequest) -> Delivery {
    let mut delivery = Delivery::new(request.package.clone());
    delivery.assign_vehicle(request.vehicle_id);

    let result = match run_delivery(fleet, &request) {
        Ok(delivered) => {
            info!(
                delivery_id = %delivery.id,
                vehicle_id = %request.vehicle_id,
                package_id = %delivered.id,
                "delivery completed"
            );
            delivery.complete(delivered, Utc::now())
        }
        Err(err) => {
            warn!(
                delivery_id = %delivery.id,
                vehicle_id = %request.vehicle_id,
                package_id = %request.package.id,
                error = %err,
                "delivery failed"
            );
            delivery.fail(err.to_string(), Utc::now())
        }
    };

    if let Err(err) = result {
        error!(delivery_id = %delivery.id, error = %err, "failed to finalise delivery");
    }

    delivery
}

fn run_delivery(fleet: &Fleet, request: &DeliveryRequest) -> Result<ShippingPackage, FleetError> {
    if request.package.recipient_id != request.recipient.id {
        return Err(FleetError::InvalidInput(format!(
            "package {} is not addressed to account {}",
            request.package.id, request.recipient.id
        )));
    }

    fleet.with_vehicle(request.vehicle_id, |vehicle| {
        match fleet.manager().ensure_can_deliver(vehicle, &request.package) {
            Ok(()) => fleet.record_feasibility(true),
            Err(err @ FleetError::OutOfRange { .. }) => {
                fleet.record_feasibility(false);
                return Err(err);
            }
            Err(err) => return Err(err),
        }

        ensure_ready(vehicle, &request.package)?;
        vehicle.set_assigned_package(Some(request.package.clone()))?;
        vehicle.perform_delivery(&request.recipient)
    })
}

/// Checks made before a package is assigned, so a refused request leaves
/// the vehicle untouched.
fn ensure_ready(vehicle: &Vehicle, package: &ShippingPackage) -> Result<(), FleetError> {
    let reject = |violation: Violation| FleetError::InvariantViolation {
        vehicle_id: vehicle.id(),
        violation,
    };

    validator::require_at_location(vehicle, vehicle.base(), "start delivering").map_err(reject)?;
    validator::require_status(vehicle, VehicleStatus::Idle, "start delivering").map_err(reject)?;
    validator::require_loadable(vehicle, package).map_err(reject)?;
    if vehicle.assigned_package().is_some() {
        return Err(reject(Violation::AlreadyLoaded));
    }

    Ok(())
}
