use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::FleetError;
use crate::models::package::ShippingPackage;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DeliveryStatus {
    Started,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Delivery {
    pub id: Uuid,
    pub package: ShippingPackage,
    pub vehicle_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: DeliveryStatus,
    pub failure_reason: Option<String>,
}

impl Delivery {
    pub fn new(package: ShippingPackage) -> Self {
        Self::starting_at(package, Utc::now())
    }

    fn starting_at(package: ShippingPackage, start_time: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            package,
            vehicle_id: None,
            start_time,
            end_time: None,
            status: DeliveryStatus::Started,
            failure_reason: None,
        }
    }

    /// Simulation use: a delivery with fixed start and end times, still in
    /// the started state.
    pub fn with_times(
        package: ShippingPackage,
        start_time: DateTime<Utc>,
        end_time: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            end_time,
            ..Self::starting_at(package, start_time)
        }
    }

    pub fn assign_vehicle(&mut self, vehicle_id: Uuid) {
        self.vehicle_id = Some(vehicle_id);
    }

    pub fn is_finished(&self) -> bool {
        self.status != DeliveryStatus::Started
    }

    pub fn complete(
        &mut self,
        delivered: ShippingPackage,
        at: DateTime<Utc>,
    ) -> Result<(), FleetError> {
        self.finish(DeliveryStatus::Completed, at)?;
        self.package = delivered;
        Ok(())
    }

    pub fn fail(&mut self, reason: impl Into<String>, at: DateTime<Utc>) -> Result<(), FleetError> {
        self.finish(DeliveryStatus::Failed, at)?;
        self.failure_reason = Some(reason.into());
        Ok(())
    }

    fn finish(&mut self, status: DeliveryStatus, at: DateTime<Utc>) -> Result<(), FleetError> {
        if self.is_finished() {
            return Err(FleetError::Conflict(format!(
                "delivery {} already finished as {:?}",
                self.id, self.status
            )));
        }

        self.status = status;
        self.end_time = Some(at);
        Ok(())
    }
}
