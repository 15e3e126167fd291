use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::FleetError;
use crate::models::account::Account;
use crate::models::location::Location;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum PackageStatus {
    Pending,
    InTransit,
    Delivered,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShippingPackage {
    pub id: Uuid,
    pub weight: f64,
    pub description: String,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub pickup_location: Location,
    pub delivery_location: Location,
    pub status: PackageStatus,
}

impl ShippingPackage {
    /// Creates a pending package addressed to the recipient's customer
    /// address.
    pub fn new(
        weight: f64,
        description: impl Into<String>,
        sender: &Account,
        recipient: &Account,
        pickup_location: Location,
    ) -> Result<Self, FleetError> {
        if !weight.is_finite() || weight <= 0.0 {
            return Err(FleetError::InvalidInput(format!(
                "package weight must be positive, got {weight}"
            )));
        }

        if sender.id == recipient.id {
            return Err(FleetError::InvalidInput(format!(
                "sender and recipient must differ (account {})",
                sender.id
            )));
        }

        let delivery_location = recipient.address().cloned().ok_or_else(|| {
            FleetError::InvalidInput(format!("recipient {} has no address", recipient.id))
        })?;

        Ok(Self {
            id: Uuid::new_v4(),
            weight,
            description: description.into(),
            sender_id: sender.id,
            recipient_id: recipient.id,
            pickup_location,
            delivery_location,
            status: PackageStatus::Pending,
        })
    }
}
