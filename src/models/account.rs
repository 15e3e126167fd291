use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::location::Location;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum AccountRole {
    Customer { address: Location },
    Operator,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: AccountRole,
}

impl Account {
    pub fn customer(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        address: Location,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            role: AccountRole::Customer { address },
        }
    }

    pub fn operator(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            role: AccountRole::Operator,
        }
    }

    /// Delivery address, present only for customers.
    pub fn address(&self) -> Option<&Location> {
        match &self.role {
            AccountRole::Customer { address } => Some(address),
            AccountRole::Operator => None,
        }
    }
}
