use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::location::Location;

/// Home of a fleet: vehicles depart from it, return to it, and may only
/// charge or undergo maintenance while parked there.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Base {
    pub id: Uuid,
    pub name: String,
    pub location: Location,
    pub capacity: usize,
}

impl Base {
    pub fn new(name: impl Into<String>, location: Location, capacity: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            location,
            capacity,
        }
    }
}
