use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Latitude in `[-90, 90)`, longitude in `[-180, 180)`, both finite.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..90.0).contains(&self.lat)
            && (-180.0..180.0).contains(&self.lng)
    }
}

/// A geographic point together with its postal address.
///
/// Equality compares every field, identity included. Code that needs to
/// know whether two places coincide should compare [`Location::coordinates`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub id: Uuid,
    pub address_line1: String,
    pub address_line2: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub country: String,
    coordinates: Coordinates,
}

impl Location {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        address_line1: impl Into<String>,
        address_line2: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        zipcode: impl Into<String>,
        country: impl Into<String>,
        lat: f64,
        lng: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            address_line1: address_line1.into(),
            address_line2: address_line2.into(),
            city: city.into(),
            state: state.into(),
            zipcode: zipcode.into(),
            country: country.into(),
            coordinates: Coordinates { lat, lng },
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates.lat
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates.lng
    }

    pub fn has_valid_coordinates(&self) -> bool {
        self.coordinates.is_valid()
    }

    pub fn same_place_as(&self, other: &Location) -> bool {
        self.coordinates == other.coordinates
    }

    pub(crate) fn set_coordinates(&mut self, coordinates: Coordinates) {
        self.coordinates = coordinates;
    }

    pub fn formatted_address(&self) -> String {
        let mut address = self.address_line1.clone();
        if !self.address_line2.is_empty() {
            address.push_str(", ");
            address.push_str(&self.address_line2);
        }
        format!(
            "{address}, {}, {} {}, {}",
            self.city, self.state, self.zipcode, self.country
        )
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:.6}, {:.6})",
            self.formatted_address(),
            self.coordinates.lat,
            self.coordinates.lng
        )
    }
}
