use serde::{Deserialize, Serialize};

/// A point on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Origin used for distance ranking: the user's position or a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObserverLocation {
    #[serde(flatten)]
    pub coordinate: Coordinate,
    pub label: String,
}

impl ObserverLocation {
    pub fn new(coordinate: Coordinate, label: impl Into<String>) -> Self {
        Self {
            coordinate,
            label: label.into(),
        }
    }
}
