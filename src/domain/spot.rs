use serde::{Deserialize, Serialize};

use super::Coordinate;

/// A known parking spot. `id` is unique within its partition only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParkingSpot {
    #[serde(rename = "spotID")]
    pub id: i64,
    #[serde(flatten)]
    pub location: Coordinate,
    #[serde(default)]
    pub occupied: bool,
}

impl ParkingSpot {
    pub fn new(id: i64, latitude: f64, longitude: f64, occupied: bool) -> Self {
        Self {
            id,
            location: Coordinate::new(latitude, longitude),
            occupied,
        }
    }
}

/// Flip an occupancy flag
pub fn toggle_occupancy(current: bool) -> bool {
    !current
}
