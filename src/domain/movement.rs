use serde::{Deserialize, Serialize};

use super::Coordinate;
use crate::error::EngineError;

/// A vehicle's observed displacement between two GPS fixes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "MovementRecord", try_from = "MovementRecord")]
pub struct Movement {
    pub old: Coordinate,
    pub new: Coordinate,
}

impl Movement {
    pub fn new(old: Coordinate, new: Coordinate) -> Self {
        Self { old, new }
    }

    /// Convenience constructor from (lat, lng) tuples
    pub fn from_degrees(old: (f64, f64), new: (f64, f64)) -> Self {
        Self {
            old: Coordinate::new(old.0, old.1),
            new: Coordinate::new(new.0, new.1),
        }
    }

    /// True when the vehicle did not move at all
    pub fn is_stationary(&self) -> bool {
        self.old == self.new
    }
}

/// Wire shape of a movement: `{oldLat, oldLng, newLat, newLng}`
///
/// Every field is optional at the serde level so that a missing field is
/// reported as `InvalidInput` with its name instead of a generic parse error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementRecord {
    #[serde(default)]
    pub old_lat: Option<f64>,
    #[serde(default)]
    pub old_lng: Option<f64>,
    #[serde(default)]
    pub new_lat: Option<f64>,
    #[serde(default)]
    pub new_lng: Option<f64>,
}

impl MovementRecord {
    /// Validate presence and range of all four fields
    pub fn validate(&self) -> Result<Movement, EngineError> {
        let field = |value: Option<f64>, name: &str| {
            value.ok_or_else(|| EngineError::invalid_input(format!("missing field `{}`", name)))
        };

        let old = Coordinate::new(field(self.old_lat, "oldLat")?, field(self.old_lng, "oldLng")?);
        let new = Coordinate::new(field(self.new_lat, "newLat")?, field(self.new_lng, "newLng")?);

        for (name, c) in [("old", old), ("new", new)] {
            if !c.is_valid() {
                return Err(EngineError::invalid_input(format!(
                    "{} coordinate out of range: ({}, {})",
                    name, c.latitude, c.longitude
                )));
            }
        }

        Ok(Movement::new(old, new))
    }
}

impl From<Movement> for MovementRecord {
    fn from(m: Movement) -> Self {
        Self {
            old_lat: Some(m.old.latitude),
            old_lng: Some(m.old.longitude),
            new_lat: Some(m.new.latitude),
            new_lng: Some(m.new.longitude),
        }
    }
}

impl TryFrom<MovementRecord> for Movement {
    type Error = EngineError;

    fn try_from(record: MovementRecord) -> Result<Self, Self::Error> {
        record.validate()
    }
}
