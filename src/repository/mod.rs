pub mod catalog;

pub use catalog::{SpotCatalog, StreetSpots};

use crate::domain::{ParkingSpot, PartitionKey};
use crate::error::EngineError;

/// Source of the spots in one partition
pub trait SpotRepository {
    /// All spots of a partition. NotFound when it is unknown or empty.
    fn fetch_spots(&self, key: &PartitionKey) -> Result<Vec<ParkingSpot>, EngineError>;
}

/// Sink for occupancy decisions
pub trait OccupancyWriter {
    /// Idempotent. NotFound when the id is not in the partition.
    fn set_occupied(
        &mut self,
        spot_id: i64,
        key: &PartitionKey,
        occupied: bool,
    ) -> Result<(), EngineError>;
}
