pub mod coordinate;
pub mod direction;
pub mod movement;
pub mod spot;

pub use coordinate::Coordinate;
pub use direction::{Cardinal, Direction, PartitionKey, normalize_street};
pub use movement::{Movement, MovementRecord};
pub use spot::{ParkingSpot, toggle_occupancy};
