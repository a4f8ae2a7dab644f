pub mod geomath;
pub mod projection;

pub use geomath::{DegreeScale, bearing_deg, distance_km, meters_to_degrees, normalize_degrees};
pub use projection::{FORWARD_OFFSET_M, LATERAL_OFFSET_M, TargetProjector};
