use super::geomath::meters_to_degrees;
use crate::domain::{Coordinate, Movement};

/// Lateral offset of a parking spot from the travelled lane, in meters.
/// Negative is to the right of the direction of travel.
pub const LATERAL_OFFSET_M: f64 = -2.0;

/// Distance a vehicle rolls past its last GPS fix before stopping, in meters
pub const FORWARD_OFFSET_M: f64 = 2.0;

/// Estimates where a vehicle actually stopped from its last two fixes
///
/// GPS fixes sit on the road while spots sit beside it, so the raw endpoint is
/// shifted by a constant physical offset:
/// - sideways, perpendicular to the movement vector, by `lateral_offset_m`
/// - then along the movement vector by `forward_offset_m`
///
/// The movement angle is taken in degree space (`atan2(Δlat, Δlng)`) and the
/// offsets are converted to degrees at the new fix's latitude. Good enough for
/// the few meters involved, not a geodesic construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetProjector {
    lateral_offset_m: f64,
    forward_offset_m: f64,
}

impl Default for TargetProjector {
    fn default() -> Self {
        Self::new(LATERAL_OFFSET_M, FORWARD_OFFSET_M)
    }
}

impl TargetProjector {
    pub fn new(lateral_offset_m: f64, forward_offset_m: f64) -> Self {
        Self {
            lateral_offset_m,
            forward_offset_m,
        }
    }

    /// Project a movement to its estimated stopping point
    pub fn project(&self, movement: &Movement) -> Coordinate {
        let scale = meters_to_degrees(movement.new.latitude);

        let d_lat = movement.new.latitude - movement.old.latitude;
        let d_lng = movement.new.longitude - movement.old.longitude;
        let movement_angle = d_lat.atan2(d_lng);
        let perpendicular_angle = movement_angle + std::f64::consts::FRAC_PI_2;

        // Sideways step
        let offset_lng = movement.new.longitude
            + perpendicular_angle.cos() * self.lateral_offset_m * scale.per_lng_deg;
        let offset_lat = movement.new.latitude
            + perpendicular_angle.sin() * self.lateral_offset_m * scale.per_lat_deg;

        // Forward step
        let target_lng =
            offset_lng + movement_angle.cos() * self.forward_offset_m * scale.per_lng_deg;
        let target_lat =
            offset_lat + movement_angle.sin() * self.forward_offset_m * scale.per_lat_deg;

        Coordinate::new(target_lat, target_lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::distance_km;

    #[test]
    fn test_northbound_offsets_east_and_north() {
        let m = Movement::from_degrees((56.1690, 10.1880), (56.1700, 10.1880));
        let target = TargetProjector::default().project(&m);

        // Right of a northbound vehicle is east
        assert!(target.longitude > m.new.longitude);
        assert!(target.latitude > m.new.latitude);

        // 2m + 2m on perpendicular axes ≈ 2.83m
        let d = distance_km(m.new, target) * 1000.0;
        assert!((d - 8.0_f64.sqrt()).abs() < 0.05);
    }

    #[test]
    fn test_eastbound_offsets_south_and_east() {
        let m = Movement::from_degrees((56.17, 10.1870), (56.17, 10.1880));
        let target = TargetProjector::default().project(&m);

        assert!(target.latitude < m.new.latitude);
        assert!(target.longitude > m.new.longitude);
    }

    #[test]
    fn test_zero_offsets_return_endpoint() {
        let m = Movement::from_degrees((56.1690, 10.1870), (56.1700, 10.1880));
        let target = TargetProjector::new(0.0, 0.0).project(&m);
        assert_eq!(target, m.new);
    }

    #[test]
    fn test_forward_only_moves_along_heading() {
        let m = Movement::from_degrees((10.0, 10.0), (9.999, 10.0));
        let target = TargetProjector::new(0.0, 5.0).project(&m);

        assert!(target.latitude < m.new.latitude);
        assert!((target.longitude - m.new.longitude).abs() < 1e-12);
        let d = distance_km(m.new, target) * 1000.0;
        assert!((d - 5.0).abs() < 0.05);
    }
}
