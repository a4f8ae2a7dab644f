use super::direction::SectorWidth;
use crate::domain::{Movement, ParkingSpot};
use crate::geometry::{bearing_deg, distance_km};

/// Angular alignment requirement between a movement and its candidate spots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadingFilter {
    pub width: SectorWidth,
    /// Maximum circular distance, in sectors, between the movement's heading
    /// and the heading from its origin to the spot
    pub tolerance: u16,
}

impl HeadingFilter {
    pub fn new(width: SectorWidth, tolerance: u16) -> Self {
        Self { width, tolerance }
    }
}

/// Filter a partition down to the spots a movement could plausibly have reached
///
/// # Algorithm
/// 1. Driven distance = haversine(old, new)
/// 2. Keep spots no farther from `old` than the driven distance
/// 3. With a heading filter, also drop spots whose heading from `old` is more
///    than `tolerance` sectors away from the movement's own heading
///
/// Output keeps the pool's order. A stationary movement only keeps spots
/// sitting exactly on its origin.
pub fn find_candidates(
    movement: &Movement,
    pool: &[ParkingSpot],
    heading: Option<HeadingFilter>,
) -> Vec<ParkingSpot> {
    let driven_km = distance_km(movement.old, movement.new);
    let movement_sector = heading.map(|filter| {
        let bearing = bearing_deg(movement.old, movement.new);
        (filter, filter.width.sector_for_bearing(bearing))
    });

    pool.iter()
        .filter(|spot| distance_km(movement.old, spot.location) <= driven_km)
        .filter(|spot| match movement_sector {
            Some((filter, sector)) => {
                let spot_sector = filter
                    .width
                    .sector_for_bearing(bearing_deg(movement.old, spot.location));
                filter.width.sector_distance(sector, spot_sector) <= filter.tolerance
            }
            None => true,
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(spots: &[ParkingSpot]) -> Vec<i64> {
        spots.iter().map(|s| s.id).collect()
    }

    #[test]
    fn test_short_hop_includes_nearby_spot() {
        let spot = ParkingSpot::new(1, 56.1700, 10.1880, false);
        let m = Movement::from_degrees((56.1700, 10.1879), (56.1701, 10.1880));

        let driven = distance_km(m.old, m.new);
        let to_spot = distance_km(m.old, spot.location);
        assert!(driven > 0.01 && driven < 0.02);
        assert!(to_spot < driven);

        let found = find_candidates(&m, &[spot.clone()], None);
        assert_eq!(found, vec![spot]);
    }

    #[test]
    fn test_spots_beyond_driven_distance_dropped() {
        let m = Movement::from_degrees((56.1700, 10.1880), (56.1710, 10.1880));
        let pool = vec![
            ParkingSpot::new(1, 56.1705, 10.1880, false),
            ParkingSpot::new(2, 56.1750, 10.1880, false),
            ParkingSpot::new(3, 56.1690, 10.1880, true),
        ];
        assert_eq!(ids(&find_candidates(&m, &pool, None)), vec![1, 3]);
    }

    #[test]
    fn test_stationary_movement_finds_nothing() {
        let m = Movement::from_degrees((56.17, 10.188), (56.17, 10.188));
        let pool = vec![
            ParkingSpot::new(1, 56.17001, 10.188, false),
            ParkingSpot::new(2, 56.16999, 10.18801, false),
        ];
        assert!(find_candidates(&m, &pool, None).is_empty());

        // Only a spot exactly on the origin survives
        let on_origin = vec![ParkingSpot::new(3, 56.17, 10.188, false)];
        assert_eq!(ids(&find_candidates(&m, &on_origin, None)), vec![3]);
    }

    #[test]
    fn test_pool_order_preserved() {
        let m = Movement::from_degrees((56.1700, 10.1880), (56.1710, 10.1880));
        let pool = vec![
            ParkingSpot::new(9, 56.1708, 10.1880, false),
            ParkingSpot::new(4, 56.1701, 10.1880, false),
            ParkingSpot::new(6, 56.1704, 10.1880, false),
        ];
        assert_eq!(ids(&find_candidates(&m, &pool, None)), vec![9, 4, 6]);
    }

    #[test]
    fn test_heading_filter_drops_spots_behind_and_beside() {
        let m = Movement::from_degrees((56.1700, 10.1880), (56.1710, 10.1880));
        let pool = vec![
            ParkingSpot::new(1, 56.1705, 10.1880, false), // ahead
            ParkingSpot::new(2, 56.1695, 10.1880, false), // behind
            ParkingSpot::new(3, 56.1700, 10.1889, false), // to the east
        ];

        assert_eq!(ids(&find_candidates(&m, &pool, None)), vec![1, 2, 3]);

        let filter = HeadingFilter::new(SectorWidth::new(20).unwrap(), 1);
        assert_eq!(ids(&find_candidates(&m, &pool, Some(filter))), vec![1]);
    }

    #[test]
    fn test_heading_filter_wraps_around_north() {
        // Heading ≈ 0°, spot slightly west of north ≈ 350° → one 10° sector away
        let m = Movement::from_degrees((56.1700, 10.1880), (56.1710, 10.1880));
        let spot = ParkingSpot::new(1, 56.1705, 10.18785, false);
        let filter = HeadingFilter::new(SectorWidth::new(10).unwrap(), 1);
        assert_eq!(ids(&find_candidates(&m, &[spot], Some(filter))), vec![1]);
    }
}
