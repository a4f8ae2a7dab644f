//! Movement → direction label, in either cardinal-quadrant or sector-heading mode

use crate::domain::{Cardinal, Direction, Movement};
use crate::error::EngineError;
use crate::geometry::{bearing_deg, normalize_degrees};

/// Angular width of a heading sector, in whole degrees dividing 360
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectorWidth(u16);

impl Default for SectorWidth {
    fn default() -> Self {
        SectorWidth(20)
    }
}

impl SectorWidth {
    pub fn new(degrees: u16) -> Result<Self, EngineError> {
        if degrees == 0 || 360 % degrees != 0 {
            return Err(EngineError::Config(format!(
                "sector width must divide 360, got {}",
                degrees
            )));
        }
        Ok(SectorWidth(degrees))
    }

    /// Number of sectors around the compass
    pub fn sector_count(self) -> u16 {
        360 / self.0
    }

    /// Round a bearing to the nearest sector boundary and return its id
    ///
    /// Bearings near 360 round up to 360 and wrap to sector 0.
    pub fn sector_for_bearing(self, bearing: f64) -> u16 {
        let width = self.0 as f64;
        let rounded = normalize_degrees((bearing / width).round() * width);
        (rounded / width) as u16 % self.sector_count()
    }

    /// Circular distance between two sector ids, in sectors
    pub fn sector_distance(self, a: u16, b: u16) -> u16 {
        let n = self.sector_count();
        let d = a.abs_diff(b) % n;
        d.min(n - d)
    }
}

/// How a movement is turned into a partition direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DirectionStrategy {
    /// north/south/east/west by dominant axis delta
    #[default]
    Cardinal,
    /// Initial bearing quantized to fixed-width sectors
    Sector(SectorWidth),
}

impl DirectionStrategy {
    pub fn classify(&self, movement: &Movement) -> Direction {
        match self {
            DirectionStrategy::Cardinal => Direction::Cardinal(classify_cardinal(movement)),
            DirectionStrategy::Sector(width) => {
                Direction::Sector(width.sector_for_bearing(bearing_deg(movement.old, movement.new)))
            }
        }
    }

    pub fn sector_width(&self) -> Option<SectorWidth> {
        match self {
            DirectionStrategy::Cardinal => None,
            DirectionStrategy::Sector(width) => Some(*width),
        }
    }
}

/// Dominant-axis classification. Ties (including a stationary movement)
/// fall through to the east/west branch.
pub fn classify_cardinal(movement: &Movement) -> Cardinal {
    let d_lat = movement.new.latitude - movement.old.latitude;
    let d_lng = movement.new.longitude - movement.old.longitude;

    if d_lat.abs() > d_lng.abs() {
        if d_lat > 0.0 {
            Cardinal::North
        } else {
            Cardinal::South
        }
    } else if d_lng > 0.0 {
        Cardinal::East
    } else {
        Cardinal::West
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sector(width: u16) -> SectorWidth {
        SectorWidth::new(width).unwrap()
    }

    #[test]
    fn test_cardinal_quadrants() {
        let cases = [
            ((56.17, 10.188), (56.18, 10.188), Cardinal::North),
            ((56.17, 10.188), (56.16, 10.1885), Cardinal::South),
            ((56.17, 10.188), (56.1701, 10.19), Cardinal::East),
            ((56.17, 10.188), (56.1701, 10.18), Cardinal::West),
        ];
        for (old, new, expected) in cases {
            let m = Movement::from_degrees(old, new);
            assert_eq!(classify_cardinal(&m), expected);
            // same answer every call
            assert_eq!(classify_cardinal(&m), classify_cardinal(&m));
        }
    }

    #[test]
    fn test_cardinal_tie_uses_longitude() {
        let east = Movement::from_degrees((1.0, 1.0), (1.5, 1.5));
        assert_eq!(classify_cardinal(&east), Cardinal::East);
        let west = Movement::from_degrees((1.0, 1.0), (1.5, 0.5));
        assert_eq!(classify_cardinal(&west), Cardinal::West);
        let still = Movement::from_degrees((1.0, 1.0), (1.0, 1.0));
        assert_eq!(classify_cardinal(&still), Cardinal::West);
    }

    #[test]
    fn test_sector_width_must_divide_360() {
        assert!(SectorWidth::new(10).is_ok());
        assert!(SectorWidth::new(20).is_ok());
        assert!(matches!(SectorWidth::new(0), Err(EngineError::Config(_))));
        assert!(matches!(SectorWidth::new(7), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_sector_rounding() {
        let w = sector(20);
        assert_eq!(w.sector_for_bearing(0.0), 0);
        assert_eq!(w.sector_for_bearing(9.9), 0);
        assert_eq!(w.sector_for_bearing(10.1), 1);
        assert_eq!(w.sector_for_bearing(95.0), 5);
        assert_eq!(w.sector_for_bearing(355.0), 0);
        assert_eq!(w.sector_for_bearing(360.0), w.sector_for_bearing(0.0));
    }

    #[test]
    fn test_sector_coverage() {
        for width in [10, 20, 30, 45, 90] {
            let w = sector(width);
            let mut bearing = 0.0;
            while bearing < 360.0 {
                assert!(w.sector_for_bearing(bearing) < w.sector_count());
                bearing += 0.37;
            }
        }
    }

    #[test]
    fn test_sector_distance_wraps() {
        let w = sector(10);
        assert_eq!(w.sector_distance(0, 35), 1);
        assert_eq!(w.sector_distance(35, 0), 1);
        assert_eq!(w.sector_distance(5, 9), 4);
        assert_eq!(w.sector_distance(0, 18), 18);
        assert_eq!(w.sector_distance(7, 7), 0);
    }

    #[test]
    fn test_sector_strategy_classifies_bearing() {
        let strategy = DirectionStrategy::Sector(sector(10));
        // Due east ≈ 90° → sector 9
        let m = Movement::from_degrees((56.17, 10.18), (56.17, 10.19));
        assert_eq!(strategy.classify(&m), Direction::Sector(9));
        // Due south → 180° → sector 18
        let m = Movement::from_degrees((56.17, 10.18), (56.16, 10.18));
        assert_eq!(strategy.classify(&m), Direction::Sector(18));
    }
}
