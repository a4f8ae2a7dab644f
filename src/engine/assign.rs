use log::debug;
use serde::Serialize;

use crate::domain::{Coordinate, Movement, ParkingSpot};
use crate::geometry::{TargetProjector, distance_km};

/// Maximum projected-target-to-spot distance for a match (10 m)
pub const DEFAULT_THRESHOLD_KM: f64 = 0.01;

/// One movement and the spot it was paired with, if any
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub movement: Movement,
    /// Estimated stopping point the spot was compared against
    pub target: Coordinate,
    pub spot: Option<ParkingSpot>,
    pub distance_km: Option<f64>,
}

impl Match {
    pub fn is_matched(&self) -> bool {
        self.spot.is_some()
    }
}

/// Result of one assignment pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assignment {
    /// Exactly one entry per input movement, in input order
    pub matches: Vec<Match>,
    /// Candidates left in the pool after every movement was considered
    pub unassigned: Vec<ParkingSpot>,
}

/// Greedy nearest-candidate matcher
///
/// Movements are handled in input order; each takes the closest remaining
/// candidate to its projected target that lies strictly under the threshold,
/// and that candidate leaves the pool. Equal distances keep the first candidate
/// in pool order. This is not a minimum-cost bipartite matching: an early
/// movement can take a spot a later one needed more.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchAssigner {
    projector: TargetProjector,
    threshold_km: f64,
}

impl Default for MatchAssigner {
    fn default() -> Self {
        Self::new(TargetProjector::default(), DEFAULT_THRESHOLD_KM)
    }
}

impl MatchAssigner {
    pub fn new(projector: TargetProjector, threshold_km: f64) -> Self {
        Self {
            projector,
            threshold_km,
        }
    }

    pub fn threshold_km(&self) -> f64 {
        self.threshold_km
    }

    pub fn projector(&self) -> &TargetProjector {
        &self.projector
    }

    pub fn assign(&self, movements: &[Movement], candidates: &[ParkingSpot]) -> Assignment {
        // Tombstones over the immutable candidate list
        let mut used = vec![false; candidates.len()];
        let mut matches = Vec::with_capacity(movements.len());

        for movement in movements {
            let target = self.projector.project(movement);
            let mut best: Option<(usize, f64)> = None;

            for (i, candidate) in candidates.iter().enumerate() {
                if used[i] {
                    continue;
                }
                let d = distance_km(target, candidate.location);
                if d < self.threshold_km && best.is_none_or(|(_, best_d)| d < best_d) {
                    best = Some((i, d));
                }
            }

            if let Some((i, d)) = best {
                used[i] = true;
                debug!(
                    "Movement ending at ({:.6}, {:.6}) matched spot {} at {:.1}m",
                    movement.new.latitude,
                    movement.new.longitude,
                    candidates[i].id,
                    d * 1000.0
                );
            } else {
                debug!(
                    "Movement ending at ({:.6}, {:.6}) left unmatched",
                    movement.new.latitude, movement.new.longitude
                );
            }

            matches.push(Match {
                movement: *movement,
                target,
                spot: best.map(|(i, _)| candidates[i].clone()),
                distance_km: best.map(|(_, d)| d),
            });
        }

        let unassigned = candidates
            .iter()
            .zip(&used)
            .filter(|(_, used)| !**used)
            .map(|(spot, _)| spot.clone())
            .collect();

        Assignment {
            matches,
            unassigned,
        }
    }
}

/// Greedy assignment with the default target projection
pub fn assign(movements: &[Movement], candidates: &[ParkingSpot], threshold_km: f64) -> Vec<Match> {
    MatchAssigner::new(TargetProjector::default(), threshold_km)
        .assign(movements, candidates)
        .matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// Northbound hop whose projected target lands ~0.3m from (56.1700, 10.1880)
    fn parked_next_to_spot() -> Movement {
        Movement::from_degrees((56.16988, 10.18797), (56.16998, 10.18797))
    }

    #[test]
    fn test_matches_spot_near_target() {
        let spot = ParkingSpot::new(1, 56.1700, 10.1880, false);
        let matches = assign(&[parked_next_to_spot()], &[spot.clone()], DEFAULT_THRESHOLD_KM);

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].spot, Some(spot));
        assert!(matches[0].distance_km.unwrap() < 0.001);
    }

    #[test]
    fn test_first_movement_wins_shared_spot() {
        let spot = ParkingSpot::new(1, 56.1700, 10.1880, false);
        let movements = [parked_next_to_spot(), parked_next_to_spot()];
        let matches = assign(&movements, &[spot.clone()], DEFAULT_THRESHOLD_KM);

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].spot, Some(spot));
        assert_eq!(matches[1].spot, None);
        assert!(!matches[1].is_matched());
    }

    #[test]
    fn test_short_hop_target_lands_outside_default_threshold() {
        // 12.7m hop whose candidate spot sits ~11.5m from the projected stop
        let spot = ParkingSpot::new(1, 56.1700, 10.1880, false);
        let hop = Movement::from_degrees((56.1700, 10.1879), (56.1701, 10.1880));
        let candidates = crate::engine::find_candidates(&hop, &[spot.clone()], None);
        assert_eq!(candidates, vec![spot.clone()]);

        let matches = assign(&[hop], &candidates, DEFAULT_THRESHOLD_KM);
        assert!(!matches[0].is_matched());
        let gap = distance_km(matches[0].target, spot.location);
        assert!(gap > 0.011 && gap < 0.012, "gap {}", gap);

        let loose = assign(&[hop], &candidates, 0.015);
        assert_eq!(loose[0].spot, Some(spot));
    }

    #[test]
    fn test_nothing_under_threshold_is_unmatched() {
        let far = ParkingSpot::new(1, 56.1710, 10.1880, false);
        let matches = assign(&[parked_next_to_spot()], &[far], DEFAULT_THRESHOLD_KM);
        assert_eq!(matches[0].spot, None);
        assert_eq!(matches[0].distance_km, None);
    }

    #[test]
    fn test_equal_distance_keeps_first_candidate() {
        let a = ParkingSpot::new(10, 56.1700, 10.1880, false);
        let b = ParkingSpot::new(20, 56.1700, 10.1880, false);
        let movements = [parked_next_to_spot(), parked_next_to_spot()];
        let matches = assign(&movements, &[a, b], DEFAULT_THRESHOLD_KM);

        assert_eq!(matches[0].spot.as_ref().map(|s| s.id), Some(10));
        assert_eq!(matches[1].spot.as_ref().map(|s| s.id), Some(20));
    }

    #[test]
    fn test_picks_nearest_candidate() {
        let near = ParkingSpot::new(1, 56.1700, 10.1880, false);
        let farther = ParkingSpot::new(2, 56.17003, 10.18801, false);
        let matches = assign(&[parked_next_to_spot()], &[farther, near], DEFAULT_THRESHOLD_KM);
        assert_eq!(matches[0].spot.as_ref().map(|s| s.id), Some(1));
    }

    #[test]
    fn test_exclusivity_and_threshold_over_grid() {
        let candidates: Vec<ParkingSpot> = (0..12)
            .map(|i| ParkingSpot::new(i, 56.1700 + i as f64 * 0.00003, 10.1880, false))
            .collect();
        let movements: Vec<Movement> = (0..20)
            .map(|i| {
                let lat = 56.16990 + i as f64 * 0.00002;
                Movement::from_degrees((lat - 0.0001, 10.18797), (lat, 10.18797))
            })
            .collect();

        let assigner = MatchAssigner::default();
        let result = assigner.assign(&movements, &candidates);
        assert_eq!(result.matches.len(), movements.len());

        let mut seen = HashSet::new();
        for m in &result.matches {
            if let Some(spot) = &m.spot {
                assert!(seen.insert(spot.id), "spot {} assigned twice", spot.id);
                assert!(distance_km(m.target, spot.location) < assigner.threshold_km());
            }
        }
        assert!(!seen.is_empty());
        assert_eq!(seen.len() + result.unassigned.len(), candidates.len());
        assert!(result.unassigned.iter().all(|s| !seen.contains(&s.id)));
    }

    #[test]
    fn test_custom_projection_and_threshold() {
        let spot = ParkingSpot::new(1, 56.16998, 10.18797, false);
        // No offset: target is the raw endpoint, right on the spot
        let assigner = MatchAssigner::new(TargetProjector::new(0.0, 0.0), 0.0005);
        let result = assigner.assign(&[parked_next_to_spot()], &[spot]);
        assert!(result.matches[0].is_matched());
        assert!(result.unassigned.is_empty());
    }
}
