//! End-to-end matching for one request: classify, fetch, filter, assign

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::assign::{Match, MatchAssigner};
use super::candidates::{HeadingFilter, find_candidates};
use super::direction::DirectionStrategy;
use crate::api::RoadSnapper;
use crate::domain::{Direction, Movement, MovementRecord, ParkingSpot, PartitionKey};
use crate::error::EngineError;
use crate::geometry::distance_km;
use crate::repository::{OccupancyWriter, SpotRepository};

/// Everything the engine needs to know about a deployment
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EngineSettings {
    pub strategy: DirectionStrategy,
    /// Heading tolerance in sectors; only used with a sector strategy
    pub heading_tolerance: Option<u16>,
    pub assigner: MatchAssigner,
}

impl EngineSettings {
    pub fn heading_filter(&self) -> Option<HeadingFilter> {
        match (self.strategy.sector_width(), self.heading_tolerance) {
            (Some(width), Some(tolerance)) => Some(HeadingFilter::new(width, tolerance)),
            _ => None,
        }
    }
}

/// Incoming request: the primary movement's fields at top level plus the
/// movements of registered cars to match against its candidates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequest {
    #[serde(flatten)]
    pub primary: MovementRecord,
    #[serde(default)]
    pub registered_cars: Option<Vec<MovementRecord>>,
    /// Street partition; absent for global sector partitions
    #[serde(default)]
    pub street: Option<String>,
}

impl MatchRequest {
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        serde_json::from_str(json)
            .map_err(|e| EngineError::invalid_input(format!("malformed request: {}", e)))
    }

    /// Validate every movement, returning (primary, registered)
    pub fn validate(&self) -> Result<(Movement, Vec<Movement>), EngineError> {
        let primary = self.primary.validate()?;
        let registered = self
            .registered_cars
            .as_ref()
            .ok_or_else(|| EngineError::invalid_input("missing field `registeredCars`"))?
            .iter()
            .enumerate()
            .map(|(i, record)| {
                record.validate().map_err(|e| match e {
                    EngineError::InvalidInput(msg) => {
                        EngineError::InvalidInput(format!("registeredCars[{}]: {}", i, msg))
                    }
                    other => other,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok((primary, registered))
    }
}

/// New occupancy state for one spot
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupancyUpdate {
    pub spot_id: i64,
    pub partition: PartitionKey,
    pub occupied: bool,
}

/// Everything decided for one request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchOutcome {
    pub direction: Direction,
    pub partition: PartitionKey,
    pub driven_distance_km: f64,
    pub candidates: Vec<ParkingSpot>,
    pub matches: Vec<Match>,
    /// Unmatched candidates become free, matched spots become occupied
    pub updates: Vec<OccupancyUpdate>,
}

/// Run one request through the engine
///
/// # Algorithm
/// 1. Validate the request (InvalidInput on any missing/out-of-range field)
/// 2. Road-snap every movement if a snapper is given (UpstreamFailure aborts)
/// 3. Classify the primary movement into a partition direction
/// 4. Fetch that partition (NotFound propagates)
/// 5. Filter candidates for the primary movement
/// 6. Assign registered movements to candidates
/// 7. Emit occupancy updates
pub fn process_request<R>(
    request: &MatchRequest,
    settings: &EngineSettings,
    repository: &R,
    snapper: Option<&dyn RoadSnapper>,
) -> Result<MatchOutcome, EngineError>
where
    R: SpotRepository + ?Sized,
{
    let (mut primary, mut registered) = request.validate()?;

    if let Some(snapper) = snapper {
        let (snapped_primary, snapped_registered) = snap_all(snapper, primary, registered)?;
        primary = snapped_primary;
        registered = snapped_registered;
    }

    if primary.is_stationary() {
        info!("Primary movement has identical old and new coordinates");
    }

    let direction = settings.strategy.classify(&primary);
    let partition = PartitionKey::new(request.street.as_deref(), direction);
    debug!("Detected movement direction {} -> partition {}", direction, partition);

    let pool = repository.fetch_spots(&partition)?;
    let candidates = find_candidates(&primary, &pool, settings.heading_filter());
    debug!(
        "Candidate spots in {}: {:?}",
        partition,
        candidates.iter().map(|s| s.id).collect::<Vec<_>>()
    );

    let assignment = settings.assigner.assign(&registered, &candidates);

    let updates = assignment
        .unassigned
        .iter()
        .map(|spot| (spot, false))
        .chain(
            assignment
                .matches
                .iter()
                .filter_map(|m| m.spot.as_ref())
                .map(|spot| (spot, true)),
        )
        .map(|(spot, occupied)| OccupancyUpdate {
            spot_id: spot.id,
            partition: partition.clone(),
            occupied,
        })
        .collect();

    Ok(MatchOutcome {
        direction,
        driven_distance_km: distance_km(primary.old, primary.new),
        partition,
        candidates,
        matches: assignment.matches,
        updates,
    })
}

fn snap_all(
    snapper: &dyn RoadSnapper,
    primary: Movement,
    registered: Vec<Movement>,
) -> Result<(Movement, Vec<Movement>), EngineError> {
    let mut all = Vec::with_capacity(registered.len() + 1);
    all.push(primary);
    all.extend(registered);

    let snapped = snapper.snap(&all)?;
    if snapped.len() != all.len() {
        return Err(EngineError::UpstreamFailure(format!(
            "road snapping returned {} movements for {}",
            snapped.len(),
            all.len()
        )));
    }

    let mut iter = snapped.into_iter();
    match iter.next() {
        Some(primary) => Ok((primary, iter.collect())),
        None => Err(EngineError::UpstreamFailure(
            "road snapping returned no movements".to_string(),
        )),
    }
}

/// Persist occupancy updates. Missing spots are logged and skipped; any other
/// failure aborts. Returns the number of updates written.
pub fn apply_updates<W>(writer: &mut W, updates: &[OccupancyUpdate]) -> Result<usize, EngineError>
where
    W: OccupancyWriter + ?Sized,
{
    let mut applied = 0;

    for update in updates {
        match writer.set_occupied(update.spot_id, &update.partition, update.occupied) {
            Ok(()) => {
                debug!(
                    "Updated parking spot {} occupancy to {} in {}",
                    update.spot_id, update.occupied, update.partition
                );
                applied += 1;
            }
            Err(e) if e.is_not_found() => {
                warn!("Skipping spot {}: {}", update.spot_id, e);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(applied)
}
