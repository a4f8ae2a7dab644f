use log::warn;
use serde::Deserialize;

use crate::domain::{Cardinal, Direction, PartitionKey, normalize_street};
use crate::error::EngineError;
use crate::repository::{SpotCatalog, StreetSpots};

/// Bulk spot file: `{"Street": [{"name": ..., "northernParkingspots": [...], ...}]}`
#[derive(Debug, Deserialize)]
pub struct BulkImport {
    #[serde(rename = "Street", default)]
    pub streets: Vec<StreetRecord>,
}

/// One street of the bulk file
#[derive(Debug, Deserialize)]
pub struct StreetRecord {
    pub name: String,
    #[serde(flatten)]
    pub spots: StreetSpots,
}

/// Counts from one import run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub streets: usize,
    pub spots: usize,
    pub skipped: usize,
}

pub fn parse_bulk_import(json: &str) -> Result<BulkImport, EngineError> {
    serde_json::from_str(json)
        .map_err(|e| EngineError::invalid_input(format!("malformed spot file: {}", e)))
}

/// Merge every street's directional spots into the catalog
///
/// # Algorithm
/// 1. Skip streets with a blank name
/// 2. For each of the four directions, keep spots with in-range coordinates
/// 3. Upsert them by id into the (street, direction) partition
pub fn import_into(catalog: &mut SpotCatalog, import: &BulkImport) -> ImportSummary {
    let mut summary = ImportSummary::default();

    for street in &import.streets {
        let Some(name) = normalize_street(Some(street.name.as_str())) else {
            warn!("Skipping street with empty name");
            summary.skipped += street.spots.len();
            continue;
        };

        for direction in Cardinal::ALL {
            let spots = street.spots.spots(direction);
            if spots.is_empty() {
                continue;
            }

            let (valid, invalid): (Vec<_>, Vec<_>) =
                spots.iter().cloned().partition(|s| s.location.is_valid());

            for spot in &invalid {
                warn!(
                    "Skipping spot {} on {}: coordinate out of range",
                    spot.id, name
                );
            }

            summary.skipped += invalid.len();

            let count = valid.len();
            let key = PartitionKey::new(Some(name.as_str()), Direction::Cardinal(direction));
            match catalog.insert_spots(&key, valid) {
                Ok(()) => summary.spots += count,
                Err(e) => {
                    warn!("Skipping {}: {}", key, e);
                    summary.skipped += count;
                }
            }
        }

        summary.streets += 1;
    }

    summary
}
