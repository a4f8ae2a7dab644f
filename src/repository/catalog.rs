//! JSON-file spot catalog
//!
//! Street partitions are stored per lower-cased street name and direction
//! label (`northern`, ..., or a sector id). Street-less sector partitions live
//! in their own map.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::{OccupancyWriter, SpotRepository};
use crate::domain::{
    Cardinal, Direction, ParkingSpot, PartitionKey, normalize_street, toggle_occupancy,
};
use crate::error::EngineError;

/// Directional spot lists of one street, in the bulk-import/listing layout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreetSpots {
    #[serde(rename = "northernParkingspots", default)]
    pub northern: Vec<ParkingSpot>,
    #[serde(rename = "southernParkingspots", default)]
    pub southern: Vec<ParkingSpot>,
    #[serde(rename = "easternParkingspots", default)]
    pub eastern: Vec<ParkingSpot>,
    #[serde(rename = "westernParkingspots", default)]
    pub western: Vec<ParkingSpot>,
}

impl StreetSpots {
    pub fn spots(&self, direction: Cardinal) -> &[ParkingSpot] {
        match direction {
            Cardinal::North => &self.northern,
            Cardinal::South => &self.southern,
            Cardinal::East => &self.eastern,
            Cardinal::West => &self.western,
        }
    }

    fn spots_mut(&mut self, direction: Cardinal) -> &mut Vec<ParkingSpot> {
        match direction {
            Cardinal::North => &mut self.northern,
            Cardinal::South => &mut self.southern,
            Cardinal::East => &mut self.eastern,
            Cardinal::West => &mut self.western,
        }
    }

    pub fn len(&self) -> usize {
        Cardinal::ALL.iter().map(|&c| self.spots(c).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpotCatalog {
    /// street → direction label → spots
    #[serde(default)]
    streets: BTreeMap<String, BTreeMap<String, Vec<ParkingSpot>>>,
    /// sector id → spots, for partitions without a street
    #[serde(default)]
    sectors: BTreeMap<u16, Vec<ParkingSpot>>,
}

impl SpotCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog file. A missing file is an empty catalog.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .context(format!("Failed to read catalog file: {:?}", path))?;
        serde_json::from_str(&contents).context(format!("Failed to parse catalog file: {:?}", path))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize catalog")?;
        std::fs::write(path, json).context(format!("Failed to write catalog file: {:?}", path))
    }

    /// Add spots to a partition, creating it if needed
    ///
    /// A spot whose id already exists in the partition replaces the stored
    /// one, new ids are appended. Cardinal partitions need a street.
    pub fn insert_spots(
        &mut self,
        key: &PartitionKey,
        spots: impl IntoIterator<Item = ParkingSpot>,
    ) -> Result<(), EngineError> {
        let partition = match (&key.street, key.direction) {
            (Some(street), direction) => self
                .streets
                .entry(street.clone())
                .or_default()
                .entry(direction.partition_label())
                .or_default(),
            (None, Direction::Sector(id)) => self.sectors.entry(id).or_default(),
            (None, Direction::Cardinal(c)) => {
                return Err(EngineError::invalid_input(format!(
                    "{} partition needs a street name",
                    c.partition_label()
                )));
            }
        };
        for spot in spots {
            match partition.iter_mut().find(|s| s.id == spot.id) {
                Some(existing) => *existing = spot,
                None => partition.push(spot),
            }
        }
        Ok(())
    }

    pub fn partition(&self, key: &PartitionKey) -> Option<&[ParkingSpot]> {
        match (&key.street, key.direction) {
            (None, Direction::Sector(id)) => self.sectors.get(&id).map(Vec::as_slice),
            (None, Direction::Cardinal(_)) => None,
            (Some(street), direction) => self
                .streets
                .get(street)
                .and_then(|partitions| partitions.get(&direction.partition_label()))
                .map(Vec::as_slice),
        }
    }

    fn partition_mut(&mut self, key: &PartitionKey) -> Option<&mut Vec<ParkingSpot>> {
        match (&key.street, key.direction) {
            (None, Direction::Sector(id)) => self.sectors.get_mut(&id),
            (None, Direction::Cardinal(_)) => None,
            (Some(street), direction) => self
                .streets
                .get_mut(street)
                .and_then(|partitions| partitions.get_mut(&direction.partition_label())),
        }
    }

    /// Total number of spots across every partition
    pub fn len(&self) -> usize {
        self.streets
            .values()
            .flat_map(|p| p.values())
            .chain(self.sectors.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flip the first spot with `id` found in any partition of `street`
    ///
    /// Returns the new occupancy state.
    pub fn toggle_spot(&mut self, street: &str, id: i64) -> Result<bool, EngineError> {
        let street = normalize_street(Some(street))
            .ok_or_else(|| EngineError::invalid_input("street name is empty"))?;

        let spot = self
            .streets
            .get_mut(&street)
            .into_iter()
            .flat_map(|partitions| partitions.values_mut())
            .flat_map(|spots| spots.iter_mut())
            .find(|spot| spot.id == id)
            .ok_or_else(|| EngineError::not_found(format!("parking spot {} in {}", id, street)))?;

        spot.occupied = toggle_occupancy(spot.occupied);
        Ok(spot.occupied)
    }

    /// Spots per street in the four-direction listing layout.
    /// Sector partitions of a street are not part of this view.
    pub fn listing(&self) -> BTreeMap<String, StreetSpots> {
        self.streets
            .iter()
            .map(|(street, partitions)| {
                let mut listing = StreetSpots::default();
                for c in Cardinal::ALL {
                    if let Some(spots) = partitions.get(c.partition_label()) {
                        listing.spots_mut(c).extend(spots.iter().cloned());
                    }
                }
                (street.clone(), listing)
            })
            .collect()
    }

    /// Spots of the street-less sector partitions
    pub fn sector_listing(&self) -> &BTreeMap<u16, Vec<ParkingSpot>> {
        &self.sectors
    }
}

impl SpotRepository for SpotCatalog {
    fn fetch_spots(&self, key: &PartitionKey) -> Result<Vec<ParkingSpot>, EngineError> {
        match self.partition(key) {
            Some(spots) if !spots.is_empty() => Ok(spots.to_vec()),
            _ => Err(EngineError::not_found(format!("no parking spots in {}", key))),
        }
    }
}

impl OccupancyWriter for SpotCatalog {
    fn set_occupied(
        &mut self,
        spot_id: i64,
        key: &PartitionKey,
        occupied: bool,
    ) -> Result<(), EngineError> {
        let spot = self
            .partition_mut(key)
            .and_then(|spots| spots.iter_mut().find(|s| s.id == spot_id))
            .ok_or_else(|| {
                EngineError::not_found(format!("parking spot {} in {}", spot_id, key))
            })?;
        spot.occupied = occupied;
        Ok(())
    }
}
