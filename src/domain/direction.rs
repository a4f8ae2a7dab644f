use serde::{Deserialize, Serialize};
use std::fmt;

/// Dominant-axis travel direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinal {
    North,
    South,
    East,
    West,
}

impl Cardinal {
    pub const ALL: [Cardinal; 4] = [
        Cardinal::North,
        Cardinal::South,
        Cardinal::East,
        Cardinal::West,
    ];

    /// Name of the catalog partition holding spots for this direction
    pub fn partition_label(&self) -> &'static str {
        match self {
            Cardinal::North => "northern",
            Cardinal::South => "southern",
            Cardinal::East => "eastern",
            Cardinal::West => "western",
        }
    }

    pub fn from_partition_label(label: &str) -> Option<Cardinal> {
        Cardinal::ALL
            .into_iter()
            .find(|c| c.partition_label() == label)
    }
}

/// Discrete direction label derived from a movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Cardinal(Cardinal),
    /// Sector id in `0..360/width`
    Sector(u16),
}

impl Direction {
    pub fn partition_label(&self) -> String {
        match self {
            Direction::Cardinal(c) => c.partition_label().to_string(),
            Direction::Sector(id) => id.to_string(),
        }
    }

    /// Inverse of `partition_label`
    pub fn from_partition_label(label: &str) -> Option<Direction> {
        Cardinal::from_partition_label(label)
            .map(Direction::Cardinal)
            .or_else(|| label.parse().ok().map(Direction::Sector))
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.partition_label())
    }
}

/// Identity of a group of spots: an optional street plus a direction.
///
/// Street names are stored lower-cased and trimmed; an empty name means the
/// global (street-less) sector partitions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartitionKey {
    pub street: Option<String>,
    pub direction: Direction,
}

impl PartitionKey {
    pub fn new(street: Option<&str>, direction: Direction) -> Self {
        Self {
            street: normalize_street(street),
            direction,
        }
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.street {
            Some(street) => write!(f, "{}/{}", street, self.direction),
            None => write!(f, "sector/{}", self.direction),
        }
    }
}

pub fn normalize_street(street: Option<&str>) -> Option<String> {
    street
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
}
