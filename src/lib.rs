//! spotmatch - Infer parking spot occupancy from before/after GPS fixes

pub mod api;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod import;
pub mod repository;

pub use domain::{Coordinate, Direction, Movement, ParkingSpot, PartitionKey};
pub use engine::{
    DirectionStrategy, EngineSettings, Match, MatchOutcome, MatchRequest, apply_updates, assign,
    find_candidates, process_request,
};
pub use error::EngineError;
pub use geometry::TargetProjector;
pub use repository::{OccupancyWriter, SpotCatalog, SpotRepository};
