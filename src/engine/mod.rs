pub mod assign;
pub mod candidates;
pub mod direction;
pub mod pipeline;

pub use assign::{Assignment, DEFAULT_THRESHOLD_KM, Match, MatchAssigner, assign};
pub use candidates::{HeadingFilter, find_candidates};
pub use direction::{DirectionStrategy, SectorWidth, classify_cardinal};
pub use pipeline::{
    EngineSettings, MatchOutcome, MatchRequest, OccupancyUpdate, apply_updates, process_request,
};
