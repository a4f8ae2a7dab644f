pub mod snapping;

pub use snapping::{OsrmSnapper, RoadSnapper};
