use thiserror::Error;

/// Errors reported by the matching engine and its collaborators
///
/// The geometry itself is total; every variant here describes a problem with
/// the inputs handed to the engine or with a collaborator that supplies them.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Missing or malformed request data. Surfaced to the caller, never retried.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Unknown partition, or a spot id that is no longer in the repository.
    #[error("not found: {0}")]
    NotFound(String),

    /// A road-snapping or repository call failed; the whole request is aborted.
    #[error("upstream failure: {0}")]
    UpstreamFailure(String),

    /// Engine configuration that cannot be used (e.g. a sector width not dividing 360)
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl EngineError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        EngineError::InvalidInput(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        EngineError::NotFound(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, EngineError::NotFound(_))
    }
}
