//! Domain-level error taxonomy for CrisisWatch.
//!
//! Environmental failures (a source that is down, a model that times out,
//! a response that will not parse) are absorbed inside the pipeline and
//! never appear here. What remains is caller input that cannot be acted on,
//! plus artifact I/O.

/// CrisisWatch domain errors.
#[derive(Debug, thiserror::Error)]
pub enum CrisisError {
    #[error("invalid region code: {0:?} (expected ISO 3166-1 alpha-3)")]
    InvalidRegion(String),

    #[error("invalid target population: {0} (must be at least 1)")]
    InvalidPopulation(i64),

    #[error("invalid funding split: shares sum to {sum}, expected 1.0")]
    InvalidFundingSplit { sum: f64 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("artifact not found: {0}")]
    ArtifactNotFound(String),

    #[error("digest mismatch: expected {expected}, got {actual}")]
    DigestMismatch { expected: String, actual: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CrisisError {
    /// Whether the error was caused by caller-supplied input.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidRegion(_)
                | Self::InvalidPopulation(_)
                | Self::InvalidFundingSplit { .. }
                | Self::InvalidConfig(_)
        )
    }
}

/// Result type for CrisisWatch domain operations.
pub type Result<T> = std::result::Result<T, CrisisError>;
