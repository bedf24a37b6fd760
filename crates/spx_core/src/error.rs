use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("both clusters must be non-empty")]
    EmptyCluster,

    #[error("grid metadata not ready")]
    GridNotReady,

    #[error("invalid grid edges: {0}")]
    InvalidGrid(String),

    #[error("shape mismatch: expected {expected} values, found {found}")]
    ShapeMismatch { expected: usize, found: usize },

    #[error("time bin {bin} out of range (have {bins})")]
    TimeBinOutOfRange { bin: usize, bins: usize },

    #[error("backend error: {0}")]
    Backend(String),
}

impl ExplorerError {
    /// Whether the session can keep running with the previous display intact.
    pub fn is_recoverable(&self) -> bool {
        match self {
            ExplorerError::EmptyCluster => true,
            ExplorerError::GridNotReady => true,
            ExplorerError::Backend(_) => true,
            ExplorerError::TimeBinOutOfRange { .. } => true,
            ExplorerError::InvalidGrid(_) => false,
            ExplorerError::ShapeMismatch { .. } => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExplorerError>;
