use thiserror::Error;

use crate::fan_out::FanOutError;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("store error: {0}")]
    Store(#[from] tally_store::StoreError),

    #[error(transparent)]
    FanOut(#[from] FanOutError),

    #[error("vote count must be a positive integer, got '{0}'")]
    InvalidVoteCount(String),

    #[error("render error: {0}")]
    Render(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}

impl NodeError {
    /// Whether the failure came from a store that is temporarily unreachable.
    pub fn is_unavailable(&self) -> bool {
        match self {
            NodeError::Store(e) => e.is_retryable(),
            NodeError::FanOut(e) => e.failures().iter().all(|f| f.error.is_retryable()),
            _ => false,
        }
    }
}
