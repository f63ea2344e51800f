//! Parse errors for domain types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid candidate id: {0}")]
    InvalidCandidateId(String),

    #[error("invalid voter id: {0}")]
    InvalidVoterId(String),

    #[error("unknown sex category: {0}")]
    UnknownSex(String),
}
