//! Reasons a vote submission is turned away.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A vote submission that failed validation.
///
/// Variants are listed in the order the checks run; the first failing check
/// wins. Rejections are shown to the voter, they are not errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    MissingCandidate,
    MissingKeyword,
    UnknownCandidate,
    InvalidVoter,
    AllowanceExceeded,
}

impl Rejection {
    pub const ALL: [Rejection; 5] = [
        Rejection::MissingCandidate,
        Rejection::MissingKeyword,
        Rejection::UnknownCandidate,
        Rejection::InvalidVoter,
        Rejection::AllowanceExceeded,
    ];

    /// Message rendered on the vote page.
    pub fn message(&self) -> &'static str {
        match self {
            Rejection::MissingCandidate => "Please enter a candidate",
            Rejection::MissingKeyword => "Please enter a voting reason",
            Rejection::UnknownCandidate => "Please enter a valid candidate",
            Rejection::InvalidVoter => "Your personal information is incorrect",
            Rejection::AllowanceExceeded => "Your vote count exceeds your limit",
        }
    }

    /// Stable short label, used for cache keys and metric labels.
    pub fn label(&self) -> &'static str {
        match self {
            Rejection::MissingCandidate => "missing_candidate",
            Rejection::MissingKeyword => "missing_keyword",
            Rejection::UnknownCandidate => "unknown_candidate",
            Rejection::InvalidVoter => "invalid_voter",
            Rejection::AllowanceExceeded => "allowance_exceeded",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
