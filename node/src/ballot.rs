//! Vote submissions and the field-level checks that need no store.

use serde::Deserialize;
use tally_types::Rejection;

use crate::NodeError;

/// Raw `POST /vote` form, exactly as submitted.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct VoteForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub mynumber: String,
    /// Candidate name.
    #[serde(default)]
    pub candidate: String,
    #[serde(default)]
    pub vote_count: String,
    #[serde(default)]
    pub keyword: String,
}

/// A submission as the node sees it.
///
/// The vote count stays raw until the identity checks have run, so a form
/// with several problems reports the earliest one in validation order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ballot {
    pub name: String,
    pub address: String,
    pub credential: String,
    pub candidate: String,
    pub vote_count: String,
    pub keyword: String,
}

impl From<VoteForm> for Ballot {
    fn from(form: VoteForm) -> Self {
        Ballot {
            name: form.name,
            address: form.address,
            credential: form.mynumber,
            candidate: form.candidate,
            vote_count: form.vote_count,
            keyword: form.keyword,
        }
    }
}

impl Ballot {
    /// Checks that run before any lookup.
    pub fn check_fields(&self) -> Result<(), Rejection> {
        if self.candidate.is_empty() {
            return Err(Rejection::MissingCandidate);
        }
        if self.keyword.is_empty() {
            return Err(Rejection::MissingKeyword);
        }
        Ok(())
    }

    /// The requested vote count. Fails on anything but a positive integer.
    pub fn count(&self) -> Result<u64, NodeError> {
        self.vote_count
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| NodeError::InvalidVoteCount(self.vote_count.clone()))
    }
}
