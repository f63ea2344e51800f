//! Result rows served by the read path.

use serde::{Deserialize, Serialize};

use crate::{Candidate, Sex};

/// A candidate together with its cumulative vote count.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateResult {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub vote_count: u64,
}

/// Vote total for one political party.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyResult {
    pub political_party: String,
    pub vote_count: u64,
}

/// Votes split by the sex of the candidate voted for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SexRatio {
    pub men: u64,
    pub women: u64,
}

impl SexRatio {
    pub fn set(&mut self, sex: Sex, votes: u64) {
        match sex {
            Sex::Male => self.men = votes,
            Sex::Female => self.women = votes,
        }
    }

    pub fn total(&self) -> u64 {
        self.men + self.women
    }
}
