//! Names of the derived aggregate keys.
//!
//! All backends share one namespace, so every writer and reader must build
//! keys through these helpers.

use tally_types::{CandidateId, Sex, VoterId};

/// Global leaderboard: member = candidate ID, score = cumulative votes.
pub const LEADERBOARD: &str = "leaderboard";

/// Keyword ranking for every candidate of `party`.
pub fn party_keywords(party: &str) -> String {
    format!("keywords:party:{party}")
}

/// Keyword ranking for a single candidate.
pub fn candidate_keywords(candidate: CandidateId) -> String {
    format!("keywords:candidate:{candidate}")
}

pub fn candidate_votes(candidate: CandidateId) -> String {
    format!("votes:candidate:{candidate}")
}

/// Votes already cast by a voter; compared against the allowance.
pub fn voter_votes(voter: VoterId) -> String {
    format!("votes:voter:{voter}")
}

pub fn sex_votes(sex: Sex) -> String {
    format!("votes:sex:{sex}")
}
