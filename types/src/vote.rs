//! Vote events.

use serde::{Deserialize, Serialize};

use crate::{CandidateId, VoterId};

/// One accepted cast. A cast with `count > 1` is a single event, stored as a
/// single row and applied as a single fan-out unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteEvent {
    pub voter: VoterId,
    pub candidate: CandidateId,
    pub keyword: String,
    pub count: u64,
}
