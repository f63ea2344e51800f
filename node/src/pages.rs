//! Page documents served over HTTP.
//!
//! Pages are rendered to JSON bytes once and then cached verbatim by the
//! page cache, so the structs here borrow wherever they can.

use bytes::Bytes;
use serde::Serialize;
use tally_types::{Candidate, CandidateResult, PartyResult, SexRatio};

use crate::NodeError;

pub const VOTE_ACCEPTED_MESSAGE: &str = "Your vote has been recorded";

/// `GET /`
#[derive(Debug, Serialize)]
pub struct HomePage {
    /// Top ten by votes, then the last-placed candidate.
    pub candidates: Vec<CandidateResult>,
    /// Totals over the displayed candidates, highest first.
    pub parties: Vec<PartyResult>,
    pub sex_ratio: SexRatio,
}

/// `GET /candidates/{id}`
#[derive(Debug, Serialize)]
pub struct CandidatePage<'a> {
    pub candidate: &'a Candidate,
    pub votes: u64,
    pub keywords: Vec<String>,
}

/// `GET /political_parties/{name}`
#[derive(Debug, Serialize)]
pub struct PartyPage<'a> {
    pub political_party: &'a str,
    pub votes: u64,
    pub candidates: Vec<&'a Candidate>,
    pub keywords: Vec<String>,
}

/// `GET /vote` and the outcome of `POST /vote`.
#[derive(Debug, Serialize)]
pub struct VotePage<'a> {
    pub candidates: &'a [Candidate],
    pub message: &'a str,
}

pub fn render<T: Serialize>(page: &T) -> Result<Bytes, NodeError> {
    Ok(Bytes::from(serde_json::to_vec(page)?))
}
