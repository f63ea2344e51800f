//! Fundamental types for the tally service.
//!
//! This crate defines the domain types shared across every other crate in the
//! workspace: candidates, voters, vote events, result rows and the reasons a
//! vote submission can be rejected.

pub mod candidate;
pub mod error;
pub mod rejection;
pub mod results;
pub mod vote;
pub mod voter;

pub use candidate::{Candidate, CandidateId, Sex};
pub use error::TypeError;
pub use rejection::Rejection;
pub use results::{CandidateResult, PartyResult, SexRatio};
pub use vote::VoteEvent;
pub use voter::{Voter, VoterId};
