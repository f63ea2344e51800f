//! Abstract storage traits for the tally service.
//!
//! Two families of stores live here:
//! - the cache stores ([`CounterStore`], [`RankedSetStore`]) that hold the
//!   derived vote aggregates and are hit on every request;
//! - the relational stores ([`CandidateStore`], [`VoterStore`], [`VoteStore`])
//!   that hold the authoritative rows.
//!
//! Every backend (Redis, LMDB, in-process, nullables for testing) implements
//! these traits. The rest of the codebase depends only on the traits.

pub mod candidate;
pub mod counter;
pub mod error;
pub mod fixtures;
pub mod keys;
pub mod ranked;
pub mod vote;
pub mod voter;

pub use candidate::CandidateStore;
pub use counter::CounterStore;
pub use error::StoreError;
pub use fixtures::Fixtures;
pub use ranked::{RankedMember, RankedSetStore};
pub use vote::VoteStore;
pub use voter::VoterStore;

/// The full relational collaborator: candidate, voter and vote rows.
pub trait ElectionStore: CandidateStore + VoterStore + VoteStore + Send + Sync {}

impl<T> ElectionStore for T where T: CandidateStore + VoterStore + VoteStore + Send + Sync {}
