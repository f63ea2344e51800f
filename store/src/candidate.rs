//! Candidate storage trait.

use tally_types::{Candidate, CandidateId};

use crate::StoreError;

/// Trait for candidate row storage.
pub trait CandidateStore {
    fn put_candidate(&self, candidate: &Candidate) -> Result<(), StoreError>;

    fn get_candidate(&self, id: CandidateId) -> Result<Candidate, StoreError>;

    fn get_candidate_by_name(&self, name: &str) -> Result<Candidate, StoreError>;

    /// Every candidate, ordered by ID.
    fn iter_candidates(&self) -> Result<Vec<Candidate>, StoreError>;

    fn candidate_count(&self) -> Result<u64, StoreError>;

    /// Candidates belonging to `party`, ordered by ID.
    fn candidates_by_party(&self, party: &str) -> Result<Vec<Candidate>, StoreError> {
        Ok(self
            .iter_candidates()?
            .into_iter()
            .filter(|c| c.political_party == party)
            .collect())
    }
}
