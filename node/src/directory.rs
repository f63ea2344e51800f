//! In-memory candidate directory.
//!
//! The directory is built once per warm-up from the relational store and is
//! immutable afterwards. Readers take a snapshot with
//! [`DirectoryHandle::snapshot`] and keep it for the whole request; a reset
//! swaps in a fresh one without blocking them.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use arc_swap::ArcSwap;
use tally_types::{Candidate, CandidateId};

/// ID-, name- and party-indexed view of every candidate.
#[derive(Debug, Default)]
pub struct CandidateDirectory {
    /// All candidates ordered by ID.
    candidates: Vec<Candidate>,
    by_id: HashMap<CandidateId, usize>,
    by_name: HashMap<String, usize>,
    by_party: BTreeMap<String, Vec<usize>>,
}

impl CandidateDirectory {
    pub fn new(mut candidates: Vec<Candidate>) -> Self {
        candidates.sort_by_key(|c| c.id);

        let mut by_id = HashMap::with_capacity(candidates.len());
        let mut by_name = HashMap::with_capacity(candidates.len());
        let mut by_party: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (idx, candidate) in candidates.iter().enumerate() {
            by_id.insert(candidate.id, idx);
            by_name.insert(candidate.name.clone(), idx);
            by_party
                .entry(candidate.political_party.clone())
                .or_default()
                .push(idx);
        }

        Self {
            candidates,
            by_id,
            by_name,
            by_party,
        }
    }

    pub fn get(&self, id: CandidateId) -> Option<&Candidate> {
        self.by_id.get(&id).map(|&idx| &self.candidates[idx])
    }

    pub fn by_name(&self, name: &str) -> Option<&Candidate> {
        self.by_name.get(name).map(|&idx| &self.candidates[idx])
    }

    /// Candidates of `party` ordered by ID, or `None` for an unknown party.
    pub fn party(&self, party: &str) -> Option<Vec<&Candidate>> {
        self.by_party
            .get(party)
            .map(|indices| indices.iter().map(|&idx| &self.candidates[idx]).collect())
    }

    pub fn parties(&self) -> impl Iterator<Item = &str> {
        self.by_party.keys().map(String::as_str)
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Atomically swappable reference to the current directory.
pub struct DirectoryHandle {
    current: ArcSwap<CandidateDirectory>,
}

impl DirectoryHandle {
    pub fn new(directory: CandidateDirectory) -> Self {
        Self {
            current: ArcSwap::from_pointee(directory),
        }
    }

    pub fn snapshot(&self) -> Arc<CandidateDirectory> {
        self.current.load_full()
    }

    pub fn replace(&self, directory: CandidateDirectory) {
        self.current.store(Arc::new(directory));
    }
}

impl Default for DirectoryHandle {
    fn default() -> Self {
        Self::new(CandidateDirectory::default())
    }
}
