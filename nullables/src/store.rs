//! Nullable relational store: thread-safe in-memory rows for testing.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use tally_store::{CandidateStore, StoreError, VoteStore, VoterStore};
use tally_types::{Candidate, CandidateId, VoteEvent, Voter};

/// An in-memory candidate + voter + vote store.
/// Thread-safe for use with tokio's multi-threaded runtime.
pub struct NullElectionStore {
    candidates: Mutex<BTreeMap<CandidateId, Candidate>>,
    voters: Mutex<HashMap<String, Voter>>,
    votes: Mutex<Vec<VoteEvent>>,
    /// Number of upcoming `insert_vote` calls that fail as unavailable.
    failing_inserts: Mutex<u32>,
    insert_attempts: Mutex<u32>,
}

impl NullElectionStore {
    pub fn new() -> Self {
        Self {
            candidates: Mutex::new(BTreeMap::new()),
            voters: Mutex::new(HashMap::new()),
            votes: Mutex::new(Vec::new()),
            failing_inserts: Mutex::new(0),
            insert_attempts: Mutex::new(0),
        }
    }

    /// Make the next `count` vote inserts fail with `StoreError::Unavailable`.
    pub fn fail_next_inserts(&self, count: u32) {
        *self.failing_inserts.lock().unwrap() = count;
    }

    /// Every `insert_vote` call so far, successful or not.
    pub fn insert_attempts(&self) -> u32 {
        *self.insert_attempts.lock().unwrap()
    }
}

impl Default for NullElectionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CandidateStore for NullElectionStore {
    fn put_candidate(&self, candidate: &Candidate) -> Result<(), StoreError> {
        let mut candidates = self.candidates.lock().unwrap();
        if candidates
            .values()
            .any(|c| c.name == candidate.name && c.id != candidate.id)
        {
            return Err(StoreError::Duplicate(format!(
                "candidate name '{}'",
                candidate.name
            )));
        }
        candidates.insert(candidate.id, candidate.clone());
        Ok(())
    }

    fn get_candidate(&self, id: CandidateId) -> Result<Candidate, StoreError> {
        self.candidates
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("candidate {id}")))
    }

    fn get_candidate_by_name(&self, name: &str) -> Result<Candidate, StoreError> {
        self.candidates
            .lock()
            .unwrap()
            .values()
            .find(|c| c.name == name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("candidate named '{name}'")))
    }

    fn iter_candidates(&self) -> Result<Vec<Candidate>, StoreError> {
        Ok(self.candidates.lock().unwrap().values().cloned().collect())
    }

    fn candidate_count(&self) -> Result<u64, StoreError> {
        Ok(self.candidates.lock().unwrap().len() as u64)
    }
}

impl VoterStore for NullElectionStore {
    fn put_voter(&self, voter: &Voter) -> Result<(), StoreError> {
        self.voters
            .lock()
            .unwrap()
            .insert(voter.credential.clone(), voter.clone());
        Ok(())
    }

    fn load_voter(&self, credential: &str, into: &mut Voter) -> Result<bool, StoreError> {
        match self.voters.lock().unwrap().get(credential) {
            Some(voter) => {
                into.fill_from(voter);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn voter_count(&self) -> Result<u64, StoreError> {
        Ok(self.voters.lock().unwrap().len() as u64)
    }
}

impl VoteStore for NullElectionStore {
    fn insert_vote(&self, vote: &VoteEvent) -> Result<(), StoreError> {
        *self.insert_attempts.lock().unwrap() += 1;
        {
            let mut failing = self.failing_inserts.lock().unwrap();
            if *failing > 0 {
                *failing -= 1;
                return Err(StoreError::Unavailable("null store told to fail".into()));
            }
        }
        self.votes.lock().unwrap().push(vote.clone());
        Ok(())
    }

    fn iter_votes(&self) -> Result<Vec<VoteEvent>, StoreError> {
        Ok(self.votes.lock().unwrap().clone())
    }

    fn vote_row_count(&self) -> Result<u64, StoreError> {
        Ok(self.votes.lock().unwrap().len() as u64)
    }

    fn delete_all_votes(&self) -> Result<u64, StoreError> {
        let mut votes = self.votes.lock().unwrap();
        let removed = votes.len() as u64;
        votes.clear();
        Ok(removed)
    }
}
