//! Seed data for the relational store.
//!
//! A fixture file is a JSON document with a `candidates` and a `voters`
//! array. The daemon's `import` command loads one into LMDB; tests build them
//! in code.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tally_types::{Candidate, Voter};

use crate::{CandidateStore, StoreError, VoterStore};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Fixtures {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub voters: Vec<Voter>,
}

impl Fixtures {
    pub fn from_json_str(s: &str) -> Result<Self, StoreError> {
        serde_json::from_str(s).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    pub fn from_json_file(path: &Path) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Backend(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&content)
    }

    /// Write every candidate and voter into `store`, returning the counts.
    pub fn load_into<S>(&self, store: &S) -> Result<(usize, usize), StoreError>
    where
        S: CandidateStore + VoterStore + ?Sized,
    {
        for candidate in &self.candidates {
            store.put_candidate(candidate)?;
        }
        for voter in &self.voters {
            store.put_voter(voter)?;
        }
        Ok((self.candidates.len(), self.voters.len()))
    }
}
