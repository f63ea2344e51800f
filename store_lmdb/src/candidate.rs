//! LMDB implementation of CandidateStore.

use tally_store::{CandidateStore, StoreError};
use tally_types::{Candidate, CandidateId};

use crate::{LmdbEnvironment, LmdbError};

fn decode_id(bytes: &[u8]) -> Result<CandidateId, LmdbError> {
    let arr: [u8; 4] = bytes
        .try_into()
        .map_err(|_| LmdbError::Serialization("candidate id has unexpected byte length".into()))?;
    Ok(CandidateId::from_be_bytes(arr))
}

impl CandidateStore for LmdbEnvironment {
    fn put_candidate(&self, candidate: &Candidate) -> Result<(), StoreError> {
        let key = candidate.id.to_be_bytes();
        let bytes = bincode::serialize(candidate).map_err(LmdbError::from)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;

        // Names are a unique index; a second candidate may not claim one.
        if let Some(existing) = self
            .candidate_names_db
            .get(&wtxn, candidate.name.as_bytes())
            .map_err(LmdbError::from)?
        {
            if decode_id(existing)? != candidate.id {
                return Err(
                    LmdbError::Duplicate(format!("candidate name '{}'", candidate.name)).into(),
                );
            }
        }

        // Renaming a candidate must drop the stale name entry.
        if let Some(previous) = self
            .candidates_db
            .get(&wtxn, &key)
            .map_err(LmdbError::from)?
        {
            let previous: Candidate = bincode::deserialize(previous).map_err(LmdbError::from)?;
            if previous.name != candidate.name {
                self.candidate_names_db
                    .delete(&mut wtxn, previous.name.as_bytes())
                    .map_err(LmdbError::from)?;
            }
        }

        self.candidates_db
            .put(&mut wtxn, &key, &bytes)
            .map_err(LmdbError::from)?;
        self.candidate_names_db
            .put(&mut wtxn, candidate.name.as_bytes(), &key)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_candidate(&self, id: CandidateId) -> Result<Candidate, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .candidates_db
            .get(&rtxn, &id.to_be_bytes())
            .map_err(LmdbError::from)?
            .ok_or_else(|| LmdbError::NotFound(format!("candidate {id}")))?;
        let candidate: Candidate = bincode::deserialize(val).map_err(LmdbError::from)?;
        Ok(candidate)
    }

    fn get_candidate_by_name(&self, name: &str) -> Result<Candidate, StoreError> {
        let id = {
            let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
            let raw = self
                .candidate_names_db
                .get(&rtxn, name.as_bytes())
                .map_err(LmdbError::from)?
                .ok_or_else(|| LmdbError::NotFound(format!("candidate named '{name}'")))?;
            decode_id(raw)?
        };
        self.get_candidate(id)
    }

    fn iter_candidates(&self) -> Result<Vec<Candidate>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = self.candidates_db.iter(&rtxn).map_err(LmdbError::from)?;
        let mut results = Vec::new();
        for result in iter {
            let (_key, val) = result.map_err(LmdbError::from)?;
            let candidate: Candidate = bincode::deserialize(val).map_err(LmdbError::from)?;
            results.push(candidate);
        }
        Ok(results)
    }

    fn candidate_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let count = self.candidates_db.len(&rtxn).map_err(LmdbError::from)?;
        Ok(count)
    }
}
