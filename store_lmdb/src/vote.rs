//! LMDB implementation of VoteStore.
//!
//! Rows are keyed by a big-endian sequence number. The next sequence is read
//! from the last key inside the same write transaction, and LMDB allows only
//! one writer at a time, so concurrent inserts never share a key.

use tally_store::{StoreError, VoteStore};
use tally_types::VoteEvent;
use tracing::info;

use crate::{LmdbEnvironment, LmdbError};

fn decode_seq(bytes: &[u8]) -> Result<u64, LmdbError> {
    let arr: [u8; 8] = bytes
        .try_into()
        .map_err(|_| LmdbError::Serialization("vote key has unexpected byte length".into()))?;
    Ok(u64::from_be_bytes(arr))
}

impl VoteStore for LmdbEnvironment {
    fn insert_vote(&self, vote: &VoteEvent) -> Result<(), StoreError> {
        let bytes = bincode::serialize(vote).map_err(LmdbError::from)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let next = match self.votes_db.last(&wtxn).map_err(LmdbError::from)? {
            Some((key, _)) => decode_seq(key)? + 1,
            None => 0,
        };
        self.votes_db
            .put(&mut wtxn, &next.to_be_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn iter_votes(&self) -> Result<Vec<VoteEvent>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = self.votes_db.iter(&rtxn).map_err(LmdbError::from)?;
        let mut results = Vec::new();
        for result in iter {
            let (_key, val) = result.map_err(LmdbError::from)?;
            let vote: VoteEvent = bincode::deserialize(val).map_err(LmdbError::from)?;
            results.push(vote);
        }
        Ok(results)
    }

    fn vote_row_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let count = self.votes_db.len(&rtxn).map_err(LmdbError::from)?;
        Ok(count)
    }

    fn delete_all_votes(&self) -> Result<u64, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let removed = self.votes_db.len(&wtxn).map_err(LmdbError::from)?;
        self.votes_db.clear(&mut wtxn).map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        info!(removed, "Deleted all vote rows");
        Ok(removed)
    }
}
