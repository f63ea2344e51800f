//! LMDB implementation of VoterStore.

use tally_store::{StoreError, VoterStore};
use tally_types::Voter;

use crate::{LmdbEnvironment, LmdbError};

impl VoterStore for LmdbEnvironment {
    fn put_voter(&self, voter: &Voter) -> Result<(), StoreError> {
        let bytes = bincode::serialize(voter).map_err(LmdbError::from)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.voters_db
            .put(&mut wtxn, voter.credential.as_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn load_voter(&self, credential: &str, into: &mut Voter) -> Result<bool, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let Some(val) = self
            .voters_db
            .get(&rtxn, credential.as_bytes())
            .map_err(LmdbError::from)?
        else {
            return Ok(false);
        };
        let voter: Voter = bincode::deserialize(val).map_err(LmdbError::from)?;
        into.fill_from(&voter);
        Ok(true)
    }

    fn voter_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let count = self.voters_db.len(&rtxn).map_err(LmdbError::from)?;
        Ok(count)
    }
}
