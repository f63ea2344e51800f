//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};
use tracing::info;

use crate::LmdbError;

const MAX_DBS: u32 = 4;

/// Wraps the LMDB environment and all database handles.
///
/// | database          | key                     | value              |
/// |-------------------|-------------------------|--------------------|
/// | `candidates`      | candidate ID (BE u32)   | bincode `Candidate`|
/// | `candidate_names` | candidate name (UTF-8)  | candidate ID       |
/// | `voters`          | credential (UTF-8)      | bincode `Voter`    |
/// | `votes`           | row sequence (BE u64)   | bincode `VoteEvent`|
#[derive(Clone)]
pub struct LmdbEnvironment {
    pub(crate) env: Arc<Env>,
    pub(crate) candidates_db: Database<Bytes, Bytes>,
    pub(crate) candidate_names_db: Database<Bytes, Bytes>,
    pub(crate) voters_db: Database<Bytes, Bytes>,
    pub(crate) votes_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given directory.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;

        // SAFETY: the environment is opened once per process and the
        // directory is not shared with another LMDB user.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let candidates_db = env.create_database(&mut wtxn, Some("candidates"))?;
        let candidate_names_db = env.create_database(&mut wtxn, Some("candidate_names"))?;
        let voters_db = env.create_database(&mut wtxn, Some("voters"))?;
        let votes_db = env.create_database(&mut wtxn, Some("votes"))?;
        wtxn.commit()?;

        info!("Opened LMDB environment at {}", path.display());

        Ok(Self {
            env: Arc::new(env),
            candidates_db,
            candidate_names_db,
            voters_db,
            votes_db,
        })
    }
}
