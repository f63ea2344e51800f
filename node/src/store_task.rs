//! Relational store calls run on tokio's blocking pool.
//!
//! The relational backends do synchronous disk I/O inside LMDB
//! transactions, which must not stall the async workers.

use std::sync::Arc;

use tally_store::{ElectionStore, StoreError};

/// Run `op` against `store` on the blocking pool and await its result.
pub async fn run_blocking<R, F>(store: &Arc<dyn ElectionStore>, op: F) -> Result<R, StoreError>
where
    F: FnOnce(&dyn ElectionStore) -> Result<R, StoreError> + Send + 'static,
    R: Send + 'static,
{
    let store = Arc::clone(store);
    tokio::task::spawn_blocking(move || op(store.as_ref()))
        .await
        .map_err(|e| StoreError::Backend(format!("store task failed: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_nullables::NullElectionStore;
    use tally_store::VoteStore;

    #[tokio::test]
    async fn result_and_error_come_back_from_the_pool() {
        let null = Arc::new(NullElectionStore::new());
        let store: Arc<dyn ElectionStore> = null.clone();
        assert_eq!(run_blocking(&store, |s| s.vote_row_count()).await.unwrap(), 0);

        null.fail_next_inserts(1);
        let vote = tally_types::VoteEvent {
            voter: tally_types::VoterId::new(1),
            candidate: tally_types::CandidateId::new(1),
            keyword: "k".into(),
            count: 1,
        };
        let err = run_blocking(&store, move |s| s.insert_vote(&vote))
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }
}
