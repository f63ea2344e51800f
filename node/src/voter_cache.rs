//! Credential → voter cache in front of the relational voter lookup.
//!
//! Voter rows never change while the service runs, so a hit is served
//! without touching the relational store. Only found voters are cached; a
//! miss on an unknown credential goes to the store every time.

use std::mem;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tally_store::{ElectionStore, StoreError, VoterStore};
use tally_types::Voter;

use crate::store_task::run_blocking;

pub struct VoterCache {
    cache: Cache<String, Arc<Voter>>,
}

impl VoterCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Fill `into` with the voter holding `credential`. Returns `false` when
    /// no such voter exists.
    ///
    /// On a miss the buffer travels to the blocking pool and back, so its
    /// allocations are kept.
    pub async fn resolve(
        &self,
        store: &Arc<dyn ElectionStore>,
        credential: &str,
        into: &mut Voter,
    ) -> Result<bool, StoreError> {
        if let Some(voter) = self.cache.get(credential).await {
            into.fill_from(&voter);
            return Ok(true);
        }
        let key = credential.to_string();
        let mut buffer = mem::take(into);
        let (found, buffer) = run_blocking(store, move |s| {
            let found = s.load_voter(&key, &mut buffer)?;
            Ok((found, buffer))
        })
        .await?;
        *into = buffer;
        if !found {
            return Ok(false);
        }
        self.cache
            .insert(credential.to_string(), Arc::new(into.clone()))
            .await;
        Ok(true)
    }

    pub fn clear(&self) {
        self.cache.invalidate_all();
    }
}
