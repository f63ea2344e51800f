//! In-process backend for the cache stores.
//!
//! Implements [`tally_store::CounterStore`] and
//! [`tally_store::RankedSetStore`] without any network hop. Used for
//! single-process deployments (no Redis configured) and throughout the test
//! suites. Ordering semantics match the Redis backend exactly.

pub mod counters;
pub mod ranked;

pub use counters::MemoryCounters;
pub use ranked::{MemoryRankedSets, SortedSet};

use async_trait::async_trait;
use tally_store::{CounterStore, RankedMember, RankedSetStore, StoreError};
use tracing::debug;

/// Counters and ranked sets behind one handle, mirroring a single Redis
/// database.
#[derive(Default)]
pub struct MemoryCacheStore {
    counters: MemoryCounters,
    sets: MemoryRankedSets,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CounterStore for MemoryCacheStore {
    async fn increment(&self, key: &str, delta: u64) -> Result<u64, StoreError> {
        Ok(self.counters.increment(key, delta))
    }

    async fn get(&self, key: &str) -> Result<u64, StoreError> {
        Ok(self.counters.get(key))
    }

    async fn clear(&self) -> Result<(), StoreError> {
        debug!(keys = self.counters.len(), "Clearing in-process counters");
        self.counters.clear();
        Ok(())
    }
}

#[async_trait]
impl RankedSetStore for MemoryCacheStore {
    async fn increment_score(
        &self,
        set: &str,
        member: &str,
        delta: u64,
    ) -> Result<u64, StoreError> {
        Ok(self.sets.increment_score(set, member, delta))
    }

    async fn range_by_rank_desc(
        &self,
        set: &str,
        start: usize,
        stop: usize,
    ) -> Result<Vec<RankedMember>, StoreError> {
        Ok(self.sets.range_desc(set, start, stop))
    }

    async fn range_by_rank_asc(
        &self,
        set: &str,
        start: usize,
        stop: usize,
    ) -> Result<Vec<RankedMember>, StoreError> {
        Ok(self.sets.range_asc(set, start, stop))
    }

    async fn clear(&self) -> Result<(), StoreError> {
        debug!(sets = self.sets.set_count(), "Clearing in-process ranked sets");
        self.sets.clear();
        Ok(())
    }
}
