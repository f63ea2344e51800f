//! Fault-injecting cache store.
//!
//! Wraps the in-process backend and fails any operation touching a key or
//! set name that has been marked as broken. Everything else passes through,
//! so a test can break exactly one aggregate and watch the others land.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use tally_store::{CounterStore, RankedMember, RankedSetStore, StoreError};
use tally_store_memory::MemoryCacheStore;

#[derive(Default)]
pub struct FaultyCacheStore {
    inner: MemoryCacheStore,
    broken: Mutex<HashSet<String>>,
}

impl FaultyCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every operation on `key` (a counter key or a ranked set name).
    pub fn break_key(&self, key: impl Into<String>) {
        self.broken.lock().unwrap().insert(key.into());
    }

    pub fn repair_all(&self) {
        self.broken.lock().unwrap().clear();
    }

    fn check(&self, key: &str) -> Result<(), StoreError> {
        if self.broken.lock().unwrap().contains(key) {
            return Err(StoreError::Unavailable(format!("injected failure on {key}")));
        }
        Ok(())
    }
}

#[async_trait]
impl CounterStore for FaultyCacheStore {
    async fn increment(&self, key: &str, delta: u64) -> Result<u64, StoreError> {
        self.check(key)?;
        CounterStore::increment(&self.inner, key, delta).await
    }

    async fn get(&self, key: &str) -> Result<u64, StoreError> {
        self.check(key)?;
        CounterStore::get(&self.inner, key).await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        CounterStore::clear(&self.inner).await
    }
}

#[async_trait]
impl RankedSetStore for FaultyCacheStore {
    async fn increment_score(
        &self,
        set: &str,
        member: &str,
        delta: u64,
    ) -> Result<u64, StoreError> {
        self.check(set)?;
        self.inner.increment_score(set, member, delta).await
    }

    async fn range_by_rank_desc(
        &self,
        set: &str,
        start: usize,
        stop: usize,
    ) -> Result<Vec<RankedMember>, StoreError> {
        self.check(set)?;
        self.inner.range_by_rank_desc(set, start, stop).await
    }

    async fn range_by_rank_asc(
        &self,
        set: &str,
        start: usize,
        stop: usize,
    ) -> Result<Vec<RankedMember>, StoreError> {
        self.check(set)?;
        self.inner.range_by_rank_asc(set, start, stop).await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        RankedSetStore::clear(&self.inner).await
    }
}
