//! Atomic counter storage trait.

use async_trait::async_trait;

use crate::StoreError;

/// Key → integer counters with atomic increment.
///
/// Authoritative for scalar vote totals. Increments must be linearizable:
/// any number of concurrent callers incrementing the same key never lose an
/// update. There is deliberately no decrement.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Add `delta` to `key` (creating it at zero) and return the new value.
    async fn increment(&self, key: &str, delta: u64) -> Result<u64, StoreError>;

    /// Current value of `key`, zero when absent.
    async fn get(&self, key: &str) -> Result<u64, StoreError>;

    /// Remove every counter.
    async fn clear(&self) -> Result<(), StoreError>;
}
