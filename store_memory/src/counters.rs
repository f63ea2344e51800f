//! Lock-light atomic counters.
//!
//! Existing keys are incremented under a shared read lock with
//! `fetch_add`; only the first increment of a new key takes the write lock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

#[derive(Default)]
pub struct MemoryCounters {
    counters: RwLock<HashMap<String, AtomicU64>>,
}

impl MemoryCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `delta` to `key` and return the new value.
    pub fn increment(&self, key: &str, delta: u64) -> u64 {
        {
            let counters = self.counters.read().unwrap_or_else(|e| e.into_inner());
            if let Some(counter) = counters.get(key) {
                return add_saturating(counter, delta);
            }
        }
        let mut counters = self.counters.write().unwrap_or_else(|e| e.into_inner());
        // Another writer may have created the key between the two locks.
        let counter = counters
            .entry(key.to_string())
            .or_insert_with(|| AtomicU64::new(0));
        add_saturating(counter, delta)
    }

    pub fn get(&self, key: &str) -> u64 {
        self.counters
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .map(|c| c.load(Ordering::Acquire))
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counters.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.counters
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

/// Counters stick at `u64::MAX` instead of wrapping.
fn add_saturating(counter: &AtomicU64, delta: u64) -> u64 {
    let previous = counter
        .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
            Some(n.saturating_add(delta))
        })
        .unwrap_or_else(|n| n);
    previous.saturating_add(delta)
}
