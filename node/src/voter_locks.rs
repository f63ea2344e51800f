//! Per-credential submission locks.
//!
//! Two concurrent submissions from the same voter could both read the vote
//! counter before either increments it, letting the pair exceed the
//! allowance. Holding the credential's lock from the allowance check through
//! the fan-out closes that window. Submissions from different voters never
//! contend.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Idle locks are swept once the map grows past this many entries.
const SWEEP_THRESHOLD: usize = 4096;

pub struct VoterLocks {
    enabled: bool,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl VoterLocks {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Wait for exclusive access to `credential`. Returns `None` when
    /// serialization is disabled.
    pub async fn lock(&self, credential: &str) -> Option<OwnedMutexGuard<()>> {
        if !self.enabled {
            return None;
        }
        let lock = {
            let mut locks = self.locks.lock().await;
            if locks.len() >= SWEEP_THRESHOLD {
                locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            }
            locks
                .entry(credential.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        Some(lock.lock_owned().await)
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Credentials with a lock entry.
    pub async fn tracked(&self) -> usize {
        self.locks.lock().await.len()
    }
}
