//! Reusable voter records.
//!
//! Each vote submission needs a scratch [`Voter`] to load into. The pool
//! keeps a bounded free list of them so their string buffers are reused
//! instead of reallocated per request. A record is always cleared before it
//! goes back on the list, so no identity leaks from one request to the next.

use std::ops::{Deref, DerefMut};
use std::sync::Mutex;

use tally_types::Voter;

pub struct VoterPool {
    free: Mutex<Vec<Voter>>,
    capacity: usize,
}

impl VoterPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            free: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
        }
    }

    /// Take a cleared record. Returned to the pool when the guard drops.
    pub fn acquire(&self) -> PooledVoter<'_> {
        let voter = self
            .free
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop()
            .unwrap_or_default();
        PooledVoter {
            pool: self,
            voter,
        }
    }

    /// Idle records currently held.
    pub fn idle(&self) -> usize {
        self.free.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn release(&self, mut voter: Voter) {
        voter.clear();
        let mut free = self.free.lock().unwrap_or_else(|e| e.into_inner());
        if free.len() < self.capacity {
            free.push(voter);
        }
    }
}

/// Scoped handle to a pooled [`Voter`].
pub struct PooledVoter<'a> {
    pool: &'a VoterPool,
    voter: Voter,
}

impl Deref for PooledVoter<'_> {
    type Target = Voter;

    fn deref(&self) -> &Voter {
        &self.voter
    }
}

impl DerefMut for PooledVoter<'_> {
    fn deref_mut(&mut self) -> &mut Voter {
        &mut self.voter
    }
}

impl Drop for PooledVoter<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.voter));
    }
}
