//! Background relational insert of accepted votes.
//!
//! The request never waits on the relational store. Each accepted vote is
//! handed to a detached task that inserts the row, retrying retryable
//! failures with linear backoff. A vote that still cannot be written is
//! logged and counted; the aggregates already reflect it, and the next
//! warm-up will reconcile them against whatever rows exist.
//!
//! The writer counts inserts still in flight so a reset can wait for them
//! before deleting rows; otherwise a late insert would survive the reset.

use std::sync::Arc;
use std::time::Duration;

use tally_store::{ElectionStore, VoteStore};
use tally_types::VoteEvent;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::metrics::TallyMetrics;
use crate::store_task::run_blocking;

#[derive(Clone)]
pub struct DurableWriter {
    store: Arc<dyn ElectionStore>,
    retries: u32,
    backoff: Duration,
    metrics: Arc<TallyMetrics>,
    in_flight: Arc<watch::Sender<usize>>,
}

/// Decrements the in-flight count when the insert task ends, however it ends.
struct InFlight(Arc<watch::Sender<usize>>);

impl InFlight {
    fn start(counter: &Arc<watch::Sender<usize>>) -> Self {
        counter.send_modify(|n| *n += 1);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.send_modify(|n| *n -= 1);
    }
}

impl DurableWriter {
    pub fn new(
        store: Arc<dyn ElectionStore>,
        retries: u32,
        backoff: Duration,
        metrics: Arc<TallyMetrics>,
    ) -> Self {
        Self {
            store,
            retries,
            backoff,
            metrics,
            in_flight: Arc::new(watch::Sender::new(0)),
        }
    }

    /// Insert `vote` in the background.
    pub fn spawn(&self, vote: VoteEvent) -> JoinHandle<()> {
        let writer = self.clone();
        let guard = InFlight::start(&self.in_flight);
        tokio::spawn(async move {
            let _guard = guard;
            writer.write(vote).await
        })
    }

    pub fn in_flight(&self) -> usize {
        *self.in_flight.borrow()
    }

    /// Wait until every insert spawned so far has stored its row or given up.
    pub async fn settle(&self) {
        let mut rx = self.in_flight.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|n| *n == 0).await;
    }

    async fn write(&self, vote: VoteEvent) {
        let mut attempt = 0u32;
        loop {
            let row = vote.clone();
            match run_blocking(&self.store, move |s| s.insert_vote(&row)).await {
                Ok(()) => {
                    debug!(voter = %vote.voter, candidate = %vote.candidate, "Vote row stored");
                    return;
                }
                Err(e) if e.is_retryable() && attempt < self.retries => {
                    attempt += 1;
                    warn!(
                        voter = %vote.voter,
                        attempt,
                        "Vote insert failed, retrying: {e}"
                    );
                    tokio::time::sleep(self.backoff * attempt).await;
                }
                Err(e) => {
                    self.metrics.durable_write_failures.inc();
                    error!(
                        voter = %vote.voter,
                        candidate = %vote.candidate,
                        count = vote.count,
                        attempts = attempt + 1,
                        "Vote row lost: {e}"
                    );
                    return;
                }
            }
        }
    }
}
