//! Rebuilding every derived structure from the relational store.
//!
//! Warm-up runs at startup and as the second half of a reset. It wipes the
//! cache stores and in-process caches, loads a fresh candidate directory,
//! seeds the leaderboard with every candidate at zero, and replays each
//! remaining vote row through the fan-out writer so the aggregates match the
//! rows exactly.

use serde::Serialize;
use tally_store::{keys, CandidateStore, VoteStore};
use tracing::{debug, info, warn, Instrument};

use crate::directory::CandidateDirectory;
use crate::node::TallyNode;
use crate::store_task::run_blocking;
use crate::tracing_spans::warm_up_span;
use crate::NodeError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct WarmUpReport {
    pub candidates: usize,
    pub votes_replayed: u64,
    /// Vote rows naming a candidate that no longer exists.
    pub votes_skipped: u64,
}

impl TallyNode {
    pub async fn warm_up(&self) -> Result<WarmUpReport, NodeError> {
        self.rebuild().instrument(warm_up_span("warm_up")).await
    }

    /// Delete every vote row, then warm up.
    ///
    /// Row inserts already spawned are awaited first so none lands after the
    /// delete. Submissions racing the reset itself may still add rows; the
    /// replay picks those up.
    pub async fn reset(&self) -> Result<WarmUpReport, NodeError> {
        async {
            let pending = self.durable.in_flight();
            if pending > 0 {
                debug!(pending, "Waiting for vote rows in flight");
            }
            self.durable.settle().await;
            let removed = run_blocking(&self.store, |s| s.delete_all_votes()).await?;
            info!(removed, "Vote rows deleted");
            self.rebuild().await
        }
        .instrument(warm_up_span("reset"))
        .await
    }

    async fn rebuild(&self) -> Result<WarmUpReport, NodeError> {
        self.counters.clear().await?;
        self.sets.clear().await?;
        self.page_cache.clear();
        self.voter_cache.clear();

        let candidates = run_blocking(&self.store, |s| s.iter_candidates()).await?;
        let directory = CandidateDirectory::new(candidates);
        for candidate in directory.candidates() {
            self.sets
                .increment_score(keys::LEADERBOARD, &candidate.id.to_string(), 0)
                .await?;
        }

        let mut report = WarmUpReport {
            candidates: directory.len(),
            ..WarmUpReport::default()
        };
        let votes = run_blocking(&self.store, |s| s.iter_votes()).await?;
        for vote in votes {
            match directory.get(vote.candidate) {
                Some(candidate) => {
                    self.fan_out.apply(&vote, candidate).await?;
                    report.votes_replayed += 1;
                }
                None => {
                    warn!(candidate = %vote.candidate, "Skipping vote row for unknown candidate");
                    report.votes_skipped += 1;
                }
            }
        }

        self.metrics.candidate_count.set(directory.len() as i64);
        self.directory.replace(directory);
        // Pages rendered while the rebuild ran are stale.
        self.page_cache.clear();
        self.metrics.warm_ups.inc();

        info!(
            candidates = report.candidates,
            votes_replayed = report.votes_replayed,
            votes_skipped = report.votes_skipped,
            "Warm-up complete"
        );
        Ok(report)
    }
}
