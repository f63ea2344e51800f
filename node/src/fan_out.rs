//! Vote fan-out: one accepted vote, six aggregate updates.
//!
//! The updates are independent, so they are issued concurrently and joined
//! with wait-for-all. A failure in one does not cancel the others and nothing
//! is rolled back; the caller gets a single [`FanOutError`] naming every
//! update that did not land. Drift left behind by a partial fan-out is
//! repaired by the next warm-up.

use std::fmt;
use std::sync::Arc;

use futures_util::future::{join_all, BoxFuture};
use tally_store::{keys, CounterStore, RankedSetStore, StoreError};
use tally_types::{Candidate, VoteEvent};
use thiserror::Error;
use tracing::{debug, warn};

/// The six derived aggregates touched by every vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AggregateUpdate {
    Leaderboard,
    CandidateKeywords,
    PartyKeywords,
    CandidateVotes,
    VoterVotes,
    SexVotes,
}

impl AggregateUpdate {
    pub const ALL: [AggregateUpdate; 6] = [
        AggregateUpdate::Leaderboard,
        AggregateUpdate::CandidateKeywords,
        AggregateUpdate::PartyKeywords,
        AggregateUpdate::CandidateVotes,
        AggregateUpdate::VoterVotes,
        AggregateUpdate::SexVotes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateUpdate::Leaderboard => "leaderboard",
            AggregateUpdate::CandidateKeywords => "candidate_keywords",
            AggregateUpdate::PartyKeywords => "party_keywords",
            AggregateUpdate::CandidateVotes => "candidate_votes",
            AggregateUpdate::VoterVotes => "voter_votes",
            AggregateUpdate::SexVotes => "sex_votes",
        }
    }
}

impl fmt::Display for AggregateUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct FailedUpdate {
    pub update: AggregateUpdate,
    pub error: StoreError,
}

/// Some aggregate updates of a fan-out failed; the rest were applied.
#[derive(Debug, Error)]
#[error("fan-out of {count} vote(s) failed for {}", describe(.failures))]
pub struct FanOutError {
    count: u64,
    failures: Vec<FailedUpdate>,
}

fn describe(failures: &[FailedUpdate]) -> String {
    failures
        .iter()
        .map(|f| format!("{} ({})", f.update, f.error))
        .collect::<Vec<_>>()
        .join(", ")
}

impl FanOutError {
    /// Vote count the fan-out tried to apply.
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn failures(&self) -> &[FailedUpdate] {
        &self.failures
    }

    pub fn failed(&self, update: AggregateUpdate) -> bool {
        self.failures.iter().any(|f| f.update == update)
    }
}

/// Applies accepted votes to the counter and ranked set stores.
#[derive(Clone)]
pub struct VoteFanOut {
    counters: Arc<dyn CounterStore>,
    sets: Arc<dyn RankedSetStore>,
}

impl VoteFanOut {
    pub fn new(counters: Arc<dyn CounterStore>, sets: Arc<dyn RankedSetStore>) -> Self {
        Self { counters, sets }
    }

    /// Apply `vote` for `candidate`. `vote.count` is applied as one unit to
    /// every aggregate.
    pub async fn apply(&self, vote: &VoteEvent, candidate: &Candidate) -> Result<(), FanOutError> {
        let count = vote.count;
        let member = candidate.id.to_string();
        let candidate_keywords = keys::candidate_keywords(candidate.id);
        let party_keywords = keys::party_keywords(&candidate.political_party);
        let candidate_votes = keys::candidate_votes(candidate.id);
        let voter_votes = keys::voter_votes(vote.voter);
        let sex_votes = keys::sex_votes(candidate.sex);

        let updates: [(AggregateUpdate, BoxFuture<'_, Result<u64, StoreError>>); 6] = [
            (
                AggregateUpdate::Leaderboard,
                self.sets.increment_score(keys::LEADERBOARD, &member, count),
            ),
            (
                AggregateUpdate::CandidateKeywords,
                self.sets
                    .increment_score(&candidate_keywords, &vote.keyword, count),
            ),
            (
                AggregateUpdate::PartyKeywords,
                self.sets.increment_score(&party_keywords, &vote.keyword, count),
            ),
            (
                AggregateUpdate::CandidateVotes,
                self.counters.increment(&candidate_votes, count),
            ),
            (
                AggregateUpdate::VoterVotes,
                self.counters.increment(&voter_votes, count),
            ),
            (
                AggregateUpdate::SexVotes,
                self.counters.increment(&sex_votes, count),
            ),
        ];

        let (kinds, futures): (Vec<_>, Vec<_>) = updates.into_iter().unzip();
        let results = join_all(futures).await;

        let failures: Vec<FailedUpdate> = kinds
            .into_iter()
            .zip(results)
            .filter_map(|(update, result)| match result {
                Ok(_) => None,
                Err(error) => Some(FailedUpdate { update, error }),
            })
            .collect();

        if failures.is_empty() {
            debug!(
                candidate = %candidate.id,
                voter = %vote.voter,
                count,
                "Vote fanned out"
            );
            return Ok(());
        }

        let err = FanOutError { count, failures };
        warn!(candidate = %candidate.id, voter = %vote.voter, "{err}");
        Err(err)
    }
}
