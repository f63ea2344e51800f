//! The tally node: wires stores, caches and the write path together.
//!
//! Every HTTP operation maps to one method here. The node holds no
//! aggregates itself; it reads and writes them through the cache store
//! traits and keeps only the directory snapshot and the page caches in
//! process.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use tally_store::{keys, CounterStore, ElectionStore, RankedSetStore};
use tally_types::{CandidateId, Rejection, VoteEvent};
use tracing::{debug, Instrument};

use crate::ballot::Ballot;
use crate::config::TallyConfig;
use crate::directory::{CandidateDirectory, DirectoryHandle};
use crate::durable::DurableWriter;
use crate::fan_out::VoteFanOut;
use crate::leaderboard::LeaderboardReader;
use crate::metrics::TallyMetrics;
use crate::page_cache::{candidate_route, outcome_key, party_route, PageCache, HOME_ROUTE};
use crate::pages::{self, VotePage, VOTE_ACCEPTED_MESSAGE};
use crate::tracing_spans::{page_span, submission_span};
use crate::voter_cache::VoterCache;
use crate::voter_locks::VoterLocks;
use crate::voter_pool::VoterPool;
use crate::NodeError;

/// Voter rows are immutable while the service runs; the TTL only bounds how
/// long an entry outlives a fixture re-import.
const VOTER_CACHE_TTL: Duration = Duration::from_secs(600);

/// Result of a vote submission that reached an outcome page.
#[derive(Clone, Debug)]
pub struct VoteOutcome {
    /// `None` when the vote was accepted.
    pub rejection: Option<Rejection>,
    pub page: Bytes,
}

impl VoteOutcome {
    pub fn accepted(&self) -> bool {
        self.rejection.is_none()
    }
}

pub struct TallyNode {
    pub(crate) config: TallyConfig,
    pub(crate) store: Arc<dyn ElectionStore>,
    pub(crate) counters: Arc<dyn CounterStore>,
    pub(crate) sets: Arc<dyn RankedSetStore>,
    pub(crate) directory: DirectoryHandle,
    pub(crate) fan_out: VoteFanOut,
    pub(crate) reader: LeaderboardReader,
    pub(crate) page_cache: PageCache,
    pub(crate) voter_cache: VoterCache,
    pub(crate) voter_pool: VoterPool,
    pub(crate) voter_locks: VoterLocks,
    pub(crate) durable: DurableWriter,
    pub(crate) metrics: Arc<TallyMetrics>,
}

impl TallyNode {
    /// Build a node over the given stores. The directory starts empty; call
    /// [`TallyNode::warm_up`] before serving.
    pub fn new(
        config: TallyConfig,
        store: Arc<dyn ElectionStore>,
        counters: Arc<dyn CounterStore>,
        sets: Arc<dyn RankedSetStore>,
    ) -> Self {
        let metrics = Arc::new(TallyMetrics::new());
        let ttl = config.page_cache_ttl();
        Self {
            fan_out: VoteFanOut::new(Arc::clone(&counters), Arc::clone(&sets)),
            reader: LeaderboardReader::new(Arc::clone(&counters), Arc::clone(&sets)),
            page_cache: PageCache::new(ttl, config.page_cache_capacity, Arc::clone(&metrics)),
            voter_cache: VoterCache::new(config.voter_cache_capacity, VOTER_CACHE_TTL),
            voter_pool: VoterPool::new(config.voter_pool_size),
            voter_locks: VoterLocks::new(config.serialize_voter_submissions),
            durable: DurableWriter::new(
                Arc::clone(&store),
                config.durable_write_retries,
                config.durable_retry_backoff(),
                Arc::clone(&metrics),
            ),
            directory: DirectoryHandle::default(),
            config,
            store,
            counters,
            sets,
            metrics,
        }
    }

    pub fn config(&self) -> &TallyConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<TallyMetrics> {
        &self.metrics
    }

    pub fn directory(&self) -> Arc<CandidateDirectory> {
        self.directory.snapshot()
    }

    // ── Read path ───────────────────────────────────────────────────────

    pub async fn home_page(&self) -> Result<Bytes, NodeError> {
        self.page_cache
            .route(HOME_ROUTE, || async {
                let directory = self.directory.snapshot();
                let page = self.reader.home(&directory).await?;
                pages::render(&page)
            })
            .instrument(page_span(HOME_ROUTE))
            .await
    }

    /// `None` when no candidate has this ID.
    pub async fn candidate_page(&self, id: CandidateId) -> Result<Option<Bytes>, NodeError> {
        let directory = self.directory.snapshot();
        let Some(candidate) = directory.get(id) else {
            return Ok(None);
        };
        let route = candidate_route(id);
        let page = self
            .page_cache
            .route(&route, || async {
                let page = self.reader.candidate(candidate).await?;
                pages::render(&page)
            })
            .instrument(page_span(&route))
            .await?;
        Ok(Some(page))
    }

    /// `None` when no candidate belongs to `party`.
    pub async fn party_page(&self, party: &str) -> Result<Option<Bytes>, NodeError> {
        let directory = self.directory.snapshot();
        let Some(members) = directory.party(party) else {
            return Ok(None);
        };
        let route = party_route(party);
        let page = self
            .page_cache
            .route(&route, || async {
                let page = self.reader.party(party, members).await?;
                pages::render(&page)
            })
            .instrument(page_span(&route))
            .await?;
        Ok(Some(page))
    }

    /// Empty vote form listing every candidate.
    pub fn vote_form(&self) -> Result<Bytes, NodeError> {
        let directory = self.directory.snapshot();
        pages::render(&VotePage {
            candidates: directory.candidates(),
            message: "",
        })
    }

    // ── Write path ──────────────────────────────────────────────────────

    /// Validate and apply one submission.
    ///
    /// Rejections come back as an outcome page, not an error. Errors mean a
    /// store failed; aggregate updates that already landed stay applied.
    pub async fn submit_vote(&self, ballot: Ballot) -> Result<VoteOutcome, NodeError> {
        let span = submission_span(&ballot.candidate, &ballot.vote_count);
        async {
            let started = Instant::now();
            let result = self.cast(&ballot).await;
            // Route pages go stale on every submission, whatever the outcome.
            self.page_cache.flush_routes();
            self.metrics
                .submission_latency_ms
                .observe(started.elapsed().as_secs_f64() * 1000.0);

            let rejection = result?;
            match rejection {
                Some(rejection) => {
                    debug!(reason = rejection.label(), "Vote rejected");
                    self.metrics
                        .votes_rejected
                        .with_label_values(&[rejection.label()])
                        .inc();
                }
                None => self.metrics.votes_accepted.inc(),
            }

            let directory = self.directory.snapshot();
            let message = rejection.map_or(VOTE_ACCEPTED_MESSAGE, |r| r.message());
            let page = self
                .page_cache
                .outcome(&outcome_key(rejection), || async {
                    pages::render(&VotePage {
                        candidates: directory.candidates(),
                        message,
                    })
                })
                .await?;
            Ok(VoteOutcome { rejection, page })
        }
        .instrument(span)
        .await
    }

    /// Run the checks in order and fan out an accepted vote. `Ok(Some(_))`
    /// is a rejection; nothing has been written in that case. A malformed
    /// vote count is an error, raised only once the identity checks pass.
    async fn cast(&self, ballot: &Ballot) -> Result<Option<Rejection>, NodeError> {
        if let Err(rejection) = ballot.check_fields() {
            return Ok(Some(rejection));
        }

        let directory = self.directory.snapshot();
        let Some(candidate) = directory.by_name(&ballot.candidate) else {
            return Ok(Some(Rejection::UnknownCandidate));
        };

        let mut voter = self.voter_pool.acquire();
        let found = self
            .voter_cache
            .resolve(&self.store, &ballot.credential, &mut voter)
            .await?;
        if !found || !voter.matches(&ballot.name, &ballot.address, &ballot.credential) {
            return Ok(Some(Rejection::InvalidVoter));
        }

        let count = ballot.count()?;

        // Held until the fan-out has landed so the next submission from this
        // voter reads the updated counter.
        let _guard = self.voter_locks.lock(&ballot.credential).await;

        let used = self.counters.get(&keys::voter_votes(voter.id)).await?;
        if !voter.can_cast(used, count) {
            return Ok(Some(Rejection::AllowanceExceeded));
        }

        let vote = VoteEvent {
            voter: voter.id,
            candidate: candidate.id,
            keyword: ballot.keyword.clone(),
            count,
        };
        if let Err(e) = self.fan_out.apply(&vote, candidate).await {
            self.metrics.fan_out_failures.inc();
            return Err(e.into());
        }
        self.metrics.votes_cast.inc_by(count);
        self.durable.spawn(vote);
        Ok(None)
    }
}
