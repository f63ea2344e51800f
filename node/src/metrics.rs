//! Prometheus metrics for the tally service.
//!
//! Covers vote submissions, fan-out and durable write failures, page cache
//! effectiveness and maintenance runs.  The [`TallyMetrics`] struct owns a
//! dedicated [`Registry`] that the HTTP `/metrics` endpoint encodes into the
//! Prometheus text exposition format.

use prometheus::{
    register_histogram_with_registry, register_int_counter_vec_with_registry,
    register_int_counter_with_registry, register_int_gauge_with_registry, Encoder, Histogram,
    HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

/// Central collection of all service-level Prometheus metrics.
pub struct TallyMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    /// Submissions that passed validation and were fanned out.
    pub votes_accepted: IntCounter,
    /// Submissions turned away, labelled by rejection reason.
    pub votes_rejected: IntCounterVec,
    /// Sum of `vote_count` over accepted submissions.
    pub votes_cast: IntCounter,
    /// Fan-outs where at least one aggregate update failed.
    pub fan_out_failures: IntCounter,
    /// Relational vote inserts abandoned after every retry failed.
    pub durable_write_failures: IntCounter,
    /// Page cache hits, labelled by cache (`route` / `outcome`).
    pub page_cache_hits: IntCounterVec,
    /// Page cache misses, labelled by cache (`route` / `outcome`).
    pub page_cache_misses: IntCounterVec,
    /// Completed warm-ups (startup and reset).
    pub warm_ups: IntCounter,

    // ── Gauges ──────────────────────────────────────────────────────────
    /// Candidates in the current directory snapshot.
    pub candidate_count: IntGauge,

    // ── Histograms ──────────────────────────────────────────────────────
    /// Time spent handling a vote submission, in milliseconds.
    pub submission_latency_ms: Histogram,
}

impl TallyMetrics {
    /// Create a fresh set of metrics, all registered under a new
    /// [`Registry`].
    pub fn new() -> Self {
        let registry = Registry::new();

        // Counters
        let votes_accepted = register_int_counter_with_registry!(
            Opts::new("tally_votes_accepted_total", "Accepted vote submissions"),
            registry
        )
        .expect("failed to register votes_accepted counter");

        let votes_rejected = register_int_counter_vec_with_registry!(
            Opts::new("tally_votes_rejected_total", "Rejected vote submissions"),
            &["reason"],
            registry
        )
        .expect("failed to register votes_rejected counter");

        let votes_cast = register_int_counter_with_registry!(
            Opts::new("tally_votes_cast_total", "Votes cast across accepted submissions"),
            registry
        )
        .expect("failed to register votes_cast counter");

        let fan_out_failures = register_int_counter_with_registry!(
            Opts::new(
                "tally_fan_out_failures_total",
                "Vote fan-outs with at least one failed aggregate update"
            ),
            registry
        )
        .expect("failed to register fan_out_failures counter");

        let durable_write_failures = register_int_counter_with_registry!(
            Opts::new(
                "tally_durable_write_failures_total",
                "Relational vote inserts abandoned after retries"
            ),
            registry
        )
        .expect("failed to register durable_write_failures counter");

        let page_cache_hits = register_int_counter_vec_with_registry!(
            Opts::new("tally_page_cache_hits_total", "Page cache hits"),
            &["cache"],
            registry
        )
        .expect("failed to register page_cache_hits counter");

        let page_cache_misses = register_int_counter_vec_with_registry!(
            Opts::new("tally_page_cache_misses_total", "Page cache misses"),
            &["cache"],
            registry
        )
        .expect("failed to register page_cache_misses counter");

        let warm_ups = register_int_counter_with_registry!(
            Opts::new("tally_warm_ups_total", "Completed cache warm-ups"),
            registry
        )
        .expect("failed to register warm_ups counter");

        // Gauges
        let candidate_count = register_int_gauge_with_registry!(
            Opts::new(
                "tally_candidate_count",
                "Candidates in the current directory snapshot"
            ),
            registry
        )
        .expect("failed to register candidate_count gauge");

        // Histograms – exponential buckets covering 0.1 ms → ~1.6 s.
        let submission_latency_ms = register_histogram_with_registry!(
            HistogramOpts::new(
                "tally_submission_latency_ms",
                "Vote submission handling time in milliseconds"
            )
            .buckets(
                prometheus::exponential_buckets(0.1, 2.0, 15)
                    .expect("static bucket parameters are valid")
            ),
            registry
        )
        .expect("failed to register submission_latency_ms histogram");

        Self {
            registry,
            votes_accepted,
            votes_rejected,
            votes_cast,
            fan_out_failures,
            durable_write_failures,
            page_cache_hits,
            page_cache_misses,
            warm_ups,
            candidate_count,
            submission_latency_ms,
        }
    }

    /// Encode every registered metric in the Prometheus text format.
    pub fn encode_text(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl Default for TallyMetrics {
    fn default() -> Self {
        Self::new()
    }
}
