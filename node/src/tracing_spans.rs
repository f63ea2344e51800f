//! Pre-built [`tracing::Span`] constructors for common tally operations.
//!
//! Consistent span names and field sets make it easy to filter and correlate
//! request logs.

use tracing::{info_span, Span};

/// Span covering one vote submission, from validation to outcome page.
pub fn submission_span(candidate: &str, vote_count: &str) -> Span {
    info_span!("submit_vote", candidate = %candidate, vote_count = %vote_count)
}

/// Span covering a cached page read.
pub fn page_span(route: &str) -> Span {
    info_span!("page", route = %route)
}

/// Span covering a warm-up or reset.
pub fn warm_up_span(reason: &'static str) -> Span {
    info_span!("warm_up", reason)
}
