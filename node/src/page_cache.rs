//! Whole-response page caches.
//!
//! Two moka caches share one TTL:
//! - the **route** cache, keyed by request path, is flushed on every vote
//!   submission so the next read re-renders from fresh aggregates;
//! - the **outcome** cache, keyed by submission outcome, only ever expires.
//!
//! Renders that fail are returned to the caller and never stored. Each cache
//! carries a flush generation: a render that overlaps a flush is returned to
//! its caller but not kept, so a page built from pre-flush aggregates never
//! outlives the flush.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use moka::future::Cache;
use tally_types::{CandidateId, Rejection};

use crate::metrics::TallyMetrics;
use crate::NodeError;

pub const HOME_ROUTE: &str = "/";

pub fn candidate_route(id: CandidateId) -> String {
    format!("/candidates/{id}")
}

pub fn party_route(party: &str) -> String {
    format!("/political_parties/{party}")
}

pub fn outcome_key(outcome: Option<Rejection>) -> String {
    match outcome {
        None => "vote:accepted".to_string(),
        Some(rejection) => format!("vote:rejected:{}", rejection.label()),
    }
}

#[derive(Clone, Copy, Debug)]
enum Tier {
    Route,
    Outcome,
}

impl Tier {
    fn label(self) -> &'static str {
        match self {
            Tier::Route => "route",
            Tier::Outcome => "outcome",
        }
    }
}

struct Generational {
    pages: Cache<String, Bytes>,
    generation: AtomicU64,
}

impl Generational {
    fn new(ttl: Duration, capacity: u64) -> Self {
        Self {
            pages: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
            generation: AtomicU64::new(0),
        }
    }

    fn flush(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.pages.invalidate_all();
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

pub struct PageCache {
    routes: Generational,
    outcomes: Generational,
    metrics: Arc<TallyMetrics>,
}

impl PageCache {
    pub fn new(ttl: Duration, capacity: u64, metrics: Arc<TallyMetrics>) -> Self {
        Self {
            routes: Generational::new(ttl, capacity),
            outcomes: Generational::new(ttl, capacity),
            metrics,
        }
    }

    /// Cached page for `route`, rendering and storing it on a miss.
    pub async fn route<F, Fut>(&self, route: &str, render: F) -> Result<Bytes, NodeError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Bytes, NodeError>>,
    {
        self.get_or_render(Tier::Route, route, render).await
    }

    /// Cached page for a submission outcome, rendering and storing it on a miss.
    pub async fn outcome<F, Fut>(&self, key: &str, render: F) -> Result<Bytes, NodeError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Bytes, NodeError>>,
    {
        self.get_or_render(Tier::Outcome, key, render).await
    }

    /// Drop every route entry. Outcome entries are left to expire.
    pub fn flush_routes(&self) {
        self.routes.flush();
    }

    pub fn clear(&self) {
        self.routes.flush();
        self.outcomes.flush();
    }

    async fn get_or_render<F, Fut>(
        &self,
        tier: Tier,
        key: &str,
        render: F,
    ) -> Result<Bytes, NodeError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Bytes, NodeError>>,
    {
        let cache = match tier {
            Tier::Route => &self.routes,
            Tier::Outcome => &self.outcomes,
        };

        if let Some(page) = cache.pages.get(key).await {
            self.metrics
                .page_cache_hits
                .with_label_values(&[tier.label()])
                .inc();
            return Ok(page);
        }

        self.metrics
            .page_cache_misses
            .with_label_values(&[tier.label()])
            .inc();
        let started = cache.generation();
        let page = render().await?;
        if cache.generation() != started {
            return Ok(page);
        }
        cache.pages.insert(key.to_string(), page.clone()).await;
        // A flush may have landed between the check and the insert.
        if cache.generation() != started {
            cache.pages.invalidate(key).await;
        }
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn cache(ttl: Duration) -> PageCache {
        PageCache::new(ttl, 100, Arc::new(TallyMetrics::new()))
    }

    async fn render_counting(
        cache: &PageCache,
        route: &str,
        renders: &AtomicU32,
    ) -> Bytes {
        cache
            .route(route, || async {
                let n = renders.fetch_add(1, Ordering::SeqCst);
                Ok(Bytes::from(format!("page {n}")))
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn hit_returns_stored_bytes_verbatim() {
        let cache = cache(Duration::from_secs(60));
        let renders = AtomicU32::new(0);
        let first = render_counting(&cache, HOME_ROUTE, &renders).await;
        let second = render_counting(&cache, HOME_ROUTE, &renders).await;
        assert_eq!(first, second);
        assert_eq!(renders.load(Ordering::SeqCst), 1);
        assert_eq!(
            cache
                .metrics
                .page_cache_hits
                .with_label_values(&["route"])
                .get(),
            1
        );
    }

    #[tokio::test]
    async fn flush_routes_forces_rerender_but_keeps_outcomes() {
        let cache = cache(Duration::from_secs(60));
        let renders = AtomicU32::new(0);
        render_counting(&cache, HOME_ROUTE, &renders).await;
        let accepted = outcome_key(None);
        cache
            .outcome(&accepted, || async { Ok(Bytes::from_static(b"ok")) })
            .await
            .unwrap();

        cache.flush_routes();

        let page = render_counting(&cache, HOME_ROUTE, &renders).await;
        assert_eq!(page, Bytes::from("page 1"));
        let outcome = cache
            .outcome(&accepted, || async { Ok(Bytes::from_static(b"re-rendered")) })
            .await
            .unwrap();
        assert_eq!(outcome, Bytes::from_static(b"ok"));

        cache.clear();
        let outcome = cache
            .outcome(&accepted, || async { Ok(Bytes::from_static(b"fresh")) })
            .await
            .unwrap();
        assert_eq!(outcome, Bytes::from_static(b"fresh"));
    }

    #[tokio::test]
    async fn render_overlapping_a_flush_is_not_kept() {
        let cache = cache(Duration::from_secs(60));
        let page = cache
            .route(HOME_ROUTE, || async {
                cache.flush_routes();
                Ok(Bytes::from_static(b"pre-vote"))
            })
            .await
            .unwrap();
        assert_eq!(page, Bytes::from_static(b"pre-vote"));

        let page = cache
            .route(HOME_ROUTE, || async { Ok(Bytes::from_static(b"post-vote")) })
            .await
            .unwrap();
        assert_eq!(page, Bytes::from_static(b"post-vote"));

        let page = cache
            .route(HOME_ROUTE, || async { Ok(Bytes::from_static(b"unused")) })
            .await
            .unwrap();
        assert_eq!(page, Bytes::from_static(b"post-vote"));
    }

    #[tokio::test]
    async fn failed_render_is_not_cached() {
        let cache = cache(Duration::from_secs(60));
        let err = cache
            .route(HOME_ROUTE, || async {
                Err(NodeError::Config("render failed".into()))
            })
            .await;
        assert!(err.is_err());
        let page = cache
            .route(HOME_ROUTE, || async { Ok(Bytes::from_static(b"good")) })
            .await
            .unwrap();
        assert_eq!(page, Bytes::from_static(b"good"));
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let cache = cache(Duration::from_millis(50));
        let renders = AtomicU32::new(0);
        render_counting(&cache, HOME_ROUTE, &renders).await;
        tokio::time::sleep(Duration::from_millis(120)).await;
        render_counting(&cache, HOME_ROUTE, &renders).await;
        assert_eq!(renders.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn keys_distinguish_routes_and_outcomes() {
        assert_eq!(candidate_route(CandidateId::new(4)), "/candidates/4");
        assert_eq!(party_route("Blue"), "/political_parties/Blue");
        assert_eq!(
            outcome_key(Some(Rejection::MissingKeyword)),
            "vote:rejected:missing_keyword"
        );
    }
}
