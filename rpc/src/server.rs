//! Axum-based HTTP server.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tally_node::{ShutdownSignal, TallyNode};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers;

/// Build the router over `node`. `/metrics` is mounted only when the node's
/// config enables it.
pub fn router(node: Arc<TallyNode>) -> Router {
    let mut router = Router::new()
        .route("/", get(handlers::home))
        .route("/candidates/:id", get(handlers::candidate))
        .route("/political_parties/:name", get(handlers::political_party))
        .route("/vote", get(handlers::vote_form).post(handlers::submit_vote))
        .route("/initialize", get(handlers::initialize));
    if node.config().enable_metrics {
        router = router.route("/metrics", get(handlers::metrics));
    }
    router.layer(TraceLayer::new_for_http()).with_state(node)
}

pub struct RpcServer {
    pub listen_addr: String,
    node: Arc<TallyNode>,
    shutdown: ShutdownSignal,
}

impl RpcServer {
    pub fn new(node: Arc<TallyNode>, shutdown: ShutdownSignal) -> Self {
        Self {
            listen_addr: node.config().listen_addr.clone(),
            node,
            shutdown,
        }
    }

    /// Serve until the shutdown signal fires, then drain in-flight requests.
    pub async fn start(self) -> std::io::Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.listen_addr).await?;
        info!("HTTP server listening on {}", listener.local_addr()?);

        let shutdown = self.shutdown.clone();
        axum::serve(listener, router(self.node))
            .with_graceful_shutdown(async move { shutdown.wait().await })
            .await?;

        info!("HTTP server stopped");
        Ok(())
    }
}
