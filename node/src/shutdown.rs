//! Graceful shutdown signal for the tally service.
//!
//! Resolves on SIGINT/SIGTERM or when triggered programmatically. The HTTP
//! server hands [`ShutdownSignal::wait`] to axum's graceful shutdown so
//! in-flight requests drain before the process exits.

use tokio::signal;
use tokio::sync::watch;

/// Cloneable shutdown handle. Every clone observes the same trigger.
#[derive(Clone)]
pub struct ShutdownSignal {
    tx: watch::Sender<bool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Trigger shutdown programmatically.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once shutdown has been triggered.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // An error means every sender is gone, which cannot happen while
        // `self` is alive.
        let _ = rx.wait_for(|triggered| *triggered).await;
    }

    /// Wait for SIGTERM or SIGINT, then trigger shutdown.
    pub async fn listen_for_os_signals(&self) {
        let ctrl_c = signal::ctrl_c();

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                }
                Err(e) => {
                    tracing::warn!("failed to install SIGTERM handler: {e}");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => { tracing::info!("received SIGINT, shutting down"); }
            _ = terminate => { tracing::info!("received SIGTERM, shutting down"); }
            _ = self.wait() => {}
        }

        self.trigger();
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}
