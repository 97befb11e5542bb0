//! Periodic age-based span cleanup.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;

use crate::config::TracingConfig;
use crate::trace::store::TraceStore;

/// Background task that removes stale spans on a fixed interval.
pub struct SpanJanitor {
    store: Arc<TraceStore>,
    interval: Duration,
    max_age: Duration,
}

impl SpanJanitor {
    pub fn new(store: Arc<TraceStore>, config: &TracingConfig) -> Self {
        Self {
            store,
            interval: Duration::from_secs(config.cleanup_interval_secs.max(1)),
            max_age: Duration::from_secs(config.max_span_age_secs),
        }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval = ?self.interval,
            max_age = ?self.max_age,
            "Span janitor starting"
        );

        let mut ticker = time::interval(self.interval);
        // The first tick completes immediately; skip it.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = self.store.cleanup(self.max_age);
                    if removed > 0 {
                        tracing::debug!(removed, remaining = self.store.len(), "Stale spans removed");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Span janitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}
