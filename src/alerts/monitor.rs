//! Timer-driven alert evaluation.
//!
//! # Responsibilities
//! - Run an evaluation pass on every tick
//! - Stop on the shutdown broadcast
//!
//! Evaluation is synchronous and short, so it runs inline on the tick
//! rather than on a blocking thread.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;

use crate::alerts::engine::AlertEngine;
use crate::config::AlertConfig;

pub struct AlertMonitor {
    engine: Arc<AlertEngine>,
    enabled: bool,
    interval: Duration,
}

impl AlertMonitor {
    pub fn new(engine: Arc<AlertEngine>, config: &AlertConfig) -> Self {
        Self {
            engine,
            enabled: config.enabled,
            interval: Duration::from_secs(config.evaluation_interval_secs.max(1)),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if !self.enabled {
            tracing::info!("Alert evaluation disabled");
            return;
        }

        tracing::info!(
            interval = ?self.interval,
            rules = self.engine.rule_names().len(),
            "Alert monitor starting"
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let summary = self.engine.evaluate();
                    tracing::debug!(
                        fired = summary.fired.len(),
                        resolved = summary.resolved.len(),
                        cooling_down = summary.cooling_down.len(),
                        failed = summary.failed.len(),
                        "Alert evaluation pass complete"
                    );
                }
                _ = shutdown.recv() => {
                    tracing::info!("Alert monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::{AlertRule, AlertSeverity};
    use crate::metrics::MetricsStore;

    #[tokio::test]
    async fn test_monitor_evaluates_until_shutdown() {
        let metrics = Arc::new(MetricsStore::new());
        let engine = Arc::new(AlertEngine::new(metrics.clone(), 10));
        engine.register_rule(AlertRule::new(
            "always",
            AlertSeverity::Info,
            0.0,
            |_| Ok(true),
            |_| Ok(1.0),
        ));

        let (tx, rx) = broadcast::channel(1);
        let monitor = AlertMonitor::new(engine.clone(), &AlertConfig::default())
            .with_interval(Duration::from_millis(10));
        let handle = tokio::spawn(monitor.run(rx));

        time::sleep(Duration::from_millis(50)).await;
        assert!(engine.active_alert("always").is_some());

        tx.send(()).unwrap();
        time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("monitor did not stop")
            .unwrap();
    }

    #[tokio::test]
    async fn test_disabled_monitor_returns_immediately() {
        let engine = Arc::new(AlertEngine::new(Arc::new(MetricsStore::new()), 10));
        let mut config = AlertConfig::default();
        config.enabled = false;

        let (_tx, rx) = broadcast::channel(1);
        time::timeout(Duration::from_secs(1), AlertMonitor::new(engine, &config).run(rx))
            .await
            .expect("disabled monitor should return");
    }
}
