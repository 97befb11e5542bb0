//! The shared observability handles.
//!
//! Built once at startup and handed to request handlers and background
//! tasks by cloning; every clone points at the same stores.

use std::sync::Arc;

use crate::alerts::{default_rules, AlertEngine};
use crate::config::CoreConfig;
use crate::metrics::MetricsStore;
use crate::trace::TraceStore;

/// Metrics store, span store and alert engine of one process.
#[derive(Clone)]
pub struct Telemetry {
    pub metrics: Arc<MetricsStore>,
    pub traces: Arc<TraceStore>,
    pub alerts: Arc<AlertEngine>,
}

impl Telemetry {
    /// Build the stores from configuration, registering the built-in alert
    /// rules when enabled.
    pub fn from_config(config: &CoreConfig) -> Self {
        let metrics = Arc::new(MetricsStore::from_config(&config.metrics));
        let traces = Arc::new(TraceStore::from_config(&config.tracing));
        let alerts = Arc::new(AlertEngine::new(
            metrics.clone(),
            config.alerts.history_capacity,
        ));

        if config.alerts.default_rules {
            for rule in default_rules(&config.alerts) {
                alerts.register_rule(rule);
            }
        }

        Self {
            metrics,
            traces,
            alerts,
        }
    }

    /// Clear all metric and span state. Alert rules are kept.
    pub fn reset(&self) {
        self.metrics.reset();
        self.traces.reset();
    }
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::from_config(&CoreConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::defaults::{HIGH_ERROR_RATE, HIGH_LATENCY_P95};

    #[test]
    fn test_default_rules_registered() {
        let telemetry = Telemetry::default();
        assert_eq!(
            telemetry.alerts.rule_names(),
            vec![HIGH_ERROR_RATE, HIGH_LATENCY_P95]
        );
    }

    #[test]
    fn test_default_rules_can_be_disabled() {
        let mut config = CoreConfig::default();
        config.alerts.default_rules = false;
        assert!(Telemetry::from_config(&config).alerts.rule_names().is_empty());
    }

    #[test]
    fn test_alert_engine_reads_shared_store() {
        let telemetry = Telemetry::default();
        telemetry.metrics.increment_counter("x", 1.0, &[]);
        assert_eq!(telemetry.alerts.metrics().counter("x", &[]), 1.0);

        telemetry.reset();
        assert_eq!(telemetry.alerts.metrics().counter("x", &[]), 0.0);
    }
}
