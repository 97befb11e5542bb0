//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! observability core. All types derive Serde traits for deserialization
//! from config files.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Default histogram bucket upper bounds, in the unit callers observe
/// (milliseconds for request durations).
pub const DEFAULT_BUCKETS: [f64; 10] = [
    10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0,
];

/// Root configuration for the observability core.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CoreConfig {
    /// Inspection server settings.
    pub server: ServerConfig,

    /// Log output settings.
    pub logging: LoggingConfig,

    /// Metrics aggregation settings.
    pub metrics: MetricsConfig,

    /// Span store settings.
    pub tracing: TracingConfig,

    /// Alert engine settings.
    pub alerts: AlertConfig,
}

/// Inspection server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:9090").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:9090".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, for development.
    Pretty,
    /// One JSON object per line, for log aggregation.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` overrides it.
    pub level: String,

    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Metrics aggregation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Bucket bounds used for any histogram without an override.
    pub default_buckets: Vec<f64>,

    /// Per-metric-name bucket bounds.
    pub histogram_buckets: HashMap<String, Vec<f64>>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            default_buckets: DEFAULT_BUCKETS.to_vec(),
            histogram_buckets: HashMap::new(),
        }
    }
}

/// Span store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TracingConfig {
    /// Maximum number of spans held in memory.
    pub max_spans: usize,

    /// Spans started longer ago than this are removed by cleanup.
    pub max_span_age_secs: u64,

    /// Interval between cleanup passes in seconds.
    pub cleanup_interval_secs: u64,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            max_spans: 10_000,
            max_span_age_secs: 3600,
            cleanup_interval_secs: 60,
        }
    }
}

/// Alert engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Run the periodic evaluation loop.
    pub enabled: bool,

    /// Interval between evaluation passes in seconds.
    pub evaluation_interval_secs: u64,

    /// Number of alert instances retained in history.
    pub history_capacity: usize,

    /// Register the built-in error-rate and latency rules.
    pub default_rules: bool,

    /// Cooldown applied to the built-in rules, in seconds.
    pub cooldown_secs: u64,

    /// Error ratio (0.0-1.0) above which the error-rate rule fires.
    pub error_rate_threshold: f64,

    /// Below this many requests the error-rate rule stays quiet.
    pub min_requests: u64,

    /// p95 request latency in milliseconds above which the latency rule fires.
    pub latency_p95_threshold_ms: f64,

    /// Below this many observations the latency rule stays quiet.
    pub min_latency_samples: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            evaluation_interval_secs: 30,
            history_capacity: 100,
            default_rules: true,
            cooldown_secs: 300,
            error_rate_threshold: 0.05,
            min_requests: 100,
            latency_p95_threshold_ms: 1000.0,
            min_latency_samples: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: CoreConfig = toml::from_str(
            r#"
            [alerts]
            min_requests = 10

            [metrics.histogram_buckets]
            payment_amount = [1.0, 5.0, 20.0]
            "#,
        )
        .unwrap();

        assert_eq!(config.alerts.min_requests, 10);
        assert_eq!(config.alerts.cooldown_secs, 300);
        assert_eq!(config.tracing.max_spans, 10_000);
        assert_eq!(config.metrics.default_buckets, DEFAULT_BUCKETS.to_vec());
        assert_eq!(
            config.metrics.histogram_buckets.get("payment_amount"),
            Some(&vec![1.0, 5.0, 20.0])
        );
    }

    #[test]
    fn test_log_format_parsing() {
        let config: CoreConfig = toml::from_str("[logging]\nformat = \"json\"").unwrap();
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");
    }
}
