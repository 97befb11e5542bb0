//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges and bucket shapes.
//! All problems are collected so a bad file is reported in one pass.

use std::fmt;

use crate::config::schema::CoreConfig;

/// A single semantic problem in a configuration file.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration, returning every error found.
pub fn validate_config(config: &CoreConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<std::net::SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "server.bind_address",
            format!("'{}' is not a socket address", config.server.bind_address),
        ));
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::new("server.request_timeout_secs", "must be > 0"));
    }

    check_buckets("metrics.default_buckets", &config.metrics.default_buckets, &mut errors);
    for (name, bounds) in &config.metrics.histogram_buckets {
        check_buckets(&format!("metrics.histogram_buckets.{}", name), bounds, &mut errors);
    }

    if config.tracing.max_spans == 0 {
        errors.push(ValidationError::new("tracing.max_spans", "must be > 0"));
    }
    if config.tracing.max_span_age_secs == 0 {
        errors.push(ValidationError::new("tracing.max_span_age_secs", "must be > 0"));
    }
    if config.tracing.cleanup_interval_secs == 0 {
        errors.push(ValidationError::new("tracing.cleanup_interval_secs", "must be > 0"));
    }

    let alerts = &config.alerts;
    if alerts.evaluation_interval_secs == 0 {
        errors.push(ValidationError::new("alerts.evaluation_interval_secs", "must be > 0"));
    }
    if alerts.history_capacity == 0 {
        errors.push(ValidationError::new("alerts.history_capacity", "must be > 0"));
    }
    if !(0.0..=1.0).contains(&alerts.error_rate_threshold) {
        errors.push(ValidationError::new(
            "alerts.error_rate_threshold",
            "must be between 0.0 and 1.0",
        ));
    }
    if !alerts.latency_p95_threshold_ms.is_finite() || alerts.latency_p95_threshold_ms <= 0.0 {
        errors.push(ValidationError::new(
            "alerts.latency_p95_threshold_ms",
            "must be a positive number",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_buckets(field: &str, bounds: &[f64], errors: &mut Vec<ValidationError>) {
    if bounds.is_empty() {
        errors.push(ValidationError::new(field, "at least one bucket is required"));
        return;
    }
    if bounds.iter().any(|b| !b.is_finite()) {
        errors.push(ValidationError::new(field, "bucket bounds must be finite"));
        return;
    }
    if bounds.windows(2).any(|w| w[0] >= w[1]) {
        errors.push(ValidationError::new(field, "bucket bounds must be strictly ascending"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&CoreConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = CoreConfig::default();
        config.tracing.max_spans = 0;
        config.alerts.error_rate_threshold = 1.5;
        config.metrics.default_buckets = vec![10.0, 5.0];
        config
            .metrics
            .histogram_buckets
            .insert("latency".into(), vec![]);

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();

        assert_eq!(errors.len(), 4);
        assert!(fields.contains(&"tracing.max_spans"));
        assert!(fields.contains(&"alerts.error_rate_threshold"));
        assert!(fields.contains(&"metrics.default_buckets"));
        assert!(fields.contains(&"metrics.histogram_buckets.latency"));
    }

    #[test]
    fn test_rejects_zero_span_age() {
        let mut config = CoreConfig::default();
        config.tracing.max_span_age_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "tracing.max_span_age_secs");
    }

    #[test]
    fn test_rejects_infinite_bucket() {
        let mut config = CoreConfig::default();
        config.metrics.default_buckets = vec![1.0, f64::INFINITY];
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].message, "bucket bounds must be finite");
    }
}
