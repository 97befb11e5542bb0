//! Built-in rules over the HTTP request metrics.
//!
//! Both rules stay quiet below a minimum sample size so that low-traffic
//! instances do not page on a handful of requests.

use std::time::Duration;

use crate::alerts::rule::AlertRule;
use crate::alerts::types::AlertSeverity;
use crate::config::AlertConfig;
use crate::metrics::{MetricsStore, HTTP_ERRORS_TOTAL, HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION_MS};

pub const HIGH_ERROR_RATE: &str = "high_error_rate";
pub const HIGH_LATENCY_P95: &str = "high_latency_p95";

fn error_rate(metrics: &MetricsStore) -> f64 {
    let requests = metrics.counter(HTTP_REQUESTS_TOTAL, &[]);
    if requests <= 0.0 {
        return 0.0;
    }
    metrics.counter(HTTP_ERRORS_TOTAL, &[]) / requests
}

/// Fires when `http_errors_total / http_requests_total` exceeds `threshold`.
pub fn error_rate_rule(threshold: f64, min_requests: u64, cooldown: Duration) -> AlertRule {
    AlertRule::new(
        HIGH_ERROR_RATE,
        AlertSeverity::Critical,
        threshold,
        move |m| {
            if m.counter(HTTP_REQUESTS_TOTAL, &[]) < min_requests as f64 {
                return Ok(false);
            }
            Ok(error_rate(m) > threshold)
        },
        |m| Ok(error_rate(m)),
    )
    .with_message(format!("HTTP error rate above {:.1}%", threshold * 100.0))
    .with_cooldown(cooldown)
}

/// Fires when the bucketed p95 of `http_request_duration_ms` exceeds
/// `threshold_ms`.
pub fn latency_rule(threshold_ms: f64, min_samples: u64, cooldown: Duration) -> AlertRule {
    AlertRule::new(
        HIGH_LATENCY_P95,
        AlertSeverity::Warning,
        threshold_ms,
        move |m| match m.histogram(HTTP_REQUEST_DURATION_MS, &[]) {
            Some(h) if h.count() >= min_samples => Ok(h.percentile(95.0) > threshold_ms),
            _ => Ok(false),
        },
        |m| Ok(m.calculate_percentile(HTTP_REQUEST_DURATION_MS, 95.0, &[])),
    )
    .with_message(format!("HTTP p95 latency above {}ms", threshold_ms))
    .with_cooldown(cooldown)
}

/// The built-in rule set, parameterized from configuration.
pub fn default_rules(config: &AlertConfig) -> Vec<AlertRule> {
    let cooldown = Duration::from_secs(config.cooldown_secs);
    vec![
        error_rate_rule(config.error_rate_threshold, config.min_requests, cooldown),
        latency_rule(
            config.latency_p95_threshold_ms,
            config.min_latency_samples,
            cooldown,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(metrics: &MetricsStore, requests: u32, errors: u32) {
        for i in 0..requests {
            metrics.increment_counter(HTTP_REQUESTS_TOTAL, 1.0, &[]);
            if i < errors {
                metrics.increment_counter(HTTP_ERRORS_TOTAL, 1.0, &[]);
            }
        }
    }

    #[test]
    fn test_error_rate_needs_minimum_traffic() {
        let metrics = MetricsStore::new();
        let rule = error_rate_rule(0.05, 100, Duration::ZERO);

        record(&metrics, 10, 10);
        assert_eq!(rule.condition(&metrics), Ok(false));

        record(&metrics, 90, 0);
        assert_eq!(rule.condition(&metrics), Ok(true));
        assert_eq!(rule.current_value(&metrics), Ok(0.1));
    }

    #[test]
    fn test_error_rate_below_threshold() {
        let metrics = MetricsStore::new();
        record(&metrics, 200, 5);
        let rule = error_rate_rule(0.05, 100, Duration::ZERO);
        assert_eq!(rule.condition(&metrics), Ok(false));
    }

    #[test]
    fn test_error_rate_without_traffic() {
        let metrics = MetricsStore::new();
        let rule = error_rate_rule(0.05, 0, Duration::ZERO);
        assert_eq!(rule.condition(&metrics), Ok(false));
        assert_eq!(rule.current_value(&metrics), Ok(0.0));
    }

    #[test]
    fn test_latency_rule() {
        let metrics = MetricsStore::new();
        let rule = latency_rule(1000.0, 50, Duration::ZERO);

        for _ in 0..49 {
            metrics.observe_histogram(HTTP_REQUEST_DURATION_MS, 4000.0, &[]);
        }
        assert_eq!(rule.condition(&metrics), Ok(false));

        metrics.observe_histogram(HTTP_REQUEST_DURATION_MS, 4000.0, &[]);
        assert_eq!(rule.condition(&metrics), Ok(true));
        assert_eq!(rule.current_value(&metrics), Ok(5000.0));
    }

    #[test]
    fn test_fast_requests_do_not_fire() {
        let metrics = MetricsStore::new();
        for _ in 0..100 {
            metrics.observe_histogram(HTTP_REQUEST_DURATION_MS, 20.0, &[]);
        }
        let rule = latency_rule(1000.0, 50, Duration::ZERO);
        assert_eq!(rule.condition(&metrics), Ok(false));
        assert_eq!(rule.current_value(&metrics), Ok(25.0));
    }

    #[test]
    fn test_default_rules_follow_config() {
        let mut config = AlertConfig::default();
        config.cooldown_secs = 60;
        let rules = default_rules(&config);

        let names: Vec<&str> = rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec![HIGH_ERROR_RATE, HIGH_LATENCY_P95]);
        assert!(rules.iter().all(|r| r.cooldown == Duration::from_secs(60)));
        assert_eq!(rules[0].message, "HTTP error rate above 5.0%");
    }
}
