//! Alert state types and errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Alert severity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

/// Runtime state of one firing of a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertInstance {
    pub rule_name: String,
    pub severity: AlertSeverity,
    pub message: String,
    /// Observed value at fire time.
    pub value: f64,
    pub threshold: f64,
    /// Fire time, epoch milliseconds.
    pub timestamp: u64,
    pub resolved: bool,
    /// Resolve time, epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<u64>,
}

/// State transition published to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum AlertEvent {
    Fired(AlertInstance),
    Resolved(AlertInstance),
}

/// Failure inside a rule's condition or value function.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlertError {
    /// A metric the rule depends on is missing or unusable.
    #[error("metric unavailable: {0}")]
    MetricUnavailable(String),

    #[error("rule evaluation failed: {0}")]
    Evaluation(String),

    /// The rule function panicked; the payload message is kept.
    #[error("rule panicked: {0}")]
    Panicked(String),
}

/// Outcome of one evaluation pass, by rule name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationSummary {
    pub fired: Vec<String>,
    pub resolved: Vec<String>,
    /// Skipped because the rule fired less than its cooldown ago.
    pub cooling_down: Vec<String>,
    pub failed: Vec<String>,
}
