//! Alert rule definitions.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::alerts::types::{AlertError, AlertSeverity};
use crate::metrics::MetricsStore;

/// Decides whether a rule is currently violated.
pub type ConditionFn = Arc<dyn Fn(&MetricsStore) -> Result<bool, AlertError> + Send + Sync>;

/// Reads the value reported when a rule fires.
pub type ValueFn = Arc<dyn Fn(&MetricsStore) -> Result<f64, AlertError> + Send + Sync>;

/// A named, static alert definition.
///
/// Rules only read the metrics store they are evaluated against and know
/// nothing about each other.
#[derive(Clone)]
pub struct AlertRule {
    pub name: String,
    pub severity: AlertSeverity,
    pub message: String,
    /// Reference value, carried into fired instances for display.
    pub threshold: f64,
    /// Minimum time between state changes caused by this rule.
    pub cooldown: Duration,
    condition: ConditionFn,
    current_value: ValueFn,
}

impl AlertRule {
    /// Create a rule with no cooldown and its name as message.
    pub fn new<C, V>(
        name: impl Into<String>,
        severity: AlertSeverity,
        threshold: f64,
        condition: C,
        current_value: V,
    ) -> Self
    where
        C: Fn(&MetricsStore) -> Result<bool, AlertError> + Send + Sync + 'static,
        V: Fn(&MetricsStore) -> Result<f64, AlertError> + Send + Sync + 'static,
    {
        let name = name.into();
        Self {
            message: name.clone(),
            name,
            severity,
            threshold,
            cooldown: Duration::ZERO,
            condition: Arc::new(condition),
            current_value: Arc::new(current_value),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub(crate) fn condition(&self, metrics: &MetricsStore) -> Result<bool, AlertError> {
        (self.condition)(metrics)
    }

    pub(crate) fn current_value(&self, metrics: &MetricsStore) -> Result<f64, AlertError> {
        (self.current_value)(metrics)
    }

    pub(crate) fn cooldown_ms(&self) -> u64 {
        self.cooldown.as_millis() as u64
    }
}

impl fmt::Debug for AlertRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlertRule")
            .field("name", &self.name)
            .field("severity", &self.severity)
            .field("message", &self.message)
            .field("threshold", &self.threshold)
            .field("cooldown", &self.cooldown)
            .finish_non_exhaustive()
    }
}
