//! Rule-based alerting over aggregated metrics.
//!
//! # Data Flow
//! ```text
//! monitor.rs (interval tick)
//!     → engine.rs (evaluate every rule, cooldown bookkeeping)
//!         → rule.rs (condition / current value, read-only on MetricsStore)
//!     → active alerts + bounded history
//!     → broadcast AlertEvent to subscribers
//! ```
//!
//! The engine holds no numeric logic beyond threshold comparison and
//! cooldown; ratios and percentiles come from the metrics store.

pub mod defaults;
pub mod engine;
pub mod monitor;
pub mod rule;
pub mod types;

pub use defaults::{default_rules, error_rate_rule, latency_rule};
pub use engine::AlertEngine;
pub use monitor::AlertMonitor;
pub use rule::AlertRule;
pub use types::{AlertError, AlertEvent, AlertInstance, AlertSeverity, EvaluationSummary};
