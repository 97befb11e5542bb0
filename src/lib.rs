//! In-process observability core: metrics aggregation, lightweight span
//! tracking and threshold alerting, with an HTTP inspection surface.

pub mod admin;
pub mod alerts;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod logging;
pub mod metrics;
pub mod telemetry;
pub mod time;
pub mod trace;

pub use alerts::{AlertEngine, AlertRule, AlertSeverity};
pub use config::schema::CoreConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use metrics::MetricsStore;
pub use telemetry::Telemetry;
pub use trace::{SpanStatus, TraceStore};
