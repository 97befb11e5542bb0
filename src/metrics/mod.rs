//! Metrics aggregation subsystem.
//!
//! # Data Flow
//! ```text
//! Request handlers / domain events
//!     → store.rs (increment_counter, set_gauge, observe_histogram)
//!         → labels.rs (canonical series key)
//!         → histogram.rs (cumulative buckets)
//!
//! Readers:
//!     → export.rs (exposition text, JSON snapshot)
//!     → alerts (counter ratios, bucketed percentiles)
//! ```
//!
//! # Metrics recorded by the HTTP layer
//! - `http_requests_total` (counter): requests by method, status
//! - `http_errors_total` (counter): 5xx responses by method, status
//! - `http_request_duration_ms` (histogram): latency distribution

pub mod export;
pub mod histogram;
pub mod labels;
pub mod store;

pub use export::{HistogramSummary, MetricsError, MetricsSnapshot};
pub use histogram::{Bucket, Histogram};
pub use labels::SeriesKey;
pub use store::MetricsStore;

/// Counter of handled HTTP requests.
pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";

/// Counter of HTTP responses with a 5xx status.
pub const HTTP_ERRORS_TOTAL: &str = "http_errors_total";

/// Histogram of request handling time in milliseconds.
pub const HTTP_REQUEST_DURATION_MS: &str = "http_request_duration_ms";
