//! Lightweight span tracking.
//!
//! # Data Flow
//! ```text
//! Request handlers
//!     → store.rs (start_span → add_tags/add_log → end_span)
//!         → ids.rs (trace and span ids)
//!
//! Readers:
//!     → span.rs (SpanRecord export shape)
//!     → http inspection routes (/traces, /spans)
//!
//! Background:
//!     → janitor.rs (age-based cleanup)
//! ```
//!
//! # Design Decisions
//! - Independent of the metrics store; callers feed span durations into
//!   histograms themselves when they want them aggregated
//! - Best-effort diagnostics: bounded memory, no errors for missing spans

pub mod ids;
pub mod janitor;
pub mod span;
pub mod store;

pub use janitor::SpanJanitor;
pub use span::{LogLevel, Span, SpanLog, SpanRecord, SpanStatus};
pub use store::TraceStore;
