//! HTTP surface subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, timeout and access tracing)
//!     → application routes
//!         → propagation.rs (root span, request metrics, trace headers)
//!     → inspection routes (admin module, not instrumented)
//! ```

pub mod propagation;
pub mod server;

pub use propagation::{
    instrument, record_request, trace_propagation, TraceContext, X_PARENT_SPAN_ID, X_SPAN_ID,
    X_TRACE_ID,
};
pub use server::HttpServer;
