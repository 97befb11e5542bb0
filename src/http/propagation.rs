//! Trace propagation and request instrumentation middleware.
//!
//! # Responsibilities
//! - Continue an inbound trace (`x-trace-id`, `x-parent-span-id`) or start one
//! - Wrap the request in a root span, ended with the response status
//! - Record request count, error count and latency
//! - Echo `x-trace-id` and `x-span-id` on the response
//!
//! # Design Decisions
//! - Path is a span tag but not a metric label (unbounded cardinality)
//! - Malformed inbound trace headers are ignored, never rejected

use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::{self, Next},
    response::Response,
    Router,
};

use crate::metrics::{MetricsStore, HTTP_ERRORS_TOTAL, HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION_MS};
use crate::telemetry::Telemetry;
use crate::trace::SpanStatus;

pub const X_TRACE_ID: &str = "x-trace-id";
pub const X_PARENT_SPAN_ID: &str = "x-parent-span-id";
pub const X_SPAN_ID: &str = "x-span-id";

const MAX_INBOUND_ID_LEN: usize = 128;

/// Trace position of the current request, available to handlers through
/// request extensions.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceContext {
    pub trace_id: String,
    pub span_id: String,
}

/// Wrap every route of `router` with [`trace_propagation`].
pub fn instrument<S>(router: Router<S>, telemetry: Telemetry) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(telemetry, trace_propagation))
}

/// Middleware function opening a root span per request.
pub async fn trace_propagation(
    State(telemetry): State<Telemetry>,
    mut request: Request,
    next: Next,
) -> Response {
    let start_time = Instant::now();
    let inbound_trace = inbound_id(request.headers(), X_TRACE_ID);
    let inbound_parent = inbound_id(request.headers(), X_PARENT_SPAN_ID);

    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let span = telemetry.traces.start_span(
        &format!("{} {}", method, path),
        inbound_trace.as_deref(),
        inbound_parent.as_deref(),
    );
    telemetry.traces.add_tags(
        &span.span_id,
        [("http.method", method.clone()), ("http.path", path.clone())],
    );

    tracing::debug!(
        trace_id = %span.trace_id,
        span_id = %span.span_id,
        method = %method,
        path = %path,
        "Request span started"
    );

    request.extensions_mut().insert(TraceContext {
        trace_id: span.trace_id.clone(),
        span_id: span.span_id.clone(),
    });

    let mut response = next.run(request).await;
    let status = response.status();

    telemetry
        .traces
        .add_tags(&span.span_id, [("http.status_code", status.as_u16())]);
    let span_status = if status.is_server_error() {
        SpanStatus::Error
    } else {
        SpanStatus::Ok
    };
    telemetry.traces.end_span(&span.span_id, span_status);

    let elapsed_ms = start_time.elapsed().as_secs_f64() * 1000.0;
    record_request(&telemetry.metrics, &method, status.as_u16(), elapsed_ms);

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&span.trace_id) {
        headers.insert(X_TRACE_ID, value);
    }
    if let Ok(value) = HeaderValue::from_str(&span.span_id) {
        headers.insert(X_SPAN_ID, value);
    }

    response
}

/// Record one handled request.
pub fn record_request(metrics: &MetricsStore, method: &str, status: u16, elapsed_ms: f64) {
    let status_str = status.to_string();
    let labels = [("method", method), ("status", status_str.as_str())];

    metrics.increment_counter(HTTP_REQUESTS_TOTAL, 1.0, &labels);
    if status >= 500 {
        metrics.increment_counter(HTTP_ERRORS_TOTAL, 1.0, &labels);
    }
    metrics.observe_histogram(HTTP_REQUEST_DURATION_MS, elapsed_ms, &[("method", method)]);
}

fn inbound_id(headers: &HeaderMap, name: &str) -> Option<String> {
    let value = headers.get(name)?.to_str().ok()?.trim();
    if value.is_empty() || value.len() > MAX_INBOUND_ID_LEN {
        tracing::debug!(header = %name, "Ignoring malformed trace header");
        return None;
    }
    Some(value.to_string())
}
