//! Read-only inspection endpoints over the telemetry stores.

pub mod handlers;

use axum::{routing::get, Router};

use self::handlers::*;
use crate::telemetry::Telemetry;

pub fn setup_admin_router(telemetry: Telemetry) -> Router {
    Router::new()
        .route("/health", get(get_health))
        .route("/metrics", get(get_metrics))
        .route("/metrics/json", get(get_metrics_json))
        .route("/alerts", get(get_alerts))
        .route("/traces/{trace_id}", get(get_trace))
        .route("/spans/{span_id}", get(get_span))
        .with_state(telemetry)
}
