//! JSON and text handlers for the inspection routes.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::alerts::AlertInstance;
use crate::metrics::MetricsSnapshot;
use crate::telemetry::Telemetry;
use crate::trace::SpanRecord;

/// Content type of the text exposition format.
pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub spans: usize,
    pub active_alerts: usize,
}

#[derive(Serialize)]
pub struct AlertsView {
    pub active: Vec<AlertInstance>,
    pub history: Vec<AlertInstance>,
}

#[derive(Serialize)]
pub struct TraceView {
    #[serde(rename = "traceId")]
    pub trace_id: String,
    pub spans: Vec<SpanRecord>,
}

pub async fn get_health(State(telemetry): State<Telemetry>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        spans: telemetry.traces.len(),
        active_alerts: telemetry.alerts.active_alerts().len(),
    })
}

pub async fn get_metrics(State(telemetry): State<Telemetry>) -> Response {
    match telemetry.metrics.prometheus_text() {
        Ok(body) => ([(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Metrics export failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

pub async fn get_metrics_json(State(telemetry): State<Telemetry>) -> Json<MetricsSnapshot> {
    Json(telemetry.metrics.snapshot())
}

pub async fn get_alerts(State(telemetry): State<Telemetry>) -> Json<AlertsView> {
    Json(AlertsView {
        active: telemetry.alerts.active_alerts(),
        history: telemetry.alerts.alert_history(),
    })
}

pub async fn get_trace(
    State(telemetry): State<Telemetry>,
    Path(trace_id): Path<String>,
) -> Result<Json<TraceView>, StatusCode> {
    let spans: Vec<SpanRecord> = telemetry
        .traces
        .trace(&trace_id)
        .iter()
        .map(SpanRecord::from)
        .collect();

    if spans.is_empty() {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(TraceView { trace_id, spans }))
}

pub async fn get_span(
    State(telemetry): State<Telemetry>,
    Path(span_id): Path<String>,
) -> Result<Json<SpanRecord>, StatusCode> {
    telemetry
        .traces
        .export_span(&span_id)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}
