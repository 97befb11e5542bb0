//! Typed async client for the observability core inspection API.

pub mod client;

pub use client::{
    AlertInstance, AlertsView, HistogramSummary, MetricsSnapshot, SpanRecord, SystemStatus,
    TelemetryClient, TraceView,
};
