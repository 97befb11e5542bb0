//! Span records and their export shape.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Terminal status of an ended span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanStatus {
    Ok,
    Error,
}

/// Severity of a span log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// A timestamped message attached to a span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanLog {
    /// Epoch milliseconds.
    pub timestamp: u64,
    pub level: LogLevel,
    pub message: String,
}

/// A timed unit of work within a trace.
///
/// A span is active until `end_time` is set; after that it is sealed and
/// the store ignores further tags, logs and end calls for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub trace_id: String,
    pub span_id: String,
    pub parent_span_id: Option<String>,
    pub name: String,
    /// Epoch milliseconds.
    pub start_time: u64,
    pub end_time: Option<u64>,
    pub duration_ms: Option<u64>,
    pub status: Option<SpanStatus>,
    pub tags: BTreeMap<String, Value>,
    pub logs: Vec<SpanLog>,
}

impl Span {
    pub(crate) fn new(
        name: &str,
        trace_id: String,
        span_id: String,
        parent_span_id: Option<String>,
        start_time: u64,
    ) -> Self {
        Self {
            trace_id,
            span_id,
            parent_span_id,
            name: name.to_string(),
            start_time,
            end_time: None,
            duration_ms: None,
            status: None,
            tags: BTreeMap::new(),
            logs: Vec::new(),
        }
    }

    pub fn is_ended(&self) -> bool {
        self.end_time.is_some()
    }

    pub fn is_root(&self) -> bool {
        self.parent_span_id.is_none()
    }

    pub(crate) fn seal(&mut self, now: u64, status: SpanStatus) {
        self.end_time = Some(now);
        self.duration_ms = Some(now.saturating_sub(self.start_time));
        self.status = Some(status);
    }
}

/// Flattened span for export and inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanRecord {
    pub trace_id: String,
    pub span_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_span_id: Option<String>,
    pub name: String,
    /// Start time, epoch milliseconds.
    pub timestamp: u64,
    /// Milliseconds; `null` while the span is active.
    pub duration: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SpanStatus>,
    pub tags: BTreeMap<String, Value>,
    pub logs: Vec<SpanLog>,
}

impl From<&Span> for SpanRecord {
    fn from(span: &Span) -> Self {
        Self {
            trace_id: span.trace_id.clone(),
            span_id: span.span_id.clone(),
            parent_span_id: span.parent_span_id.clone(),
            name: span.name.clone(),
            timestamp: span.start_time,
            duration: span.duration_ms,
            status: span.status,
            tags: span.tags.clone(),
            logs: span.logs.clone(),
        }
    }
}
