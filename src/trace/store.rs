//! Bounded in-memory span store.
//!
//! # Responsibilities
//! - Open, annotate and seal spans by id
//! - Group spans by trace id
//! - Keep memory bounded: oldest-inserted eviction at capacity, plus
//!   age-based cleanup for spans whose owner never ended them
//!
//! # Design Decisions
//! - Unknown span ids are silent no-ops; tracing must never fail a request
//! - Ended spans are sealed: later tags, logs and end calls are ignored
//! - One store-wide mutex; every operation is O(1) except trace lookup and
//!   cleanup, which scan the buffer

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::Value;

use crate::config::TracingConfig;
use crate::time::now_millis;
use crate::trace::ids::{new_span_id, new_trace_id};
use crate::trace::span::{LogLevel, Span, SpanLog, SpanRecord, SpanStatus};

/// Insertion-ordered span buffer.
#[derive(Debug, Default)]
struct SpanBuffer {
    spans: HashMap<String, Span>,
    /// Span ids in insertion order. May briefly hold ids already removed
    /// from `spans`; those are skipped on eviction.
    order: VecDeque<String>,
}

/// Process-wide span storage. Share it behind an `Arc`.
#[derive(Debug)]
pub struct TraceStore {
    inner: Mutex<SpanBuffer>,
    capacity: usize,
}

impl TraceStore {
    /// Create a store holding at most `capacity` spans.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(SpanBuffer::default()),
            capacity: capacity.max(1),
        }
    }

    pub fn from_config(config: &TracingConfig) -> Self {
        Self::new(config.max_spans)
    }

    fn lock(&self) -> MutexGuard<'_, SpanBuffer> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open a span. Without a `trace_id` the span starts a new trace.
    ///
    /// Returns a copy of the new span; its `span_id` is the handle for all
    /// further calls.
    pub fn start_span(
        &self,
        name: &str,
        trace_id: Option<&str>,
        parent_span_id: Option<&str>,
    ) -> Span {
        let now = now_millis();
        let trace_id = trace_id
            .map(str::to_string)
            .unwrap_or_else(new_trace_id);

        let mut buffer = self.lock();

        let mut span_id = new_span_id();
        while buffer.spans.contains_key(&span_id) {
            span_id = new_span_id();
        }

        while buffer.spans.len() >= self.capacity {
            match buffer.order.pop_front() {
                Some(oldest) => {
                    if buffer.spans.remove(&oldest).is_some() {
                        tracing::debug!(span_id = %oldest, "Span evicted at capacity");
                    }
                }
                None => break,
            }
        }

        let span = Span::new(
            name,
            trace_id,
            span_id.clone(),
            parent_span_id.map(str::to_string),
            now,
        );
        buffer.order.push_back(span_id.clone());
        buffer.spans.insert(span_id, span.clone());
        span
    }

    /// Seal a span with `status`. Returns the ended span, or `None` when the
    /// id is unknown or the span was already ended.
    pub fn end_span(&self, span_id: &str, status: SpanStatus) -> Option<Span> {
        let now = now_millis();
        let mut buffer = self.lock();
        let span = buffer.spans.get_mut(span_id)?;
        if span.is_ended() {
            tracing::debug!(span_id = %span_id, "Ignoring end of already ended span");
            return None;
        }
        span.seal(now, status);
        Some(span.clone())
    }

    /// Merge tags into an active span.
    pub fn add_tags<I, K, V>(&self, span_id: &str, tags: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut buffer = self.lock();
        if let Some(span) = active_span(&mut buffer, span_id) {
            span.tags
                .extend(tags.into_iter().map(|(k, v)| (k.into(), v.into())));
        }
    }

    /// Append a log entry to an active span.
    pub fn add_log(&self, span_id: &str, message: impl Into<String>, level: LogLevel) {
        let timestamp = now_millis();
        let mut buffer = self.lock();
        if let Some(span) = active_span(&mut buffer, span_id) {
            span.logs.push(SpanLog {
                timestamp,
                level,
                message: message.into(),
            });
        }
    }

    /// Copy of a span.
    pub fn span(&self, span_id: &str) -> Option<Span> {
        self.lock().spans.get(span_id).cloned()
    }

    /// All spans of a trace, in insertion order.
    pub fn trace(&self, trace_id: &str) -> Vec<Span> {
        let buffer = self.lock();
        buffer
            .order
            .iter()
            .filter_map(|id| buffer.spans.get(id))
            .filter(|span| span.trace_id == trace_id)
            .cloned()
            .collect()
    }

    /// Flattened export record of a span.
    pub fn export_span(&self, span_id: &str) -> Option<SpanRecord> {
        self.lock().spans.get(span_id).map(SpanRecord::from)
    }

    /// Remove spans started more than `max_age` ago, ended or not.
    /// Returns the number of spans removed.
    pub fn cleanup(&self, max_age: Duration) -> usize {
        self.cleanup_at(now_millis(), max_age)
    }

    /// [`cleanup`](Self::cleanup) against an explicit clock reading.
    pub fn cleanup_at(&self, now: u64, max_age: Duration) -> usize {
        let cutoff = now.saturating_sub(max_age.as_millis() as u64);
        let mut buffer = self.lock();
        let before = buffer.spans.len();

        buffer.spans.retain(|_, span| span.start_time >= cutoff);
        let SpanBuffer { spans, order } = &mut *buffer;
        order.retain(|id| spans.contains_key(id));

        before - buffer.spans.len()
    }

    pub fn len(&self) -> usize {
        self.lock().spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every span. Meant for test isolation.
    pub fn reset(&self) {
        let mut buffer = self.lock();
        buffer.spans.clear();
        buffer.order.clear();
    }
}

fn active_span<'a>(buffer: &'a mut SpanBuffer, span_id: &str) -> Option<&'a mut Span> {
    match buffer.spans.get_mut(span_id) {
        Some(span) if span.is_ended() => {
            tracing::debug!(span_id = %span_id, "Ignoring mutation of ended span");
            None
        }
        other => other,
    }
}
