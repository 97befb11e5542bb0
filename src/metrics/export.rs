//! Exposition text and JSON snapshot rendering.

use std::collections::BTreeMap;
use std::fmt::Write;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::metrics::histogram::{Bucket, Histogram};
use crate::metrics::labels::SeriesKey;
use crate::metrics::store::MetricsStore;

/// Errors surfaced by explicit export calls. Mutations never fail.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("failed to render exposition text: {0}")]
    Format(#[from] std::fmt::Error),

    #[error("failed to serialize metrics snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

/// Point-in-time copy of every series, keyed by canonical series key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub counters: BTreeMap<String, f64>,
    pub gauges: BTreeMap<String, f64>,
    pub histograms: BTreeMap<String, HistogramSummary>,
}

/// Histogram state plus derived statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramSummary {
    pub buckets: Vec<Bucket>,
    pub sum: f64,
    pub count: u64,
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
    pub avg: f64,
}

impl From<&Histogram> for HistogramSummary {
    fn from(h: &Histogram) -> Self {
        Self {
            buckets: h.buckets().collect(),
            sum: h.sum(),
            count: h.count(),
            p50: h.percentile(50.0),
            p95: h.percentile(95.0),
            p99: h.percentile(99.0),
            avg: h.mean(),
        }
    }
}

#[derive(Clone, Copy)]
enum MetricKind {
    Counter,
    Gauge,
    Histogram,
}

impl MetricKind {
    fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
        }
    }
}

impl MetricsStore {
    /// Render every series in the line-oriented text exposition format.
    ///
    /// Series are grouped per metric name under a single `# TYPE` line and
    /// sorted by canonical key. Each series is copied under its own lock.
    pub fn prometheus_text(&self) -> Result<String, MetricsError> {
        let mut out = String::new();

        let counters = sorted(self.counters.iter().map(|e| (e.key().clone(), *e.value())));
        write_scalars(&mut out, MetricKind::Counter, &counters)?;

        let gauges = sorted(self.gauges.iter().map(|e| (e.key().clone(), *e.value())));
        write_scalars(&mut out, MetricKind::Gauge, &gauges)?;

        let histograms = sorted(
            self.histograms
                .iter()
                .map(|e| (e.key().clone(), e.value().clone())),
        );
        let mut current: Option<&str> = None;
        for (key, histogram) in &histograms {
            write_type_line(&mut out, &mut current, key, MetricKind::Histogram)?;
            write_histogram(&mut out, key, histogram)?;
        }

        Ok(out)
    }

    /// Copy every series into a serializable snapshot.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            counters: self
                .counters
                .iter()
                .map(|e| (e.key().to_string(), *e.value()))
                .collect(),
            gauges: self
                .gauges
                .iter()
                .map(|e| (e.key().to_string(), *e.value()))
                .collect(),
            histograms: self
                .histograms
                .iter()
                .map(|e| (e.key().to_string(), HistogramSummary::from(e.value())))
                .collect(),
        }
    }

    /// The snapshot as a JSON document.
    pub fn snapshot_json(&self) -> Result<String, MetricsError> {
        Ok(serde_json::to_string(&self.snapshot())?)
    }
}

fn sorted<V>(entries: impl Iterator<Item = (SeriesKey, V)>) -> Vec<(SeriesKey, V)> {
    let mut entries: Vec<_> = entries.collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries
}

fn write_type_line<'a>(
    out: &mut String,
    current: &mut Option<&'a str>,
    key: &'a SeriesKey,
    kind: MetricKind,
) -> std::fmt::Result {
    if *current != Some(key.name()) {
        writeln!(out, "# TYPE {} {}", key.name(), kind.as_str())?;
        *current = Some(key.name());
    }
    Ok(())
}

fn write_scalars(
    out: &mut String,
    kind: MetricKind,
    series: &[(SeriesKey, f64)],
) -> std::fmt::Result {
    let mut current: Option<&str> = None;
    for (key, value) in series {
        write_type_line(out, &mut current, key, kind)?;
        writeln!(out, "{} {}", key, format_value(*value))?;
    }
    Ok(())
}

fn write_histogram(out: &mut String, key: &SeriesKey, h: &Histogram) -> std::fmt::Result {
    let name = key.name();
    for bucket in h.buckets() {
        writeln!(
            out,
            "{}_bucket{} {}",
            name,
            key.render_labels_with("le", &format_value(bucket.le)),
            bucket.count
        )?;
    }
    writeln!(
        out,
        "{}_bucket{} {}",
        name,
        key.render_labels_with("le", "+Inf"),
        h.count()
    )?;
    writeln!(out, "{}_sum{} {}", name, key.label_block(), format_value(h.sum()))?;
    writeln!(out, "{}_count{} {}", name, key.label_block(), h.count())
}

/// Render a sample value; non-finite values use the exposition spellings.
fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "+Inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        value.to_string()
    }
}
