//! In-memory counter, gauge and histogram storage.
//!
//! # Responsibilities
//! - Address series by name + canonical labels
//! - Mirror every labeled write into the label-less base series
//! - Pin histogram bucket bounds per metric name
//!
//! # Design Decisions
//! - Sharded `DashMap`s: each series is mutated under its shard lock, so a
//!   reader never sees a histogram's sum and count disagree
//! - Unknown series read as zero / `None`; instrumentation never fails the
//!   instrumented code path
//! - Deltas and values are not validated (NaN is the caller's problem)

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;

use crate::config::{MetricsConfig, DEFAULT_BUCKETS};
use crate::metrics::histogram::Histogram;
use crate::metrics::labels::SeriesKey;

/// Process-wide metric state. Share it behind an `Arc`.
#[derive(Debug)]
pub struct MetricsStore {
    pub(crate) counters: DashMap<SeriesKey, f64>,
    pub(crate) gauges: DashMap<SeriesKey, f64>,
    pub(crate) histograms: DashMap<SeriesKey, Histogram>,
    /// Bounds actually used by each histogram name, fixed on first use.
    pinned_bounds: DashMap<String, Arc<[f64]>>,
    default_bounds: Arc<[f64]>,
    bucket_overrides: HashMap<String, Arc<[f64]>>,
}

impl Default for MetricsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsStore {
    /// Create a store using the default bucket layout for every histogram.
    pub fn new() -> Self {
        Self {
            counters: DashMap::new(),
            gauges: DashMap::new(),
            histograms: DashMap::new(),
            pinned_bounds: DashMap::new(),
            default_bounds: Arc::from(&DEFAULT_BUCKETS[..]),
            bucket_overrides: HashMap::new(),
        }
    }

    /// Create a store from validated configuration.
    pub fn from_config(config: &MetricsConfig) -> Self {
        let mut store = Self::new();
        store.default_bounds = Arc::from(config.default_buckets.as_slice());
        store.bucket_overrides = config
            .histogram_buckets
            .iter()
            .map(|(name, bounds)| (name.clone(), Arc::from(bounds.as_slice())))
            .collect();
        store
    }

    /// Use `bounds` for histograms named `name`.
    ///
    /// Bounds are sorted and deduplicated; non-finite values are dropped. If
    /// nothing usable remains the default bounds apply.
    pub fn with_histogram_buckets(mut self, name: &str, bounds: Vec<f64>) -> Self {
        let mut bounds: Vec<f64> = bounds.into_iter().filter(|b| b.is_finite()).collect();
        bounds.sort_by(f64::total_cmp);
        bounds.dedup();

        if bounds.is_empty() {
            tracing::warn!(metric = %name, "No usable histogram bounds, keeping defaults");
            return self;
        }
        self.bucket_overrides
            .insert(name.to_string(), Arc::from(bounds));
        self
    }

    /// Add `delta` to the base counter and, if labels are given, the labeled one.
    pub fn increment_counter(&self, name: &str, delta: f64, labels: &[(&str, &str)]) {
        for key in Self::targets(name, labels) {
            *self.counters.entry(key).or_insert(0.0) += delta;
        }
    }

    /// Overwrite the base gauge and, if labels are given, the labeled one.
    pub fn set_gauge(&self, name: &str, value: f64, labels: &[(&str, &str)]) {
        for key in Self::targets(name, labels) {
            self.gauges.insert(key, value);
        }
    }

    /// Record one observation into the base and labeled histograms.
    pub fn observe_histogram(&self, name: &str, value: f64, labels: &[(&str, &str)]) {
        let bounds = self.bounds_for(name);
        for key in Self::targets(name, labels) {
            self.histograms
                .entry(key)
                .or_insert_with(|| Histogram::new(bounds.clone()))
                .observe(value);
        }
    }

    /// Current counter value, 0 for an unseen series.
    pub fn counter(&self, name: &str, labels: &[(&str, &str)]) -> f64 {
        self.counters
            .get(&SeriesKey::new(name, labels))
            .map(|v| *v)
            .unwrap_or(0.0)
    }

    /// Current gauge value, 0 for an unseen series.
    pub fn gauge(&self, name: &str, labels: &[(&str, &str)]) -> f64 {
        self.gauges
            .get(&SeriesKey::new(name, labels))
            .map(|v| *v)
            .unwrap_or(0.0)
    }

    /// Copy of a histogram, `None` for an unseen series.
    pub fn histogram(&self, name: &str, labels: &[(&str, &str)]) -> Option<Histogram> {
        self.histograms
            .get(&SeriesKey::new(name, labels))
            .map(|h| h.clone())
    }

    /// Approximate percentile of a histogram; see [`Histogram::percentile`].
    /// Unseen series return 0.
    pub fn calculate_percentile(&self, name: &str, p: f64, labels: &[(&str, &str)]) -> f64 {
        self.histograms
            .get(&SeriesKey::new(name, labels))
            .map(|h| h.percentile(p))
            .unwrap_or(0.0)
    }

    /// Drop every series. Meant for test isolation.
    pub fn reset(&self) {
        self.counters.clear();
        self.gauges.clear();
        self.histograms.clear();
        self.pinned_bounds.clear();
        tracing::debug!("Metrics store reset");
    }

    /// Number of live series across all metric kinds.
    pub fn series_count(&self) -> usize {
        self.counters.len() + self.gauges.len() + self.histograms.len()
    }

    fn targets(name: &str, labels: &[(&str, &str)]) -> impl Iterator<Item = SeriesKey> {
        let labeled = (!labels.is_empty()).then(|| SeriesKey::new(name, labels));
        std::iter::once(SeriesKey::base(name)).chain(labeled)
    }

    fn bounds_for(&self, name: &str) -> Arc<[f64]> {
        if let Some(bounds) = self.pinned_bounds.get(name) {
            return bounds.clone();
        }
        self.pinned_bounds
            .entry(name.to_string())
            .or_insert_with(|| {
                let bounds = self
                    .bucket_overrides
                    .get(name)
                    .cloned()
                    .unwrap_or_else(|| self.default_bounds.clone());
                tracing::debug!(metric = %name, buckets = bounds.len(), "Histogram buckets pinned");
                bounds
            })
            .clone()
    }
}
