//! Fixed-bucket cumulative histogram.
//!
//! Every observation increments each bucket whose upper bound it satisfies,
//! so bucket counts are cumulative and non-decreasing by construction. The
//! last bucket's count can be lower than the total count when observations
//! exceed every bound; those only show up in the implicit `+Inf` bucket.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// One bucket as seen by readers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    /// Inclusive upper bound.
    pub le: f64,
    /// Observations `<= le`.
    pub count: u64,
}

/// Cumulative bucketed histogram with running sum and count.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    bounds: Arc<[f64]>,
    counts: Vec<u64>,
    sum: f64,
    count: u64,
}

impl Histogram {
    /// Create an empty histogram over ascending `bounds`.
    pub fn new(bounds: Arc<[f64]>) -> Self {
        let counts = vec![0; bounds.len()];
        Self {
            bounds,
            counts,
            sum: 0.0,
            count: 0,
        }
    }

    /// Record one observation.
    pub fn observe(&mut self, value: f64) {
        for (bound, count) in self.bounds.iter().zip(self.counts.iter_mut()) {
            if *bound >= value {
                *count += 1;
            }
        }
        self.count += 1;
        self.sum += value;
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn bounds(&self) -> &[f64] {
        &self.bounds
    }

    /// Buckets in ascending order of bound.
    pub fn buckets(&self) -> impl Iterator<Item = Bucket> + '_ {
        self.bounds
            .iter()
            .zip(self.counts.iter())
            .map(|(&le, &count)| Bucket { le, count })
    }

    /// Arithmetic mean of all observations, 0 when empty.
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }

    /// Approximate percentile (`p` in 0-100) from bucket counts.
    ///
    /// Returns the bound of the first bucket whose cumulative count reaches
    /// `count * p / 100`, falling back to the last bound when no bucket does.
    /// The answer is always a bucket bound: it is biased upward and only as
    /// precise as the bucket layout, so histograms with different bounds
    /// cannot be compared through it.
    pub fn percentile(&self, p: f64) -> f64 {
        let target = self.count as f64 * (p / 100.0);
        self.buckets()
            .find(|bucket| bucket.count as f64 >= target)
            .map(|bucket| bucket.le)
            .or_else(|| self.bounds.last().copied())
            .unwrap_or(0.0)
    }
}
