//! Hourly sentiment index over an externally-collected sample series.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use common::SentimentSample;

/// Sentiment samples bucketed by hour for O(1) average lookup.
///
/// Built once per backtest run from the sample series covering the
/// period; the engine then queries the bucket of each bar's hour.
#[derive(Debug, Clone, Default)]
pub struct SentimentIndex {
    buckets: HashMap<i64, Vec<f64>>,
    sample_count: usize,
}

impl SentimentIndex {
    /// One O(n) pass over the samples, keyed by the hour each timestamp
    /// falls into.
    pub fn build(samples: &[SentimentSample]) -> Self {
        let mut buckets: HashMap<i64, Vec<f64>> = HashMap::new();
        for sample in samples {
            buckets
                .entry(hour_key(sample.timestamp))
                .or_default()
                .push(sample.score);
        }
        Self {
            buckets,
            sample_count: samples.len(),
        }
    }

    /// Mean score of the bucket covering `timestamp`'s hour, or `None`
    /// if no samples landed in that hour.
    pub fn average_at(&self, timestamp: DateTime<Utc>) -> Option<f64> {
        let scores = self.buckets.get(&hour_key(timestamp))?;
        if scores.is_empty() {
            return None;
        }
        Some(scores.iter().sum::<f64>() / scores.len() as f64)
    }

    /// Total number of samples indexed (for run logging).
    pub fn len(&self) -> usize {
        self.sample_count
    }

    pub fn is_empty(&self) -> bool {
        self.sample_count == 0
    }
}

/// Truncate to the hour: all timestamps within the same UTC hour share a key.
fn hour_key(timestamp: DateTime<Utc>) -> i64 {
    timestamp.timestamp().div_euclid(3600)
}
