//! Latency histogram using HdrHistogram
//!
//! Wraps HdrHistogram for percentile queries over request latencies.
//!
//! # Example
//!
//! ```
//! use volley::stats::histogram::LatencyHistogram;
//! use std::time::Duration;
//!
//! let mut hist = LatencyHistogram::new().unwrap();
//! hist.record(Duration::from_millis(10));
//! hist.record(Duration::from_millis(20));
//!
//! let p50 = hist.percentile(50.0).unwrap();
//! assert!(p50 >= Duration::from_millis(9));
//! ```

use crate::Result;
use anyhow::Context;
use hdrhistogram::Histogram;
use std::time::Duration;

/// Highest trackable latency (1 hour in nanoseconds)
const MAX_TRACKABLE_NANOS: u64 = 3_600_000_000_000;

/// Latency histogram wrapper
///
/// Tracks latencies from 1 nanosecond to 1 hour with 3 significant digits,
/// so reported values are within 0.1% of the recorded ones.
#[derive(Debug)]
pub struct LatencyHistogram {
    histogram: Histogram<u64>,
}

impl LatencyHistogram {
    pub fn new() -> Result<Self> {
        let histogram = Histogram::new_with_bounds(1, MAX_TRACKABLE_NANOS, 3)
            .context("Failed to create latency histogram")?;

        Ok(Self { histogram })
    }

    /// Record a latency sample
    ///
    /// Values outside 1ns..=1h are clamped into range.
    #[inline]
    pub fn record(&mut self, latency: Duration) {
        let nanos = u64::try_from(latency.as_nanos()).unwrap_or(u64::MAX);
        let value = nanos.clamp(1, MAX_TRACKABLE_NANOS);
        // In range after clamping
        let _ = self.histogram.record(value);
    }

    /// Get the value at a specific percentile (0.0 - 100.0)
    ///
    /// Nearest rank: the smallest recorded value such that at least
    /// `percentile`% of samples are less than or equal to it.
    pub fn percentile(&self, percentile: f64) -> Option<Duration> {
        if self.is_empty() {
            return None;
        }

        let value = self.histogram.value_at_percentile(percentile);
        Some(Duration::from_nanos(value))
    }

    pub fn len(&self) -> u64 {
        self.histogram.len()
    }

    pub fn is_empty(&self) -> bool {
        self.histogram.len() == 0
    }
}
