//! Statistics aggregation
//!
//! Reduces a set of outcome records into a [`Summary`]. The reduction is
//! order-insensitive, so it serves both per-target collections and the
//! global concatenation of all targets.
//!
//! # Features
//!
//! - **Status buckets**: 1xx through 5xx, out-of-range codes, transport errors
//! - **Exact latency moments**: min, max, mean and standard deviation
//! - **Percentiles**: p50 through p99.9 from an HdrHistogram
//! - **Throughput**: requests per second over the observed span
//!
//! # Example
//!
//! ```
//! use volley::stats::OutcomeRecord;
//! use volley::stats::aggregator::summarize;
//! use chrono::Utc;
//! use std::time::Duration;
//!
//! let start = Utc::now();
//! let records = vec![
//!     OutcomeRecord::success("HTTP/1.1", "http://localhost/", "GET", start, Duration::from_millis(5), 200, 10),
//!     OutcomeRecord::success("HTTP/1.1", "http://localhost/", "GET", start, Duration::from_millis(7), 503, 10),
//! ];
//!
//! let summary = summarize(&records).unwrap();
//! assert_eq!(summary.total, 2);
//! assert_eq!(summary.buckets.success, 1);
//! assert_eq!(summary.buckets.server_error, 1);
//! ```

use super::histogram::LatencyHistogram;
use super::OutcomeRecord;
use crate::util::time::calculate_rate;
use crate::Result;
use std::time::Duration;

/// Percentiles reported in every summary
pub const REPORTED_PERCENTILES: [f64; 6] = [50.0, 75.0, 90.0, 95.0, 99.0, 99.9];

/// Record counts by status class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusBuckets {
    /// 1xx
    pub informational: usize,
    /// 2xx
    pub success: usize,
    /// 3xx
    pub redirect: usize,
    /// 4xx
    pub client_error: usize,
    /// 5xx
    pub server_error: usize,
    /// Completed exchange with a status outside 100..=599
    pub other: usize,
    /// Transport failure, whatever the status
    pub error: usize,
}

impl StatusBuckets {
    fn count(&mut self, record: &OutcomeRecord) {
        if record.is_error() {
            self.error += 1;
            return;
        }
        match record.status_code {
            100..=199 => self.informational += 1,
            200..=299 => self.success += 1,
            300..=399 => self.redirect += 1,
            400..=499 => self.client_error += 1,
            500..=599 => self.server_error += 1,
            _ => self.other += 1,
        }
    }

    /// Labelled counts in display order
    pub fn entries(&self) -> [(&'static str, usize); 7] {
        [
            ("1xx", self.informational),
            ("2xx", self.success),
            ("3xx", self.redirect),
            ("4xx", self.client_error),
            ("5xx", self.server_error),
            ("other", self.other),
            ("error", self.error),
        ]
    }

    pub fn total(&self) -> usize {
        self.entries().iter().map(|(_, n)| n).sum()
    }
}

/// Latency distribution of a record set
#[derive(Debug, Clone, PartialEq)]
pub struct LatencySummary {
    pub min: Duration,
    pub max: Duration,
    pub mean: Duration,
    pub stddev: Duration,
    /// (percentile, value) pairs for [`REPORTED_PERCENTILES`]
    pub percentiles: Vec<(f64, Duration)>,
}

impl LatencySummary {
    pub fn percentile(&self, percentile: f64) -> Option<Duration> {
        self.percentiles
            .iter()
            .find(|(p, _)| (*p - percentile).abs() < f64::EPSILON)
            .map(|(_, d)| *d)
    }
}

/// Aggregate view of a record set
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total: usize,
    pub buckets: StatusBuckets,
    /// Records without a transport failure
    pub success_count: usize,
    pub error_count: usize,
    /// `None` for an empty record set
    pub latency: Option<LatencySummary>,
    pub total_bytes: u64,
    pub mean_bytes: f64,
    /// Earliest start to latest end
    pub span: Duration,
    /// Requests per second over `span`, 0 when the span is zero
    pub throughput: f64,
}

impl Summary {
    /// Share of records in a bucket, in percent
    pub fn percent(&self, count: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 * 100.0 / self.total as f64
        }
    }
}

/// Summarize a record set
pub fn summarize(records: &[OutcomeRecord]) -> Result<Summary> {
    let total = records.len();

    let mut buckets = StatusBuckets::default();
    let mut total_bytes: u64 = 0;
    for record in records {
        buckets.count(record);
        total_bytes = total_bytes.saturating_add(record.data_transferred);
    }

    let error_count = buckets.error;
    let latency = summarize_latency(records)?;

    let span = match (
        records.iter().map(|r| r.start_time).min(),
        records.iter().map(|r| r.end_time).max(),
    ) {
        (Some(start), Some(end)) => (end - start).to_std().unwrap_or(Duration::ZERO),
        _ => Duration::ZERO,
    };
    let throughput = calculate_rate(total as u64, span);

    Ok(Summary {
        total,
        buckets,
        success_count: total - error_count,
        error_count,
        latency,
        total_bytes,
        mean_bytes: if total == 0 {
            0.0
        } else {
            total_bytes as f64 / total as f64
        },
        span,
        throughput,
    })
}

fn summarize_latency(records: &[OutcomeRecord]) -> Result<Option<LatencySummary>> {
    if records.is_empty() {
        return Ok(None);
    }

    let mut histogram = LatencyHistogram::new()?;
    let mut min = Duration::MAX;
    let mut max = Duration::ZERO;
    let mut sum_nanos: u128 = 0;
    for record in records {
        histogram.record(record.duration);
        min = min.min(record.duration);
        max = max.max(record.duration);
        sum_nanos += record.duration.as_nanos();
    }

    let n = records.len() as f64;
    let mean_nanos = sum_nanos as f64 / n;
    let variance = records
        .iter()
        .map(|r| {
            let delta = r.duration.as_nanos() as f64 - mean_nanos;
            delta * delta
        })
        .sum::<f64>()
        / n;

    let percentiles = REPORTED_PERCENTILES
        .iter()
        .filter_map(|&p| histogram.percentile(p).map(|d| (p, d)))
        .collect();

    Ok(Some(LatencySummary {
        min,
        max,
        mean: Duration::from_nanos(mean_nanos.round() as u64),
        stddev: Duration::from_nanos(variance.sqrt().round() as u64),
        percentiles,
    }))
}
