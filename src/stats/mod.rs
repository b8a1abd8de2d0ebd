//! Per-request outcomes and their aggregation
//!
//! Every executed request yields exactly one [`OutcomeRecord`]. Records are
//! created by workers, collected per target by the pool coordinator into an
//! [`OutcomeCollection`], and reduced into summaries by the aggregator.
//!
//! # Example
//!
//! ```
//! use volley::stats::{OutcomeCollection, OutcomeRecord};
//! use chrono::Utc;
//! use std::time::Duration;
//!
//! let start = Utc::now();
//! let record = OutcomeRecord::success(
//!     "HTTP/1.1", "http://localhost/", "GET", start, Duration::from_millis(3), 200, 512,
//! );
//!
//! let mut records = OutcomeCollection::with_capacity(1);
//! records.push(record).unwrap();
//! assert!(records.is_full());
//! ```

pub mod aggregator;
pub mod histogram;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Transport failure class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Timeout,
    Connect,
    Tls,
    Body,
    Request,
    Other,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Timeout => "timeout",
            ErrorKind::Connect => "connect",
            ErrorKind::Tls => "tls",
            ErrorKind::Body => "body",
            ErrorKind::Request => "request",
            ErrorKind::Other => "other",
        };
        f.write_str(name)
    }
}

/// Transport failure captured as data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedError {
    pub kind: ErrorKind,
    pub message: String,
}

impl CapturedError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for CapturedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Result of executing one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeRecord {
    pub proto: String,
    pub url: String,
    pub method: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Elapsed time, serialized as integer nanoseconds
    #[serde(with = "duration_nanos")]
    pub duration: Duration,
    pub status_code: u16,
    /// `None` means the exchange completed
    pub error: Option<CapturedError>,
    pub data_transferred: u64,
}

impl OutcomeRecord {
    /// Build a record whose end time is `start + duration`
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        proto: impl Into<String>,
        url: impl Into<String>,
        method: impl Into<String>,
        start_time: DateTime<Utc>,
        duration: Duration,
        status_code: u16,
        data_transferred: u64,
        error: Option<CapturedError>,
    ) -> Self {
        let elapsed = chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::zero());
        Self {
            proto: proto.into(),
            url: url.into(),
            method: method.into(),
            start_time,
            end_time: start_time + elapsed,
            duration,
            status_code,
            error,
            data_transferred,
        }
    }

    /// Build a record for a completed exchange
    pub fn success(
        proto: impl Into<String>,
        url: impl Into<String>,
        method: impl Into<String>,
        start_time: DateTime<Utc>,
        duration: Duration,
        status_code: u16,
        data_transferred: u64,
    ) -> Self {
        Self::new(proto, url, method, start_time, duration, status_code, data_transferred, None)
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Fixed-capacity, arrival-ordered record store for one target
#[derive(Debug, Clone)]
pub struct OutcomeCollection {
    records: Vec<OutcomeRecord>,
    capacity: usize,
}

impl OutcomeCollection {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a record, handing it back if the collection is already full
    pub fn push(&mut self, record: OutcomeRecord) -> Result<(), OutcomeRecord> {
        if self.is_full() {
            return Err(record);
        }
        self.records.push(record);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.records.len() >= self.capacity
    }

    pub fn as_slice(&self) -> &[OutcomeRecord] {
        &self.records
    }

    pub fn into_vec(self) -> Vec<OutcomeRecord> {
        self.records
    }
}

/// Serialize a `Duration` as integer nanoseconds
mod duration_nanos {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let nanos = u64::try_from(value.as_nanos()).unwrap_or(u64::MAX);
        serializer.serialize_u64(nanos)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_nanos)
    }
}
