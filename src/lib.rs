//! Volley - concurrent HTTP load generator
//!
//! Volley fires a fixed number of requests at one or more HTTP targets with
//! a bounded number of concurrent workers per target, then reports latency,
//! status and transfer statistics per target and across the whole run.
//!
//! # Architecture
//!
//! - **Pre-built request sets**: every request is built and queued before any is sent
//! - **Worker pools**: one pool per target, all targets run in parallel
//! - **Pluggable transport**: HTTP engines behind a trait, reqwest by default
//! - **Pattern URLs**: targets may generate a fresh URL per request from a regex
//! - **Result sinks**: console lines, text summary, JSON and CSV files

pub mod config;
pub mod coordinator;
pub mod engine;
pub mod output;
pub mod queue;
pub mod request;
pub mod stats;
pub mod util;
pub mod worker;

// Re-export commonly used types
pub use config::{RunConfig, TargetSpec};
pub use coordinator::{RunReport, StressRunner};
pub use engine::HttpEngine;

/// Result type used throughout Volley
pub type Result<T> = anyhow::Result<T>;
