//! Mock HTTP engine for testing
//!
//! Simulates request execution without touching the network, making pool
//! and runner tests fast and deterministic.
//!
//! # Features
//!
//! - Configurable status code, body size and latency
//! - Configurable failure (all requests, or every n-th request)
//! - Records every executed URL
//! - Tracks the highest number of requests in flight at once
//!
//! # Example
//!
//! ```
//! use volley::engine::mock::MockEngine;
//!
//! let engine = MockEngine::new();
//! engine.set_status(404);
//! engine.set_bytes(128);
//! assert_eq!(engine.call_count(), 0);
//! ```

use super::{EngineFactory, Exchange, HttpEngine};
use crate::config::{RunConfig, TargetSpec};
use crate::request::BuiltRequest;
use crate::stats::{CapturedError, ErrorKind};
use crate::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock HTTP engine for testing
///
/// Clones share state, so a test can keep a handle while the runner holds
/// another one as its engine.
#[derive(Clone)]
pub struct MockEngine {
    /// Status code returned for successful requests
    status: Arc<Mutex<u16>>,

    /// Body size returned for successful requests
    bytes: Arc<Mutex<u64>>,

    /// Simulated latency per request
    delay: Arc<Mutex<Option<Duration>>>,

    /// Whether every request should fail
    should_fail: Arc<Mutex<bool>>,

    /// Fail every n-th request (1-based call number)
    fail_every: Arc<Mutex<Option<usize>>>,

    /// URLs of every executed request, in execution order
    calls: Arc<Mutex<Vec<String>>>,

    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,

    /// Number of engines handed out through `EngineFactory`
    engines_created: Arc<AtomicUsize>,
}

impl MockEngine {
    /// Create a new mock engine with default settings
    ///
    /// By default every request succeeds with status 200, an empty body and
    /// no delay.
    pub fn new() -> Self {
        Self {
            status: Arc::new(Mutex::new(200)),
            bytes: Arc::new(Mutex::new(0)),
            delay: Arc::new(Mutex::new(None)),
            should_fail: Arc::new(Mutex::new(false)),
            fail_every: Arc::new(Mutex::new(None)),
            calls: Arc::new(Mutex::new(Vec::new())),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
            engines_created: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn set_status(&self, status: u16) {
        *self.status.lock().unwrap() = status;
    }

    pub fn set_bytes(&self, bytes: u64) {
        *self.bytes.lock().unwrap() = bytes;
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Configure the engine to fail all requests with a connect error
    pub fn set_should_fail(&self, should_fail: bool) {
        *self.should_fail.lock().unwrap() = should_fail;
    }

    /// Fail every n-th request with a timeout error
    pub fn set_fail_every(&self, n: usize) {
        *self.fail_every.lock().unwrap() = Some(n.max(1));
    }

    /// Get the number of executed requests
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Get a copy of every executed URL
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Highest number of requests observed executing at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn engines_created(&self) -> usize {
        self.engines_created.load(Ordering::SeqCst)
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpEngine for MockEngine {
    async fn execute(&self, request: &BuiltRequest) -> Exchange {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let call_number = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(request.url.to_string());
            calls.len()
        };

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        } else {
            tokio::task::yield_now().await;
        }

        let should_fail = *self.should_fail.lock().unwrap();
        let fail_every = *self.fail_every.lock().unwrap();

        let exchange = if should_fail {
            Exchange::failed(CapturedError::new(ErrorKind::Connect, "mock connection refused"))
        } else if fail_every.is_some_and(|n| call_number % n == 0) {
            Exchange::failed(CapturedError::new(ErrorKind::Timeout, "mock deadline elapsed"))
        } else {
            Exchange {
                proto: "HTTP/1.1".to_string(),
                status: *self.status.lock().unwrap(),
                bytes: *self.bytes.lock().unwrap(),
                headers: vec![("content-type".to_string(), "text/plain".to_string())],
                error: None,
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        exchange
    }
}

impl EngineFactory for MockEngine {
    fn engine_for(&self, _target: &TargetSpec, _config: &RunConfig) -> Result<Arc<dyn HttpEngine>> {
        self.engines_created.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(self.clone()))
    }
}
