//! HTTP engine abstraction
//!
//! An engine executes one [`BuiltRequest`] and reports what happened as an
//! [`Exchange`]. All workers of a target share one engine, so implementations
//! must be safe for concurrent use.
//!
//! # Architecture
//!
//! The `HttpEngine` trait keeps the worker loop agnostic of the transport.
//! An [`EngineFactory`] creates one engine per target from that target's
//! [`ClientOptions`], which lets tests swap the network for
//! [`mock::MockEngine`].
//!
//! # Engine Types
//!
//! - **reqwest** ([`http::ReqwestEngine`]): HTTP/1.1 and HTTP/2 over rustls
//! - **mock** ([`mock::MockEngine`]): canned responses, call recording
//!
//! # Error Handling
//!
//! Transport failures never surface as `Err`. They are captured in
//! [`Exchange::error`] so a failed request is recorded and the run goes on.

pub mod http;
pub mod mock;

use crate::config::{RunConfig, TargetSpec};
use crate::request::BuiltRequest;
use crate::stats::CapturedError;
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// What came back from executing one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exchange {
    /// Negotiated protocol, e.g. "HTTP/1.1" (empty when nothing came back)
    pub proto: String,
    /// Status code (0 when no response was received)
    pub status: u16,
    /// Response body bytes received
    pub bytes: u64,
    /// Response headers, for verbose output
    pub headers: Vec<(String, String)>,
    /// Transport failure, if any
    pub error: Option<CapturedError>,
}

impl Exchange {
    /// Exchange that failed before or while reading the response
    pub fn failed(error: CapturedError) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }
}

/// HTTP engine trait for all backends
#[async_trait]
pub trait HttpEngine: Send + Sync {
    /// Execute a request and capture the outcome
    async fn execute(&self, request: &BuiltRequest) -> Exchange;
}

/// Creates the shared engine of a target
pub trait EngineFactory: Send + Sync {
    fn engine_for(&self, target: &TargetSpec, config: &RunConfig) -> Result<Arc<dyn HttpEngine>>;
}

/// Client settings of one target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientOptions {
    /// Whole-request timeout, `None` for no limit
    pub timeout: Option<Duration>,
    /// Verify server certificates
    pub verify_tls: bool,
    /// Accept compressed responses
    pub compress: bool,
    /// Reuse connections between requests
    pub keep_alive: bool,
    /// Allow HTTP/2 negotiation
    pub http2: bool,
}

impl ClientOptions {
    /// Derive client settings from a target and the global flags
    pub fn for_target(target: &TargetSpec, config: &RunConfig) -> Result<Self> {
        let timeout = target
            .timeout_duration()?
            .filter(|timeout| !timeout.is_zero());

        Ok(Self {
            timeout,
            verify_tls: config.enforce_ssl,
            compress: target.compress,
            keep_alive: target.keep_alive,
            http2: !config.no_http2,
        })
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            verify_tls: false,
            compress: false,
            keep_alive: false,
            http2: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_options_from_defaults() {
        let config = RunConfig::default();
        let options = ClientOptions::for_target(&config.targets[0], &config).unwrap();

        assert_eq!(options.timeout, Some(Duration::from_secs(10)));
        assert!(!options.verify_tls);
        assert!(!options.compress);
        assert!(!options.keep_alive);
        assert!(options.http2);
    }

    #[test]
    fn test_client_options_from_flags() {
        let mut target = TargetSpec::new("https://localhost");
        target.timeout = None;
        target.compress = true;
        target.keep_alive = true;
        let mut config = RunConfig::new(vec![target]);
        config.enforce_ssl = true;
        config.no_http2 = true;

        let options = ClientOptions::for_target(&config.targets[0], &config).unwrap();
        assert_eq!(options.timeout, None);
        assert!(options.verify_tls);
        assert!(options.compress);
        assert!(options.keep_alive);
        assert!(!options.http2);
    }

    #[test]
    fn test_failed_exchange() {
        let exchange = Exchange::failed(CapturedError::new(
            crate::stats::ErrorKind::Timeout,
            "deadline elapsed",
        ));
        assert_eq!(exchange.status, 0);
        assert_eq!(exchange.bytes, 0);
        assert!(exchange.proto.is_empty());
        assert!(exchange.error.is_some());
    }
}
