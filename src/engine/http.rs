//! reqwest-backed HTTP engine
//!
//! One `reqwest::Client` per target, shared by every worker of that target.
//! The client carries the target's transport settings: timeout, TLS
//! verification, compression, connection reuse and HTTP/2 negotiation.

use super::{ClientOptions, EngineFactory, Exchange, HttpEngine};
use crate::config::{RunConfig, TargetSpec};
use crate::request::BuiltRequest;
use crate::stats::{CapturedError, ErrorKind};
use crate::Result;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{HeaderValue, CONNECTION};
use reqwest::Client;
use std::error::Error as StdError;
use std::sync::Arc;

/// HTTP engine over a shared reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestEngine {
    client: Client,
    options: ClientOptions,
}

impl ReqwestEngine {
    pub fn new(options: ClientOptions) -> Result<Self> {
        let mut builder = Client::builder();

        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }

        if !options.verify_tls {
            builder = builder.danger_accept_invalid_certs(true);
        }

        builder = builder.gzip(options.compress);

        if !options.keep_alive {
            builder = builder.pool_max_idle_per_host(0);
        }

        if !options.http2 {
            builder = builder.http1_only();
        }

        let client = builder.build().context("Failed to build HTTP client")?;
        Ok(Self { client, options })
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }
}

#[async_trait]
impl HttpEngine for ReqwestEngine {
    async fn execute(&self, request: &BuiltRequest) -> Exchange {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());

        if let Some(ref credential) = request.basic_auth {
            builder = builder.basic_auth(&credential.username, Some(&credential.password));
        }

        if !self.options.keep_alive {
            builder = builder.header(CONNECTION, HeaderValue::from_static("close"));
        }

        if let Some(ref body) = request.body {
            builder = builder.body(body.clone());
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => return Exchange::failed(classify_error(&err)),
        };

        let proto = format!("{:?}", response.version());
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        match response.bytes().await {
            Ok(body) => Exchange {
                proto,
                status,
                bytes: body.len() as u64,
                headers,
                error: None,
            },
            Err(err) => Exchange {
                proto,
                status,
                bytes: 0,
                headers,
                error: Some(classify_error(&err)),
            },
        }
    }
}

/// Map a reqwest failure to a captured error
///
/// The message carries the whole source chain, since the top-level reqwest
/// message rarely names the cause.
pub fn classify_error(err: &reqwest::Error) -> CapturedError {
    let causes = source_chain(err);
    let lowered = causes.to_ascii_lowercase();

    let kind = if err.is_timeout() {
        ErrorKind::Timeout
    } else if lowered.contains("tls") || lowered.contains("ssl") || lowered.contains("certificate") {
        ErrorKind::Tls
    } else if err.is_connect() {
        ErrorKind::Connect
    } else if err.is_body() || err.is_decode() {
        ErrorKind::Body
    } else if err.is_request() || err.is_builder() || err.is_redirect() {
        ErrorKind::Request
    } else {
        ErrorKind::Other
    };

    let message = if causes.is_empty() {
        err.to_string()
    } else {
        format!("{}: {}", err, causes)
    };

    CapturedError::new(kind, message)
}

/// Messages of every underlying cause, outermost first
fn source_chain(err: &dyn StdError) -> String {
    let mut parts = Vec::new();
    let mut current = err.source();
    while let Some(cause) = current {
        parts.push(cause.to_string());
        current = cause.source();
    }
    parts.join(": ")
}

/// Builds one reqwest engine per target
#[derive(Debug, Default, Clone, Copy)]
pub struct ReqwestEngineFactory;

impl EngineFactory for ReqwestEngineFactory {
    fn engine_for(&self, target: &TargetSpec, config: &RunConfig) -> Result<Arc<dyn HttpEngine>> {
        let options = ClientOptions::for_target(target, config)?;
        let engine = ReqwestEngine::new(options)
            .with_context(|| format!("Failed to create engine for {}", target.url))?;
        Ok(Arc::new(engine))
    }
}
