//! Request construction
//!
//! Turns one target's declarative configuration into one concrete,
//! ready-to-send [`BuiltRequest`]. Every request instance is built
//! independently, so pattern targets get a fresh URL and body files are
//! re-read for each instance.

pub mod pattern;

use crate::config::TargetSpec;
use bytes::Bytes;
use pattern::UrlGenerator;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Method, Url};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

/// Malformed key-value list
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyValueError {
    #[error("missing ':' separator in {pair:?}")]
    MissingSeparator { pair: String },

    #[error("empty key or value in {pair:?}")]
    EmptyKeyOrValue { pair: String },
}

/// Failure to turn a target into a concrete request
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to generate URL from pattern {pattern:?}: {reason}")]
    Pattern { pattern: String, reason: String },

    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid HTTP method {0:?}")]
    InvalidMethod(String),

    #[error("failed to read body file {}", .path.display())]
    BodyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid headers")]
    Headers(#[source] KeyValueError),

    #[error("invalid basic auth")]
    BasicAuth(#[source] KeyValueError),

    #[error("invalid header {name:?}: {reason}")]
    InvalidHeader { name: String, reason: String },
}

/// Basic auth credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

/// Fully resolved request
#[derive(Debug, Clone)]
pub struct BuiltRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
    pub basic_auth: Option<Credential>,
}

/// Build one request from a target
pub fn build_request(
    target: &TargetSpec,
    urls: &mut dyn UrlGenerator,
) -> Result<BuiltRequest, BuildError> {
    let raw_url = if target.regex_url {
        urls.generate(&target.url)?
    } else {
        target.url.clone()
    };
    let url = resolve_url(&raw_url)?;

    let method = if target.method.is_empty() {
        Method::GET
    } else {
        Method::from_bytes(target.method.as_bytes())
            .map_err(|_| BuildError::InvalidMethod(target.method.clone()))?
    };

    let body = if let Some(path) = target.body_file() {
        let contents = fs::read(path).map_err(|source| BuildError::BodyFile {
            path: path.clone(),
            source,
        })?;
        Some(Bytes::from(contents))
    } else {
        target
            .body_text()
            .map(|text| Bytes::copy_from_slice(text.as_bytes()))
    };

    let mut headers = HeaderMap::new();
    if let Some(list) = target.header_list() {
        for (key, value) in parse_key_value_list(list).map_err(BuildError::Headers)? {
            let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
                BuildError::InvalidHeader {
                    name: key.clone(),
                    reason: e.to_string(),
                }
            })?;
            let value = HeaderValue::from_str(&value).map_err(|e| BuildError::InvalidHeader {
                name: key.clone(),
                reason: e.to_string(),
            })?;
            headers.append(name, value);
        }
    }

    // User-Agent always replaces anything from the header list
    let user_agent =
        HeaderValue::from_str(&target.user_agent).map_err(|e| BuildError::InvalidHeader {
            name: USER_AGENT.to_string(),
            reason: e.to_string(),
        })?;
    headers.insert(USER_AGENT, user_agent);

    let basic_auth = match target.basic_auth_list() {
        Some(list) => parse_key_value_list(list)
            .map_err(BuildError::BasicAuth)?
            .into_iter()
            .next()
            .map(|(username, password)| Credential { username, password }),
        None => None,
    };

    Ok(BuiltRequest {
        method,
        url,
        headers,
        body,
        basic_auth,
    })
}

/// Parse a URL, defaulting the scheme to http
fn resolve_url(raw: &str) -> Result<Url, BuildError> {
    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{}", raw)
    };

    Url::parse(&with_scheme).map_err(|e| BuildError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Parse a `key: value, key: value` list
///
/// Pieces are split on `,`, then on the first `:`, and both halves are
/// trimmed. A piece without a separator, or with an empty key or value,
/// fails the whole list. Input order is kept.
pub fn parse_key_value_list(input: &str) -> Result<Vec<(String, String)>, KeyValueError> {
    input
        .split(',')
        .map(|pair| {
            let (key, value) = pair
                .split_once(':')
                .ok_or_else(|| KeyValueError::MissingSeparator {
                    pair: pair.to_string(),
                })?;
            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() || value.is_empty() {
                return Err(KeyValueError::EmptyKeyOrValue {
                    pair: pair.to_string(),
                });
            }
            Ok((key.to_string(), value.to_string()))
        })
        .collect()
}
