//! Configuration module
//!
//! Handles CLI argument parsing, TOML configuration files, and validation.
//!
//! Two layers exist:
//!
//! - [`TargetTemplate`]: a partially specified target as it appears in a TOML
//!   file or on the command line (every field optional)
//! - [`TargetSpec`] / [`RunConfig`]: the fully resolved configuration consumed
//!   by the request builder and the worker pools

pub mod cli;
pub mod cli_convert;
pub mod toml;
pub mod validator;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_URL: &str = "http://localhost";
pub const DEFAULT_COUNT: usize = 10;
pub const DEFAULT_CONCURRENCY: usize = 1;
pub const DEFAULT_TIMEOUT: &str = "10s";
pub const DEFAULT_METHOD: &str = "GET";
pub const DEFAULT_USER_AGENT: &str = "volley";

/// Fully resolved configuration of one target
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TargetSpec {
    /// Literal URL, or a regex pattern when `regex_url` is set
    pub url: String,
    /// Treat `url` as a pattern and generate a concrete URL per request
    #[serde(default)]
    pub regex_url: bool,
    /// Total number of requests to issue
    pub count: usize,
    /// Number of concurrent workers
    pub concurrency: usize,
    /// Per-request timeout (e.g. "10s", "250ms", "1m30s")
    pub timeout: Option<String>,
    /// HTTP method
    pub method: String,
    /// Literal request body
    pub body: Option<String>,
    /// File whose contents become the request body (wins over `body`)
    pub body_filename: Option<PathBuf>,
    /// Raw header list ("Key: value, Other: value")
    pub headers: Option<String>,
    /// User-Agent header value
    pub user_agent: String,
    /// Raw basic auth list ("user: password"), only the first pair is used
    pub basic_auth: Option<String>,
    /// Allow compressed responses
    #[serde(default)]
    pub compress: bool,
    /// Reuse connections between requests
    #[serde(default)]
    pub keep_alive: bool,
}

impl TargetSpec {
    /// Create a target for `url` with every other field at its default
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            regex_url: false,
            count: DEFAULT_COUNT,
            concurrency: DEFAULT_CONCURRENCY,
            timeout: Some(DEFAULT_TIMEOUT.to_string()),
            method: DEFAULT_METHOD.to_string(),
            body: None,
            body_filename: None,
            headers: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            basic_auth: None,
            compress: false,
            keep_alive: false,
        }
    }

    /// Parse the configured timeout
    ///
    /// Returns `Ok(None)` when no timeout is configured (no per-request limit).
    pub fn timeout_duration(&self) -> crate::Result<Option<Duration>> {
        match non_empty(&self.timeout) {
            Some(raw) => cli_convert::parse_duration(raw).map(Some),
            None => Ok(None),
        }
    }

    pub fn body_text(&self) -> Option<&str> {
        non_empty(&self.body)
    }

    pub fn header_list(&self) -> Option<&str> {
        non_empty(&self.headers)
    }

    pub fn basic_auth_list(&self) -> Option<&str> {
        non_empty(&self.basic_auth)
    }

    pub fn body_file(&self) -> Option<&PathBuf> {
        self.body_filename
            .as_ref()
            .filter(|path| !path.as_os_str().is_empty())
    }
}

impl Default for TargetSpec {
    fn default() -> Self {
        Self::new(DEFAULT_URL)
    }
}

/// Treat `Some("")` the same as `None`
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Complete run configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunConfig {
    /// Targets in configured order
    pub targets: Vec<TargetSpec>,
    /// Print request/response detail for every request
    #[serde(default)]
    pub verbose: bool,
    /// Suppress per-request output
    #[serde(default)]
    pub quiet: bool,
    /// Disable HTTP/2 negotiation
    #[serde(default)]
    pub no_http2: bool,
    /// Verify TLS certificates
    #[serde(default)]
    pub enforce_ssl: bool,
    /// Result file sinks
    #[serde(default)]
    pub output: OutputConfig,
    /// Ceiling on workers running at once across all targets
    pub max_workers: Option<usize>,
}

impl RunConfig {
    pub fn new(targets: Vec<TargetSpec>) -> Self {
        Self {
            targets,
            verbose: false,
            quiet: false,
            no_http2: false,
            enforce_ssl: false,
            output: OutputConfig::default(),
            max_workers: None,
        }
    }

    /// Total number of requests across all targets
    pub fn total_requests(&self) -> usize {
        self.targets.iter().map(|t| t.count).sum()
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::new(vec![TargetSpec::default()])
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputConfig {
    /// JSON result file path
    pub json_output: Option<PathBuf>,
    /// CSV result file path
    pub csv_output: Option<PathBuf>,
}

/// Partially specified target
///
/// Used for the top-level defaults and the `[[targets]]` entries of a TOML
/// file, and for the global target flags on the command line. Unset fields
/// fall through to the next layer when resolved.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TargetTemplate {
    pub url: Option<String>,
    #[serde(alias = "regex")]
    pub regex_url: Option<bool>,
    pub count: Option<usize>,
    pub concurrency: Option<usize>,
    pub timeout: Option<String>,
    pub method: Option<String>,
    pub body: Option<String>,
    pub body_filename: Option<PathBuf>,
    pub headers: Option<String>,
    pub user_agent: Option<String>,
    pub basic_auth: Option<String>,
    pub compress: Option<bool>,
    pub keep_alive: Option<bool>,
}

impl TargetTemplate {
    /// Fill unset fields from `fallback`
    pub fn or(self, fallback: &TargetTemplate) -> TargetTemplate {
        TargetTemplate {
            url: self.url.or_else(|| fallback.url.clone()),
            regex_url: self.regex_url.or(fallback.regex_url),
            count: self.count.or(fallback.count),
            concurrency: self.concurrency.or(fallback.concurrency),
            timeout: self.timeout.or_else(|| fallback.timeout.clone()),
            method: self.method.or_else(|| fallback.method.clone()),
            body: self.body.or_else(|| fallback.body.clone()),
            body_filename: self.body_filename.or_else(|| fallback.body_filename.clone()),
            headers: self.headers.or_else(|| fallback.headers.clone()),
            user_agent: self.user_agent.or_else(|| fallback.user_agent.clone()),
            basic_auth: self.basic_auth.or_else(|| fallback.basic_auth.clone()),
            compress: self.compress.or(fallback.compress),
            keep_alive: self.keep_alive.or(fallback.keep_alive),
        }
    }

    /// Resolve against `defaults`, then against the built-in defaults
    pub fn resolve(self, defaults: &TargetTemplate) -> TargetSpec {
        let merged = self.or(defaults);
        TargetSpec {
            url: merged.url.unwrap_or_else(|| DEFAULT_URL.to_string()),
            regex_url: merged.regex_url.unwrap_or(false),
            count: merged.count.unwrap_or(DEFAULT_COUNT),
            concurrency: merged.concurrency.unwrap_or(DEFAULT_CONCURRENCY),
            timeout: Some(merged.timeout.unwrap_or_else(|| DEFAULT_TIMEOUT.to_string())),
            method: merged.method.unwrap_or_else(|| DEFAULT_METHOD.to_string()),
            body: merged.body,
            body_filename: merged.body_filename,
            headers: merged.headers,
            user_agent: merged.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            basic_auth: merged.basic_auth,
            compress: merged.compress.unwrap_or(false),
            keep_alive: merged.keep_alive.unwrap_or(false),
        }
    }
}

// Display trait implementations

impl fmt::Display for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Configuration:")?;
        writeln!(f, "  Targets: {} target(s), {} request(s) total", self.targets.len(), self.total_requests())?;
        for (i, target) in self.targets.iter().enumerate() {
            writeln!(f, "    {}. {}", i + 1, target)?;
        }
        writeln!(
            f,
            "  Flags: verbose={}, quiet={}, no_http2={}, enforce_ssl={}",
            self.verbose, self.quiet, self.no_http2, self.enforce_ssl
        )?;
        if let Some(max) = self.max_workers {
            writeln!(f, "  Max workers: {}", max)?;
        }
        if let Some(ref path) = self.output.json_output {
            writeln!(f, "  JSON output: {}", path.display())?;
        }
        if let Some(ref path) = self.output.csv_output {
            writeln!(f, "  CSV output: {}", path.display())?;
        }
        Ok(())
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}{} count={} concurrency={}",
            self.method,
            self.url,
            if self.regex_url { " (pattern)" } else { "" },
            self.count,
            self.concurrency
        )?;
        if let Some(timeout) = non_empty(&self.timeout) {
            write!(f, " timeout={}", timeout)?;
        }
        if self.compress {
            write!(f, " compress")?;
        }
        if self.keep_alive {
            write!(f, " keepalive")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_spec_defaults() {
        let target = TargetSpec::default();
        assert_eq!(target.url, "http://localhost");
        assert_eq!(target.count, 10);
        assert_eq!(target.concurrency, 1);
        assert_eq!(target.timeout.as_deref(), Some("10s"));
        assert_eq!(target.method, "GET");
        assert_eq!(target.user_agent, "volley");
        assert!(!target.regex_url);
        assert!(!target.compress);
        assert!(!target.keep_alive);
    }

    #[test]
    fn test_timeout_duration() {
        let mut target = TargetSpec::default();
        assert_eq!(target.timeout_duration().unwrap(), Some(Duration::from_secs(10)));

        target.timeout = Some(String::new());
        assert_eq!(target.timeout_duration().unwrap(), None);

        target.timeout = None;
        assert_eq!(target.timeout_duration().unwrap(), None);

        target.timeout = Some("soon".to_string());
        assert!(target.timeout_duration().is_err());
    }

    #[test]
    fn test_empty_strings_are_unset() {
        let mut target = TargetSpec::default();
        target.body = Some(String::new());
        target.headers = Some(String::new());
        target.basic_auth = Some(String::new());
        target.body_filename = Some(PathBuf::new());

        assert!(target.body_text().is_none());
        assert!(target.header_list().is_none());
        assert!(target.basic_auth_list().is_none());
        assert!(target.body_file().is_none());
    }

    #[test]
    fn test_template_layering() {
        let defaults = TargetTemplate {
            count: Some(100),
            concurrency: Some(4),
            method: Some("POST".to_string()),
            ..Default::default()
        };
        let target = TargetTemplate {
            url: Some("http://example.com".to_string()),
            count: Some(20),
            ..Default::default()
        };

        let spec = target.resolve(&defaults);
        assert_eq!(spec.url, "http://example.com");
        assert_eq!(spec.count, 20); // target wins
        assert_eq!(spec.concurrency, 4); // from defaults
        assert_eq!(spec.method, "POST");
        assert_eq!(spec.user_agent, DEFAULT_USER_AGENT); // built-in
    }

    #[test]
    fn test_total_requests() {
        let mut a = TargetSpec::new("http://a");
        a.count = 3;
        let mut b = TargetSpec::new("http://b");
        b.count = 7;
        let config = RunConfig::new(vec![a, b]);
        assert_eq!(config.total_requests(), 10);
    }

    #[test]
    fn test_display_config() {
        let config = RunConfig::default();
        let text = config.to_string();
        assert!(text.contains("1 target(s)"));
        assert!(text.contains("GET http://localhost count=10 concurrency=1"));
    }
}
