//! CLI argument parsing using clap

use clap::Parser;
use std::path::PathBuf;

/// Volley - concurrent HTTP load generator
#[derive(Parser, Debug, Default)]
#[command(name = "volley")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Target URLs (or regex patterns with --regex), one target each
    #[arg(value_name = "URL")]
    pub urls: Vec<String>,

    /// TOML configuration file (CLI flags override its values)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // === Target Options ===
    /// Total number of requests per target
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Number of concurrent workers per target
    #[arg(short = 'c', long)]
    pub concurrency: Option<usize>,

    /// Per-request timeout (e.g., 10s, 250ms, 1m30s)
    #[arg(short = 't', long)]
    pub timeout: Option<String>,

    /// HTTP method
    #[arg(short = 'X', long)]
    pub method: Option<String>,

    /// Literal request body
    #[arg(long)]
    pub body: Option<String>,

    /// File whose contents are sent as the request body (wins over --body)
    #[arg(long, value_name = "PATH")]
    pub body_file: Option<PathBuf>,

    /// Request headers (e.g., "Accept: text/html, X-Trace: 1")
    #[arg(short = 'H', long)]
    pub headers: Option<String>,

    /// User-Agent header value
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Basic auth credential as "user: password"
    #[arg(long)]
    pub basic_auth: Option<String>,

    /// Accept compressed responses
    #[arg(long)]
    pub compress: bool,

    /// Reuse connections between requests
    #[arg(long)]
    pub keepalive: bool,

    /// Interpret URLs as regex patterns and generate one URL per request
    #[arg(short = 'r', long)]
    pub regex: bool,

    // === Global Options ===
    /// Print request and response headers for every request
    #[arg(short = 'v', long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress per-request output
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Disable HTTP/2 (HTTP/1.1 only)
    #[arg(long)]
    pub no_http2: bool,

    /// Verify TLS certificates
    #[arg(long)]
    pub enforce_ssl: bool,

    /// Maximum number of workers running at once across all targets
    #[arg(long)]
    pub max_workers: Option<usize>,

    // === Output Options ===
    /// Write every request's outcome as JSON to this file
    #[arg(long, value_name = "PATH")]
    pub json: Option<PathBuf>,

    /// Write every request's outcome as CSV to this file
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,

    // === Advanced Options ===
    /// Validate and print the configuration, then exit
    #[arg(long)]
    pub dry_run: bool,

    /// Enable diagnostic logging on stderr
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate CLI arguments
    ///
    /// Only checks that need the raw flags live here. Everything that also
    /// applies to file-supplied targets is checked by the config validator.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.urls.is_empty() && self.config.is_none() {
            anyhow::bail!("no targets given: pass at least one URL or --config <PATH>");
        }

        if self.urls.iter().any(|url| url.trim().is_empty()) {
            anyhow::bail!("target URL must not be blank");
        }

        if let Some(ref path) = self.body_file {
            if path.as_os_str().is_empty() {
                anyhow::bail!("--body-file must not be empty");
            }
        }

        Ok(())
    }
}
