//! TOML configuration file parsing
//!
//! A file holds global flags, top-level target defaults (any target field),
//! and a `[[targets]]` array of per-target overrides:
//!
//! ```toml
//! quiet = true
//! json_output = "results.json"
//! count = 100
//! concurrency = 10
//!
//! [[targets]]
//! url = "http://localhost:8080/health"
//!
//! [[targets]]
//! url = "http://localhost:8080/items/[0-9]{3}"
//! regex = true
//! method = "POST"
//! ```

use super::*;
use crate::config::cli::Cli;
use crate::config::cli_convert;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Parsed contents of a configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StressFile {
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub quiet: bool,
    #[serde(default)]
    pub no_http2: bool,
    #[serde(default)]
    pub enforce_ssl: bool,
    pub json_output: Option<PathBuf>,
    pub csv_output: Option<PathBuf>,
    pub max_workers: Option<usize>,

    /// Defaults shared by every target
    #[serde(flatten)]
    pub defaults: TargetTemplate,

    #[serde(default)]
    pub targets: Vec<TargetTemplate>,
}

/// Parse TOML configuration file
pub fn parse_toml_file(path: &Path) -> Result<StressFile> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_toml_string(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse TOML configuration from string
pub fn parse_toml_string(contents: &str) -> Result<StressFile> {
    let file: StressFile = ::toml::from_str(contents)
        .context("Failed to parse TOML configuration")?;

    Ok(file)
}

/// Merge CLI arguments with file configuration (CLI takes precedence)
///
/// File targets come first, in file order, followed by one target per
/// positional URL. Each target field resolves as: target override, then CLI
/// flag, then file default, then built-in default.
pub fn merge_cli_with_file(cli: &Cli, file: StressFile) -> RunConfig {
    let defaults = cli_convert::cli_target_defaults(cli).or(&file.defaults);

    let mut targets: Vec<TargetSpec> = file
        .targets
        .into_iter()
        .map(|target| target.resolve(&defaults))
        .collect();

    targets.extend(cli.urls.iter().map(|url| {
        TargetTemplate {
            url: Some(url.clone()),
            ..Default::default()
        }
        .resolve(&defaults)
    }));

    RunConfig {
        targets,
        verbose: cli.verbose || file.verbose,
        quiet: cli.quiet || file.quiet,
        no_http2: cli.no_http2 || file.no_http2,
        enforce_ssl: cli.enforce_ssl || file.enforce_ssl,
        output: OutputConfig {
            json_output: cli.json.clone().or(file.json_output),
            csv_output: cli.csv.clone().or(file.csv_output),
        },
        max_workers: cli.max_workers.or(file.max_workers),
    }
}
