//! CLI to Config conversion utilities

use crate::config::cli::Cli;
use crate::config::toml::{self as config_toml, StressFile};
use crate::config::{RunConfig, TargetTemplate};
use anyhow::{bail, Context, Result};
use std::time::Duration;

/// Parse a duration string (e.g., "10s", "1.5h", "300ms", "1h30m")
///
/// Grammar: an optional sign followed by one or more `<decimal><unit>`
/// groups, with units `ns`, `us`/`µs`, `ms`, `s`, `m`, `h`. A bare `0` is
/// accepted. Negative values parse but clamp to zero, so a caller checking a
/// lower bound rejects them.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let mut rest = s;
    let mut negative = false;
    if let Some(stripped) = rest.strip_prefix('-') {
        negative = true;
        rest = stripped;
    } else if let Some(stripped) = rest.strip_prefix('+') {
        rest = stripped;
    }

    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        bail!("Invalid duration format: {:?}", s);
    }

    let mut total_nanos: u128 = 0;
    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let number = &rest[..number_end];
        rest = &rest[number_end..];

        let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
        if whole.is_empty() && fraction.is_empty() {
            bail!("Invalid duration format: {:?}", s);
        }
        if fraction.contains('.') {
            bail!("Invalid duration format: {:?}", s);
        }

        let unit_end = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit = &rest[..unit_end];
        rest = &rest[unit_end..];

        let unit_nanos: u128 = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => 1_000,
            "ms" => 1_000_000,
            "s" => 1_000_000_000,
            "m" => 60 * 1_000_000_000,
            "h" => 3_600 * 1_000_000_000,
            "" => bail!("Missing unit in duration {:?}", s),
            other => bail!("Unknown unit {:?} in duration {:?}", other, s),
        };

        let whole_value: u128 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .with_context(|| format!("Invalid duration format: {:?}", s))?
        };

        // Digits past nanosecond precision of the largest unit carry no weight
        let fraction = &fraction[..fraction.len().min(18)];
        let fraction_value: u128 = if fraction.is_empty() {
            0
        } else {
            fraction
                .parse()
                .with_context(|| format!("Invalid duration format: {:?}", s))?
        };
        let scale = 10u128.pow(fraction.len() as u32);

        let group = whole_value
            .checked_mul(unit_nanos)
            .and_then(|v| v.checked_add(fraction_value * unit_nanos / scale))
            .with_context(|| format!("Duration out of range: {:?}", s))?;
        total_nanos = total_nanos
            .checked_add(group)
            .with_context(|| format!("Duration out of range: {:?}", s))?;
    }

    let nanos = u64::try_from(total_nanos).with_context(|| format!("Duration out of range: {:?}", s))?;
    if negative {
        return Ok(Duration::ZERO);
    }
    Ok(Duration::from_nanos(nanos))
}

/// Collect the target flags given on the command line
///
/// Boolean flags only contribute when set, so a file value of `true` cannot
/// be switched off from the command line.
pub fn cli_target_defaults(cli: &Cli) -> TargetTemplate {
    TargetTemplate {
        url: None,
        regex_url: cli.regex.then_some(true),
        count: cli.count,
        concurrency: cli.concurrency,
        timeout: cli.timeout.clone(),
        method: cli.method.clone(),
        body: cli.body.clone(),
        body_filename: cli.body_file.clone(),
        headers: cli.headers.clone(),
        user_agent: cli.user_agent.clone(),
        basic_auth: cli.basic_auth.clone(),
        compress: cli.compress.then_some(true),
        keep_alive: cli.keepalive.then_some(true),
    }
}

/// Build the run configuration from CLI arguments and the optional config file
pub fn build_run_config(cli: &Cli) -> Result<RunConfig> {
    let file = match cli.config {
        Some(ref path) => config_toml::parse_toml_file(path)?,
        None => StressFile::default(),
    };

    Ok(config_toml::merge_cli_with_file(cli, file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_duration_single_unit() {
        assert_eq!(parse_duration("10s").unwrap(), Duration::from_secs(10));
        assert_eq!(parse_duration("300ms").unwrap(), Duration::from_millis(300));
        assert_eq!(parse_duration("250us").unwrap(), Duration::from_micros(250));
        assert_eq!(parse_duration("250µs").unwrap(), Duration::from_micros(250));
        assert_eq!(parse_duration("42ns").unwrap(), Duration::from_nanos(42));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
    }

    #[test]
    fn test_parse_duration_fractions() {
        assert_eq!(parse_duration("1.5h").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_duration(".5s").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("1.s").unwrap(), Duration::from_secs(1));
    }

    #[test]
    fn test_parse_duration_compound() {
        assert_eq!(parse_duration("1h30m").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_duration("1m30s").unwrap(), Duration::from_secs(90));
        assert_eq!(
            parse_duration("2s500ms").unwrap(),
            Duration::from_millis(2500)
        );
    }

    #[test]
    fn test_parse_duration_zero_and_sign() {
        assert_eq!(parse_duration("0").unwrap(), Duration::ZERO);
        assert_eq!(parse_duration("-0").unwrap(), Duration::ZERO);
        assert_eq!(parse_duration("+3s").unwrap(), Duration::from_secs(3));
        assert_eq!(parse_duration("-3s").unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_parse_duration_malformed() {
        for raw in ["", "-", "10", "s", "10x", "1..5s", "10 s", " 10s", "ten"] {
            assert!(parse_duration(raw).is_err(), "{:?} should not parse", raw);
        }
    }

    #[test]
    fn test_parse_duration_overflow() {
        assert!(parse_duration("99999999999999999999h").is_err());
    }

    #[test]
    fn test_cli_target_defaults() {
        let cli = Cli {
            count: Some(50),
            method: Some("PUT".to_string()),
            keepalive: true,
            body_file: Some(PathBuf::from("payload.json")),
            ..Default::default()
        };

        let template = cli_target_defaults(&cli);
        assert_eq!(template.count, Some(50));
        assert_eq!(template.method.as_deref(), Some("PUT"));
        assert_eq!(template.keep_alive, Some(true));
        assert_eq!(template.compress, None);
        assert_eq!(template.regex_url, None);
        assert_eq!(template.body_filename, Some(PathBuf::from("payload.json")));
    }

    #[test]
    fn test_build_run_config_cli_only() {
        let cli = Cli {
            urls: vec!["localhost:8080".to_string(), "http://example.com".to_string()],
            concurrency: Some(2),
            quiet: true,
            json: Some(PathBuf::from("out.json")),
            ..Default::default()
        };

        let config = build_run_config(&cli).unwrap();
        assert_eq!(config.targets.len(), 2);
        assert_eq!(config.targets[0].url, "localhost:8080");
        assert_eq!(config.targets[0].concurrency, 2);
        assert_eq!(config.targets[1].count, crate::config::DEFAULT_COUNT);
        assert!(config.quiet);
        assert_eq!(config.output.json_output, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn test_build_run_config_without_targets() {
        let config = build_run_config(&Cli::default()).unwrap();
        assert!(config.targets.is_empty());
    }

    #[test]
    fn test_build_run_config_missing_file() {
        let cli = Cli {
            config: Some(PathBuf::from("/nonexistent/volley.toml")),
            ..Default::default()
        };
        assert!(build_run_config(&cli).is_err());
    }
}
