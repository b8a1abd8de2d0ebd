//! Configuration validation
//!
//! Validation is fail-fast: the first violation is returned and nothing is
//! accumulated. It runs before any request is built or sent.

use super::*;
use thiserror::Error;

/// Reason a configuration was rejected
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("zero targets")]
    NoTargets,

    #[error("target {}: empty URL", .index + 1)]
    EmptyUrl { index: usize },

    #[error("target {}: request count must be greater than zero", .index + 1)]
    ZeroCount { index: usize },

    #[error("target {}: concurrency must be greater than zero", .index + 1)]
    ZeroConcurrency { index: usize },

    #[error("target {}: failed to parse timeout {timeout:?}: {reason}", .index + 1)]
    InvalidTimeout {
        index: usize,
        timeout: String,
        reason: String,
    },

    #[error("target {}: timeout must be greater than one millisecond, got {timeout:?}", .index + 1)]
    TimeoutTooSmall { index: usize, timeout: String },

    // Message text kept as shipped; the check rejects concurrency > count.
    #[error(
        "target {}: concurrency must be higher than request count (concurrency {concurrency}, count {count})",
        .index + 1
    )]
    ConcurrencyExceedsCount {
        index: usize,
        concurrency: usize,
        count: usize,
    },

    #[error("max_workers must be greater than zero")]
    ZeroMaxWorkers,
}

/// Validate complete configuration
pub fn validate_config(config: &RunConfig) -> std::result::Result<(), ValidationError> {
    validate_targets(&config.targets)?;

    if config.max_workers == Some(0) {
        return Err(ValidationError::ZeroMaxWorkers);
    }

    Ok(())
}

/// Validate targets configuration
pub fn validate_targets(targets: &[TargetSpec]) -> std::result::Result<(), ValidationError> {
    if targets.is_empty() {
        return Err(ValidationError::NoTargets);
    }

    for (index, target) in targets.iter().enumerate() {
        validate_target(target, index)?;
    }

    Ok(())
}

/// Validate single target configuration
fn validate_target(target: &TargetSpec, index: usize) -> std::result::Result<(), ValidationError> {
    if target.url.is_empty() {
        return Err(ValidationError::EmptyUrl { index });
    }

    if target.count == 0 {
        return Err(ValidationError::ZeroCount { index });
    }

    if target.concurrency == 0 {
        return Err(ValidationError::ZeroConcurrency { index });
    }

    if let Some(raw) = non_empty(&target.timeout) {
        let timeout = cli_convert::parse_duration(raw).map_err(|e| ValidationError::InvalidTimeout {
            index,
            timeout: raw.to_string(),
            reason: e.to_string(),
        })?;
        if timeout <= Duration::from_millis(1) {
            return Err(ValidationError::TimeoutTooSmall {
                index,
                timeout: raw.to_string(),
            });
        }
    }

    if target.concurrency > target.count {
        return Err(ValidationError::ConcurrencyExceedsCount {
            index,
            concurrency: target.concurrency,
            count: target.count,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_target() -> TargetSpec {
        TargetSpec::new("http://localhost:8080/health")
    }

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&RunConfig::default()).is_ok());
    }

    #[test]
    fn test_validate_zero_targets() {
        let config = RunConfig::new(vec![]);
        assert_eq!(validate_config(&config), Err(ValidationError::NoTargets));
    }

    #[test]
    fn test_validate_empty_url() {
        let mut target = valid_target();
        target.url = String::new();
        let config = RunConfig::new(vec![target]);
        assert_eq!(validate_config(&config), Err(ValidationError::EmptyUrl { index: 0 }));
    }

    #[test]
    fn test_validate_zero_count() {
        let mut target = valid_target();
        target.count = 0;
        let config = RunConfig::new(vec![target]);
        assert_eq!(validate_config(&config), Err(ValidationError::ZeroCount { index: 0 }));
    }

    #[test]
    fn test_validate_zero_concurrency() {
        let mut target = valid_target();
        target.concurrency = 0;
        let config = RunConfig::new(vec![target]);
        assert_eq!(
            validate_config(&config),
            Err(ValidationError::ZeroConcurrency { index: 0 })
        );
    }

    #[test]
    fn test_validate_timeout_too_small() {
        for raw in ["1ms", "500us", "0", "0s", "-5s"] {
            let mut target = valid_target();
            target.timeout = Some(raw.to_string());
            let config = RunConfig::new(vec![target]);
            assert!(
                matches!(validate_config(&config), Err(ValidationError::TimeoutTooSmall { .. })),
                "timeout {:?} should be rejected as too small",
                raw
            );
        }
    }

    #[test]
    fn test_validate_timeout_unparseable() {
        for raw in ["ten seconds", "10", "10x", "1..5s", "s"] {
            let mut target = valid_target();
            target.timeout = Some(raw.to_string());
            let config = RunConfig::new(vec![target]);
            assert!(
                matches!(validate_config(&config), Err(ValidationError::InvalidTimeout { .. })),
                "timeout {:?} should be rejected as unparseable",
                raw
            );
        }
    }

    #[test]
    fn test_validate_timeout_accepted() {
        for raw in ["2ms", "1.5s", "1m30s", "10s"] {
            let mut target = valid_target();
            target.timeout = Some(raw.to_string());
            assert!(validate_config(&RunConfig::new(vec![target])).is_ok(), "{}", raw);
        }

        // No timeout at all is fine
        let mut target = valid_target();
        target.timeout = None;
        assert!(validate_config(&RunConfig::new(vec![target])).is_ok());
    }

    #[test]
    fn test_validate_concurrency_exceeds_count() {
        let mut target = valid_target();
        target.count = 5;
        target.concurrency = 6;
        let config = RunConfig::new(vec![target]);
        assert_eq!(
            validate_config(&config),
            Err(ValidationError::ConcurrencyExceedsCount {
                index: 0,
                concurrency: 6,
                count: 5
            })
        );

        // Equal is allowed
        let mut target = valid_target();
        target.count = 5;
        target.concurrency = 5;
        assert!(validate_config(&RunConfig::new(vec![target])).is_ok());
    }

    #[test]
    fn test_validate_fail_fast_order() {
        // Every field is broken; the URL check comes first
        let mut target = valid_target();
        target.url = String::new();
        target.count = 0;
        target.concurrency = 0;
        target.timeout = Some("bogus".to_string());
        let config = RunConfig::new(vec![target]);
        assert_eq!(validate_config(&config), Err(ValidationError::EmptyUrl { index: 0 }));

        // Count before concurrency
        let mut target = valid_target();
        target.count = 0;
        target.concurrency = 0;
        let config = RunConfig::new(vec![target]);
        assert_eq!(validate_config(&config), Err(ValidationError::ZeroCount { index: 0 }));
    }

    #[test]
    fn test_validate_reports_failing_target_index() {
        let good = valid_target();
        let mut bad = valid_target();
        bad.concurrency = 0;
        let config = RunConfig::new(vec![good.clone(), good, bad]);

        let err = validate_config(&config).unwrap_err();
        assert_eq!(err, ValidationError::ZeroConcurrency { index: 2 });
        assert!(err.to_string().starts_with("target 3:"));
    }

    #[test]
    fn test_validate_max_workers() {
        let mut config = RunConfig::default();
        config.max_workers = Some(0);
        assert_eq!(validate_config(&config), Err(ValidationError::ZeroMaxWorkers));

        config.max_workers = Some(4);
        assert!(validate_config(&config).is_ok());
    }
}
