//! Controller settings loaded from environment variables.

use crate::error::ControllerError;
use std::env;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_CONCURRENCY: u16 = 3;
const DEFAULT_DEBOUNCE_SECS: u64 = 1;
const DEFAULT_ERROR_BACKOFF_MIN_SECS: u64 = 5;
const DEFAULT_ERROR_BACKOFF_MAX_SECS: u64 = 300;

/// Runtime settings for the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Namespace to watch (`None` watches all namespaces)
    pub namespace: Option<String>,
    /// Maximum concurrent reconciliations across different ScalingWindows
    pub concurrency: u16,
    /// Quiet period after an event before reconciling
    pub debounce: Duration,
    /// First retry delay after a failed reconciliation
    pub error_backoff_min: Duration,
    /// Upper bound for retry delays after repeated failures
    pub error_backoff_max: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            namespace: None,
            concurrency: DEFAULT_CONCURRENCY,
            debounce: Duration::from_secs(DEFAULT_DEBOUNCE_SECS),
            error_backoff_min: Duration::from_secs(DEFAULT_ERROR_BACKOFF_MIN_SECS),
            error_backoff_max: Duration::from_secs(DEFAULT_ERROR_BACKOFF_MAX_SECS),
        }
    }
}

impl Settings {
    /// Loads settings from the process environment.
    ///
    /// - `WATCH_NAMESPACE`: namespace to watch (default: all namespaces)
    /// - `RECONCILE_CONCURRENCY`: concurrent reconciliations (default: 3)
    /// - `RECONCILE_DEBOUNCE_SECS`: event debounce (default: 1)
    /// - `ERROR_BACKOFF_MIN_SECS` / `ERROR_BACKOFF_MAX_SECS`: retry delays (default: 5 / 300)
    pub fn from_env() -> Result<Self, ControllerError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads settings through `lookup`, which returns the value of a variable if set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ControllerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let namespace = lookup("WATCH_NAMESPACE").filter(|ns| !ns.trim().is_empty());
        let concurrency = parse_or(&lookup, "RECONCILE_CONCURRENCY", defaults.concurrency)?;
        let debounce = Duration::from_secs(parse_or(&lookup, "RECONCILE_DEBOUNCE_SECS", DEFAULT_DEBOUNCE_SECS)?);
        let error_backoff_min = Duration::from_secs(parse_or(
            &lookup,
            "ERROR_BACKOFF_MIN_SECS",
            DEFAULT_ERROR_BACKOFF_MIN_SECS,
        )?);
        let error_backoff_max = Duration::from_secs(parse_or(
            &lookup,
            "ERROR_BACKOFF_MAX_SECS",
            DEFAULT_ERROR_BACKOFF_MAX_SECS,
        )?);

        if error_backoff_min.is_zero() {
            return Err(ControllerError::InvalidConfig(
                "ERROR_BACKOFF_MIN_SECS must be greater than 0".to_string(),
            ));
        }
        if error_backoff_min > error_backoff_max {
            return Err(ControllerError::InvalidConfig(format!(
                "ERROR_BACKOFF_MIN_SECS ({}) must not exceed ERROR_BACKOFF_MAX_SECS ({})",
                error_backoff_min.as_secs(),
                error_backoff_max.as_secs()
            )));
        }

        Ok(Self {
            namespace,
            concurrency,
            debounce,
            error_backoff_min,
            error_backoff_max,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ControllerError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e| {
            ControllerError::InvalidConfig(format!("{} has invalid value {:?}: {}", key, raw, e))
        }),
        None => Ok(default),
    }
}
