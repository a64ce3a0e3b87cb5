//! Reconciler configuration
//!
//! Defines the operation timeout budget and the polling backoff used while
//! waiting for the platform to settle.

use anyhow::Context;
use std::time::Duration;

/// Timeout applied to create and delete when the caller sets none
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20 * 60);

/// Reconciler configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilerConfig {
    /// Budget for one create, or for each phase of one delete
    pub default_timeout: Duration,

    /// Delay before the second probe
    pub initial_poll_delay: Duration,

    /// Upper bound for the doubling backoff
    pub max_poll_delay: Duration,

    /// Keep polling through transient probe errors (5xx, throttling, network)
    pub retry_transient_probe_errors: bool,
}

impl ReconcilerConfig {
    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - TETHER_TIMEOUT (optional, seconds, default: 1200)
    /// - TETHER_POLL_INITIAL_DELAY_MS (optional, default: 500)
    /// - TETHER_POLL_MAX_DELAY_MS (optional, default: 10000)
    /// - TETHER_RETRY_PROBE_ERRORS (optional, true/false, default: true)
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let parse_u64 = |key: &str| -> anyhow::Result<Option<u64>> {
            lookup(key)
                .map(|raw| {
                    raw.trim()
                        .parse::<u64>()
                        .with_context(|| format!("{} must be a whole number, got '{}'", key, raw))
                })
                .transpose()
        };

        let default_timeout = parse_u64("TETHER_TIMEOUT")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.default_timeout);

        let initial_poll_delay = parse_u64("TETHER_POLL_INITIAL_DELAY_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.initial_poll_delay);

        let max_poll_delay = parse_u64("TETHER_POLL_MAX_DELAY_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.max_poll_delay);

        let retry_transient_probe_errors = lookup("TETHER_RETRY_PROBE_ERRORS")
            .map(|raw| {
                raw.trim().parse::<bool>().with_context(|| {
                    format!("TETHER_RETRY_PROBE_ERRORS must be true or false, got '{}'", raw)
                })
            })
            .transpose()?
            .unwrap_or(defaults.retry_transient_probe_errors);

        Ok(Self {
            default_timeout,
            initial_poll_delay,
            max_poll_delay,
            retry_transient_probe_errors,
        })
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.default_timeout.is_zero() {
            anyhow::bail!("default_timeout must be greater than 0");
        }

        if self.initial_poll_delay.is_zero() {
            anyhow::bail!("initial_poll_delay must be greater than 0");
        }

        if self.max_poll_delay < self.initial_poll_delay {
            anyhow::bail!("max_poll_delay must not be shorter than initial_poll_delay");
        }

        Ok(())
    }
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            default_timeout: DEFAULT_TIMEOUT,
            initial_poll_delay: Duration::from_millis(500),
            max_poll_delay: Duration::from_secs(10),
            retry_transient_probe_errors: true,
        }
    }
}
