//! Deadline-bounded polling
//!
//! Turns a point-in-time probe of remote state into a blocking operation.
//! The probe is re-evaluated with exponential backoff until it reports a
//! terminal outcome or the deadline passes. The deadline is the only way to
//! stop a poll early.

use std::future::Future;
use std::time::Duration;
use tether_client::ClientError;
use thiserror::Error;
use tokio::time::{self, Instant};
use tracing::{debug, warn};

use crate::config::ReconcilerConfig;

/// Stand-in for "no deadline" when a timeout does not fit in an `Instant`
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// Deadline `timeout` from now, saturating at a far-future instant
pub fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}

/// Classification of a single probe evaluation
#[derive(Debug)]
pub enum PollOutcome {
    /// Remote reached the desired state
    TerminalSuccess,
    /// Remote reported an error state; polling stops
    TerminalFailure(String),
    /// Remote is still converging
    Retryable(String),
    /// The probe itself failed (transport or decoding)
    ProbeError(ClientError),
}

/// Why a poll did not succeed
#[derive(Debug, Error)]
pub enum PollError {
    #[error("terminal failure: {0}")]
    TerminalFailure(String),

    #[error("deadline exceeded after {attempts} attempt(s), last observed {last_reason}")]
    DeadlineExceeded { last_reason: String, attempts: u32 },

    #[error("probe failed: {0}")]
    Probe(#[source] ClientError),
}

/// Retry loop driving a probe to a terminal outcome
#[derive(Debug, Clone)]
pub struct Poller {
    initial_delay: Duration,
    max_delay: Duration,
    retry_transient_probe_errors: bool,
}

impl Poller {
    /// Creates a poller with the given backoff bounds
    ///
    /// Transient probe errors are retried by default.
    pub fn new(initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            initial_delay,
            max_delay: max_delay.max(initial_delay),
            retry_transient_probe_errors: true,
        }
    }

    pub fn from_config(config: &ReconcilerConfig) -> Self {
        Self::new(config.initial_poll_delay, config.max_poll_delay)
            .retry_transient_probe_errors(config.retry_transient_probe_errors)
    }

    /// Whether transient probe errors count as "still converging"
    ///
    /// When disabled every probe error ends the poll immediately.
    pub fn retry_transient_probe_errors(mut self, enabled: bool) -> Self {
        self.retry_transient_probe_errors = enabled;
        self
    }

    /// Evaluates `probe` until it reaches a terminal outcome or `deadline` passes
    ///
    /// The probe is always evaluated at least once, even if the deadline has
    /// already passed. The last evaluation happens at the deadline itself.
    ///
    /// # Errors
    /// - [`PollError::TerminalFailure`] as soon as the probe reports one
    /// - [`PollError::Probe`] for a probe error that is not retried
    /// - [`PollError::DeadlineExceeded`] with the last retryable reason
    pub async fn poll<F, Fut>(&self, deadline: Instant, mut probe: F) -> Result<(), PollError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = PollOutcome>,
    {
        let mut delay = self.initial_delay;
        let mut attempts: u32 = 0;

        loop {
            attempts = attempts.saturating_add(1);

            let reason = match probe().await {
                PollOutcome::TerminalSuccess => {
                    debug!("Poll succeeded after {} attempt(s)", attempts);
                    return Ok(());
                }
                PollOutcome::TerminalFailure(reason) => {
                    return Err(PollError::TerminalFailure(reason));
                }
                PollOutcome::Retryable(reason) => reason,
                PollOutcome::ProbeError(cause)
                    if self.retry_transient_probe_errors && cause.is_transient() =>
                {
                    warn!("Transient probe error (attempt {}): {}", attempts, cause);
                    format!("probe error: {}", cause)
                }
                PollOutcome::ProbeError(cause) => return Err(PollError::Probe(cause)),
            };

            let now = Instant::now();
            if now >= deadline {
                return Err(PollError::DeadlineExceeded {
                    last_reason: reason,
                    attempts,
                });
            }

            let wait = delay.min(deadline - now);
            debug!(
                "Attempt {}: {}; retrying in {:?}",
                attempts, reason, wait
            );
            time::sleep(wait).await;

            delay = delay.saturating_mul(2).min(self.max_delay);
        }
    }
}

impl Default for Poller {
    fn default() -> Self {
        Self::from_config(&ReconcilerConfig::default())
    }
}
