//! Bounded polling for long-running video operations.
//!
//! Job submission returns an [`Operation`] that must be polled until its
//! completion flag is set. [`wait_until_done`] does that with a growing
//! delay between status checks, a hard attempt bound, and a
//! [`CancellationToken`] so shutdown can abort a poll mid-wait.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::api::{GeminiClient, GeminiError};
use crate::config::PollConfig;
use crate::messages::Operation;

/// Calculate the next poll delay from the current delay and config.
///
/// The result is clamped to [`PollConfig::max_delay`].
pub fn next_delay(current: Duration, config: &PollConfig) -> Duration {
    let next_ms = (current.as_millis() as f64 * config.multiplier) as u64;
    Duration::from_millis(next_ms).min(config.max_delay)
}

/// Poll an operation until it completes, fails, or the bound is hit.
///
/// Each wait races the `cancel` token; exceeding
/// [`PollConfig::max_attempts`] yields [`GeminiError::PollTimeout`], and an
/// operation that finishes with a provider-reported error yields
/// [`GeminiError::OperationFailed`].
pub async fn wait_until_done(
    client: &GeminiClient,
    operation: Operation,
    config: &PollConfig,
    cancel: &CancellationToken,
) -> Result<Operation, GeminiError> {
    let mut operation = operation;
    let mut delay = config.initial_delay;
    let mut attempt = 0u32;

    while !operation.done {
        if attempt >= config.max_attempts {
            return Err(GeminiError::PollTimeout { attempts: attempt });
        }

        // Wait out the poll interval, respecting cancellation.
        tokio::select! {
            _ = cancel.cancelled() => return Err(GeminiError::Cancelled),
            _ = tokio::time::sleep(delay) => {}
        }

        attempt += 1;
        tracing::debug!(
            operation = %operation.name,
            attempt,
            delay_ms = delay.as_millis() as u64,
            "Checking video operation",
        );

        operation = tokio::select! {
            _ = cancel.cancelled() => return Err(GeminiError::Cancelled),
            result = client.poll_operation(&operation.name) => result?,
        };

        delay = next_delay(delay, config);
    }

    if let Some(error) = operation.error.take() {
        return Err(GeminiError::OperationFailed(error.message));
    }

    Ok(operation)
}
