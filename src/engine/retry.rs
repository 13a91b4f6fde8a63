//! Bounded retry for file reads
//!
//! A freshly written WAV on a shared filesystem can be visible before its
//! contents are flushed. Reads go through [`retry_with_backoff`], which
//! retries transient failures with exponential backoff and gives up after a
//! fixed number of attempts.

use std::path::Path;
use std::thread;
use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SleepstackError};

/// Longest single wait between two attempts in milliseconds
pub const MAX_DELAY_MS: u64 = 60_000;

/// Exponential backoff policy for reads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Delay before the second attempt in milliseconds
    pub initial_delay_ms: u64,
    /// Multiplier applied to the delay after every failed attempt
    pub backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay_ms: 500,
            backoff_factor: 2.0,
        }
    }
}

impl RetryPolicy {
    /// A policy that tries exactly once
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// A policy that retries without sleeping
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay_ms: 0,
            backoff_factor: 1.0,
        }
    }

    /// Delay to wait after the given failed attempt (1-based)
    ///
    /// With the default policy this is 0.5s, 1s, 2s, 4s. Never exceeds
    /// [`MAX_DELAY_MS`].
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let millis = self.initial_delay_ms as f64 * self.backoff_factor.powi(exponent);
        if millis.is_nan() {
            return Duration::ZERO;
        }
        Duration::from_millis(millis.round().min(MAX_DELAY_MS as f64) as u64)
    }
}

/// Run `op` until it succeeds, fails permanently, or attempts run out
///
/// `op` receives the 1-based attempt number. Errors for which
/// [`SleepstackError::is_transient`] is false are returned immediately.
/// Exhausting the policy yields `RetriesExhausted` wrapping the last error.
pub fn retry_with_backoff<T, F>(path: &Path, policy: &RetryPolicy, mut op: F) -> Result<T>
where
    F: FnMut(u32) -> Result<T>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op(attempt) {
            Ok(value) => return Ok(value),
            Err(err) if !err.is_transient() => return Err(err),
            Err(err) if attempt >= max_attempts => {
                warn!(
                    "All {} read attempts failed for {}. Last error: {}",
                    max_attempts,
                    path.display(),
                    err
                );
                return Err(SleepstackError::RetriesExhausted {
                    path: path.to_path_buf(),
                    attempts: max_attempts,
                    source: Box::new(err),
                });
            }
            Err(err) => {
                let delay = policy.delay_after(attempt);
                warn!(
                    "Read attempt {} failed for {}: {}. Retrying in {:?}",
                    attempt,
                    path.display(),
                    err,
                    delay
                );
                if !delay.is_zero() {
                    thread::sleep(delay);
                }
                attempt += 1;
            }
        }
    }
}
