// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! A single retry combinator applied uniformly to every backend call (spec §9:
//! "Centralize it into one retry combinator ... apply uniformly").

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, error, warn};

use crate::constants::{
    RETRY_INITIAL_INTERVAL_MILLIS, RETRY_MAX_ATTEMPTS, RETRY_MAX_INTERVAL_SECS, RETRY_MULTIPLIER,
};
use crate::errors::BackendError;

/// Bounded exponential backoff with jitter: 1s, 2s, 4s, 8s, ... capped at
/// [`RETRY_MAX_INTERVAL_SECS`], up to [`RETRY_MAX_ATTEMPTS`] total attempts.
pub struct Backoff {
    current: Duration,
    max: Duration,
    multiplier: f64,
    attempts_left: u32,
}

impl Backoff {
    #[must_use]
    pub fn default_policy() -> Self {
        Self {
            current: Duration::from_millis(RETRY_INITIAL_INTERVAL_MILLIS),
            max: Duration::from_secs(RETRY_MAX_INTERVAL_SECS),
            multiplier: RETRY_MULTIPLIER,
            attempts_left: RETRY_MAX_ATTEMPTS,
        }
    }

    fn next_delay(&mut self) -> Option<Duration> {
        if self.attempts_left == 0 {
            return None;
        }
        self.attempts_left -= 1;

        let jitter_factor = rand::rng().random_range(0.8..=1.2);
        let millis = (self.current.as_millis() as f64 * jitter_factor) as u64;
        let delay = Duration::from_millis(millis);

        let next = self.current.mul_f64(self.multiplier);
        self.current = next.min(self.max);

        Some(delay)
    }
}

/// Run `call` and, on a retryable [`BackendError`], retry with bounded exponential
/// backoff until it succeeds, a non-retryable error is returned, or attempts are
/// exhausted — in which case the last error is returned for the periodic resync to
/// correct later (spec §4.5 "Retry policy").
pub async fn retry_backend_call<T, F, Fut>(operation: &str, mut call: F) -> Result<T, BackendError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, BackendError>>,
{
    let mut backoff = Backoff::default_policy();
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        match call().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(operation, attempt, "backend call succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) if err.is_retryable() => match backoff.next_delay() {
                Some(delay) => {
                    warn!(
                        operation,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "retryable backend error, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                None => {
                    error!(operation, attempt, error = %err, "retries exhausted, deferring to next resync");
                    return Err(err);
                }
            },
            Err(err) => {
                error!(operation, attempt, error = %err, "non-retryable backend error");
                return Err(err);
            }
        }
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod retry_tests;
