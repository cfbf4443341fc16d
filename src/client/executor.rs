// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Single entry point wrapping client calls with retry, error suppression and timing.

use crate::client::latency::{LatencyRecorder, Operation};
use crate::constants::client::{RETRY_INITIAL_DELAY_MS, RETRY_MAX_ATTEMPTS, RETRY_MAX_DELAY_MS};
use crate::error::{Error, Result};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Which failures are logged and swallowed instead of returned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Suppress {
    #[default]
    Never,
    All,
    /// Only a missing document
    NotFound,
}

impl Suppress {
    fn covers(self, error: &Error) -> bool {
        match self {
            Suppress::Never => false,
            Suppress::All => true,
            Suppress::NotFound => matches!(error, Error::DocumentNotFound(_)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CallOptions {
    pub retry: bool,
    pub suppress: Suppress,
    pub record_timing: bool,
}

impl CallOptions {
    pub fn retried(mut self) -> Self {
        self.retry = true;
        self
    }

    pub fn suppressing(mut self, suppress: Suppress) -> Self {
        self.suppress = suppress;
        self
    }

    pub fn timed(mut self) -> Self {
        self.record_timing = true;
        self
    }
}

/// Exponential backoff on transient errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// Total attempts including the first
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(RETRY_INITIAL_DELAY_MS),
            max_delay: Duration::from_millis(RETRY_MAX_DELAY_MS),
            max_attempts: RETRY_MAX_ATTEMPTS,
        }
    }
}

impl RetryPolicy {
    /// Delay after the given failed attempt, counting from zero.
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.initial_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |d| d.min(self.max_delay))
    }
}

#[derive(Debug, Default)]
pub struct Executor {
    retry: RetryPolicy,
    latencies: LatencyRecorder,
}

impl Executor {
    pub fn new(retry: RetryPolicy) -> Self {
        Self {
            retry,
            latencies: LatencyRecorder::default(),
        }
    }

    pub fn latencies(&self) -> &LatencyRecorder {
        &self.latencies
    }

    /// Run `call` under `options`. `Ok(None)` means the failure was suppressed.
    ///
    /// Only successful calls are timed; with retries the time spans all attempts.
    pub async fn execute<T, F, Fut>(
        &self,
        operation: Operation,
        options: CallOptions,
        mut call: F,
    ) -> Result<Option<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let start = Instant::now();
        let outcome = if options.retry {
            self.with_retry(operation, &mut call).await
        } else {
            call().await
        };

        match outcome {
            Ok(value) => {
                if options.record_timing {
                    self.latencies.record(operation, start.elapsed());
                }
                Ok(Some(value))
            }
            Err(e) if options.suppress.covers(&e) => {
                warn!("{} failed, ignoring: {}", operation, e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn with_retry<T, F, Fut>(&self, operation: Operation, call: &mut F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match call().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!("{} succeeded after {} attempts", operation, attempt + 1);
                    }
                    return Ok(value);
                }
                Err(e) if e.is_transient() && attempt + 1 < self.retry.max_attempts => {
                    let delay = self.retry.delay(attempt);
                    debug!(
                        "{} failed (attempt {}/{}): {}. Retrying in {:?}",
                        operation,
                        attempt + 1,
                        self.retry.max_attempts,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn make_executor() -> Executor {
        Executor::new(RetryPolicy {
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            max_attempts: 4,
        })
    }

    /// Fails with `error` for the first `failures` calls, then returns the call number.
    fn flaky(
        calls: &AtomicU32,
        failures: u32,
        error: fn() -> Error,
    ) -> impl FnMut() -> std::future::Ready<Result<u32>> + '_ {
        move || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            std::future::ready(if n <= failures { Err(error()) } else { Ok(n) })
        }
    }

    fn busy() -> Error {
        Error::TemporaryFailure("busy".to_string())
    }

    fn missing() -> Error {
        Error::DocumentNotFound("k1".to_string())
    }

    #[test]
    fn test_delay_doubles_and_caps() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.delay(0), Duration::from_millis(100));
        assert_eq!(policy.delay(1), Duration::from_millis(200));
        assert_eq!(policy.delay(3), Duration::from_millis(800));
        assert_eq!(policy.delay(7), Duration::from_secs(10));
        assert_eq!(policy.delay(40), Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_retry_until_success() {
        let executor = make_executor();
        let calls = AtomicU32::new(0);

        let result = executor
            .execute(Operation::Create, CallOptions::default().retried(), flaky(&calls, 2, busy))
            .await
            .unwrap();

        assert_eq!(result, Some(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_attempts() {
        let executor = make_executor();
        let calls = AtomicU32::new(0);

        let result = executor
            .execute(Operation::Create, CallOptions::default().retried(), flaky(&calls, 10, busy))
            .await;

        assert!(matches!(result, Err(Error::TemporaryFailure(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_retry_stops_on_non_transient_error() {
        let executor = make_executor();
        let calls = AtomicU32::new(0);

        let result = executor
            .execute(Operation::Create, CallOptions::default().retried(), flaky(&calls, 10, missing))
            .await;

        assert!(matches!(result, Err(Error::DocumentNotFound(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_suppressed_failure_returns_none() {
        let executor = make_executor();
        let calls = AtomicU32::new(0);

        let options = CallOptions::default().suppressing(Suppress::All);
        let result = executor
            .execute(Operation::Delete, options, flaky(&calls, 1, busy))
            .await
            .unwrap();

        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_not_found_suppression_is_selective() {
        let executor = make_executor();
        let options = CallOptions::default().suppressing(Suppress::NotFound);

        let calls = AtomicU32::new(0);
        let missed = executor
            .execute(Operation::Read, options, flaky(&calls, 1, missing))
            .await
            .unwrap();
        assert_eq!(missed, None);

        let calls = AtomicU32::new(0);
        let failed = executor
            .execute(Operation::Read, options, flaky(&calls, 1, busy))
            .await;
        assert!(failed.is_err());
    }

    #[tokio::test]
    async fn test_timing_records_successes_only() {
        let executor = make_executor();
        let options = CallOptions::default().timed().suppressing(Suppress::All);

        let calls = AtomicU32::new(0);
        executor
            .execute(Operation::Update, options, flaky(&calls, 0, busy))
            .await
            .unwrap();
        let calls = AtomicU32::new(0);
        executor
            .execute(Operation::Update, options, flaky(&calls, 1, busy))
            .await
            .unwrap();

        assert_eq!(executor.latencies().count(Operation::Update), 1);
    }
}
