//! Fixed-budget retry for the upload pipeline.
//!
//! Failures are classified by [`VouchrError::is_retryable`]: terminal errors
//! (duplicates, validation) are returned on the first attempt, anything else
//! is retried after a constant delay until the attempt budget runs out, at
//! which point the last error is returned.

use std::future::Future;
use std::time::Duration;

use backoff::backoff::Backoff;

use crate::config::UploadConfig;
use crate::error::{Result, VouchrError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub const fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }

    /// Policy wrapping the whole upload pipeline and the database insert.
    pub fn pipeline(config: &UploadConfig) -> Self {
        Self::new(config.retry_attempts, config.retry_delay())
    }

    /// Policy wrapping the Drive upload step.
    pub fn drive_upload(config: &UploadConfig) -> Self {
        Self::new(config.retry_attempts, config.upload_retry_delay())
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(1000))
    }
}

/// Constant delay, bounded number of retries.
#[derive(Debug, Clone)]
struct FixedSchedule {
    delay: Duration,
    retries: u32,
    remaining: u32,
}

impl FixedSchedule {
    fn new(policy: RetryPolicy) -> Self {
        let retries = policy.attempts.max(1) - 1;
        Self {
            delay: policy.delay,
            retries,
            remaining: retries,
        }
    }
}

impl Backoff for FixedSchedule {
    fn reset(&mut self) {
        self.remaining = self.retries;
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.delay)
    }
}

fn classify(err: VouchrError) -> backoff::Error<VouchrError> {
    if err.is_retryable() {
        backoff::Error::transient(err)
    } else {
        backoff::Error::permanent(err)
    }
}

/// Run `op` under `policy`. `label` names the operation in retry logs.
pub async fn retry<T, F, Fut>(policy: RetryPolicy, label: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    backoff::future::retry_notify(
        FixedSchedule::new(policy),
        || {
            let attempt = op();
            async move { attempt.await.map_err(classify) }
        },
        |err: VouchrError, wait: Duration| {
            tracing::warn!(
                operation = label,
                error = %err,
                retry_in_ms = wait.as_millis() as u64,
                "Operation failed, retrying"
            );
        },
    )
    .await
}
