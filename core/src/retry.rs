//! Bounded retry of transient server failures.
//!
//! # Design
//! `run_and_retry` re-invokes a request-producing closure while it fails with
//! an error whose [`DbxError::retry_backoff`] is `Some`: `Retry` (503),
//! `RateLimited` (429, server-supplied wait) and `Server` (500). Everything
//! else, including route errors, is returned on first occurrence. When the
//! retry budget runs out the last failure is returned unchanged.
//!
//! Waits go through a [`CancelToken`]. Cancellation cuts a wait short but does
//! not stop the loop; the token stays cancelled so the caller still sees the
//! signal afterwards.

use crate::cancel::CancelToken;
use crate::error::RequestError;

struct RetryContext {
    attempt: u32,
    max_retries: u32,
}

impl RetryContext {
    fn exhausted(&self) -> bool {
        self.attempt >= self.max_retries
    }
}

/// Run `op` once, plus up to `max_retries` more times on retryable failures.
pub fn run_and_retry<T, E, F>(
    max_retries: u32,
    cancel: &CancelToken,
    mut op: F,
) -> Result<T, RequestError<E>>
where
    F: FnMut() -> Result<T, RequestError<E>>,
{
    let mut ctx = RetryContext {
        attempt: 0,
        max_retries,
    };

    loop {
        let err = match op() {
            Ok(value) => return Ok(value),
            Err(RequestError::Dbx(err)) => err,
            Err(route) => return Err(route),
        };

        let Some(backoff) = err.retry_backoff() else {
            return Err(err.into());
        };
        if ctx.exhausted() {
            tracing::debug!(attempts = ctx.attempt + 1, error = %err, "retries exhausted");
            return Err(err.into());
        }

        tracing::warn!(
            attempt = ctx.attempt + 1,
            max_retries = ctx.max_retries,
            backoff_secs = backoff.as_secs(),
            error = %err,
            "retrying request"
        );
        if !backoff.is_zero() && cancel.wait_timeout(backoff) {
            tracing::warn!("backoff wait interrupted by cancellation");
        }

        ctx.attempt += 1;
    }
}
