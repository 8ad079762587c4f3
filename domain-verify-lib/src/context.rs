//! Shared deadline and cancellation for a verification run.
//!
//! A single `CheckContext` governs a whole bulk operation. Every suspension
//! point in the engine (DNS lookup, WHOIS permit wait, TCP dial, WHOIS read)
//! goes through [`CheckContext::run`], so cancelling the token or passing the
//! deadline unwinds all in-flight work promptly.

use crate::error::VerifyError;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Deadline plus cancellation token, cheap to clone and share across tasks.
#[derive(Debug, Clone, Default)]
pub struct CheckContext {
    deadline: Option<Instant>,
    token: CancellationToken,
}

impl CheckContext {
    /// A context with no deadline that is only done when cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context whose deadline is `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// A context with an absolute deadline.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            token: CancellationToken::new(),
        }
    }

    /// Derive a context that is cancelled with this one but can also be
    /// cancelled on its own. The deadline is the earlier of the two.
    pub fn child(&self, timeout: Option<Duration>) -> Self {
        let own = timeout.map(|t| Instant::now() + t);
        let deadline = match (self.deadline, own) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        Self {
            deadline,
            token: self.token.child_token(),
        }
    }

    /// Cancel this context and every child derived from it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline; `None` when there is no deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// True once cancelled or past the deadline.
    pub fn is_done(&self) -> bool {
        self.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Return the cancellation-kind error if the context is already done.
    pub fn check(&self) -> Result<(), VerifyError> {
        if self.is_cancelled() {
            return Err(VerifyError::Cancelled);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(VerifyError::deadline("check context"));
        }
        Ok(())
    }

    /// Resolves when the context is cancelled or its deadline elapses.
    pub async fn done(&self) -> VerifyError {
        match self.deadline {
            Some(deadline) => tokio::select! {
                _ = self.token.cancelled() => VerifyError::Cancelled,
                _ = tokio::time::sleep_until(deadline) => VerifyError::deadline("check context"),
            },
            None => {
                self.token.cancelled().await;
                VerifyError::Cancelled
            }
        }
    }

    /// Drive `fut` to completion unless the context finishes first.
    ///
    /// Cancellation is checked before polling, so an already-cancelled
    /// context never starts the operation.
    pub async fn run<F, T>(&self, operation: &str, fut: F) -> Result<T, VerifyError>
    where
        F: Future<Output = T>,
    {
        if self.is_cancelled() {
            return Err(VerifyError::Cancelled);
        }
        tokio::select! {
            biased;
            err = self.done() => Err(match err {
                VerifyError::DeadlineExceeded { .. } => VerifyError::deadline(operation),
                other => other,
            }),
            value = fut => Ok(value),
        }
    }
}
