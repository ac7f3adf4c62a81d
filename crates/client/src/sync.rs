//! Eventually-consistent synchronization of server-owned lists.
//!
//! Right after a mutation (placing an order, adding to the cart) the backend
//! may still return the old or an empty list. A [`ListSynchronizer`] waits a
//! settle delay, fetches, and while the result is empty or the fetch fails
//! it retries with bounded exponential backoff. Once retries are exhausted an
//! empty list is accepted as authoritative and a failed fetch is downgraded
//! to an empty list.
//!
//! Retries run strictly one after another. A background cycle started with
//! [`ListSynchronizer::spawn`] can be cancelled through its [`SyncHandle`],
//! and dropping the handle cancels it too.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Backoff schedule for one synchronization cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncPolicy {
    /// Wait before the first fetch of a cycle.
    pub settle_delay: Duration,
    /// Wait before the first retry.
    pub initial_delay: Duration,
    /// Multiplier applied to the delay after each retry.
    pub backoff_factor: f64,
    /// Retries after the first fetch.
    pub max_retries: u32,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(500),
            initial_delay: Duration::from_millis(500),
            backoff_factor: 1.5,
            max_retries: 5,
        }
    }
}

impl SyncPolicy {
    /// Delay before retry number `retry` (zero-based).
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
        let scaled = self.initial_delay.as_secs_f64() * self.backoff_factor.powi(exponent);
        Duration::try_from_secs_f64(scaled).unwrap_or(Duration::MAX)
    }

    /// Most fetches a single cycle performs.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Result of one synchronization cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome<T> {
    /// The list to show. Empty when the backend had nothing or kept failing.
    pub items: Vec<T>,
    /// Fetches performed.
    pub attempts: u32,
    /// Whether the cycle gave up on retrying.
    pub exhausted: bool,
}

/// Fetches one remote collection with settle delay and bounded backoff.
#[derive(Debug, Clone)]
pub struct ListSynchronizer {
    name: &'static str,
    policy: SyncPolicy,
}

impl ListSynchronizer {
    /// A synchronizer for the collection called `name` (used in logs).
    #[must_use]
    pub const fn new(name: &'static str, policy: SyncPolicy) -> Self {
        Self { name, policy }
    }

    #[must_use]
    pub const fn policy(&self) -> &SyncPolicy {
        &self.policy
    }

    /// Run a full cycle: settle delay, then fetch with backoff.
    pub async fn sync<T, E, F, Fut>(&self, fetch: F) -> SyncOutcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Vec<T>, E>>,
        E: fmt::Display,
    {
        if !self.policy.settle_delay.is_zero() {
            debug!(collection = self.name, delay_ms = %self.policy.settle_delay.as_millis(), "Waiting for backend to settle");
            tokio::time::sleep(self.policy.settle_delay).await;
        }
        self.cycle(fetch).await
    }

    /// Run a fresh cycle immediately, with the retry counter reset.
    pub async fn refresh<T, E, F, Fut>(&self, fetch: F) -> SyncOutcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Vec<T>, E>>,
        E: fmt::Display,
    {
        self.cycle(fetch).await
    }

    /// Run [`sync`](Self::sync) on a background task.
    ///
    /// `on_complete` receives the outcome unless the cycle was cancelled
    /// first. Dropping the returned handle cancels the cycle.
    pub fn spawn<T, E, F, Fut, C>(&self, fetch: F, on_complete: C) -> SyncHandle<T>
    where
        T: Send + 'static,
        E: fmt::Display + Send + 'static,
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Vec<T>, E>> + Send + 'static,
        C: FnOnce(&SyncOutcome<T>) + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let this = self.clone();

        let task = tokio::spawn(async move {
            let outcome = tokio::select! {
                () = token.cancelled() => {
                    debug!(collection = this.name, "Sync cycle cancelled");
                    return None;
                }
                outcome = this.sync(fetch) => outcome,
            };
            if token.is_cancelled() {
                return None;
            }
            on_complete(&outcome);
            Some(outcome)
        });

        SyncHandle {
            cancel,
            task,
        }
    }

    async fn cycle<T, E, F, Fut>(&self, mut fetch: F) -> SyncOutcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Vec<T>, E>>,
        E: fmt::Display,
    {
        let mut retries = 0u32;

        loop {
            let attempt = retries + 1;
            let result = fetch().await;
            let can_retry = retries < self.policy.max_retries;

            match result {
                Ok(items) if !items.is_empty() => {
                    info!(collection = self.name, attempt, count = items.len(), "Synchronized");
                    return SyncOutcome {
                        items,
                        attempts: attempt,
                        exhausted: false,
                    };
                }
                Ok(_) if !can_retry => {
                    info!(collection = self.name, attempt, "Still empty after retries, accepting");
                    return SyncOutcome {
                        items: Vec::new(),
                        attempts: attempt,
                        exhausted: true,
                    };
                }
                Err(e) if !can_retry => {
                    warn!(collection = self.name, attempt, error = %e, "Fetch kept failing, showing empty list");
                    return SyncOutcome {
                        items: Vec::new(),
                        attempts: attempt,
                        exhausted: true,
                    };
                }
                Ok(_) => {
                    debug!(collection = self.name, attempt, "Empty result, retrying");
                }
                Err(e) => {
                    warn!(collection = self.name, attempt, error = %e, "Fetch failed, retrying");
                }
            }

            tokio::time::sleep(self.policy.delay_for(retries)).await;
            retries += 1;
        }
    }
}

/// A background synchronization cycle.
///
/// Cancelled when dropped. Use [`join`](Self::join) to wait for the outcome.
#[derive(Debug)]
pub struct SyncHandle<T> {
    cancel: CancellationToken,
    task: JoinHandle<Option<SyncOutcome<T>>>,
}

impl<T> SyncHandle<T> {
    /// Stop the cycle. Pending timers are dropped and no completion
    /// callback runs afterwards.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Wait for the cycle. Returns `None` if it was cancelled.
    ///
    /// Dropping the returned future cancels the cycle like dropping the
    /// handle does.
    pub async fn join(mut self) -> Option<SyncOutcome<T>> {
        (&mut self.task).await.ok().flatten()
    }
}

impl<T> Drop for SyncHandle<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
