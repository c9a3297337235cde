//! Concurrent acquisition of declared dependencies into the vendor tree.
//!
//! The [`AcquisitionEngine`] spawns one worker per dependency. Workers are
//! admitted through a counting gate (a [`Semaphore`] with
//! [`MAX_CONCURRENT_FETCHES`] permits) and each retries its own fetch up to
//! [`FETCH_ATTEMPTS`] times with a fixed [`FETCH_RETRY_DELAY`] pause.
//!
//! # Retry holds the slot
//!
//! A worker keeps its permit for the whole retry sequence, so a failing
//! dependency occupies one slot for up to twenty seconds while the remaining
//! slots keep serving the other dependencies.
//!
//! # Failure aggregation
//!
//! One dependency failing never cancels its siblings. The engine joins every
//! worker and then returns a single [`VndrError::FetchFailed`] listing every
//! dependency that exhausted its attempts, in input order.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use vndr::git::GitFetcher;
//! use vndr::installer::AcquisitionEngine;
//! use vndr::manifest::DependencyEntry;
//! use vndr::resolver::KnownHostLookup;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let fetcher = GitFetcher::new(Arc::new(KnownHostLookup::new()?));
//! let engine = AcquisitionEngine::new(Arc::new(fetcher));
//! engine
//!     .fetch_all(Path::new("vendor"), &[DependencyEntry::new("github.com/pkg/errors", "v0.8.0")])
//!     .await?;
//! # Ok(())
//! # }
//! ```


use anyhow::Result;
use futures::future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio_retry::Retry;
use tokio_retry::strategy::FixedInterval;

use crate::constants::{FETCH_ATTEMPTS, FETCH_RETRY_DELAY, MAX_CONCURRENT_FETCHES};
use crate::core::VndrError;
use crate::manifest::DependencyEntry;
use crate::source::Fetcher;

/// How often and how patiently a single dependency is fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    pub attempts: usize,
    /// Pause after a failed attempt.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: FETCH_ATTEMPTS,
            delay: FETCH_RETRY_DELAY,
        }
    }
}

/// Fetches dependency lists under a global concurrency ceiling.
pub struct AcquisitionEngine {
    fetcher: Arc<dyn Fetcher>,
    max_concurrency: usize,
    retry: RetryPolicy,
}

impl AcquisitionEngine {
    /// Create an engine with the default ceiling (16) and retry policy (20 × 1 s).
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            max_concurrency: MAX_CONCURRENT_FETCHES,
            retry: RetryPolicy::default(),
        }
    }

    /// Override the number of simultaneous fetches.
    #[must_use]
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Override the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = RetryPolicy {
            attempts: retry.attempts.max(1),
            delay: retry.delay,
        };
        self
    }

    /// Fetch every entry into `dest_root`.
    ///
    /// All workers run to completion before this returns.
    ///
    /// # Errors
    ///
    /// [`VndrError::FetchFailed`] with one `<import path>: <cause>` message per
    /// dependency that exhausted its attempts.
    pub async fn fetch_all(&self, dest_root: &Path, entries: &[DependencyEntry]) -> Result<()> {
        let gate = Arc::new(Semaphore::new(self.max_concurrency));

        let handles: Vec<_> = entries
            .iter()
            .cloned()
            .map(|entry| {
                let gate = Arc::clone(&gate);
                let fetcher = Arc::clone(&self.fetcher);
                let dest_root = dest_root.to_path_buf();
                let retry = self.retry;
                let import_path = entry.import_path.clone();
                let handle = tokio::spawn(async move {
                    fetch_with_retry(gate, fetcher, entry, dest_root, retry).await
                });
                (import_path, handle)
            })
            .collect();

        let (paths, handles): (Vec<String>, Vec<_>) = handles.into_iter().unzip();
        let results = future::join_all(handles).await;

        let mut failures = Vec::with_capacity(results.len());
        for (import_path, joined) in paths.into_iter().zip(results) {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(message)) => failures.push(message),
                Err(join_err) => failures.push(format!("{import_path}: {join_err}")),
            }
        }

        if failures.is_empty() {
            return Ok(());
        }
        Err(VndrError::FetchFailed {
            failures,
        }
        .into())
    }
}

/// One worker: take a slot, retry the fetch, release the slot.
///
/// Returns the failure message on exhaustion.
async fn fetch_with_retry(
    gate: Arc<Semaphore>,
    fetcher: Arc<dyn Fetcher>,
    entry: DependencyEntry,
    dest_root: PathBuf,
    retry: RetryPolicy,
) -> Result<(), String> {
    let permit = gate
        .acquire_owned()
        .await
        .map_err(|e| format!("{}: admission gate closed: {e}", entry.import_path))?;

    let attempt = AtomicUsize::new(0);
    let strategy = FixedInterval::new(retry.delay).take(retry.attempts - 1);
    let total = retry.attempts;

    let outcome = Retry::spawn(strategy, || {
        let n = attempt.fetch_add(1, Ordering::SeqCst) + 1;
        let fetcher = &fetcher;
        let entry = &entry;
        let dest_root = dest_root.as_path();
        async move {
            match entry.repo_override() {
                Some(repo) => tracing::info!(
                    target: "vndr::fetch",
                    "\tClone {} to {}, revision {}, attempt {}/{}",
                    repo,
                    entry.import_path,
                    entry.revision,
                    n,
                    total
                ),
                None => tracing::info!(
                    target: "vndr::fetch",
                    "\tClone {}, revision {}, attempt {}/{}",
                    entry.import_path,
                    entry.revision,
                    n,
                    total
                ),
            }
            fetcher.fetch(entry, dest_root).await.map_err(|e| {
                tracing::info!(
                    target: "vndr::fetch",
                    "\tClone {}, attempt {}/{} finished with error {:#}",
                    entry.import_path,
                    n,
                    total,
                    e
                );
                e
            })
        }
    })
    .await;
    drop(permit);

    match outcome {
        Ok(fetched) => {
            tracing::info!(
                target: "vndr::fetch",
                "\tFinished clone {} ({})",
                entry.import_path,
                fetched.revision
            );
            Ok(())
        }
        Err(e) => Err(format!("{}: {:#}", entry.import_path, e)),
    }
}
