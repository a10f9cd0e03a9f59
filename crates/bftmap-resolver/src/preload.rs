//! Background prefetch of neighboring partitions.
//!
//! Preloads are spawned onto the ambient tokio runtime and never awaited by
//! the resolution that triggered them. A pending set keyed by area name
//! keeps at most one preload per area in flight; the key is released when
//! the task finishes or is cancelled. All tasks share one
//! [`CancellationToken`], cancelled on [`Preloader::shutdown`] or drop.

use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default)]
pub struct Preloader {
    token: CancellationToken,
    pending: Arc<Mutex<HashSet<String>>>,
}

impl Preloader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns `work` under `key` unless a preload for `key` is already
    /// pending, the preloader is shut down, or no runtime is available.
    ///
    /// Returns whether a task was spawned.
    pub fn schedule<W>(&self, key: impl Into<String>, work: W) -> bool
    where
        W: Future<Output = ()> + Send + 'static,
    {
        let key = key.into();
        if self.token.is_cancelled() {
            return false;
        }
        let Ok(handle) = Handle::try_current() else {
            tracing::debug!(area = %key, "no async runtime; skipping preload");
            return false;
        };
        if !lock(&self.pending).insert(key.clone()) {
            tracing::debug!(area = %key, "preload already pending");
            return false;
        }

        let token = self.token.clone();
        let pending = Arc::clone(&self.pending);
        handle.spawn(async move {
            tokio::select! {
                () = token.cancelled() => {
                    tracing::debug!(area = %key, "preload cancelled");
                }
                () = work => {
                    tracing::debug!(area = %key, "preload finished");
                }
            }
            lock(&pending).remove(&key);
        });
        true
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }

    #[must_use]
    pub fn is_pending(&self, key: &str) -> bool {
        lock(&self.pending).contains(key)
    }

    /// Cancels every running preload and refuses new ones.
    pub fn shutdown(&self) {
        if !self.token.is_cancelled() {
            tracing::info!(pending = self.pending_count(), "cancelling preloads");
            self.token.cancel();
        }
    }
}

impl Drop for Preloader {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

fn lock(pending: &Mutex<HashSet<String>>) -> MutexGuard<'_, HashSet<String>> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}
