use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::error::ResolverError;

use super::DatasetFetcher;

#[derive(Debug, Default)]
struct MemoryState {
    files: HashMap<String, String>,
    failing: HashSet<String>,
    fetches: HashMap<String, usize>,
}

/// In-memory dataset store that counts every fetch.
///
/// Used by tests and demos to observe cache behavior: a cache hit leaves the
/// per-path counter unchanged. Paths registered with [`fail_path`] answer
/// with a simulated 503; unknown paths answer with `NotFound`.
///
/// [`fail_path`]: MemoryFetcher::fail_path
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    state: Mutex<MemoryState>,
    latency: Option<Duration>,
}

impl MemoryFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with_file(self, path: impl Into<String>, body: impl Into<String>) -> Self {
        self.insert(path, body);
        self
    }

    /// Delays every fetch, so concurrent callers overlap in flight.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn insert(&self, path: impl Into<String>, body: impl Into<String>) {
        self.lock().files.insert(path.into(), body.into());
    }

    /// Makes every subsequent fetch of `path` fail with a transient error.
    pub fn fail_path(&self, path: impl Into<String>) {
        self.lock().failing.insert(path.into());
    }

    #[must_use]
    pub fn fetch_count(&self, path: &str) -> usize {
        self.lock().fetches.get(path).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total_fetches(&self) -> usize {
        self.lock().fetches.values().sum()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DatasetFetcher for MemoryFetcher {
    async fn fetch_text(&self, path: &str) -> Result<String, ResolverError> {
        {
            let mut state = self.lock();
            *state.fetches.entry(path.to_owned()).or_default() += 1;
        }
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let state = self.lock();
        if state.failing.contains(path) {
            return Err(ResolverError::UnexpectedStatus {
                status: 503,
                path: path.to_owned(),
            });
        }
        state
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| ResolverError::NotFound {
                path: path.to_owned(),
            })
    }
}
