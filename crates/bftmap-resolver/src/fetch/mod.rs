//! Dataset transports.
//!
//! Everything above this module talks to a [`DatasetFetcher`] and never sees
//! whether bytes came from an HTTP origin, a local checkout, or memory.

mod fs;
mod http;
mod memory;

use std::future::Future;

use bftmap_core::AppConfig;

use crate::error::ResolverError;

pub use fs::FsFetcher;
pub use http::HttpFetcher;
pub use memory::MemoryFetcher;

/// Fetches a dataset file by its path relative to the data base.
pub trait DatasetFetcher: Send + Sync + 'static {
    /// Returns the file body as text.
    ///
    /// # Errors
    ///
    /// [`ResolverError::NotFound`] for a missing file; transport-specific
    /// variants for everything else.
    fn fetch_text(&self, path: &str) -> impl Future<Output = Result<String, ResolverError>> + Send;
}

/// Runtime-selected transport.
#[derive(Debug)]
pub enum AnyFetcher {
    Http(HttpFetcher),
    Fs(FsFetcher),
    /// Only built for tests and the `test-util` feature.
    #[cfg(any(test, feature = "test-util"))]
    Memory(MemoryFetcher),
}

impl AnyFetcher {
    /// Picks HTTP for `http(s)://` bases and the filesystem otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError::InvalidBaseUrl`] or [`ResolverError::Http`]
    /// if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, ResolverError> {
        if config.data_base_is_remote() {
            let fetcher = HttpFetcher::new(
                &config.data_base,
                config.fetch_timeout_secs,
                &config.user_agent,
                config.fetch_max_retries,
                config.fetch_retry_backoff_base_ms,
            )?;
            Ok(AnyFetcher::Http(fetcher))
        } else {
            Ok(AnyFetcher::Fs(FsFetcher::new(&config.data_base)))
        }
    }

    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            AnyFetcher::Http(f) => format!("http {}", f.base()),
            AnyFetcher::Fs(f) => format!("fs {}", f.root().display()),
            #[cfg(any(test, feature = "test-util"))]
            AnyFetcher::Memory(_) => "memory".to_owned(),
        }
    }
}

impl DatasetFetcher for AnyFetcher {
    async fn fetch_text(&self, path: &str) -> Result<String, ResolverError> {
        match self {
            AnyFetcher::Http(f) => f.fetch_text(path).await,
            AnyFetcher::Fs(f) => f.fetch_text(path).await,
            #[cfg(any(test, feature = "test-util"))]
            AnyFetcher::Memory(f) => f.fetch_text(path).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use bftmap_core::Environment;

    use super::*;

    fn config(data_base: &str) -> AppConfig {
        AppConfig {
            env: Environment::Test,
            bind_addr: ([127, 0, 0, 1], 0).into(),
            log_level: "info".to_owned(),
            data_base: data_base.to_owned(),
            fetch_timeout_secs: 5,
            user_agent: "bftmap-test".to_owned(),
            fetch_max_retries: 0,
            fetch_retry_backoff_base_ms: 0,
            fetch_concurrency: 1,
            default_radius_meters: 1_000.0,
            default_max_count: 10,
            duplicate_tolerance_deg: 0.000_1,
            preload_enabled: false,
        }
    }

    #[test]
    fn config_selects_only_real_transports() {
        let remote = AnyFetcher::from_config(&config("https://example.org/bft")).unwrap();
        assert!(matches!(remote, AnyFetcher::Http(_)));
        assert!(remote.describe().starts_with("http "));

        let local = AnyFetcher::from_config(&config("./data-root")).unwrap();
        assert!(matches!(local, AnyFetcher::Fs(_)));
        assert!(local.describe().starts_with("fs "));
    }
}
