use std::time::Duration;

use reqwest::{Client, StatusCode, Url};

use crate::error::ResolverError;
use crate::retry::RetryPolicy;

use super::DatasetFetcher;

/// Fetches dataset files from an HTTP(S) origin.
///
/// 404 maps to [`ResolverError::NotFound`] and is never retried; 5xx and
/// network failures are retried with exponential back-off up to
/// `max_retries` additional attempts.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    base: Url,
    retry: RetryPolicy,
}

impl HttpFetcher {
    /// Creates a fetcher rooted at `base`.
    ///
    /// # Errors
    ///
    /// - [`ResolverError::InvalidBaseUrl`] if `base` is not an absolute
    ///   `http(s)` URL.
    /// - [`ResolverError::Http`] if the underlying `reqwest::Client` cannot be
    ///   constructed.
    pub fn new(
        base: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, ResolverError> {
        let base = normalize_base(base)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base,
            retry: RetryPolicy::new(max_retries, backoff_base_ms),
        })
    }

    #[must_use]
    pub fn base(&self) -> &Url {
        &self.base
    }

    fn url_for(&self, path: &str) -> Result<Url, ResolverError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| ResolverError::InvalidBaseUrl {
                base: self.base.to_string(),
                reason: format!("cannot join {path}: {e}"),
            })
    }

    async fn fetch_once(&self, url: Url, path: &str) -> Result<String, ResolverError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "text/csv,text/plain;q=0.9,*/*;q=0.8")
            .send()
            .await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(ResolverError::NotFound {
                path: path.to_owned(),
            });
        }
        if !status.is_success() {
            return Err(ResolverError::UnexpectedStatus {
                status: status.as_u16(),
                path: path.to_owned(),
            });
        }

        Ok(response.text().await?)
    }
}

impl DatasetFetcher for HttpFetcher {
    async fn fetch_text(&self, path: &str) -> Result<String, ResolverError> {
        let url = self.url_for(path)?;
        self.retry
            .run(|| self.fetch_once(url.clone(), path))
            .await
    }
}

/// Parses `base` and guarantees a trailing slash so relative joins append
/// rather than replace the last segment.
fn normalize_base(base: &str) -> Result<Url, ResolverError> {
    let invalid = |reason: String| ResolverError::InvalidBaseUrl {
        base: base.to_owned(),
        reason,
    };

    let mut url = Url::parse(base).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
