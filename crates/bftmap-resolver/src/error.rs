use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("dataset not found: {path}")]
    NotFound { path: String },

    #[error("unexpected HTTP status {status} for {path}")]
    UnexpectedStatus { status: u16, path: String },

    #[error("invalid data base URL \"{base}\": {reason}")]
    InvalidBaseUrl { base: String, reason: String },

    /// Neither lightweight index file could be loaded; the tiered path
    /// cannot start.
    #[error("lightweight index unavailable: {reason}")]
    IndexUnavailable { reason: String },

    /// Every integrated source failed to load.
    #[error("all data sources exhausted ({attempted} attempted): {reason}")]
    AllSourcesExhausted { attempted: usize, reason: String },
}

impl ResolverError {
    /// Whether this error came from the tiered path failing to fetch, as
    /// opposed to a terminal condition.
    #[must_use]
    pub fn is_fetch_failure(&self) -> bool {
        !matches!(self, ResolverError::AllSourcesExhausted { .. })
    }

    /// Timeouts, connection failures and 5xx: worth another attempt.
    /// A 404 is an answer, not a glitch.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            ResolverError::Http(e) => {
                e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            }
            ResolverError::UnexpectedStatus { status, .. } => *status >= 500,
            ResolverError::Io { .. }
            | ResolverError::NotFound { .. }
            | ResolverError::InvalidBaseUrl { .. }
            | ResolverError::IndexUnavailable { .. }
            | ResolverError::AllSourcesExhausted { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(status: u16) -> ResolverError {
        ResolverError::UnexpectedStatus {
            status,
            path: "data/x.csv".to_owned(),
        }
    }

    #[test]
    fn only_server_errors_are_transient() {
        assert!(status(503).is_transient());
        assert!(!status(403).is_transient());
        assert!(!ResolverError::NotFound {
            path: "data/x.csv".to_owned()
        }
        .is_transient());
    }
}
