use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Root the dataset paths are resolved against: an `http(s)://` URL or a
    /// local directory.
    pub data_base: String,
    pub fetch_timeout_secs: u64,
    pub user_agent: String,
    pub fetch_max_retries: u32,
    pub fetch_retry_backoff_base_ms: u64,
    /// Upper bound on concurrent partition fetches during adjacent expansion.
    pub fetch_concurrency: usize,
    pub default_radius_meters: f64,
    pub default_max_count: usize,
    /// Coordinate tolerance for the registry duplicate check, in degrees.
    pub duplicate_tolerance_deg: f64,
    pub preload_enabled: bool,
}

impl AppConfig {
    /// Whether `data_base` names a remote origin rather than a directory.
    #[must_use]
    pub fn data_base_is_remote(&self) -> bool {
        self.data_base.starts_with("http://") || self.data_base.starts_with("https://")
    }
}
