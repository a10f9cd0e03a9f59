pub mod app_config;
pub mod config;
pub mod geo;
pub mod types;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::{distance_meters, ViewportBounds, EARTH_RADIUS_METERS};
pub use types::{AreaDescriptor, AreaKind, FacilityRecord, ResolvedFacility, SourceKind};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
