use thiserror::Error;

pub mod app_config;
pub mod config;
pub mod geo;
pub mod rank;
pub mod spots;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::{distance_km, format_distance, Coordinate, UNKNOWN_DISTANCE_LABEL};
pub use rank::{rank_spots, RankedSpot};
pub use spots::{load_spots, ParkingSpot, SpotsFile};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid coordinate ({latitude}, {longitude}): {reason}")]
    InvalidCoordinate {
        latitude: f64,
        longitude: f64,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read spots file {path}: {source}")]
    SpotsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse spots file: {0}")]
    SpotsFileParse(#[from] serde_yaml::Error),

    #[error("invalid env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("validation error: {0}")]
    Validation(String),
}
