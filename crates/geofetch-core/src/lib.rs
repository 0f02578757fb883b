//! Shared domain types, state-mutation intents, collaborator ports, and
//! environment configuration for geofetch.

pub mod app_config;
pub mod config;
pub mod intent;
pub mod ports;
pub mod types;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use intent::StateIntent;
pub use ports::{
    DeviceGeolocation, IntentSink, IpGeolocation, IssueService, SourceError, StateReader,
};
pub use types::{
    CachedRemoteState, CallCount, Coordinates, IpInfo, Issue, IssuesResponse, LocationFetchType,
    LocationUiState,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
