use std::time::Duration;

/// Extra grace period added on top of the geolocation timeout before the IP
/// fallback is started.
pub const FALLBACK_GRACE_MS: u64 = 1_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Environment {
    /// Log filter used when `GEOFETCH_LOG_LEVEL` is unset.
    #[must_use]
    pub fn default_log_level(&self) -> &'static str {
        match self {
            Environment::Development => "debug",
            Environment::Test => "warn",
            Environment::Production => "info",
        }
    }
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
    pub log_level: String,
    pub api_base_url: String,
    pub ipinfo_url: String,
    /// `GEOLOCATION_TIMEOUT`, in milliseconds.
    pub geolocation_timeout_ms: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl AppConfig {
    /// How long the device source is given before the IP lookup is started
    /// alongside it: `GEOLOCATION_TIMEOUT + 1000ms`.
    #[must_use]
    pub fn fallback_delay(&self) -> Duration {
        Duration::from_millis(
            self.geolocation_timeout_ms
                .saturating_add(FALLBACK_GRACE_MS),
        )
    }
}
