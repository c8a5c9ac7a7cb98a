//! Backend API Config

use std::time::Duration;

use clap::Args;

/// Backend API settings.
#[derive(Debug, Args)]
pub struct ApiConfig {
    /// Base URL of the store backend
    #[arg(long, env = "SKYWALKER_API_URL", default_value = "http://localhost:8080")]
    pub api_url: String,

    /// Request timeout in seconds
    #[arg(long, env = "SKYWALKER_API_TIMEOUT_SECONDS", default_value_t = 10u64)]
    pub timeout_seconds: u64,
}

impl ApiConfig {
    /// Request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}
