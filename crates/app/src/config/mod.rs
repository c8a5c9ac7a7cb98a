//! Application configuration
//!
//! Every setting can come from a flag, an environment variable or a `.env`
//! file, in that order of precedence.

use clap::Args;

use crate::config::{
    api::ApiConfig, observability::LoggingConfig, storage::StorageConfig, store::StoreConfig,
};

pub mod api;
pub mod observability;
pub mod storage;
pub mod store;

/// Storefront settings shared by every command.
#[derive(Debug, Args)]
pub struct AppConfig {
    /// Backend API settings.
    #[command(flatten)]
    pub api: ApiConfig,

    /// Local state settings.
    #[command(flatten)]
    pub storage: StorageConfig,

    /// Store data and cart policy.
    #[command(flatten)]
    pub store: StoreConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}
