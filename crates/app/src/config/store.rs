//! Store Config

use std::path::PathBuf;

use clap::Args;

/// Store data and cart policy.
#[derive(Debug, Args)]
pub struct StoreConfig {
    /// Store fixture holding discount codes and tax rates
    #[arg(long = "store", env = "SKYWALKER_STORE", default_value = "merch")]
    pub name: String,

    /// Directory to load the store fixture from instead of the bundled one
    #[arg(long, env = "SKYWALKER_FIXTURES_DIR")]
    pub fixtures_dir: Option<PathBuf>,

    /// Most units of one variant a cart line may hold
    #[arg(
        long,
        env = "SKYWALKER_MAX_PER_LINE",
        default_value_t = 10u32,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub max_per_line: u32,
}
