//! Local State Config

use std::path::PathBuf;

use clap::Args;

/// Where cart and checkout state is kept between runs.
#[derive(Debug, Args)]
pub struct StorageConfig {
    /// Directory holding one JSON file per state key
    #[arg(long, env = "SKYWALKER_STATE_DIR", default_value = ".skywalker")]
    pub state_dir: PathBuf,
}
