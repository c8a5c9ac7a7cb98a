//! Panickin' Skywalker storefront CLI

use std::process;

use clap::Parser;
use skywalker_app::observability::init_subscriber;
use tracing::debug;

mod cli;

#[tokio::main]
#[expect(
    clippy::print_stdout,
    clippy::print_stderr,
    reason = "the CLI reports results and errors on the terminal"
)]
pub async fn main() {
    let _env = dotenvy::dotenv();

    let cli = cli::Cli::parse();

    if let Err(error) = init_subscriber(&cli.config.logging) {
        eprintln!("{error}");
        process::exit(1);
    }

    match cli.run().await {
        Ok(output) => println!("{output}"),
        Err(error) => {
            debug!(?error, "command failed");
            eprintln!("{}", error.notice());
            process::exit(1);
        }
    }
}
