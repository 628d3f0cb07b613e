mod cli;
mod config;
mod credentials;
mod error;
mod git;
mod logging;
mod output;
mod providers;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_to_stderr());

    info!("Starting gitlab-tui {}", env!("CARGO_PKG_VERSION"));
    cli.execute().await?;

    Ok(())
}
