//! Boundary CLI entry point.

use boundary_cli::{logging, run, Cli};
use boundary_core::Config;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up BOUNDARY_* settings from a local .env before anything reads them
    boundary_core::env::load_dotenv()?;

    // Parse CLI arguments
    let cli = Cli::parse();

    let config = Config::resolve(cli.config.as_deref())?;

    // Initialize logging
    logging::init(cli.verbose, &config.logging);

    // Run the command
    run(cli, config).await
}
