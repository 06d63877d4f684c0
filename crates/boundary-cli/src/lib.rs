//! Boundary command-line interface.

pub mod commands;
pub mod logging;
pub mod render;

use boundary_core::Config;
use clap::{Parser, Subcommand};

/// Boundary - encrypted secret store
#[derive(Parser)]
#[command(name = "boundary")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file
    #[arg(short, long, env = "BOUNDARY_CONFIG", global = true)]
    pub config: Option<std::path::PathBuf>,

    /// Secrets directory (overrides config)
    #[arg(long, global = true)]
    pub dir: Option<std::path::PathBuf>,

    /// Deployment environment (overrides config and BOUNDARY_ENV)
    #[arg(short, long = "env", global = true)]
    pub environment: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Manage encrypted secrets
    Secrets(commands::secrets::SecretsArgs),

    /// Run diagnostics on the secret store
    Doctor(commands::doctor::DoctorArgs),

    /// Configuration management
    Config(commands::config::ConfigArgs),

    /// Show version information
    Version,
}

/// Run the CLI with the given arguments on top of the resolved configuration.
pub async fn run(cli: Cli, mut config: Config) -> anyhow::Result<()> {
    if let Some(dir) = cli.dir {
        config.secrets.dir = dir;
    }
    if let Some(environment) = cli.environment {
        config.secrets.environment = Some(environment);
    }

    match cli.command {
        Commands::Secrets(args) => commands::secrets::run(args, &config).await,
        Commands::Doctor(args) => commands::doctor::run(args, &config).await,
        Commands::Config(args) => commands::config::run(args, &config, cli.config.as_deref()),
        Commands::Version => {
            println!("boundary {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
