//! Tracing subscriber setup.

use boundary_core::config::{LogLevel, LoggingConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the default filter directive from the configured level and `-v` count.
///
/// Each `-v` raises the level by one step, capped at `trace`.
pub fn default_directive(verbose: u8, level: LogLevel) -> String {
    let levels = [
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Trace,
    ];
    let base = levels.iter().position(|l| *l == level).unwrap_or(2);
    let effective = levels[(base + verbose as usize).min(levels.len() - 1)];
    format!(
        "boundary={lvl},boundary_cli={lvl},boundary_secrets={lvl},boundary_core={lvl}",
        lvl = effective.as_str()
    )
}

/// Install the global subscriber. `RUST_LOG` wins over configuration.
pub fn init(verbose: u8, config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directive(verbose, config.level).into());

    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so command output on stdout stays machine-readable.
    let result = if config.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    if let Err(e) = result {
        eprintln!("logging already initialized: {e}");
    }
}
