//! Secret management commands.
//!
//! Provides `boundary secrets ...` subcommands, one per secret store
//! operation, on top of the `boundary-secrets` crate.

use std::path::PathBuf;

use anyhow::Context;
use boundary_core::Config;
use boundary_secrets::{
    bootstrap, generate_value, FileSecretStore, SecretError, SecretOptions, SecretStore,
    ValueFormat,
};
use chrono::{DateTime, Duration, Utc};
use clap::Args;
use tracing::debug;

use crate::render;

/// Secrets command arguments.
#[derive(Args)]
pub struct SecretsArgs {
    #[command(subcommand)]
    pub command: SecretsCommand,
}

/// Optional metadata shared by `set`, `update`, and `generate`.
#[derive(Args, Debug, Default)]
pub struct MetaArgs {
    /// Free-text description
    #[arg(long)]
    pub description: Option<String>,

    /// Label to attach (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Expire this many days from now
    #[arg(long, conflicts_with = "expires_at")]
    pub expires_in_days: Option<u32>,

    /// Expire at an RFC 3339 timestamp
    #[arg(long)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl MetaArgs {
    /// Convert to store options. Unset flags stay `None` so updates keep the
    /// record's current values.
    fn into_options(self) -> anyhow::Result<SecretOptions> {
        let expires_at = match (self.expires_at, self.expires_in_days) {
            (Some(at), _) => Some(at),
            (None, Some(days)) => Some(
                Utc::now()
                    .checked_add_signed(Duration::days(i64::from(days)))
                    .with_context(|| format!("--expires-in-days {days} is out of range"))?,
            ),
            (None, None) => None,
        };

        Ok(SecretOptions {
            description: self.description,
            tags: (!self.tags.is_empty()).then(|| self.tags.into_iter().collect()),
            expires_at,
            environment: None,
        })
    }
}

/// Encoding accepted by `generate`.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum FormatArg {
    Hex,
    Base64,
}

impl From<FormatArg> for ValueFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Hex => ValueFormat::Hex,
            FormatArg::Base64 => ValueFormat::Base64,
        }
    }
}

#[derive(clap::Subcommand)]
pub enum SecretsCommand {
    /// Create a new secret (prompts for value)
    Set {
        /// Secret name (alphanumeric, underscore, hyphen)
        name: String,

        /// Secret value (if omitted, prompts for hidden input)
        #[arg(long)]
        value: Option<String>,

        #[command(flatten)]
        meta: MetaArgs,
    },

    /// Retrieve and print a decrypted secret
    Get {
        /// Secret name
        name: String,
    },

    /// Replace a secret's value, bumping its version (creates if missing)
    Update {
        /// Secret name
        name: String,

        /// New value (if omitted, prompts for hidden input)
        #[arg(long)]
        value: Option<String>,

        #[command(flatten)]
        meta: MetaArgs,
    },

    /// Delete a secret
    Delete {
        /// Secret name
        name: String,
    },

    /// List secrets in the environment (metadata only)
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Generate a new master key and re-encrypt every secret under it
    Rotate {
        /// Confirm the rotation
        #[arg(long)]
        yes: bool,
    },

    /// Export metadata of every secret as JSON (never values)
    Export {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check that a secret exists, is unexpired, and decrypts cleanly
    Validate {
        /// Secret name
        name: String,
    },

    /// List secrets expiring within a number of days
    Expiring {
        /// Look-ahead window (defaults to the configured warning window)
        #[arg(long)]
        days: Option<u32>,
    },

    /// Store a freshly generated random value (replaces an existing one)
    Generate {
        /// Secret name
        name: String,

        /// Random bytes before encoding
        #[arg(long, default_value_t = 32)]
        bytes: usize,

        /// Output encoding
        #[arg(long, value_enum, default_value = "hex")]
        format: FormatArg,

        /// Also print the generated value
        #[arg(long)]
        print: bool,

        #[command(flatten)]
        meta: MetaArgs,
    },

    /// Create any missing standard production secrets
    Bootstrap,
}

/// Resolve a value from the flag or an interactive hidden prompt.
fn read_value(name: &str, value: Option<String>) -> anyhow::Result<String> {
    let secret_value = match value {
        Some(v) => v,
        None => {
            let prompt = format!("Enter value for '{name}': ");
            rpassword::prompt_password(prompt).context("Failed to read secret")?
        }
    };

    if secret_value.is_empty() {
        anyhow::bail!("Secret value must not be empty");
    }
    Ok(secret_value)
}

/// Run the secrets command.
pub async fn run(args: SecretsArgs, config: &Config) -> anyhow::Result<()> {
    config.validate().context("Invalid configuration")?;
    let store = FileSecretStore::from_config(config)
        .await
        .context("Failed to initialize secret store")?;
    let environment = store.default_environment().to_string();
    debug!(dir = %store.base_dir().display(), %environment, "opened secret store");

    match args.command {
        SecretsCommand::Set { name, value, meta } => {
            let secret_value = read_value(&name, value)?;
            let result = store.store(&name, &secret_value, meta.into_options()?).await;
            match result {
                Ok(meta) => println!(
                    "Secret '{}' stored ({}, version {}).",
                    meta.name, meta.environment, meta.version
                ),
                Err(SecretError::AlreadyExists(_)) => anyhow::bail!(
                    "Secret '{}' already exists in {}; use 'boundary secrets update' to change it",
                    name,
                    environment
                ),
                Err(e) => return Err(e.into()),
            }
        }

        SecretsCommand::Get { name } => match store.get(&name, None).await? {
            Some(secret) => println!("{}", secret.expose()),
            None => anyhow::bail!("Secret '{}' not found or expired in {}", name, environment),
        },

        SecretsCommand::Update { name, value, meta } => {
            let secret_value = read_value(&name, value)?;
            let meta = store
                .update(&name, &secret_value, meta.into_options()?)
                .await?;
            println!(
                "Secret '{}' updated ({}, version {}).",
                meta.name, meta.environment, meta.version
            );
        }

        SecretsCommand::Delete { name } => {
            store.delete(&name, None).await?;
            println!("Secret '{}' deleted.", name);
        }

        SecretsCommand::List { json } => {
            let secrets = store.list(None).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&secrets)?);
            } else {
                render::metadata_table(&environment, &secrets);
            }
        }

        SecretsCommand::Rotate { yes } => {
            if !yes {
                anyhow::bail!(
                    "Rotation re-encrypts every secret in {}; pass --yes to proceed",
                    store.base_dir().display()
                );
            }
            let report = store
                .rotate_master_key()
                .await
                .context("Master key rotation failed; the previous key is still valid")?;
            println!(
                "Master key rotated. Re-encrypted {} secret(s).",
                report.rotated
            );
        }

        SecretsCommand::Export { output } => {
            let report = store.export(None).await?;
            match output {
                Some(path) => {
                    std::fs::write(&path, report)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Exported metadata to {}.", path.display());
                }
                None => println!("{}", report),
            }
        }

        SecretsCommand::Validate { name } => {
            if store.validate(&name, None).await {
                println!("Secret '{}' is valid.", name);
            } else {
                anyhow::bail!("Secret '{}' is missing, expired, or corrupted", name);
            }
        }

        SecretsCommand::Expiring { days } => {
            let days = days.unwrap_or(config.secrets.expiry_warning_days);
            let secrets = store.expiring(days, None).await?;
            if secrets.is_empty() {
                println!("No secrets expire within {} day(s).", days);
            } else {
                render::metadata_table(&environment, &secrets);
            }
        }

        SecretsCommand::Generate {
            name,
            bytes,
            format,
            print,
            meta,
        } => {
            if bytes == 0 {
                anyhow::bail!("--bytes must be at least 1");
            }
            let value = generate_value(bytes, format.into());
            let meta = store
                .update(&name, value.expose_secret(), meta.into_options()?)
                .await?;
            println!(
                "Generated secret '{}' ({}, version {}).",
                meta.name, meta.environment, meta.version
            );
            if print {
                println!("{}", value.expose_secret());
            }
        }

        SecretsCommand::Bootstrap => {
            let created = bootstrap(&store, &environment).await?;
            if created.is_empty() {
                println!("All standard secrets already exist in {}.", environment);
            } else {
                for name in &created {
                    println!("  + {}", name);
                }
                println!("\n{} secret(s) created in {}.", created.len(), environment);
            }
        }
    }

    Ok(())
}
