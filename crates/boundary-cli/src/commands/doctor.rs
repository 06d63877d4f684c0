//! Diagnostic commands.

use boundary_core::config::Config;
use boundary_core::paths;
use boundary_secrets::master_key::master_key_path;
use boundary_secrets::{FileSecretStore, KeySource, SecretStore};
use chrono::Utc;
use clap::Args;
use console::{style, Emoji};

static CHECK: Emoji = Emoji("✓", "+");
static CROSS: Emoji = Emoji("✗", "x");
static WARN: Emoji = Emoji("⚠", "!");

/// Doctor command arguments.
#[derive(Args)]
pub struct DoctorArgs {
    /// Also decrypt every secret to verify integrity
    #[arg(long)]
    pub full: bool,
}

/// Run the doctor command.
pub async fn run(args: DoctorArgs, config: &Config) -> anyhow::Result<()> {
    println!("Boundary Doctor\n");

    let mut errors = 0;
    let mut warnings = 0;

    // Check config
    println!("Checking configuration...");

    match config.validate() {
        Ok(_) => println!("  {} Configuration valid", style(CHECK).green()),
        Err(e) => {
            println!("  {} Configuration invalid: {}", style(CROSS).red(), e);
            errors += 1;
        }
    }
    let environment = config.active_environment();
    println!("  {} Active environment: {}", style(CHECK).green(), environment);

    // Check directories
    println!("\nChecking secrets directory...");

    let dir = &config.secrets.dir;
    if !dir.exists() {
        println!("  {} Secrets directory missing: {:?}", style(WARN).yellow(), dir);
        println!("    It is created on first use, e.g. 'boundary secrets bootstrap'");
        warnings += 1;
        return summary(errors, warnings);
    }
    println!("  {} Secrets directory exists: {:?}", style(CHECK).green(), dir);

    if paths::is_group_or_world_accessible(dir) {
        println!("  {} Secrets directory is group/world accessible", style(WARN).yellow());
        warnings += 1;
    }

    let key_file = master_key_path(dir);
    if key_file.exists() && paths::is_group_or_world_accessible(&key_file) {
        println!(
            "  {} Master key file is group/world accessible: {:?}",
            style(CROSS).red(),
            key_file
        );
        errors += 1;
    }

    // Check store
    println!("\nChecking secret store...");

    let store = match FileSecretStore::from_config(config).await {
        Ok(store) => store,
        Err(e) => {
            println!("  {} Secret store error: {}", style(CROSS).red(), e);
            errors += 1;
            return summary(errors, warnings);
        }
    };

    match store.key_source().await {
        KeySource::File(path) => {
            println!("  {} Master key loaded from {:?}", style(CHECK).green(), path)
        }
        KeySource::Environment => println!(
            "  {} Master key loaded from BOUNDARY_MASTER_KEY",
            style(CHECK).green()
        ),
        KeySource::Provided => println!("  {} Master key provided", style(CHECK).green()),
    }

    if store.has_pending_rotation().await {
        println!(
            "  {} A master key rotation was interrupted; re-run 'boundary secrets rotate --yes'",
            style(WARN).yellow()
        );
        warnings += 1;
    }

    let secrets = match store.list(None).await {
        Ok(secrets) => secrets,
        Err(e) => {
            println!("  {} Failed to list secrets: {}", style(CROSS).red(), e);
            errors += 1;
            return summary(errors, warnings);
        }
    };
    println!("  {} {} secret(s) in {}", style(CHECK).green(), secrets.len(), environment);

    let now = Utc::now();
    let window = config.secrets.expiry_warning_days;
    for meta in &secrets {
        if meta.is_expired(now) {
            println!("  {} '{}' has expired", style(WARN).yellow(), meta.name);
            warnings += 1;
        } else if meta.expires_within(window, now) {
            println!(
                "  {} '{}' expires within {} day(s)",
                style(WARN).yellow(),
                meta.name,
                window
            );
            warnings += 1;
        }
    }

    // Full checks: decrypt every live secret
    if args.full {
        println!("\nVerifying secret integrity...");
        for meta in secrets.iter().filter(|m| !m.is_expired(now)) {
            if store.validate(&meta.name, None).await {
                println!("  {} {}", style(CHECK).green(), meta.name);
            } else {
                println!("  {} {} failed to decrypt", style(CROSS).red(), meta.name);
                errors += 1;
            }
        }
    }

    summary(errors, warnings)
}

fn summary(errors: usize, warnings: usize) -> anyhow::Result<()> {
    println!("\n{}", style("Summary").bold());
    let errors_styled = if errors > 0 {
        style(errors).red()
    } else {
        style(errors).green()
    };
    let warnings_styled = if warnings > 0 {
        style(warnings).yellow()
    } else {
        style(warnings).green()
    };
    println!("  Errors: {}", errors_styled);
    println!("  Warnings: {}", warnings_styled);

    if errors > 0 {
        anyhow::bail!("{} error(s) found", errors);
    }

    Ok(())
}
