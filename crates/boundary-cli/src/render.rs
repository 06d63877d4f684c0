//! Terminal rendering utilities.
//!
//! Formats secret metadata for human consumption. Values are never rendered.

use boundary_secrets::SecretMetadata;
use chrono::{DateTime, Utc};
use console::style;

/// Format an optional expiry relative to `now`.
pub fn format_expiry(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    match expires_at {
        None => "never".to_string(),
        Some(at) if at <= now => format!("expired {}", at.format("%Y-%m-%d")),
        Some(at) => {
            let days = (at - now).num_days();
            format!("{} ({}d)", at.format("%Y-%m-%d"), days)
        }
    }
}

/// Join tags for display.
pub fn format_tags(meta: &SecretMetadata) -> String {
    if meta.tags.is_empty() {
        "-".to_string()
    } else {
        meta.tags.iter().cloned().collect::<Vec<_>>().join(",")
    }
}

/// Print a metadata table for one environment.
pub fn metadata_table(environment: &str, secrets: &[SecretMetadata]) {
    if secrets.is_empty() {
        println!("No secrets in {}.", environment);
        return;
    }

    let now = Utc::now();
    let name_width = secrets
        .iter()
        .map(|m| m.name.len())
        .max()
        .unwrap_or(0)
        .max("NAME".len());

    println!(
        "{}",
        style(format!(
            "{:<name_width$}  {:>7}  {:<20}  {:<20}  {}",
            "NAME", "VERSION", "UPDATED", "EXPIRES", "TAGS"
        ))
        .bold()
    );

    for meta in secrets {
        let expiry = format_expiry(meta.expires_at, now);
        let expiry = if meta.is_expired(now) {
            style(format!("{:<20}", expiry)).red()
        } else if meta.expires_at.is_some() {
            style(format!("{:<20}", expiry)).yellow()
        } else {
            style(format!("{:<20}", expiry)).dim()
        };

        println!(
            "{:<name_width$}  {:>7}  {:<20}  {}  {}",
            style(&meta.name).cyan(),
            meta.version,
            meta.updated_at.format("%Y-%m-%d %H:%M:%S"),
            expiry,
            style(format_tags(meta)).dim(),
        );
    }

    println!("\n{} secret(s) in {}.", secrets.len(), environment);
}
