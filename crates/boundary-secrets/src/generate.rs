//! Random secret values and the standard production secret set.

use base64::Engine;
use boundary_core::SecretString;
use tracing::info;
use zeroize::Zeroizing;

use crate::error::Result;
use crate::store::SecretStore;
use crate::types::SecretOptions;

/// Text encoding for generated values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFormat {
    /// Lowercase hex, two characters per byte.
    Hex,
    /// Standard base64 with `+`, `/` and `=` removed, safe for URLs and
    /// shell environments.
    Base64,
}

/// Generate `bytes` random bytes rendered in `format`.
pub fn generate_value(bytes: usize, format: ValueFormat) -> SecretString {
    let mut raw = Zeroizing::new(vec![0u8; bytes]);
    rand::RngCore::fill_bytes(&mut rand::thread_rng(), raw.as_mut_slice());

    match format {
        ValueFormat::Hex => SecretString::new(hex::encode(raw.as_slice())),
        ValueFormat::Base64 => {
            let encoded = Zeroizing::new(
                base64::engine::general_purpose::STANDARD.encode(raw.as_slice()),
            );
            SecretString::new(
                encoded
                    .chars()
                    .filter(|c| !matches!(c, '+' | '/' | '='))
                    .collect::<String>(),
            )
        }
    }
}

/// One entry of the standard production set.
#[derive(Debug, Clone, Copy)]
pub struct StandardSecret {
    pub name: &'static str,
    pub bytes: usize,
    pub format: ValueFormat,
    pub prefix: &'static str,
    pub description: &'static str,
}

/// Secrets every backend deployment needs.
pub const STANDARD_SECRETS: &[StandardSecret] = &[
    StandardSecret {
        name: "jwt_secret",
        bytes: 64,
        format: ValueFormat::Hex,
        prefix: "",
        description: "JWT signing secret",
    },
    StandardSecret {
        name: "jwt_refresh_secret",
        bytes: 64,
        format: ValueFormat::Hex,
        prefix: "",
        description: "JWT refresh token signing secret",
    },
    StandardSecret {
        name: "session_secret",
        bytes: 64,
        format: ValueFormat::Hex,
        prefix: "",
        description: "Session cookie secret",
    },
    StandardSecret {
        name: "encryption_key",
        bytes: 32,
        format: ValueFormat::Hex,
        prefix: "",
        description: "Application encryption key",
    },
    StandardSecret {
        name: "database_encryption_key",
        bytes: 32,
        format: ValueFormat::Base64,
        prefix: "",
        description: "Database column encryption key",
    },
    StandardSecret {
        name: "redis_password",
        bytes: 24,
        format: ValueFormat::Base64,
        prefix: "",
        description: "Redis password",
    },
    StandardSecret {
        name: "mcp_api_key",
        bytes: 32,
        format: ValueFormat::Base64,
        prefix: "bk-",
        description: "MCP server API key",
    },
];

impl StandardSecret {
    /// Produce a fresh value for this entry.
    pub fn generate(&self) -> SecretString {
        let value = generate_value(self.bytes, self.format);
        if self.prefix.is_empty() {
            value
        } else {
            SecretString::new(format!("{}{}", self.prefix, value.expose_secret()))
        }
    }
}

/// Store every [`STANDARD_SECRETS`] entry missing from `environment`.
///
/// Existing secrets are left alone. Returns the names that were created.
pub async fn bootstrap(store: &dyn SecretStore, environment: &str) -> Result<Vec<String>> {
    let mut created = Vec::new();

    for standard in STANDARD_SECRETS {
        if store.exists(standard.name, Some(environment)).await? {
            continue;
        }
        let value = standard.generate();
        let options = SecretOptions::new()
            .environment(environment)
            .description(standard.description)
            .tags(["generated"]);
        store.store(standard.name, value.expose_secret(), options).await?;
        created.push(standard.name.to_string());
    }

    info!(environment, created = created.len(), "bootstrapped standard secrets");
    Ok(created)
}
