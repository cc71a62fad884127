//! Configuration module for environment variable parsing.
//!
//! Everything except the webhook secret is read once at startup. The secret
//! is resolved per request through [`SecretSource`], so an operator can set
//! `ATS_WEBHOOK_SECRET` without touching the settings file.

use std::env;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::web::dedup::{DEFAULT_DEDUP_TTL, MAX_DEDUP_TTL};

/// Environment variable that overrides the configured webhook secret.
pub const SECRET_ENV_VAR: &str = "ATS_WEBHOOK_SECRET";

/// Settings-file key holding the webhook secret.
pub const SECRET_CONFIG_KEY: &str = "AtsWebhook:Secret";

const DEFAULT_SETTINGS_PATH: &str = "appsettings.json";

/// Default cap on a buffered webhook body.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// How long an admitted event id is remembered, in seconds
    pub dedup_ttl_seconds: u64,

    /// Largest request body the receiver will buffer
    pub max_body_bytes: usize,

    /// Secret from the settings file (`AtsWebhook:Secret`), if any
    pub configured_secret: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let settings_path = env::var("RECEIVER_SETTINGS_PATH")
            .unwrap_or_else(|_| DEFAULT_SETTINGS_PATH.to_string());

        Config {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),

            dedup_ttl_seconds: parse_dedup_ttl("DEDUP_TTL_SECONDS"),

            max_body_bytes: env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_BODY_BYTES),

            configured_secret: load_configured_secret(Path::new(&settings_path)),
        }
    }
}

/// Parse a dedup TTL in seconds, rejecting zero and values above the cap.
fn parse_dedup_ttl(name: &str) -> u64 {
    let default = DEFAULT_DEDUP_TTL.as_secs();
    let raw = match env::var(name) {
        Ok(v) => v,
        Err(_) => return default,
    };

    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 && secs <= MAX_DEDUP_TTL.as_secs() => secs,
        _ => {
            warn!(env_var = name, value = %raw, "Invalid dedup TTL, using default");
            default
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    #[serde(rename = "AtsWebhook", default)]
    ats_webhook: AtsWebhookSection,
}

#[derive(Debug, Default, Deserialize)]
struct AtsWebhookSection {
    #[serde(rename = "Secret", default)]
    secret: Option<String>,
}

/// Read `AtsWebhook:Secret` from a JSON settings file.
///
/// A missing file is normal and silent. A file that exists but cannot be
/// read or parsed is logged and treated as having no secret.
fn load_configured_secret(path: &Path) -> Option<String> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "settings_file_unreadable");
            return None;
        }
    };

    match serde_json::from_str::<SettingsFile>(&raw) {
        Ok(settings) => settings.ats_webhook.secret,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "settings_file_invalid");
            None
        }
    }
}

/// Resolution chain for the shared webhook secret.
///
/// The environment variable wins when set and non-blank; otherwise the
/// configured value is used. Blank values count as absent.
#[derive(Debug, Clone)]
pub struct SecretSource {
    env_var: Option<&'static str>,
    configured: Option<String>,
}

impl SecretSource {
    /// Environment override first, then the configured value.
    pub fn from_config(config: &Config) -> Self {
        Self {
            env_var: Some(SECRET_ENV_VAR),
            configured: config.configured_secret.clone(),
        }
    }

    /// A fixed secret with no environment lookup.
    pub fn fixed(secret: impl Into<String>) -> Self {
        Self {
            env_var: None,
            configured: Some(secret.into()),
        }
    }

    /// A source that never resolves; every request fails closed.
    pub fn unconfigured() -> Self {
        Self {
            env_var: None,
            configured: None,
        }
    }

    /// Resolve the secret for one request.
    pub fn resolve(&self) -> Option<String> {
        let from_env = self.env_var.and_then(|name| env::var(name).ok());

        from_env
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.configured.clone())
            .filter(|s| !s.trim().is_empty())
    }
}
