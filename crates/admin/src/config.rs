//! Back-office configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `KIOSK_API_BASE_URL` - Backend REST API base URL (default: `http://localhost:8000`)
//! - `KIOSK_HTTP_TIMEOUT_SECS` - Per-request timeout; unset means transport defaults
//! - `KIOSK_ADMIN_TOKEN` - Pre-issued admin bearer token (skips `admin login`)

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Back-office client configuration.
///
/// Implements `Debug` manually to redact the admin token.
#[derive(Clone)]
pub struct AdminConfig {
    /// Backend REST API base URL
    pub api_base_url: String,
    /// Request timeout (`None` = no client-side timeout)
    pub http_timeout: Option<Duration>,
    /// Bearer token issued by a previous admin login
    pub admin_token: Option<SecretString>,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("api_base_url", &self.api_base_url)
            .field("http_timeout", &self.http_timeout)
            .field(
                "admin_token",
                &self.admin_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            http_timeout: None,
            admin_token: None,
        }
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = get_env_or_default("KIOSK_API_BASE_URL", DEFAULT_API_BASE_URL);
        validate_base_url("KIOSK_API_BASE_URL", &api_base_url)?;

        let http_timeout = get_optional_env("KIOSK_HTTP_TIMEOUT_SECS")
            .map(|raw| parse_timeout("KIOSK_HTTP_TIMEOUT_SECS", &raw))
            .transpose()?;

        let admin_token = get_optional_env("KIOSK_ADMIN_TOKEN")
            .map(|raw| -> Result<SecretString, ConfigError> {
                validate_secret_strength(&raw, "KIOSK_ADMIN_TOKEN")?;
                Ok(SecretString::from(raw))
            })
            .transpose()?;

        Ok(Self {
            api_base_url,
            http_timeout,
            admin_token,
        })
    }

    /// Whether a pre-issued token is configured.
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.admin_token
            .as_ref()
            .is_some_and(|t| !t.expose_secret().is_empty())
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

fn validate_base_url(key: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if matches!(url.scheme(), "http" | "https") {
        Ok(())
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ))
    }
}

fn parse_timeout(key: &str, raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be greater than zero".to_string(),
        )),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
    }
}

/// Reject tokens that are obviously copied from a template.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    Ok(())
}
