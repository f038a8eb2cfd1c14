//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `KIOSK_API_BASE_URL` - Backend REST API base URL (default: `http://localhost:8000`)
//! - `KIOSK_HTTP_TIMEOUT_SECS` - Per-request timeout; unset means transport defaults
//! - `KIOSK_STATE_DIR` - Directory holding persisted client state (default: `.kiosk`)
//! - `KIOSK_TAB` - Name of the tab whose session id is used (default: `default`)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default backend address (local development host).
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Backend REST API base URL
    pub api_base_url: String,
    /// Request timeout (`None` = no client-side timeout)
    pub http_timeout: Option<Duration>,
    /// Directory for durable and tab-scoped state files
    pub state_dir: PathBuf,
    /// Tab name scoping the anonymous session id
    pub tab: String,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            http_timeout: None,
            state_dir: PathBuf::from(".kiosk"),
            tab: "default".to_string(),
        }
    }
}

impl StorefrontConfig {
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

        let state_dir = PathBuf::from(get_env_or_default("KIOSK_STATE_DIR", ".kiosk"));

        let tab = get_env_or_default("KIOSK_TAB", "default");
        validate_tab_name("KIOSK_TAB", &tab)?;

        Ok(Self {
            api_base_url,
            http_timeout,
            state_dir,
            tab,
        })
    }

    /// File holding durable state (bearer token, cached customer).
    #[must_use]
    pub fn durable_store_path(&self) -> PathBuf {
        self.state_dir.join("durable.json")
    }

    /// File holding this tab's transient state (anonymous session id).
    #[must_use]
    pub fn tab_store_path(&self) -> PathBuf {
        self.state_dir.join(format!("tab-{}.json", self.tab))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating blank values as unset.
#[must_use]
pub fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
#[must_use]
pub fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Check that a base URL is absolute http(s).
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` naming `key` when the URL is unusable.
pub fn validate_base_url(key: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(())
}

/// Parse a positive number of seconds.
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

/// Tab names become part of a file name.
fn validate_tab_name(key: &str, tab: &str) -> Result<(), ConfigError> {
    if tab
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        Ok(())
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "only letters, digits, '-' and '_' are allowed".to_string(),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_base_url() {
        assert!(validate_base_url("K", "http://localhost:8000").is_ok());
        assert!(validate_base_url("K", "https://api.example.com/v1").is_ok());
        assert!(matches!(
            validate_base_url("K", "ftp://example.com"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(validate_base_url("K", "localhost:8000/api").is_err());
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout("T", "15").unwrap(), Duration::from_secs(15));
        assert!(parse_timeout("T", "0").is_err());
        assert!(parse_timeout("T", "soon").is_err());
    }

    #[test]
    fn test_validate_tab_name() {
        assert!(validate_tab_name("T", "checkout-2").is_ok());
        assert!(validate_tab_name("T", "../etc").is_err());
    }

    #[test]
    fn test_store_paths() {
        let config = StorefrontConfig {
            state_dir: PathBuf::from("/tmp/kiosk"),
            tab: "window_1".to_string(),
            ..StorefrontConfig::default()
        };
        assert_eq!(
            config.durable_store_path(),
            PathBuf::from("/tmp/kiosk/durable.json")
        );
        assert_eq!(
            config.tab_store_path(),
            PathBuf::from("/tmp/kiosk/tab-window_1.json")
        );
    }

    #[test]
    fn test_default_points_at_local_backend() {
        let config = StorefrontConfig::default();
        assert_eq!(config.api_base_url, "http://localhost:8000");
        assert!(config.http_timeout.is_none());
    }
}
