//! Fleet compliance API client configuration.
//!
//! Defaults point at the production fleet portal backend. Override via
//! environment variables or explicit construction for staging and tests.

use url::Url;

/// Configuration for connecting to the fleet compliance API.
///
/// Custom `Debug` implementation redacts the `api_token` field
/// to prevent credential leakage in log output.
#[derive(Clone)]
pub struct FleetApiConfig {
    /// Base URL for the fleet compliance backend.
    /// Default: <https://fleet.api.meridian-marine.com>
    pub base_url: Url,
    /// Bearer token for API authentication.
    pub api_token: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Read-cache TTL in seconds.
    pub cache_ttl_secs: u64,
}

impl std::fmt::Debug for FleetApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FleetApiConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .finish()
    }
}

impl FleetApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `FLEET_API_URL` (default: `https://fleet.api.meridian-marine.com`)
    /// - `FLEET_API_TOKEN` (required)
    /// - `FLEET_TIMEOUT_SECS` (default: 30)
    /// - `FLEET_CACHE_TTL_SECS` (default: 300)
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_token = std::env::var("FLEET_API_TOKEN").map_err(|_| ConfigError::MissingToken)?;

        Ok(Self {
            base_url: env_url("FLEET_API_URL", "https://fleet.api.meridian-marine.com")?,
            api_token,
            timeout_secs: env_u64("FLEET_TIMEOUT_SECS", 30),
            cache_ttl_secs: env_u64("FLEET_CACHE_TTL_SECS", 300),
        })
    }

    /// Create a configuration pointing to a local mock server (for testing).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if the URL cannot be parsed
    /// (should not occur for a wiremock URI, but avoids `expect()`).
    pub fn local_mock(base_url: &str, token: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: Url::parse(base_url)
                .map_err(|e| ConfigError::InvalidUrl("local_mock".to_string(), e.to_string()))?,
            api_token: token.to_string(),
            timeout_secs: 5,
            cache_ttl_secs: 300,
        })
    }
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

fn env_u64(var: &str, default: u64) -> u64 {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("FLEET_API_TOKEN environment variable is required")]
    MissingToken,
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
}
