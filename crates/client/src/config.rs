//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `SHOPSPHERE_API_URL` - Backend base URL (default: `http://localhost:8080/api`)
//! - `SHOPSPHERE_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `SHOPSPHERE_INVALID_TOKEN_POLICY` - `retain` or `clear` (default: `retain`)
//! - `SHOPSPHERE_SYNC_SETTLE_MS` - Wait before the first list fetch (default: 500)
//! - `SHOPSPHERE_SYNC_INITIAL_DELAY_MS` - First retry delay (default: 500)
//! - `SHOPSPHERE_SYNC_BACKOFF_FACTOR` - Delay multiplier per retry (default: 1.5)
//! - `SHOPSPHERE_SYNC_MAX_RETRIES` - Retries per sync cycle (default: 5)
//! - `SHOPSPHERE_RESTORE_RETRY_DELAYS_MS` - Startup restore retries (default: `1000,2000`)
//! - `SHOPSPHERE_PAYMENT_DELAY_MS` - Simulated payment processing time (default: 2000)

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::session::InvalidTokenPolicy;
use crate::sync::SyncPolicy;

/// Default backend location used by the development server.
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// ShopSphere client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every endpoint path is appended to.
    pub api_url: Url,
    /// Timeout applied to each HTTP request.
    pub request_timeout: Duration,
    /// What session recovery does when the backend says the token is bad.
    pub invalid_token_policy: InvalidTokenPolicy,
    /// Retry policy for order, cart and wishlist synchronization.
    pub sync: SyncPolicy,
    /// Delays between startup session restore attempts.
    pub restore_retry_delays: Vec<Duration>,
    /// Simulated payment processing time during checkout.
    pub payment_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            request_timeout: Duration::from_secs(30),
            invalid_token_policy: InvalidTokenPolicy::default(),
            sync: SyncPolicy::default(),
            restore_retry_delays: vec![Duration::from_secs(1), Duration::from_secs(2)],
            payment_delay: Duration::from_secs(2),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let defaults = Self::default();

        let api_url = match get_optional_env("SHOPSPHERE_API_URL") {
            Some(raw) => parse_api_url(&raw)?,
            None => defaults.api_url,
        };

        let request_timeout = Duration::from_secs(get_parsed_or(
            "SHOPSPHERE_REQUEST_TIMEOUT_SECS",
            defaults.request_timeout.as_secs(),
        )?);

        let invalid_token_policy = get_parsed_or(
            "SHOPSPHERE_INVALID_TOKEN_POLICY",
            defaults.invalid_token_policy,
        )?;

        let sync = SyncPolicy {
            settle_delay: get_millis_or("SHOPSPHERE_SYNC_SETTLE_MS", defaults.sync.settle_delay)?,
            initial_delay: get_millis_or(
                "SHOPSPHERE_SYNC_INITIAL_DELAY_MS",
                defaults.sync.initial_delay,
            )?,
            backoff_factor: get_parsed_or(
                "SHOPSPHERE_SYNC_BACKOFF_FACTOR",
                defaults.sync.backoff_factor,
            )?,
            max_retries: get_parsed_or("SHOPSPHERE_SYNC_MAX_RETRIES", defaults.sync.max_retries)?,
        };
        if !sync.backoff_factor.is_finite() || sync.backoff_factor < 1.0 {
            return Err(ConfigError::InvalidEnvVar(
                "SHOPSPHERE_SYNC_BACKOFF_FACTOR".to_string(),
                format!("must be a finite number >= 1.0 (got {})", sync.backoff_factor),
            ));
        }

        let restore_retry_delays = match get_optional_env("SHOPSPHERE_RESTORE_RETRY_DELAYS_MS") {
            Some(raw) => parse_millis_list("SHOPSPHERE_RESTORE_RETRY_DELAYS_MS", &raw)?,
            None => defaults.restore_retry_delays,
        };

        let payment_delay = get_millis_or("SHOPSPHERE_PAYMENT_DELAY_MS", defaults.payment_delay)?;

        Ok(Self {
            api_url,
            request_timeout,
            invalid_token_policy,
            sync,
            restore_retry_delays,
            payment_delay,
        })
    }

    /// Configuration pointing at `api_url` with all other defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `api_url` is not an absolute http(s) URL.
    pub fn for_api_url(api_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_api_url(api_url)?,
            ..Self::default()
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn default_api_url() -> Url {
    Url::parse(DEFAULT_API_URL).expect("DEFAULT_API_URL is a valid URL")
}

/// Parse and check a backend base URL.
fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar("SHOPSPHERE_API_URL".to_string(), reason);

    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().is_none() {
        return Err(invalid("URL must have a host".to_string()));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("URL must not have a query or fragment".to_string()));
    }
    Ok(url)
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse an environment variable, falling back to `default` when unset.
fn get_parsed_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Parse a millisecond duration, falling back to `default` when unset.
fn get_millis_or(key: &str, default: Duration) -> Result<Duration, ConfigError> {
    let default_ms = u64::try_from(default.as_millis()).unwrap_or(u64::MAX);
    get_parsed_or(key, default_ms).map(Duration::from_millis)
}

/// Parse a comma-separated list of millisecond durations.
fn parse_millis_list(key: &str, raw: &str) -> Result<Vec<Duration>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), format!("'{part}': {e}")))
        })
        .collect()
}
