//! CLI configuration.
//!
//! # Environment Variables
//!
//! Everything read by [`ClientConfig::from_env`], plus:
//! - `SHOPSPHERE_CREDENTIALS_PATH` - Credential file (default: `$HOME/.shopsphere/credentials.json`)
//! - `SENTRY_DSN` - Sentry error tracking DSN (optional)
//! - `SENTRY_ENVIRONMENT` - Sentry environment name (optional)

use std::path::PathBuf;

use shopsphere_client::{ClientConfig, ConfigError};

const CREDENTIALS_DIR: &str = ".shopsphere";
const CREDENTIALS_FILE: &str = "credentials.json";

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub client: ClientConfig,
    pub credentials_path: PathBuf,
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
}

impl CliConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed, or if
    /// no credential path is set and `HOME` is unknown.
    pub fn from_env() -> Result<Self, ConfigError> {
        let client = ClientConfig::from_env()?;

        let credentials_path = match get_optional_env("SHOPSPHERE_CREDENTIALS_PATH") {
            Some(path) => PathBuf::from(path),
            None => get_optional_env("HOME")
                .map(|home| PathBuf::from(home).join(CREDENTIALS_DIR).join(CREDENTIALS_FILE))
                .ok_or_else(|| ConfigError::MissingEnvVar("SHOPSPHERE_CREDENTIALS_PATH".to_string()))?,
        };

        Ok(Self {
            client,
            credentials_path,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }
}

fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
