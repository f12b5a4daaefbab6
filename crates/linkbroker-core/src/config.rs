//! Environment-sourced broker configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Provider account credentials used by the interactive login.
///
/// Absence is tolerated at startup; a login attempt without credentials
/// fails with a login error rather than crashing the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderCredentials {
    pub username: String,
    pub password: String,
}

/// Immutable broker configuration, built once in `main` and passed to
/// every component.
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    /// Listen address for the HTTP API.
    pub host: String,
    /// Listen port for the HTTP API.
    pub port: u16,
    /// Bearer secret protecting the broker's own API.
    pub api_token: String,
    /// Provider account credentials, if configured.
    pub credentials: Option<ProviderCredentials>,
    /// Path of the persisted session file.
    pub session_file: PathBuf,
    /// Overall deadline for one interactive login, in seconds.
    pub login_timeout_secs: u64,
}

impl BrokerConfig {
    /// Build configuration from the environment.
    ///
    /// The bearer secret is mandatory; everything else has a default or is
    /// deferred to first use.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_token = std::env::var("API_BEARER_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingBearerToken)?;

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw.clone()))?,
            Err(_) => 8080,
        };

        let credentials = match (
            std::env::var("LINKEDIN_USERNAME").ok().filter(|v| !v.is_empty()),
            std::env::var("LINKEDIN_PASSWORD").ok().filter(|v| !v.is_empty()),
        ) {
            (Some(username), Some(password)) => Some(ProviderCredentials { username, password }),
            _ => None,
        };

        let session_file = std::env::var("COOKIE_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("cookies.json"));

        let login_timeout_secs = std::env::var("LOGIN_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(90);

        Ok(Self {
            host,
            port,
            api_token,
            credentials,
            session_file,
            login_timeout_secs,
        })
    }
}
