//! Startup configuration errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("API_BEARER_TOKEN is not set; refusing to start an unauthenticated broker")]
    MissingBearerToken,

    #[error("invalid PORT value: {0}")]
    InvalidPort(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
