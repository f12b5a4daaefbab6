//! Broker core — configuration and shared error types.

pub mod config;
pub mod error;

pub use config::{BrokerConfig, ProviderCredentials};
pub use error::{ConfigError, Result};
