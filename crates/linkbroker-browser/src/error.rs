//! Login failure modes.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoginError {
    #[error("provider username/password not configured")]
    MissingCredentials,

    #[error("failed to launch browser: {0}")]
    Launch(#[from] std::io::Error),

    #[error("could not reach the browser's DevTools endpoint: {0}")]
    DevToolsUnreachable(String),

    #[error("DevTools protocol error: {0}")]
    Protocol(String),

    #[error("login form interaction failed: {0}")]
    FormInteraction(String),

    #[error("login was not accepted by the provider (no logged-in marker appeared)")]
    NotAccepted,

    #[error("login timed out")]
    TimedOut,
}
