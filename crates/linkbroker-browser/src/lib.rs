//! Browser login agent — Chrome lifecycle, CDP credential entry, cookie capture.
//!
//! The broker treats interactive login as an external collaborator: anything
//! implementing [`LoginAgent`] can produce a cookie session. The shipped
//! implementation drives a throwaway Chromium instance over the DevTools
//! protocol.

pub mod agent;
pub mod cdp;
pub mod chrome;
pub mod error;

pub use agent::LoginAgent;
pub use chrome::{ChromeConfig, ChromeLoginAgent};
pub use error::LoginError;
