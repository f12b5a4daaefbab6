//! Session record types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One captured browser cookie.
///
/// Only `name` and `value` matter to the broker; any further attributes the
/// capturing browser reported (domain, path, expiry) are carried along so
/// the persisted file stays a faithful snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    #[serde(flatten)]
    pub attributes: HashMap<String, serde_json::Value>,
}

impl SessionCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            attributes: HashMap::new(),
        }
    }
}

/// The single current session: cookies plus capture time.
///
/// A record is usable only if `cookies` is non-empty. There is no TTL;
/// callers re-login explicitly when the provider rejects the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Capture time as epoch seconds.
    #[serde(rename = "timestamp")]
    pub captured_at: f64,
    pub cookies: Vec<SessionCookie>,
}

impl SessionRecord {
    /// Whether the record carries any cookies at all.
    pub fn is_valid(&self) -> bool {
        !self.cookies.is_empty()
    }

    /// Cookie lookup by name.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.value.as_str())
    }

    /// Render the cookies as a single `Cookie` request-header value.
    pub fn cookie_header(&self) -> String {
        self.cookies
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ")
    }
}
