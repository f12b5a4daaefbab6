//! Normalization of the provider's nested connections response.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One normalized connection. Immutable; no identity beyond its fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub occupation: String,
    pub email: Option<String>,
}

/// Flatten `data.elements[].handle~` into connection records.
///
/// Total over arbitrary JSON: missing sections yield an empty list and
/// missing fields default to empty strings (email stays absent). Output
/// order follows input order; elements are a paging window, not a set.
pub fn normalize_connections(raw: &Value) -> Vec<ConnectionRecord> {
    raw.pointer("/data/elements")
        .and_then(Value::as_array)
        .map(|elements| {
            elements
                .iter()
                .map(|element| {
                    let handle = &element["handle~"];
                    ConnectionRecord {
                        first_name: string_field(handle, "firstName"),
                        last_name: string_field(handle, "lastName"),
                        occupation: string_field(handle, "occupation"),
                        email: handle["emailAddress"].as_str().map(str::to_string),
                    }
                })
                .collect()
        })
        .unwrap_or_default()
}

fn string_field(handle: &Value, key: &str) -> String {
    handle[key].as_str().unwrap_or_default().to_string()
}
