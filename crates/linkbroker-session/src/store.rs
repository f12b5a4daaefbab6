//! On-disk session store.
//!
//! Holds at most one record. Saves go through a sibling temp file and an
//! atomic rename so a concurrent reader sees either the previous record or
//! the new one, never a partial write.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;
use tracing::warn;

use crate::record::{SessionCookie, SessionRecord};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to write session file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode session record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Persists the single current session record.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the current record.
    ///
    /// A missing or unreadable file is a legitimate "not logged in" state
    /// and returns `None`. A corrupt file is logged and treated the same
    /// way; the next successful login overwrites it.
    pub fn load(&self) -> Option<SessionRecord> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str::<SessionRecord>(&raw) {
            Ok(record) if record.is_valid() => Some(record),
            Ok(_) => None,
            Err(e) => {
                warn!("session file {} is corrupt: {}", self.path.display(), e);
                None
            }
        }
    }

    /// Replace the current record with freshly captured cookies.
    pub fn save(&self, cookies: Vec<SessionCookie>) -> Result<SessionRecord, StoreError> {
        let captured_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);
        let record = SessionRecord {
            captured_at,
            cookies,
        };
        self.write_atomic(&record)?;
        Ok(record)
    }

    fn write_atomic(&self, record: &SessionRecord) -> Result<(), StoreError> {
        let json = serde_json::to_vec(record)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut file = std::fs::File::create(&tmp)?;
            file.write_all(&json)?;
            file.sync_all()?;
        }
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
