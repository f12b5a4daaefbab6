//! Session persistence — the single on-disk cookie session record.

pub mod record;
pub mod store;

pub use record::{SessionCookie, SessionRecord};
pub use store::{SessionStore, StoreError};
