//! The login agent seam.

use async_trait::async_trait;
use linkbroker_session::SessionCookie;

use crate::error::LoginError;

/// Performs the interactive provider login and yields the captured cookies.
///
/// Implementations own whatever automation resource they open and must
/// release it on every exit path, including cancellation. The call is slow
/// (seconds to tens of seconds); callers wrap it in their own deadline.
#[async_trait]
pub trait LoginAgent: Send + Sync {
    async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Vec<SessionCookie>, LoginError>;
}
