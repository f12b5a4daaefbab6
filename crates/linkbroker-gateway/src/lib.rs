//! Provider gateway — paced, cookie-authenticated calls against the
//! provider's private API, plus normalization of its nested responses.

pub mod gateway;
pub mod normalize;
pub mod pacing;

pub use gateway::{GatewayError, GatewayOutcome, ProviderGateway, page_offset};
pub use normalize::{normalize_connections, ConnectionRecord};
pub use pacing::{NoPacing, PacingPolicy, RandomDelay};
