//! Broker HTTP surface: bearer auth, route handlers, shared state.
//!
//! The binary in `main.rs` wires this to the real Chrome login agent and
//! provider gateway; tests wire it to fakes.

pub mod auth;
pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
