//! Session domain module.
//!
//! Per-user conversational state and the store that serializes access to it.
//!
//! # Module Structure
//!
//! - `state`: the closed set of conversational states (`SessionState`)
//! - `model`: one user's session (`Session`) and its transition helpers
//! - `store`: the in-memory, per-user-locked session map (`SessionStore`)

mod model;
mod state;
mod store;

// Re-export public API
pub use model::Session;
pub use state::SessionState;
pub use store::{SessionGuard, SessionStore};
