//! Domain layer for Vocalis.
//!
//! Holds the types and traits shared by every other crate: the per-user
//! session state machine, model naming rules, the audio normalization
//! pipeline and the interfaces of the external collaborators (model
//! repository, blob store, synthesis service, audio toolkit).

pub mod audio;
pub mod config;
pub mod error;
pub mod event;
pub mod model;
pub mod reply;
pub mod session;
pub mod synthesis;
pub mod user;

// Re-export common types
pub use error::{ErrorKind, Result, VocalisError};
pub use user::UserId;
