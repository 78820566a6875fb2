//! Voice model domain module.
//!
//! # Module Structure
//!
//! - `name`: validated model names (`ModelName`)
//! - `repository`: row persistence for users and models (`ModelRepository`)
//! - `files`: blob storage for model audio (`ModelFileStore`, `RemoteFileRef`)

mod files;
mod name;
mod repository;

// Re-export public API
pub use files::{ModelFileStore, RemoteFileRef};
pub use name::{MAX_MODEL_NAME_BYTES, ModelName};
pub use repository::ModelRepository;

/// Default number of models a user may hold.
pub const MAX_MODELS: usize = 5;

/// File extension of stored model blobs.
pub const MODEL_FILE_EXTENSION: &str = "ogg";
