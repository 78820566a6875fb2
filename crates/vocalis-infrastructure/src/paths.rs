//! Path layout for stored model blobs.

use std::path::PathBuf;
use vocalis_core::UserId;
use vocalis_core::model::{MODEL_FILE_EXTENSION, ModelName};

/// Resolves where model blobs live on disk.
///
/// # Directory Structure
///
/// ```text
/// <root>/                 # MODELS_DIR, "voices" by default
/// ├── 1001/               # one directory per user id
/// │   ├── alice.ogg
/// │   └── bob.ogg
/// └── 1002/
///     └── alice.ogg
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPaths {
    root: PathBuf,
}

impl ModelPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding every blob of `user_id`.
    pub fn user_dir(&self, user_id: UserId) -> PathBuf {
        self.root.join(user_id.to_string())
    }

    /// `<root>/<user_id>/<name>.ogg`
    pub fn model_file(&self, user_id: UserId, model: &ModelName) -> PathBuf {
        self.user_dir(user_id)
            .join(format!("{}.{}", model.as_str(), MODEL_FILE_EXTENSION))
    }
}
