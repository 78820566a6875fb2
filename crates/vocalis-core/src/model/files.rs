//! Model blob storage trait.

use crate::error::Result;
use crate::model::ModelName;
use crate::user::UserId;
use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;

/// Transport-side reference to an uploaded file (for Telegram, the
/// `file_path` returned by `getFile`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFileRef(String);

impl RemoteFileRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteFileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stores one audio blob per `(user, model name)`.
///
/// There is no transaction spanning this store and [`ModelRepository`]: a
/// blob can outlive a failed row insert.
///
/// [`ModelRepository`]: crate::model::ModelRepository
#[async_trait]
pub trait ModelFileStore: Send + Sync {
    /// Deterministic location of the blob for `(user_id, model)`.
    fn model_path(&self, user_id: UserId, model: &ModelName) -> PathBuf;

    /// Downloads `file_ref` with `access_token` and writes it verbatim to
    /// [`model_path`](Self::model_path).
    ///
    /// # Errors
    ///
    /// `Download` on transport failure or a non-2xx status, `Io` when the
    /// file cannot be written. A partially written file is left in place.
    async fn fetch_and_store(
        &self,
        user_id: UserId,
        file_ref: &RemoteFileRef,
        access_token: &str,
        model: &ModelName,
    ) -> Result<()>;

    /// Reads the stored blob. `ModelFileMissing` if it does not exist.
    async fn read_model(&self, user_id: UserId, model: &ModelName) -> Result<Vec<u8>>;

    /// Deletes the stored blob. A missing blob is not an error.
    async fn remove_model(&self, user_id: UserId, model: &ModelName) -> Result<()>;
}
