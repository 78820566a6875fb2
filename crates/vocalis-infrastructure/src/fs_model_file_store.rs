//! Filesystem-backed model blob store.
//!
//! Blobs are downloaded from the chat platform's file endpoint and written
//! verbatim to `<root>/<user_id>/<name>.ogg`.

use crate::paths::ModelPaths;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use vocalis_core::UserId;
use vocalis_core::error::{Result, VocalisError};
use vocalis_core::model::{ModelFileStore, ModelName, RemoteFileRef};

/// Upper bound for one download, body included. The caller holds the
/// user's session lock for the whole transfer.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Stores model blobs under a root directory.
#[derive(Clone)]
pub struct FsModelFileStore {
    paths: ModelPaths,
    api_url: String,
    http: reqwest::Client,
    timeout: Duration,
}

impl FsModelFileStore {
    /// # Arguments
    ///
    /// * `root` - Blob root (`MODELS_DIR`)
    /// * `api_url` - Base URL of the file endpoint, e.g. `https://api.telegram.org`
    pub fn new(root: impl Into<PathBuf>, api_url: impl Into<String>) -> Self {
        Self::with_client(root, api_url, reqwest::Client::new())
    }

    pub fn with_client(
        root: impl Into<PathBuf>,
        api_url: impl Into<String>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            paths: ModelPaths::new(root),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            http,
            timeout: DOWNLOAD_TIMEOUT,
        }
    }

    /// Overrides [`DOWNLOAD_TIMEOUT`].
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The URL embeds the token and must never be logged.
    fn download_url(&self, file_ref: &RemoteFileRef, access_token: &str) -> String {
        format!("{}/file/bot{}/{}", self.api_url, access_token, file_ref)
    }
}

#[async_trait]
impl ModelFileStore for FsModelFileStore {
    fn model_path(&self, user_id: UserId, model: &ModelName) -> PathBuf {
        self.paths.model_file(user_id, model)
    }

    async fn fetch_and_store(
        &self,
        user_id: UserId,
        file_ref: &RemoteFileRef,
        access_token: &str,
        model: &ModelName,
    ) -> Result<()> {
        let mut response = self
            .http
            .get(self.download_url(file_ref, access_token))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| VocalisError::download(format!("request failed: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(VocalisError::download(format!(
                "server returned {} for {}",
                status, file_ref
            )));
        }

        let user_dir = self.paths.user_dir(user_id);
        fs::create_dir_all(&user_dir).await.map_err(|e| {
            VocalisError::io(format!(
                "Failed to create directory {}: {}",
                user_dir.display(),
                e
            ))
        })?;

        let path = self.model_path(user_id, model);
        let mut file = fs::File::create(&path).await.map_err(|e| {
            VocalisError::io(format!("Failed to create {}: {}", path.display(), e))
        })?;

        let mut written = 0usize;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| VocalisError::download(format!("body read failed: {}", e.without_url())))?
        {
            file.write_all(&chunk).await.map_err(|e| {
                VocalisError::io(format!("Failed to write {}: {}", path.display(), e))
            })?;
            written += chunk.len();
        }
        file.flush()
            .await
            .map_err(|e| VocalisError::io(format!("Failed to flush {}: {}", path.display(), e)))?;

        info!(
            user_id = %user_id,
            model = %model,
            bytes = written,
            "Stored model blob"
        );
        Ok(())
    }

    async fn read_model(&self, user_id: UserId, model: &ModelName) -> Result<Vec<u8>> {
        let path = self.model_path(user_id, model);
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(VocalisError::ModelFileMissing(
                path.display().to_string(),
            )),
            Err(e) => Err(VocalisError::io(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn remove_model(&self, user_id: UserId, model: &ModelName) -> Result<()> {
        let path = self.model_path(user_id, model);
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = %path.display(), "Removed model blob");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(VocalisError::io(format!(
                "Failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }
}
