//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use vocalis_application::SessionUseCase;
use vocalis_core::UserId;
use vocalis_core::audio::{AudioMetadata, AudioNormalizer, AudioToolkit};
use vocalis_core::error::{Result, VocalisError};
use vocalis_core::model::{ModelFileStore, ModelName, ModelRepository, RemoteFileRef};
use vocalis_core::session::SessionStore;
use vocalis_core::synthesis::SynthesisClient;

pub const TOKEN: &str = "123:test-token";
pub const MAX_MODELS: usize = 5;

/// Leading tag of clips the mock toolkit reports as canonical.
pub const OPUS_TAG: &[u8] = b"OPUS";

// ============================================================================
// Model repository
// ============================================================================

#[derive(Default)]
pub struct MockModelRepository {
    users: Mutex<Vec<UserId>>,
    models: Mutex<HashMap<UserId, Vec<String>>>,
    fail_save: Mutex<bool>,
}

impl MockModelRepository {
    pub fn with_models(user_id: UserId, names: &[&str]) -> Self {
        let repo = Self::default();
        repo.users.lock().unwrap().push(user_id);
        repo.models
            .lock()
            .unwrap()
            .insert(user_id, names.iter().map(|n| n.to_string()).collect());
        repo
    }

    pub fn fail_next_saves(&self) {
        *self.fail_save.lock().unwrap() = true;
    }

    pub fn names(&self, user_id: UserId) -> Vec<String> {
        self.models
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Inserts a row behind the orchestrator's back.
    pub fn insert_directly(&self, user_id: UserId, name: &str) {
        self.models
            .lock()
            .unwrap()
            .entry(user_id)
            .or_default()
            .push(name.to_string());
    }
}

#[async_trait]
impl ModelRepository for MockModelRepository {
    async fn user_exists(&self, user_id: UserId) -> Result<bool> {
        Ok(self.users.lock().unwrap().contains(&user_id))
    }

    async fn add_user(&self, user_id: UserId) -> Result<()> {
        let mut users = self.users.lock().unwrap();
        if !users.contains(&user_id) {
            users.push(user_id);
        }
        Ok(())
    }

    async fn save_model(&self, user_id: UserId, name: &str) -> Result<()> {
        if *self.fail_save.lock().unwrap() {
            return Err(VocalisError::data_access("insert failed"));
        }
        let mut models = self.models.lock().unwrap();
        let names = models.entry(user_id).or_default();
        if names.iter().any(|n| n == name) {
            return Err(VocalisError::DuplicateModelName(name.to_string()));
        }
        names.push(name.to_string());
        Ok(())
    }

    async fn list_models(&self, user_id: UserId) -> Result<Vec<String>> {
        Ok(self.names(user_id))
    }

    async fn count_models(&self, user_id: UserId) -> Result<usize> {
        Ok(self.names(user_id).len())
    }

    async fn delete_model(&self, user_id: UserId, name: &str) -> Result<()> {
        if let Some(names) = self.models.lock().unwrap().get_mut(&user_id) {
            names.retain(|n| n != name);
        }
        Ok(())
    }
}

// ============================================================================
// Blob store
// ============================================================================

/// In-memory blob store. `remote` plays the transport's file endpoint.
#[derive(Default)]
pub struct MockFileStore {
    remote: Mutex<HashMap<String, Vec<u8>>>,
    blobs: Mutex<HashMap<PathBuf, Vec<u8>>>,
    tokens_seen: Mutex<Vec<String>>,
}

impl MockFileStore {
    pub fn publish(&self, file_ref: &str, bytes: &[u8]) {
        self.remote
            .lock()
            .unwrap()
            .insert(file_ref.to_string(), bytes.to_vec());
    }

    pub fn put_blob(&self, user_id: UserId, name: &str, bytes: &[u8]) {
        let path = self.model_path(user_id, &ModelName::parse(name).unwrap());
        self.blobs.lock().unwrap().insert(path, bytes.to_vec());
    }

    pub fn has_blob(&self, user_id: UserId, name: &str) -> bool {
        let path = self.model_path(user_id, &ModelName::parse(name).unwrap());
        self.blobs.lock().unwrap().contains_key(&path)
    }

    pub fn tokens_seen(&self) -> Vec<String> {
        self.tokens_seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelFileStore for MockFileStore {
    fn model_path(&self, user_id: UserId, model: &ModelName) -> PathBuf {
        PathBuf::from(format!("voices/{}/{}.ogg", user_id, model))
    }

    async fn fetch_and_store(
        &self,
        user_id: UserId,
        file_ref: &RemoteFileRef,
        access_token: &str,
        model: &ModelName,
    ) -> Result<()> {
        self.tokens_seen
            .lock()
            .unwrap()
            .push(access_token.to_string());
        let bytes = self
            .remote
            .lock()
            .unwrap()
            .get(file_ref.as_str())
            .cloned()
            .ok_or_else(|| VocalisError::download("server returned 404 Not Found"))?;
        self.blobs
            .lock()
            .unwrap()
            .insert(self.model_path(user_id, model), bytes);
        Ok(())
    }

    async fn read_model(&self, user_id: UserId, model: &ModelName) -> Result<Vec<u8>> {
        let path = self.model_path(user_id, model);
        self.blobs
            .lock()
            .unwrap()
            .get(&path)
            .cloned()
            .ok_or_else(|| VocalisError::ModelFileMissing(path.display().to_string()))
    }

    async fn remove_model(&self, user_id: UserId, model: &ModelName) -> Result<()> {
        self.blobs
            .lock()
            .unwrap()
            .remove(&self.model_path(user_id, model));
        Ok(())
    }
}

// ============================================================================
// Synthesis
// ============================================================================

/// Echoes `OPUS` + text, or fails when told to. Records every call.
#[derive(Default)]
pub struct MockSynthesis {
    calls: Mutex<Vec<(String, Vec<u8>)>>,
    failure: Mutex<Option<String>>,
}

impl MockSynthesis {
    pub fn fail_with(&self, status: &str) {
        *self.failure.lock().unwrap() = Some(status.to_string());
    }

    pub fn calls(&self) -> Vec<(String, Vec<u8>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SynthesisClient for MockSynthesis {
    async fn synthesize(&self, text: &str, reference_audio: Vec<u8>) -> Result<Vec<u8>> {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), reference_audio));
        if let Some(status) = self.failure.lock().unwrap().clone() {
            return Err(VocalisError::synthesis(status));
        }
        let mut audio = OPUS_TAG.to_vec();
        audio.extend_from_slice(text.as_bytes());
        Ok(audio)
    }
}

// ============================================================================
// Audio toolkit
// ============================================================================

/// Clips starting with [`OPUS_TAG`] are canonical; anything else is recoded
/// by prefixing the tag. Duration is one second per ten bytes.
pub struct MockToolkit;

#[async_trait]
impl AudioToolkit for MockToolkit {
    async fn inspect(&self, audio: &[u8]) -> Option<AudioMetadata> {
        if audio.starts_with(OPUS_TAG) {
            Some(AudioMetadata::canonical())
        } else {
            Some(AudioMetadata::new("pcm_s16le", 1, 22_050))
        }
    }

    async fn recode(&self, audio: &[u8]) -> Result<Vec<u8>> {
        let mut out = OPUS_TAG.to_vec();
        out.extend_from_slice(audio);
        Ok(out)
    }

    async fn duration(&self, audio: &[u8]) -> Result<f64> {
        Ok(audio.len() as f64 / 10.0)
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub usecase: SessionUseCase,
    pub repo: Arc<MockModelRepository>,
    pub files: Arc<MockFileStore>,
    pub synthesis: Arc<MockSynthesis>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_repo(MockModelRepository::default())
    }

    pub fn with_repo(repo: MockModelRepository) -> Self {
        let repo = Arc::new(repo);
        let files = Arc::new(MockFileStore::default());
        let synthesis = Arc::new(MockSynthesis::default());
        let usecase = SessionUseCase::new(
            Arc::new(SessionStore::new()),
            repo.clone(),
            files.clone(),
            synthesis.clone(),
            AudioNormalizer::new(Arc::new(MockToolkit)),
            MAX_MODELS,
            TOKEN,
        );
        Self {
            usecase,
            repo,
            files,
            synthesis,
        }
    }
}
