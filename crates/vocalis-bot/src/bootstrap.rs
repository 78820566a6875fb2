//! Wires the concrete adapters into a [`SessionUseCase`].

use std::sync::Arc;
use tracing::info;
use vocalis_application::SessionUseCase;
use vocalis_core::audio::AudioNormalizer;
use vocalis_core::config::AppConfig;
use vocalis_core::error::Result;
use vocalis_core::session::SessionStore;
use vocalis_infrastructure::{FfmpegToolkit, FsModelFileStore, SqliteModelRepository};
use vocalis_interaction::{GrpcSynthesisClient, TelegramClient};

/// The running pieces of the bot.
pub struct App {
    pub telegram: TelegramClient,
    pub usecase: Arc<SessionUseCase>,
}

/// Opens storage and builds every client described by `config`.
///
/// The synthesis channel connects lazily, so an unreachable synthesis
/// service does not prevent startup.
pub fn build(config: &AppConfig) -> Result<App> {
    let repository = SqliteModelRepository::open(&config.storage.database_path)?;
    info!(path = %config.storage.database_path.display(), "Opened model database");

    let files = FsModelFileStore::new(
        config.storage.models_dir.clone(),
        config.telegram.api_url.clone(),
    );
    let synthesis = GrpcSynthesisClient::new(&config.synthesis)?;
    let normalizer = AudioNormalizer::new(Arc::new(FfmpegToolkit::new(&config.audio)));

    let usecase = SessionUseCase::new(
        Arc::new(SessionStore::new()),
        Arc::new(repository),
        Arc::new(files),
        Arc::new(synthesis),
        normalizer,
        config.max_models,
        config.telegram.token.clone(),
    );

    info!(
        models_dir = %config.storage.models_dir.display(),
        synthesis = %config.synthesis.endpoint(),
        max_models = config.max_models,
        "Bot assembled"
    );

    Ok(App {
        telegram: TelegramClient::new(&config.telegram),
        usecase: Arc::new(usecase),
    })
}
