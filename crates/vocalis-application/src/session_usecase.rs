//! Session use case implementation.
//!
//! `SessionUseCase` is the single entry point for inbound events. Every
//! operation locks the user's session for its whole duration, so events of
//! one user are handled one at a time while different users proceed in
//! parallel.

use crate::messages;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use vocalis_core::UserId;
use vocalis_core::audio::AudioNormalizer;
use vocalis_core::error::{ErrorKind, Result, VocalisError};
use vocalis_core::event::{BotCommand, CallbackPayload, InboundEvent};
use vocalis_core::model::{ModelFileStore, ModelName, ModelRepository, RemoteFileRef};
use vocalis_core::reply::Reply;
use vocalis_core::session::{SessionState, SessionStore};
use vocalis_core::synthesis::SynthesisClient;

/// Use case coordinating sessions, model storage and synthesis.
///
/// # Responsibilities
///
/// - Driving the create / delete / choose flows of the session state machine
/// - Enforcing the per-user model limit and name uniqueness
/// - Synthesizing free text with the active model and normalizing the result
///
/// Failures never change the session state unless stated otherwise.
pub struct SessionUseCase {
    sessions: Arc<SessionStore>,
    models: Arc<dyn ModelRepository>,
    files: Arc<dyn ModelFileStore>,
    synthesis: Arc<dyn SynthesisClient>,
    normalizer: AudioNormalizer,
    max_models: usize,
    /// Credential for downloading uploaded clips.
    access_token: String,
}

impl SessionUseCase {
    /// # Arguments
    ///
    /// * `max_models` - Per-user model limit
    /// * `access_token` - Transport token used by [`handle`](Self::handle) for
    ///   voice downloads
    pub fn new(
        sessions: Arc<SessionStore>,
        models: Arc<dyn ModelRepository>,
        files: Arc<dyn ModelFileStore>,
        synthesis: Arc<dyn SynthesisClient>,
        normalizer: AudioNormalizer,
        max_models: usize,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            sessions,
            models,
            files,
            synthesis,
            normalizer,
            max_models,
            access_token: access_token.into(),
        }
    }

    /// Handles one event and always produces a reply: failures become the
    /// matching user-facing text after being logged. Sessions left idle are
    /// dropped from memory afterwards.
    pub async fn handle(&self, event: InboundEvent) -> Reply {
        let user_id = event.user_id();
        let kind = event.kind();

        let result = match event {
            InboundEvent::Command { command, .. } => self.on_command(user_id, command).await,
            InboundEvent::Text { text, .. } => self.on_text(user_id, &text).await,
            InboundEvent::Voice { file_ref, .. } => {
                self.on_voice(user_id, &file_ref, &self.access_token).await
            }
            InboundEvent::Callback { payload, .. } => self.on_callback(user_id, &payload).await,
        };

        let reply = result.unwrap_or_else(|e| {
            log_failure(user_id, kind, &e);
            Reply::Text(messages::error_text(&e))
        });
        self.sessions.evict_if_idle(user_id).await;
        reply
    }

    /// Current state of `user_id`'s session.
    pub async fn session_state(&self, user_id: UserId) -> SessionState {
        self.sessions.state(user_id).await
    }

    /// Name of the model `user_id` synthesizes with, if any.
    pub async fn active_model(&self, user_id: UserId) -> Option<String> {
        self.sessions
            .snapshot(user_id)
            .await
            .active_model()
            .map(str::to_string)
    }

    /// Handles a bot command. Commands are accepted in any state; starting a
    /// flow abandons the one in progress.
    #[tracing::instrument(skip(self), fields(user_id = %user_id))]
    pub async fn on_command(&self, user_id: UserId, command: BotCommand) -> Result<Reply> {
        let mut session = self.sessions.lock(user_id).await;

        match command {
            BotCommand::Start => {
                session.reset();
                Ok(Reply::text(messages::WELCOME))
            }
            BotCommand::Cancel => {
                let was_busy = session.state().is_busy();
                session.reset();
                Ok(Reply::text(if was_busy {
                    messages::CANCELLED
                } else {
                    messages::NOTHING_TO_CANCEL
                }))
            }
            BotCommand::SaveModel => {
                let count = self.models.count_models(user_id).await?;
                if count >= self.max_models {
                    return Err(VocalisError::ModelLimitReached {
                        max: self.max_models,
                    });
                }
                session.begin_create();
                debug!(count, "Create flow started");
                Ok(Reply::text(messages::ASK_MODEL_NAME))
            }
            BotCommand::DeleteModel => {
                session.begin_delete();
                Ok(Reply::text(messages::ASK_DELETE_NAME))
            }
            BotCommand::ChooseModel => {
                let models = self.models.list_models(user_id).await?;
                if models.is_empty() {
                    return Err(VocalisError::NoModels);
                }
                Ok(Reply::ModelMenu {
                    prompt: messages::CHOOSE_MODEL_PROMPT.to_string(),
                    models,
                })
            }
        }
    }

    /// Handles free text according to the session state.
    #[tracing::instrument(skip(self, text), fields(user_id = %user_id))]
    pub async fn on_text(&self, user_id: UserId, text: &str) -> Result<Reply> {
        let mut session = self.sessions.lock(user_id).await;
        let state = session.state();

        match state {
            SessionState::WaitingModelName => {
                let name = ModelName::parse(text)?;
                let existing = self.models.list_models(user_id).await?;
                if existing.iter().any(|n| n == name.as_str()) {
                    return Err(VocalisError::DuplicateModelName(name.into_inner()));
                }
                session.stage_model(name.as_str());
                debug!(model = %name, "Model name staged");
                Ok(Reply::text(messages::ASK_VOICE))
            }
            SessionState::WaitingDeleteModelName => {
                let name = ModelName::parse(text)?;
                let existing = self.models.list_models(user_id).await?;
                if !existing.iter().any(|n| n == name.as_str()) {
                    return Err(VocalisError::ModelNotFound(name.into_inner()));
                }

                self.models.delete_model(user_id, name.as_str()).await?;
                if let Err(e) = self.files.remove_model(user_id, &name).await {
                    warn!(model = %name, error = %e, "Model row deleted but blob removal failed");
                }
                session.forget_model(name.as_str());
                session.reset();
                info!(model = %name, "Model deleted");
                Ok(Reply::text(messages::model_deleted(name.as_str())))
            }
            SessionState::WaitingVoice => Err(VocalisError::UnexpectedEvent {
                event: "text",
                state,
            }),
            SessionState::Free => {
                let text = text.trim();
                if text.is_empty() {
                    return Err(VocalisError::EmptyText);
                }
                let active = session
                    .active_model()
                    .ok_or(VocalisError::NoActiveModel)?;
                let model = ModelName::parse(active)?;

                let reference = self.files.read_model(user_id, &model).await?;
                let audio = self.synthesis.synthesize(text, reference).await?;
                let clip = self.normalizer.normalize(&audio).await?;

                info!(
                    model = %model,
                    duration_seconds = clip.duration_seconds,
                    "Synthesized reply"
                );
                Ok(Reply::Voice(clip.into()))
            }
        }
    }

    /// Stores an uploaded clip as the staged model. Only valid while waiting
    /// for a voice message; any failure leaves the session there.
    ///
    /// A failure after the blob was written (for example a rejected row
    /// insert) leaves the blob on disk.
    #[tracing::instrument(skip(self, access_token), fields(user_id = %user_id, file_ref = %file_ref))]
    pub async fn on_voice(
        &self,
        user_id: UserId,
        file_ref: &RemoteFileRef,
        access_token: &str,
    ) -> Result<Reply> {
        let mut session = self.sessions.lock(user_id).await;
        let state = session.state();
        if state != SessionState::WaitingVoice {
            return Err(VocalisError::UnexpectedEvent {
                event: "voice",
                state,
            });
        }

        let pending = session.pending_model_name().map(str::to_string);
        let Some(pending) = pending else {
            session.reset();
            return Err(VocalisError::internal(
                "waiting for voice without a staged model name",
            ));
        };
        let model = ModelName::parse(&pending)?;

        // Another flow may have filled the quota since the name was staged.
        let count = self.models.count_models(user_id).await?;
        if count >= self.max_models {
            return Err(VocalisError::ModelLimitReached {
                max: self.max_models,
            });
        }

        self.files
            .fetch_and_store(user_id, file_ref, access_token, &model)
            .await?;

        if !self.models.user_exists(user_id).await? {
            self.models.add_user(user_id).await?;
            info!("New user registered");
        }
        self.models.save_model(user_id, model.as_str()).await?;

        session.complete_upload();
        info!(model = %model, "Model saved");
        Ok(Reply::text(messages::model_saved(model.as_str())))
    }

    /// Makes `name` the active model. The conversational state is left as
    /// is.
    #[tracing::instrument(skip(self), fields(user_id = %user_id))]
    pub async fn on_model_chosen(&self, user_id: UserId, name: &str) -> Result<Reply> {
        let mut session = self.sessions.lock(user_id).await;

        let models = self.models.list_models(user_id).await?;
        if !models.iter().any(|n| n == name) {
            return Err(VocalisError::ModelNotFound(name.to_string()));
        }

        session.choose_model(name);
        debug!(model = name, "Active model changed");
        Ok(Reply::text(messages::model_chosen(name)))
    }

    /// Handles an inline button press.
    pub async fn on_callback(&self, user_id: UserId, payload: &str) -> Result<Reply> {
        match CallbackPayload::parse(payload)? {
            CallbackPayload::ChooseModel(name) => self.on_model_chosen(user_id, &name).await,
        }
    }
}

fn log_failure(user_id: UserId, event: &str, e: &VocalisError) {
    match e.kind() {
        ErrorKind::Validation | ErrorKind::NotFound => {
            debug!(user_id = %user_id, event, error = %e, "Event rejected")
        }
        ErrorKind::Upstream => warn!(user_id = %user_id, event, error = %e, "Upstream failure"),
        ErrorKind::Persistence | ErrorKind::Configuration | ErrorKind::Internal => {
            error!(user_id = %user_id, event, error = %e, "Event failed")
        }
    }
}
