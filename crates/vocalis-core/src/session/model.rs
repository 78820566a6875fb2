//! Session domain model.

use super::state::SessionState;

/// Ephemeral per-user conversational state.
///
/// Sessions live only in memory; a restart drops every in-progress flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    state: SessionState,
    /// Name staged between `WaitingModelName` and `WaitingVoice`.
    pending_model_name: Option<String>,
    /// Saved model used for synthesis. Written by a successful upload and by
    /// an explicit model choice.
    active_model: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// True when the session holds nothing a fresh one would not.
    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }

    pub fn pending_model_name(&self) -> Option<&str> {
        self.pending_model_name.as_deref()
    }

    pub fn active_model(&self) -> Option<&str> {
        self.active_model.as_deref()
    }

    /// `Free` -> `WaitingModelName`. Any previously staged name is dropped.
    pub fn begin_create(&mut self) {
        self.pending_model_name = None;
        self.state = SessionState::WaitingModelName;
    }

    /// `Free` -> `WaitingDeleteModelName`.
    pub fn begin_delete(&mut self) {
        self.pending_model_name = None;
        self.state = SessionState::WaitingDeleteModelName;
    }

    /// `WaitingModelName` -> `WaitingVoice` with `name` staged.
    pub fn stage_model(&mut self, name: impl Into<String>) {
        self.pending_model_name = Some(name.into());
        self.state = SessionState::WaitingVoice;
    }

    /// `WaitingVoice` -> `Free`. The staged name becomes the active model and
    /// is returned.
    pub fn complete_upload(&mut self) -> Option<String> {
        let staged = self.pending_model_name.take();
        if let Some(name) = &staged {
            self.active_model = Some(name.clone());
        }
        self.state = SessionState::Free;
        staged
    }

    /// Selects a saved model for synthesis. The conversational state is left
    /// alone.
    pub fn choose_model(&mut self, name: impl Into<String>) {
        self.active_model = Some(name.into());
    }

    /// Forgets the active model if it is `name`.
    pub fn forget_model(&mut self, name: &str) {
        if self.active_model.as_deref() == Some(name) {
            self.active_model = None;
        }
    }

    /// Abandons any flow in progress. The active model survives.
    pub fn reset(&mut self) {
        self.pending_model_name = None;
        self.state = SessionState::Free;
    }
}
