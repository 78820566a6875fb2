use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Conversational state of a single user.
///
/// The set is closed: every transition in the orchestrator matches on this
/// enum exhaustively.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SessionState {
    /// Idle. Free text is a synthesis request.
    #[default]
    Free,
    /// A "create model" command was issued; the next text is the model name.
    WaitingModelName,
    /// A name is staged; the next voice clip becomes the model audio.
    WaitingVoice,
    /// A "delete model" command was issued; the next text names the victim.
    WaitingDeleteModelName,
}

impl SessionState {
    /// Whether the user is in the middle of a multi-step flow.
    pub fn is_busy(self) -> bool {
        !matches!(self, SessionState::Free)
    }
}
