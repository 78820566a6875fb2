//! Inbound events and their parsing.

use crate::error::{Result, VocalisError};
use crate::model::RemoteFileRef;
use crate::user::UserId;
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString};

/// Separator between the action and its argument in callback payloads.
const CALLBACK_SEPARATOR: char = '|';

/// Bot commands understood by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum BotCommand {
    /// Greeting and usage help.
    Start,
    /// "Create model": name a new model, then upload a clip.
    SaveModel,
    /// "Delete model": name the model to remove.
    DeleteModel,
    /// Pick one of the saved models for synthesis.
    ChooseModel,
    /// Abandon the current flow.
    Cancel,
}

impl BotCommand {
    /// Parses a leading `/command` (optionally `/command@botname`) from a
    /// message. Returns `None` for plain text and unknown commands.
    pub fn parse(text: &str) -> Option<Self> {
        let word = text.trim_start().split_whitespace().next()?;
        let name = word.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name);
        Self::from_str(name).ok()
    }

    /// Short description shown in the transport's command menu.
    pub fn description(self) -> &'static str {
        match self {
            BotCommand::Start => "Start",
            BotCommand::SaveModel => "Send a voice message to build a new model",
            BotCommand::DeleteModel => "Delete a model",
            BotCommand::ChooseModel => "Choose the model used for synthesis",
            BotCommand::Cancel => "Cancel the current action",
        }
    }
}

/// Structured form of a callback button payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackPayload {
    /// `choose_model|<name>`
    ChooseModel(String),
}

impl CallbackPayload {
    const CHOOSE_MODEL: &'static str = "choose_model";

    /// # Errors
    ///
    /// `UnknownCallback` for anything but `choose_model|<non-empty name>`.
    pub fn parse(payload: &str) -> Result<Self> {
        match payload.split_once(CALLBACK_SEPARATOR) {
            Some((Self::CHOOSE_MODEL, name)) if !name.trim().is_empty() => {
                Ok(Self::ChooseModel(name.to_string()))
            }
            _ => Err(VocalisError::UnknownCallback(payload.to_string())),
        }
    }

    pub fn encode(&self) -> String {
        match self {
            Self::ChooseModel(name) => {
                format!("{}{}{}", Self::CHOOSE_MODEL, CALLBACK_SEPARATOR, name)
            }
        }
    }
}

/// An event delivered by the transport, already reduced to what the
/// orchestrator needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Text { user_id: UserId, text: String },
    Voice { user_id: UserId, file_ref: RemoteFileRef },
    Command { user_id: UserId, command: BotCommand },
    Callback { user_id: UserId, payload: String },
}

impl InboundEvent {
    pub fn user_id(&self) -> UserId {
        match self {
            Self::Text { user_id, .. }
            | Self::Voice { user_id, .. }
            | Self::Command { user_id, .. }
            | Self::Callback { user_id, .. } => *user_id,
        }
    }

    /// Short label for logs and `UnexpectedEvent` errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Voice { .. } => "voice",
            Self::Command { .. } => "command",
            Self::Callback { .. } => "callback",
        }
    }
}
