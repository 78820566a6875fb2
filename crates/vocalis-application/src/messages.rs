//! User-facing reply texts.

use vocalis_core::error::VocalisError;
use vocalis_core::model::MAX_MODEL_NAME_BYTES;
use vocalis_core::session::SessionState;

pub const WELCOME: &str = "Hi! I speak your text in a voice of your choice.\n\
    /save_model - record a new voice model\n\
    /choose_model - pick the voice used for synthesis\n\
    /delete_model - delete a voice model\n\
    /cancel - abandon the current action\n\
    Any other text is spoken with the chosen voice.";

pub const ASK_MODEL_NAME: &str = "Send a name for the new model.";
pub const ASK_VOICE: &str = "Send a voice message to create the model.";
pub const ASK_DELETE_NAME: &str = "Send the name of the model to delete.";
pub const CHOOSE_MODEL_PROMPT: &str = "Choose a model:";
pub const CANCELLED: &str = "Cancelled.";
pub const NOTHING_TO_CANCEL: &str = "Nothing to cancel.";
pub const GENERIC_FAILURE: &str = "Something went wrong, please try again later.";

pub fn model_saved(name: &str) -> String {
    format!("Model \"{name}\" saved and selected.")
}

pub fn model_deleted(name: &str) -> String {
    format!("Model \"{name}\" deleted.")
}

pub fn model_chosen(name: &str) -> String {
    format!("Model \"{name}\" selected.")
}

/// Reply text for a failed event.
///
/// Validation and not-found errors get a specific message; everything else
/// collapses to [`GENERIC_FAILURE`] so internals never reach the user.
pub fn error_text(error: &VocalisError) -> String {
    match error {
        VocalisError::EmptyModelName => "The model name must not be empty.".to_string(),
        VocalisError::InvalidModelName { .. } => format!(
            "That name can't be used. Use up to {MAX_MODEL_NAME_BYTES} bytes, \
             without slashes or a leading dot."
        ),
        VocalisError::DuplicateModelName(name) => {
            format!("A model named \"{name}\" already exists. Send another name.")
        }
        VocalisError::ModelLimitReached { max } => {
            format!("You already have {max} models. Delete one with /delete_model first.")
        }
        VocalisError::UnexpectedEvent { event, state } => unexpected_event_text(event, *state),
        VocalisError::EmptyText => "Send some text to speak.".to_string(),
        VocalisError::UnknownCallback(_) => "That button is no longer valid.".to_string(),
        VocalisError::NoActiveModel => {
            "No model selected. Create one with /save_model or pick one with /choose_model."
                .to_string()
        }
        VocalisError::ModelNotFound(name) => format!("There is no model named \"{name}\"."),
        VocalisError::ModelFileMissing(_) => {
            "The audio of the selected model is missing. Re-create it with /save_model \
             or pick another one with /choose_model."
                .to_string()
        }
        VocalisError::NoModels => "You have no models yet. Create one with /save_model.".to_string(),
        _ => GENERIC_FAILURE.to_string(),
    }
}

fn unexpected_event_text(event: &str, state: SessionState) -> String {
    match (event, state) {
        ("voice", _) => "I wasn't expecting a voice message. Use /save_model to create a model."
            .to_string(),
        (_, SessionState::WaitingVoice) => {
            "Send a voice message for the new model, or /cancel.".to_string()
        }
        _ => GENERIC_FAILURE.to_string(),
    }
}
