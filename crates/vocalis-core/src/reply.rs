//! Outbound replies.

use crate::audio::NormalizedClip;

/// MIME type of every voice reply.
pub const VOICE_MIME_TYPE: &str = "audio/ogg";

/// A voice-note payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceNote {
    pub audio: Vec<u8>,
    pub mime_type: &'static str,
    pub duration_seconds: u32,
}

impl From<NormalizedClip> for VoiceNote {
    fn from(clip: NormalizedClip) -> Self {
        Self {
            audio: clip.bytes,
            mime_type: VOICE_MIME_TYPE,
            duration_seconds: clip.duration_seconds,
        }
    }
}

/// What the transport should send back to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Plain text message.
    Text(String),
    /// Synthesized speech.
    Voice(VoiceNote),
    /// A prompt with one selectable button per saved model. Buttons carry
    /// `choose_model|<name>` payloads.
    ModelMenu { prompt: String, models: Vec<String> },
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Returns the text of a `Text` reply.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}
