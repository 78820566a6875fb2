//! Reduces Telegram updates to orchestrator events.

use super::types::{InlineKeyboardButton, InlineKeyboardMarkup, Update};
use tracing::debug;
use vocalis_core::UserId;
use vocalis_core::event::{BotCommand, CallbackPayload, InboundEvent};

/// An event that may still need a Bot API round trip before it reaches the
/// orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    /// Ready to dispatch.
    Event(InboundEvent),
    /// A voice clip known only by `file_id`; `getFile` turns it into a
    /// downloadable reference.
    Voice { user_id: UserId, file_id: String },
}

impl Incoming {
    pub fn user_id(&self) -> UserId {
        match self {
            Self::Event(event) => event.user_id(),
            Self::Voice { user_id, .. } => *user_id,
        }
    }
}

/// One inbound update with the routing data needed to answer it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub update_id: i64,
    /// Where replies go.
    pub chat_id: i64,
    /// Set for callback queries, which must be acknowledged.
    pub callback_query_id: Option<String>,
    pub incoming: Incoming,
}

/// Maps an update to an [`Envelope`].
///
/// Returns `None` for updates the bot does not handle: messages without a
/// sender, from other bots, or with neither text nor voice, and callback
/// queries without data or origin chat. Slash words that are not known
/// commands are delivered as text.
pub fn map_update(update: Update) -> Option<Envelope> {
    let update_id = update.update_id;

    if let Some(query) = update.callback_query {
        let chat_id = query.message.as_ref().map(|m| m.chat.id)?;
        let Some(payload) = query.data else {
            debug!(update_id, "Ignoring callback query without data");
            return None;
        };
        return Some(Envelope {
            update_id,
            chat_id,
            callback_query_id: Some(query.id),
            incoming: Incoming::Event(InboundEvent::Callback {
                user_id: UserId(query.from.id),
                payload,
            }),
        });
    }

    let message = update.message?;
    let from = message.from.filter(|u| !u.is_bot)?;
    let user_id = UserId(from.id);

    let incoming = if let Some(voice) = message.voice {
        Incoming::Voice {
            user_id,
            file_id: voice.file_id,
        }
    } else if let Some(text) = message.text {
        match BotCommand::parse(&text) {
            Some(command) => Incoming::Event(InboundEvent::Command { user_id, command }),
            None => Incoming::Event(InboundEvent::Text { user_id, text }),
        }
    } else {
        debug!(update_id, "Ignoring message without text or voice");
        return None;
    };

    Some(Envelope {
        update_id,
        chat_id: message.chat.id,
        callback_query_id: None,
        incoming,
    })
}

/// One button per model, one per row.
pub fn model_keyboard(models: &[String]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: models
            .iter()
            .map(|name| {
                vec![InlineKeyboardButton {
                    text: name.clone(),
                    callback_data: CallbackPayload::ChooseModel(name.clone()).encode(),
                }]
            })
            .collect(),
    }
}
