//! Telegram Bot API transport.

mod client;
mod mapper;
pub mod types;

pub use client::TelegramClient;
pub use mapper::{Envelope, Incoming, map_update, model_keyboard};
