//! Interaction layer for Vocalis: clients for the systems the bot talks to.
//!
//! - `grpc_synthesis_client`: the remote speech synthesis service
//! - `telegram`: Bot API client and update-to-event mapping

pub mod audio_processor;
pub mod grpc_synthesis_client;
pub mod telegram;

pub use grpc_synthesis_client::GrpcSynthesisClient;
pub use telegram::{Envelope, Incoming, TelegramClient};
