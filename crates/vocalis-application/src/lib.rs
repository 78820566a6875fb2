//! Application layer for Vocalis.
//!
//! `SessionUseCase` drives the per-user conversation: it consults the session
//! state machine, calls the model store, blob store and synthesis service,
//! and turns the outcome into a [`Reply`](vocalis_core::reply::Reply).

pub mod messages;
pub mod session_usecase;

pub use session_usecase::SessionUseCase;
