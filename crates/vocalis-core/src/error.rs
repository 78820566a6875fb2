//! Error types for Vocalis.

use crate::session::SessionState;
use thiserror::Error;

/// Broad classification of a [`VocalisError`].
///
/// The reply layer uses this to decide whether the user sees a specific
/// message or the generic "try again later" text, and the logging layer uses
/// it to pick a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input or an event that does not fit the current state.
    Validation,
    /// Something the user referred to does not exist.
    NotFound,
    /// An external collaborator (synthesis, download, codec) failed.
    Upstream,
    /// The database or local filesystem failed.
    Persistence,
    /// Startup configuration is missing or malformed.
    Configuration,
    /// Should not happen in normal operation.
    Internal,
}

/// A shared error type for the entire Vocalis workspace.
#[derive(Error, Debug, Clone)]
pub enum VocalisError {
    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------
    #[error("Model name must not be empty")]
    EmptyModelName,

    #[error("Invalid model name '{name}': {reason}")]
    InvalidModelName { name: String, reason: &'static str },

    #[error("Model '{0}' already exists")]
    DuplicateModelName(String),

    #[error("Model limit reached ({max} models)")]
    ModelLimitReached { max: usize },

    #[error("Unexpected {event} event in state {state}")]
    UnexpectedEvent {
        event: &'static str,
        state: SessionState,
    },

    #[error("Text must not be empty")]
    EmptyText,

    #[error("Unknown callback payload: {0}")]
    UnknownCallback(String),

    // ------------------------------------------------------------------
    // Not found
    // ------------------------------------------------------------------
    #[error("No active model selected")]
    NoActiveModel,

    #[error("Model file missing: {0}")]
    ModelFileMissing(String),

    #[error("Model '{0}' not found")]
    ModelNotFound(String),

    #[error("User has no saved models")]
    NoModels,

    // ------------------------------------------------------------------
    // Upstream
    // ------------------------------------------------------------------
    #[error("Synthesis failed: {0}")]
    Synthesis(String),

    #[error("File download failed: {0}")]
    Download(String),

    #[error("Audio re-encoding failed: {0}")]
    RecodeFailed(String),

    #[error("Audio duration probe failed: {0}")]
    DurationProbeFailed(String),

    #[error("Transport error: {0}")]
    Transport(String),

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------
    #[error("Data access error: {0}")]
    DataAccess(String),

    #[error("IO error: {message}")]
    Io { message: String },

    // ------------------------------------------------------------------
    // Configuration / internal
    // ------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl VocalisError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a DataAccess error
    pub fn data_access(message: impl Into<String>) -> Self {
        Self::DataAccess(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a Synthesis error
    pub fn synthesis(message: impl Into<String>) -> Self {
        Self::Synthesis(message.into())
    }

    /// Creates a Download error
    pub fn download(message: impl Into<String>) -> Self {
        Self::Download(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Classification
    // ============================================================================

    /// Returns the broad kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyModelName
            | Self::InvalidModelName { .. }
            | Self::DuplicateModelName(_)
            | Self::ModelLimitReached { .. }
            | Self::UnexpectedEvent { .. }
            | Self::EmptyText
            | Self::UnknownCallback(_) => ErrorKind::Validation,
            Self::NoActiveModel
            | Self::ModelFileMissing(_)
            | Self::ModelNotFound(_)
            | Self::NoModels => ErrorKind::NotFound,
            Self::Synthesis(_)
            | Self::Download(_)
            | Self::RecodeFailed(_)
            | Self::DurationProbeFailed(_)
            | Self::Transport(_) => ErrorKind::Upstream,
            Self::DataAccess(_) | Self::Io { .. } => ErrorKind::Persistence,
            Self::Config(_) => ErrorKind::Configuration,
            Self::Cancelled | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    /// Check if this is a not-found error
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Check if this error came from an external collaborator
    pub fn is_upstream(&self) -> bool {
        self.kind() == ErrorKind::Upstream
    }

    /// Whether the user gets the specific error text rather than the generic
    /// failure message.
    pub fn is_user_facing(&self) -> bool {
        matches!(self.kind(), ErrorKind::Validation | ErrorKind::NotFound)
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for VocalisError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

/// A type alias for `Result<T, VocalisError>`.
pub type Result<T> = std::result::Result<T, VocalisError>;
