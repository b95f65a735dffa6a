//! # Playback Error Types
//!
//! Error types for source resolution, the offline cache and the playback
//! session.

use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors that can occur during playback operations.
#[derive(Error, Debug, Clone)]
pub enum PlaybackError {
    // ========================================================================
    // Source Errors
    // ========================================================================
    /// Network failure while resolving or fetching a source.
    #[error("Network error: {0}")]
    Transport(String),

    /// The catalog answered with something that could not be understood.
    #[error("Invalid response: {0}")]
    Decoding(String),

    /// No playable audio exists for the requested recording.
    #[error("Audio not found: {0}")]
    MissingMedia(String),

    // ========================================================================
    // Cache Errors
    // ========================================================================
    /// Offline cache storage failed.
    #[error("Cache error: {0}")]
    CacheIo(String),

    // ========================================================================
    // Session Errors
    // ========================================================================
    /// The work was superseded by a newer load.
    #[error("Operation cancelled")]
    Cancelled,

    /// An operation needed a current recording but none is loaded.
    #[error("No active playback session")]
    NoActiveSession,

    /// The platform media player rejected a command.
    #[error("Player error: {0}")]
    Player(String),

    /// Snapshot persistence failed.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// JSON encoding or decoding of persisted state failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PlaybackError {
    /// Returns `true` if this error is transient and the operation can be retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, PlaybackError::Transport(_) | PlaybackError::CacheIo(_))
    }

    /// Returns `false` for errors the user should never see.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, PlaybackError::Cancelled)
    }

    /// Short message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            PlaybackError::Transport(_) => {
                "Unable to reach the server. Check your connection and try again.".to_string()
            }
            PlaybackError::Decoding(_) => "The server sent an unexpected response.".to_string(),
            PlaybackError::MissingMedia(_) => {
                "Audio for this recording is not available.".to_string()
            }
            PlaybackError::CacheIo(_) => "Offline storage is unavailable.".to_string(),
            PlaybackError::NoActiveSession => "Nothing is playing.".to_string(),
            PlaybackError::Cancelled => String::new(),
            other => other.to_string(),
        }
    }
}

impl From<BridgeError> for PlaybackError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::Transport(msg) => PlaybackError::Transport(msg),
            BridgeError::Decoding(msg) => PlaybackError::Decoding(msg),
            BridgeError::NotFound(msg) => PlaybackError::MissingMedia(msg),
            BridgeError::Io(e) => PlaybackError::CacheIo(e.to_string()),
            BridgeError::NotAvailable(msg) => PlaybackError::Player(msg),
            BridgeError::OperationFailed(msg) => PlaybackError::Player(msg),
        }
    }
}

impl From<serde_json::Error> for PlaybackError {
    fn from(err: serde_json::Error) -> Self {
        PlaybackError::Serialization(err.to_string())
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
