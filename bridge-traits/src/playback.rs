//! Media player bridge.
//!
//! The host owns the actual audio pipeline (AVPlayer, ExoPlayer, an HTML
//! audio element, rodio on desktop). The core drives it through
//! [`MediaPlayer`] commands and learns about progress through
//! [`PlayerEvent`]s that the host forwards in the order it observed them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::Result;

/// Where the player should read media from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaSource {
    /// File already present in the offline cache.
    LocalFile { path: PathBuf },
    /// Remote URL to stream.
    Remote { url: String },
}

impl MediaSource {
    pub fn is_local(&self) -> bool {
        matches!(self, MediaSource::LocalFile { .. })
    }
}

/// Options accompanying a [`MediaPlayer::load`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadOptions {
    /// Start playing as soon as the media is ready.
    pub autoplay: bool,
    /// Initial position.
    pub start_position: Duration,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            autoplay: false,
            start_position: Duration::ZERO,
        }
    }
}

/// Signals emitted by the host player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlayerEvent {
    /// Current playback position in seconds.
    Position(f64),
    /// Media duration in seconds, once known.
    Duration(f64),
    /// Whether the loaded item can start playing.
    Ready(bool),
    /// Whether the player is currently producing audio.
    Playing(bool),
    /// The loaded item played to its end.
    Completed,
    /// The player gave up on the loaded item.
    Failed { message: String },
}

/// Platform media-playback primitive.
#[async_trait]
pub trait MediaPlayer: Send + Sync {
    /// Replace the current item with `source`.
    async fn load(&self, source: MediaSource, options: LoadOptions) -> Result<()>;

    async fn play(&self) -> Result<()>;

    async fn pause(&self) -> Result<()>;

    /// Seek to an absolute position.
    async fn seek(&self, position: Duration) -> Result<()>;

    /// Stop playback and release the current item.
    async fn stop(&self) -> Result<()>;
}
