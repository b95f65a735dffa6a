//! # Host Bridge Traits
//!
//! Contracts between the recital player core and the host platform.
//!
//! ## Overview
//!
//! The core owns timing reconstruction, segment locating, the offline cache
//! index and the playback session. Everything that touches the outside
//! world is a trait in this crate, implemented per platform and injected at
//! construction time.
//!
//! ## Traits
//!
//! ### Content
//! - [`RecitationCatalog`](catalog::RecitationCatalog) - Segments, audio URLs and timing data
//! - [`Downloader`](download::Downloader) - URL to temporary file
//!
//! ### Playback
//! - [`MediaPlayer`](playback::MediaPlayer) - Load/play/pause/seek commands;
//!   progress arrives as [`PlayerEvent`](playback::PlayerEvent)s
//!
//! ### Storage
//! - [`FileSystemAccess`](storage::FileSystemAccess) - File I/O with atomic rename
//! - [`SettingsStore`](storage::SettingsStore) - Small key-value blobs
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Error Handling
//!
//! Every trait returns [`BridgeError`](error::BridgeError). Implementations
//! should classify failures precisely: the core surfaces
//! `Transport`/`Decoding`/`NotFound` failures of audio-source resolution to
//! the user but silently degrades when the same errors hit segment timing.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync`; implementations are shared via
//! `Arc` across background tasks.

pub mod catalog;
pub mod download;
pub mod error;
pub mod playback;
pub mod storage;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use catalog::{AudioSourceInfo, RawTiming, RecitationCatalog, Segment};
pub use download::Downloader;
pub use playback::{LoadOptions, MediaPlayer, MediaSource, PlayerEvent};
pub use storage::{FileMetadata, FileSystemAccess, SettingsStore};
pub use time::{Clock, ConsoleLogger, LogEntry, LogLevel, LoggerSink, ManualClock, SystemClock};
