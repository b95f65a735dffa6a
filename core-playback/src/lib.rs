//! # Recital Playback Core
//!
//! Platform-independent playback logic for recited audio: every recording is
//! a sequence of text segments (verses), and the core keeps the text in step
//! with the audio.
//!
//! ## Overview
//!
//! - [`timing`]: normalizes sparse catalog timing data and reconstructs a
//!   start time for every segment
//! - [`locator`]: maps a playback position to the active segment and back
//! - [`cache`]: durable index of downloaded audio and known source URLs
//! - [`session`]: the playback session controller
//!
//! All I/O goes through the traits in `bridge-traits`; wiring happens through
//! `core_runtime::config::CoreConfig`.

pub mod cache;
pub mod error;
pub mod locator;
pub mod session;
pub mod timing;

pub use cache::{CacheConfig, CacheEntry, CacheKey, ContentCache};
pub use error::{PlaybackError, Result};
pub use locator::{LocatorMode, SegmentLocator};
pub use session::{
    PlaybackSnapshot, SessionController, SessionPhase, SessionRequest, SessionState,
    SnapshotStore, MAX_POSITION_SECONDS,
};
pub use timing::{normalize_timings, reconstruct_timeline, AnchorMap, Timeline};
