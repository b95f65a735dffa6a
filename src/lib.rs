//! Workspace facade crate.
//!
//! Re-exports the recital player core so host applications can depend on
//! `recital-workspace` alone. The `desktop-shims` feature (on by default)
//! lets [`runtime::config::CoreConfig`] fall back to the Tokio file system
//! and the reqwest downloader when the host does not inject its own.

pub use bridge_traits as bridge;
pub use core_playback as playback;
pub use core_runtime as runtime;

pub use core_playback::{
    CacheKey, ContentCache, PlaybackError, SessionController, SessionRequest, SessionState,
};
pub use core_runtime::config::CoreConfig;
