//! # Offline Content Cache
//!
//! Durable map from (performer, recording) pairs to locally stored audio
//! files and the remote URLs they came from.
//!
//! ## Overview
//!
//! - Persistent JSON index stored next to the files via `FileSystemAccess`
//! - Self-healing: entries whose file vanished are purged on lookup
//! - Download-or-reuse with atomic placement of the downloaded file
//! - Fails open: an unreadable index behaves like an empty cache
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │     ContentCache                       │
//! │  - resolve_local_file()                │
//! │  - resolve_cached_remote_url()         │
//! │  - record_remote_url()                 │
//! │  - download_if_absent()                │
//! └────────┬───────────────────────────────┘
//!          │
//!          ├──> CacheIndex (JSON, temp file + rename)
//!          ├──> FileSystemAccess (Storage)
//!          └──> Downloader (temp file per request)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_playback::cache::{CacheConfig, CacheKey, ContentCache};
//!
//! let cache = ContentCache::new(CacheConfig::default(), fs, downloader);
//! let key = CacheKey::new(performer_id, recording_id);
//!
//! let path = cache.download_if_absent(key, &url).await?;
//! assert!(cache.is_cached(key).await);
//! ```

pub mod config;
pub mod index;
pub mod manager;

// Re-export commonly used types
pub use config::CacheConfig;
pub use index::{extension_from_url, CacheEntry, CacheIndex, CacheKey};
pub use manager::ContentCache;
