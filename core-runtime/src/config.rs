//! # Core Configuration Module
//!
//! Provides configuration management for the Recital Player Core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds every bridge the playback session needs plus the
//! tunables that shape its behavior. It enforces fail-fast validation so a
//! host learns about a missing bridge at startup rather than on first play.
//!
//! ## Required Dependencies
//!
//! - `RecitationCatalog` - Segments, audio URLs and timing data
//! - `MediaPlayer` - Platform audio playback
//! - `SettingsStore` - Resumable snapshot persistence
//!
//! ## Optional Dependencies (with platform defaults)
//!
//! - `FileSystemAccess` - Offline cache storage (desktop default: tokio fs)
//! - `Downloader` - Offline downloads (desktop default: reqwest)
//! - `Clock` - Wall clock for snapshot throttling (default: system clock)
//! - `EventBus` - Session and cache notifications (default: none)
//!
//! When the `desktop-shims` feature is enabled, desktop-ready defaults for
//! `FileSystemAccess` and `Downloader` are injected automatically if not
//! provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .catalog(Arc::new(MyCatalog))
//!     .media_player(Arc::new(MyPlayer))
//!     .settings_store(Arc::new(MySettings))
//!     .file_system(Arc::new(MyFileSystem))
//!     .downloader(Arc::new(MyDownloader))
//!     .skip_interval(Duration::from_secs(15))
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use crate::events::EventBus;
use bridge_traits::{
    Clock, Downloader, FileSystemAccess, MediaPlayer, RecitationCatalog, SettingsStore,
    SystemClock,
};
use std::sync::Arc;
use std::time::Duration;

/// Settings key under which the resumable playback snapshot is stored.
pub const DEFAULT_SNAPSHOT_KEY: &str = "playback.snapshot";

/// Number of chapters in the default catalog.
pub const DEFAULT_CHAPTER_COUNT: u32 = 114;

/// Tunables for the playback session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackSettings {
    /// Minimum time between two unforced snapshot writes.
    pub save_interval: Duration,
    /// Distance covered by skip forward/backward.
    pub skip_interval: Duration,
    /// Highest chapter number; chapters are numbered from 1.
    pub chapter_count: u32,
    /// Start the next chapter automatically when one finishes.
    pub auto_advance: bool,
    /// Settings key for the persisted snapshot.
    pub snapshot_key: String,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            save_interval: Duration::from_secs(1),
            skip_interval: Duration::from_secs(10),
            chapter_count: DEFAULT_CHAPTER_COUNT,
            auto_advance: true,
            snapshot_key: DEFAULT_SNAPSHOT_KEY.to_string(),
        }
    }
}

impl PlaybackSettings {
    /// Validates the settings.
    pub fn validate(&self) -> Result<()> {
        if self.chapter_count == 0 {
            return Err(Error::Config(
                "Chapter count must be at least 1".to_string(),
            ));
        }

        if self.save_interval.is_zero() {
            return Err(Error::Config(
                "Snapshot save interval must be greater than 0".to_string(),
            ));
        }

        if self.skip_interval.is_zero() {
            return Err(Error::Config(
                "Skip interval must be greater than 0".to_string(),
            ));
        }

        if self.snapshot_key.is_empty() {
            return Err(Error::Config("Snapshot key cannot be empty".to_string()));
        }

        Ok(())
    }
}

/// Core configuration for the Recital Player Core.
///
/// This struct holds all dependencies and settings required to construct a
/// playback session. Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Remote catalog (required)
    pub catalog: Arc<dyn RecitationCatalog>,

    /// Platform audio player (required)
    pub media_player: Arc<dyn MediaPlayer>,

    /// Snapshot persistence (required)
    pub settings_store: Arc<dyn SettingsStore>,

    /// File system access for the offline cache
    pub file_system: Arc<dyn FileSystemAccess>,

    /// Download primitive for the offline cache
    pub downloader: Arc<dyn Downloader>,

    /// Wall clock
    pub clock: Arc<dyn Clock>,

    /// Optional event bus for session and cache notifications
    pub event_bus: Option<EventBus>,

    /// Session tunables
    pub playback: PlaybackSettings,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("catalog", &"RecitationCatalog { ... }")
            .field("media_player", &"MediaPlayer { ... }")
            .field("settings_store", &"SettingsStore { ... }")
            .field("file_system", &"FileSystemAccess { ... }")
            .field("downloader", &"Downloader { ... }")
            .field("clock", &"Clock { ... }")
            .field("event_bus", &self.event_bus)
            .field("playback", &self.playback)
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        self.playback.validate()
    }
}

fn capability_missing(capability: &str, purpose: &str) -> Error {
    Error::capability_missing(
        capability,
        format!(
            "{} implementation is required for {}. \
             Inject a platform adapter with CoreConfig::builder().",
            capability, purpose
        ),
    )
}

#[cfg(feature = "desktop-shims")]
fn provide_default_file_system() -> Result<Arc<dyn FileSystemAccess>> {
    use bridge_desktop::TokioFileSystem;

    let fs: Arc<dyn FileSystemAccess> = Arc::new(TokioFileSystem::new());
    Ok(fs)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_file_system() -> Result<Arc<dyn FileSystemAccess>> {
    Err(Error::capability_missing(
        "FileSystemAccess",
        "FileSystemAccess implementation is required for the offline cache. \
         Desktop: enable the 'desktop-shims' feature to use TokioFileSystem. \
         Mobile: inject the sandboxed app-directory adapter.",
    ))
}

#[cfg(feature = "desktop-shims")]
fn provide_default_downloader() -> Result<Arc<dyn Downloader>> {
    use bridge_desktop::ReqwestDownloader;

    let downloader: Arc<dyn Downloader> = Arc::new(ReqwestDownloader::new());
    Ok(downloader)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_downloader() -> Result<Arc<dyn Downloader>> {
    Err(Error::capability_missing(
        "Downloader",
        "Downloader implementation is required for offline downloads. \
         Desktop: enable the 'desktop-shims' feature to use ReqwestDownloader. \
         Mobile: inject the platform background-download adapter.",
    ))
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    catalog: Option<Arc<dyn RecitationCatalog>>,
    media_player: Option<Arc<dyn MediaPlayer>>,
    settings_store: Option<Arc<dyn SettingsStore>>,
    file_system: Option<Arc<dyn FileSystemAccess>>,
    downloader: Option<Arc<dyn Downloader>>,
    clock: Option<Arc<dyn Clock>>,
    event_bus: Option<EventBus>,
    playback: PlaybackSettings,
}

impl CoreConfigBuilder {
    /// Sets the recitation catalog.
    pub fn catalog(mut self, catalog: Arc<dyn RecitationCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Sets the platform media player.
    pub fn media_player(mut self, player: Arc<dyn MediaPlayer>) -> Self {
        self.media_player = Some(player);
        self
    }

    /// Sets the settings store used for snapshot persistence.
    pub fn settings_store(mut self, store: Arc<dyn SettingsStore>) -> Self {
        self.settings_store = Some(store);
        self
    }

    /// Sets the file system used by the offline cache.
    pub fn file_system(mut self, fs: Arc<dyn FileSystemAccess>) -> Self {
        self.file_system = Some(fs);
        self
    }

    /// Sets the download primitive used by the offline cache.
    pub fn downloader(mut self, downloader: Arc<dyn Downloader>) -> Self {
        self.downloader = Some(downloader);
        self
    }

    /// Overrides the wall clock (tests use a manual clock).
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Attaches an event bus.
    pub fn event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Minimum interval between unforced snapshot writes.
    pub fn save_interval(mut self, interval: Duration) -> Self {
        self.playback.save_interval = interval;
        self
    }

    /// Distance covered by skip forward/backward.
    pub fn skip_interval(mut self, interval: Duration) -> Self {
        self.playback.skip_interval = interval;
        self
    }

    /// Highest chapter number.
    pub fn chapter_count(mut self, count: u32) -> Self {
        self.playback.chapter_count = count;
        self
    }

    /// Enables or disables automatic advance to the next chapter.
    pub fn auto_advance(mut self, enabled: bool) -> Self {
        self.playback.auto_advance = enabled;
        self
    }

    /// Replaces all playback settings at once.
    pub fn playback_settings(mut self, settings: PlaybackSettings) -> Self {
        self.playback = settings;
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityMissing`] naming the first required bridge
    /// that was not provided (and has no platform default), or
    /// [`Error::Config`] when a setting is out of range.
    pub fn build(self) -> Result<CoreConfig> {
        let catalog = self
            .catalog
            .ok_or_else(|| capability_missing("RecitationCatalog", "segment and audio lookup"))?;

        let media_player = self
            .media_player
            .ok_or_else(|| capability_missing("MediaPlayer", "audio playback"))?;

        let settings_store = self
            .settings_store
            .ok_or_else(|| capability_missing("SettingsStore", "resumable playback snapshots"))?;

        let file_system = match self.file_system {
            Some(fs) => fs,
            None => provide_default_file_system()?,
        };

        let downloader = match self.downloader {
            Some(downloader) => downloader,
            None => provide_default_downloader()?,
        };

        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn Clock>);

        let config = CoreConfig {
            catalog,
            media_player,
            settings_store,
            file_system,
            downloader,
            clock,
            event_bus: self.event_bus,
            playback: self.playback,
        };

        config.validate()?;

        Ok(config)
    }
}
