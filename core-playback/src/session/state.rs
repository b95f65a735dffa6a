//! Observable session state.

use crate::cache::CacheKey;
use crate::locator::{LocatorMode, SegmentLocator};
use bridge_traits::Segment;
use std::time::Duration;

/// Largest position, in seconds, the session holds or hands to the player.
pub const MAX_POSITION_SECONDS: f64 = 7.0 * 86_400.0;

/// Lifecycle phase of the playback session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// No recording selected.
    #[default]
    Idle,
    /// Source resolution or player load in flight.
    Loading,
    /// Loaded and not yet started.
    Ready,
    Playing,
    Paused,
}

/// What to play.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRequest {
    pub recording_id: u32,
    pub performer_id: u32,
    pub translation_id: Option<u32>,
    pub autoplay: bool,
    /// Initial position in seconds.
    pub start_position: f64,
}

impl SessionRequest {
    pub fn new(recording_id: u32, performer_id: u32) -> Self {
        Self {
            recording_id,
            performer_id,
            translation_id: None,
            autoplay: false,
            start_position: 0.0,
        }
    }

    pub fn with_translation(mut self, translation_id: u32) -> Self {
        self.translation_id = Some(translation_id);
        self
    }

    pub fn autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = autoplay;
        self
    }

    pub fn starting_at(mut self, seconds: f64) -> Self {
        self.start_position = seconds;
        self
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(self.performer_id, self.recording_id)
    }
}

/// Snapshot of everything a UI needs to render the player.
///
/// Replaced wholesale when a new recording or performer is loaded and reset
/// on stop. Cloning is cheap: segments and timeline are shared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub phase: SessionPhase,
    pub recording_id: Option<u32>,
    pub performer_id: Option<u32>,
    pub translation_id: Option<u32>,
    pub locator: SegmentLocator,
    pub current_segment: Option<usize>,
    /// Seconds.
    pub position: f64,
    /// Seconds, once the player reports it.
    pub duration: Option<f64>,
    pub is_playing: bool,
    /// Whether the current load was asked to start playing.
    pub autoplay: bool,
    pub is_ready: bool,
    pub is_loading: bool,
    /// Playing from a local file.
    pub is_cached: bool,
    pub is_downloading: bool,
    pub error_message: Option<String>,
    /// Whole seconds left on the sleep timer.
    pub sleep_timer_remaining: Option<Duration>,
    /// Load counter; bumps on every new load and on stop.
    pub generation: u64,
}

impl SessionState {
    pub fn segments(&self) -> &[Segment] {
        self.locator.segments()
    }

    pub fn timeline(&self) -> &[f64] {
        self.locator.timeline()
    }

    pub fn locator_mode(&self) -> LocatorMode {
        self.locator.mode()
    }

    pub fn cache_key(&self) -> Option<CacheKey> {
        Some(CacheKey::new(self.performer_id?, self.recording_id?))
    }

    pub fn has_session(&self) -> bool {
        self.recording_id.is_some()
    }

    /// Whether a replacement load should start playing: the pending
    /// autoplay request while loading, the player state afterwards.
    pub fn wants_playback(&self) -> bool {
        if self.phase == SessionPhase::Loading {
            self.autoplay
        } else {
            self.is_playing
        }
    }

    /// Recomputes the active segment. Returns `true` when it changed.
    pub(crate) fn relocate(&mut self) -> bool {
        let next = self.locator.locate(self.position, self.duration);
        let changed = next != self.current_segment;
        self.current_segment = next;
        changed
    }
}
