//! # Session Controller
//!
//! Owns the single active playback session and coordinates the catalog,
//! the content cache, the platform player and snapshot persistence.
//!
//! ## Loads
//!
//! [`SessionController::start_session`] replaces the session immediately and
//! spawns two tasks: one resolves the audio source and hands it to the
//! player, the other fetches segments and timing data and publishes the
//! timeline. Each load carries a generation number and a cancellation
//! token. A newer load cancels the previous token, and every result is
//! applied only when its generation and (recording, performer) pair still
//! match the live session.
//!
//! ## State
//!
//! State lives behind a synchronous mutex that is never held across an
//! `.await`. Every mutation is followed by a `watch` notification, so
//! [`SessionController::subscribe`] observers see each committed state.

use super::sleep_timer::SleepTimer;
use super::snapshot::{PlaybackSnapshot, SnapshotStore};
use super::state::{SessionPhase, SessionRequest, SessionState, MAX_POSITION_SECONDS};
use crate::cache::{CacheConfig, CacheKey, ContentCache};
use crate::error::{PlaybackError, Result};
use crate::locator::{LocatorMode, SegmentLocator};
use crate::timing::{normalize_timings, reconstruct_timeline, Timeline};
use bridge_traits::{
    AudioSourceInfo, LoadOptions, MediaPlayer, MediaSource, PlayerEvent, RecitationCatalog,
};
use core_async::sync::{mpsc, watch, CancellationToken, OnceCell};
use core_async::task::JoinHandle;
use core_async::time::{duration_from_secs_f64, Duration};
use core_runtime::config::{CoreConfig, PlaybackSettings};
use core_runtime::events::{CoreEvent, EventBus, SessionEvent};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Catalog answer for one load, fetched at most once and shared by its
/// timeline and source tasks.
type SourceLookup = Arc<OnceCell<Result<AudioSourceInfo>>>;

struct Inner {
    catalog: Arc<dyn RecitationCatalog>,
    player: Arc<dyn MediaPlayer>,
    cache: Arc<ContentCache>,
    snapshots: SnapshotStore,
    events: EventBus,
    settings: PlaybackSettings,
    state: Mutex<SessionState>,
    notifier: watch::Sender<SessionState>,
    load_token: Mutex<Option<CancellationToken>>,
    downloads: Mutex<HashSet<CacheKey>>,
    sleep_timer: SleepTimer,
}

/// Handle to the playback session. Clones share the same session.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<Inner>,
}

impl SessionController {
    /// Builds a controller from the runtime configuration and a shared cache.
    pub fn new(config: &CoreConfig, cache: Arc<ContentCache>) -> Self {
        let snapshots = SnapshotStore::new(
            config.settings_store.clone(),
            config.clock.clone(),
            config.playback.snapshot_key.clone(),
            config.playback.save_interval,
        );
        let (notifier, _) = watch::channel(SessionState::default());

        Self {
            inner: Arc::new(Inner {
                catalog: config.catalog.clone(),
                player: config.media_player.clone(),
                cache,
                snapshots,
                events: config.event_bus.clone().unwrap_or_else(EventBus::default),
                settings: config.playback.clone(),
                state: Mutex::new(SessionState::default()),
                notifier,
                load_token: Mutex::new(None),
                downloads: Mutex::new(HashSet::new()),
                sleep_timer: SleepTimer::default(),
            }),
        }
    }

    /// Builds a controller with a [`ContentCache`] over the configured
    /// file system and downloader.
    pub fn with_default_cache(config: &CoreConfig) -> Self {
        let mut cache = ContentCache::new(
            CacheConfig::default(),
            config.file_system.clone(),
            config.downloader.clone(),
        );
        if let Some(bus) = &config.event_bus {
            cache = cache.with_event_bus(bus.clone());
        }
        Self::new(config, Arc::new(cache))
    }

    pub fn cache(&self) -> &Arc<ContentCache> {
        &self.inner.cache
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.inner.state.lock().clone()
    }

    /// Receives every committed state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.notifier.subscribe()
    }

    pub fn events(&self) -> &EventBus {
        &self.inner.events
    }

    // ------------------------------------------------------------------
    // State plumbing
    // ------------------------------------------------------------------

    fn update<R>(&self, mutate: impl FnOnce(&mut SessionState) -> R) -> R {
        let (result, committed) = {
            let mut state = self.inner.state.lock();
            let result = mutate(&mut state);
            (result, state.clone())
        };
        self.inner.notifier.send_replace(committed);
        result
    }

    /// Applies `mutate` only while `generation` and `key` describe the live load.
    fn update_if_current<R>(
        &self,
        generation: u64,
        key: CacheKey,
        mutate: impl FnOnce(&mut SessionState) -> R,
    ) -> Option<R> {
        let (result, committed) = {
            let mut state = self.inner.state.lock();
            if state.generation != generation || state.cache_key() != Some(key) {
                return None;
            }
            let result = mutate(&mut state);
            (result, state.clone())
        };
        self.inner.notifier.send_replace(committed);
        Some(result)
    }

    fn is_current(&self, generation: u64, key: CacheKey) -> bool {
        let state = self.inner.state.lock();
        state.generation == generation && state.cache_key() == Some(key)
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.inner.events.emit(CoreEvent::Session(event));
    }

    fn require_session(&self) -> Result<SessionState> {
        let state = self.state();
        if state.has_session() {
            Ok(state)
        } else {
            Err(PlaybackError::NoActiveSession)
        }
    }

    async fn save_snapshot(&self, force: bool) {
        let snapshot = {
            let state = self.inner.state.lock();
            match (state.recording_id, state.performer_id) {
                (Some(recording_id), Some(performer_id)) => PlaybackSnapshot {
                    recording_id,
                    performer_id,
                    position_seconds: state.position,
                },
                _ => return,
            }
        };

        if let Err(e) = self.inner.snapshots.save(&snapshot, force).await {
            warn!(error = %e, "Failed to save playback snapshot");
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Starts loading a recording, superseding any load in flight.
    ///
    /// Returns the generation of the new load.
    #[instrument(skip(self, request), fields(recording = request.recording_id, performer = request.performer_id))]
    pub async fn start_session(&self, request: SessionRequest) -> u64 {
        let request = SessionRequest {
            start_position: sanitize_position(request.start_position),
            ..request
        };
        let token = CancellationToken::new();
        let generation = {
            let mut current = self.inner.load_token.lock();
            if let Some(previous) = current.replace(token.clone()) {
                previous.cancel();
            }
            self.update(|state| {
                let generation = state.generation + 1;
                *state = SessionState {
                    phase: SessionPhase::Loading,
                    recording_id: Some(request.recording_id),
                    performer_id: Some(request.performer_id),
                    translation_id: request.translation_id,
                    position: request.start_position,
                    autoplay: request.autoplay,
                    is_loading: true,
                    sleep_timer_remaining: state.sleep_timer_remaining,
                    generation,
                    ..SessionState::default()
                };
                generation
            })
        };

        info!(generation, "Starting playback session");
        self.emit(SessionEvent::LoadStarted {
            recording_id: request.recording_id,
            performer_id: request.performer_id,
            generation,
        });
        self.save_snapshot(true).await;

        let lookup = SourceLookup::default();

        let this = self.clone();
        let segment_request = request.clone();
        let segment_token = token.clone();
        let segment_lookup = lookup.clone();
        core_async::spawn(async move {
            this.load_segments(segment_request, generation, segment_token, segment_lookup)
                .await;
        });

        let this = self.clone();
        core_async::spawn(async move {
            this.load_source(request, generation, token, lookup).await;
        });

        generation
    }

    async fn lookup_source(
        &self,
        request: &SessionRequest,
        lookup: &SourceLookup,
    ) -> Result<AudioSourceInfo> {
        lookup
            .get_or_init(|| async {
                self.inner
                    .catalog
                    .fetch_audio_source(request.recording_id, request.performer_id)
                    .await
                    .map_err(PlaybackError::from)
            })
            .await
            .clone()
    }

    async fn load_segments(
        &self,
        request: SessionRequest,
        generation: u64,
        token: CancellationToken,
        lookup: SourceLookup,
    ) {
        let key = request.cache_key();
        let catalog = &self.inner.catalog;

        let segments = core_async::select! {
            _ = token.cancelled() => return,
            result = catalog.fetch_segments(request.recording_id, request.translation_id) => result,
        };
        let segments = match segments {
            Ok(segments) => segments,
            Err(e) => {
                warn!(error = %e, recording = request.recording_id, "Segments unavailable");
                return;
            }
        };

        let source = core_async::select! {
            _ = token.cancelled() => return,
            result = self.lookup_source(&request, &lookup) => result,
        };
        let timeline = match source {
            Ok(info) => {
                let anchors = normalize_timings(request.recording_id, &info.timings, info.duration_hint);
                let duration = info.duration_hint.or_else(|| self.inner.state.lock().duration);
                reconstruct_timeline(&segments, &anchors, duration)
            }
            Err(e) => {
                debug!(error = %e, "Timing data unavailable, locating by text weight");
                Timeline::new()
            }
        };

        let locator = SegmentLocator::new(segments, timeline);
        let count = locator.len();
        let precise = locator.mode() == LocatorMode::Precise;

        let applied = self.update_if_current(generation, key, |state| {
            state.locator = locator;
            state.relocate();
            state.current_segment
        });

        match applied {
            Some(current) => {
                debug!(segments = count, precise, "Published segment timeline");
                self.emit(SessionEvent::TimelineUpdated {
                    recording_id: request.recording_id,
                    segments: count,
                    precise,
                });
                if let Some(index) = current {
                    self.emit(SessionEvent::SegmentChanged {
                        recording_id: request.recording_id,
                        index,
                    });
                }
            }
            None => debug!(generation, "Discarding stale timeline"),
        }
    }

    /// Cached file, then cached URL, then the catalog.
    async fn resolve_source(
        &self,
        request: &SessionRequest,
        lookup: &SourceLookup,
    ) -> Result<MediaSource> {
        let key = request.cache_key();
        let cache = &self.inner.cache;

        if let Some(path) = cache.resolve_local_file(key).await {
            return Ok(MediaSource::LocalFile { path });
        }
        if let Some(url) = cache.resolve_cached_remote_url(key).await {
            return Ok(MediaSource::Remote { url });
        }

        let info = self.lookup_source(request, lookup).await?;
        if let Err(e) = cache.record_remote_url(key, &info.url).await {
            warn!(error = %e, "Could not record audio URL");
        }
        Ok(MediaSource::Remote { url: info.url })
    }

    async fn open_source(
        &self,
        request: &SessionRequest,
        generation: u64,
        lookup: &SourceLookup,
    ) -> Result<bool> {
        let source = self.resolve_source(request, lookup).await?;
        if !self.is_current(generation, request.cache_key()) {
            return Err(PlaybackError::Cancelled);
        }

        let from_cache = source.is_local();
        let options = LoadOptions {
            autoplay: request.autoplay,
            start_position: duration_from_secs_f64(request.start_position),
        };
        self.inner.player.load(source, options).await?;
        Ok(from_cache)
    }

    async fn load_source(
        &self,
        request: SessionRequest,
        generation: u64,
        token: CancellationToken,
        lookup: SourceLookup,
    ) {
        let key = request.cache_key();
        let result = core_async::select! {
            _ = token.cancelled() => Err(PlaybackError::Cancelled),
            result = self.open_source(&request, generation, &lookup) => result,
        };

        match result {
            Ok(from_cache) => {
                let applied = self.update_if_current(generation, key, |state| {
                    state.is_loading = false;
                    state.is_ready = true;
                    state.is_cached = from_cache;
                    state.is_playing = request.autoplay;
                    state.phase = if request.autoplay {
                        SessionPhase::Playing
                    } else {
                        SessionPhase::Ready
                    };
                });
                if applied.is_some() {
                    info!(from_cache, "Audio source ready");
                    self.emit(SessionEvent::Ready {
                        recording_id: request.recording_id,
                        from_cache,
                    });
                }
            }
            Err(PlaybackError::Cancelled) => debug!(generation, "Load superseded"),
            Err(e) => {
                let message = e.user_message();
                let applied = self.update_if_current(generation, key, |state| {
                    state.is_loading = false;
                    state.is_ready = false;
                    state.is_playing = false;
                    state.phase = SessionPhase::Idle;
                    state.error_message = Some(message.clone());
                });
                if applied.is_some() {
                    warn!(error = %e, "Failed to load audio source");
                    self.emit(SessionEvent::Error {
                        recording_id: Some(request.recording_id),
                        message,
                        recoverable: e.is_transient(),
                    });
                }
            }
        }
    }

    /// Restarts the current recording with another performer, keeping the
    /// position and whether it was playing.
    pub async fn update_reciter(&self, performer_id: u32) -> Result<u64> {
        let state = self.require_session()?;
        let recording_id = state.recording_id.ok_or(PlaybackError::NoActiveSession)?;

        let request = SessionRequest {
            recording_id,
            performer_id,
            translation_id: state.translation_id,
            autoplay: state.wants_playback(),
            start_position: state.position,
        };
        Ok(self.start_session(request).await)
    }

    /// Reopens the last saved session, paused at its saved position.
    ///
    /// Does nothing when a session is already active or nothing was saved.
    pub async fn restore_if_possible(&self) -> Result<bool> {
        if self.state().has_session() {
            return Ok(false);
        }
        let Some(snapshot) = self.inner.snapshots.load().await? else {
            return Ok(false);
        };
        if !(1..=self.inner.settings.chapter_count).contains(&snapshot.recording_id) {
            warn!(recording = snapshot.recording_id, "Saved recording is out of range");
            return Ok(false);
        }

        info!(
            recording = snapshot.recording_id,
            position = snapshot.position_seconds,
            "Restoring playback session"
        );
        let request = SessionRequest::new(snapshot.recording_id, snapshot.performer_id)
            .starting_at(snapshot.position_seconds);
        self.start_session(request).await;
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Transport
    // ------------------------------------------------------------------

    pub async fn play(&self) -> Result<()> {
        let state = self.require_session()?;
        self.inner.player.play().await?;

        self.update(|state| {
            state.is_playing = true;
            state.phase = SessionPhase::Playing;
        });
        if let Some(recording_id) = state.recording_id {
            self.emit(SessionEvent::Played { recording_id });
        }
        self.save_snapshot(true).await;
        Ok(())
    }

    pub async fn pause(&self) -> Result<()> {
        self.require_session()?;
        self.inner.player.pause().await?;

        let (recording_id, position) = self.update(|state| {
            state.is_playing = false;
            state.phase = SessionPhase::Paused;
            (state.recording_id, state.position)
        });
        if let Some(recording_id) = recording_id {
            self.emit(SessionEvent::Paused {
                recording_id,
                position_ms: (position * 1000.0) as u64,
            });
        }
        self.save_snapshot(true).await;
        Ok(())
    }

    pub async fn toggle_play_pause(&self) -> Result<()> {
        if self.state().is_playing {
            self.pause().await
        } else {
            self.play().await
        }
    }

    /// Ends the session. Pending loads and the sleep timer are cancelled and
    /// the final position is saved first.
    #[instrument(skip(self))]
    pub async fn stop(&self) -> Result<()> {
        if let Some(token) = self.inner.load_token.lock().take() {
            token.cancel();
        }
        self.inner.sleep_timer.cancel();
        self.save_snapshot(true).await;

        if let Err(e) = self.inner.player.stop().await {
            warn!(error = %e, "Player failed to stop");
        }

        let recording_id = self.update(|state| {
            let recording_id = state.recording_id;
            *state = SessionState {
                generation: state.generation + 1,
                ..SessionState::default()
            };
            recording_id
        });

        if let Some(recording_id) = recording_id {
            info!(recording = recording_id, "Playback stopped");
            self.emit(SessionEvent::Stopped { recording_id });
        }
        Ok(())
    }

    /// Moves to `position` seconds, clamped to the known duration.
    pub async fn seek(&self, position: f64) -> Result<()> {
        let state = self.require_session()?;
        let mut target = sanitize_position(position);
        if let Some(duration) = state.duration {
            target = target.min(duration);
        }

        self.inner.player.seek(duration_from_secs_f64(target)).await?;
        self.apply_position(target);
        self.save_snapshot(false).await;
        Ok(())
    }

    /// Seeks to the start of segment `index`. Returns `false` when the
    /// position cannot be determined yet.
    pub async fn seek_to_segment(&self, index: usize) -> Result<bool> {
        let state = self.require_session()?;
        let Some(position) = state.locator.seek_position(index, state.duration) else {
            return Ok(false);
        };
        self.seek(position).await?;
        Ok(true)
    }

    pub async fn skip_forward(&self) -> Result<()> {
        let state = self.require_session()?;
        self.seek(state.position + self.inner.settings.skip_interval.as_secs_f64())
            .await
    }

    pub async fn skip_backward(&self) -> Result<()> {
        let state = self.require_session()?;
        self.seek(state.position - self.inner.settings.skip_interval.as_secs_f64())
            .await
    }

    async fn change_chapter(&self, recording_id: u32, autoplay: bool) -> Result<()> {
        let state = self.require_session()?;
        let performer_id = state.performer_id.ok_or(PlaybackError::NoActiveSession)?;

        let mut request = SessionRequest::new(recording_id, performer_id).autoplay(autoplay);
        request.translation_id = state.translation_id;
        self.start_session(request).await;
        Ok(())
    }

    /// Loads the following chapter. Returns `false` at the last chapter.
    pub async fn next_chapter(&self) -> Result<bool> {
        let state = self.require_session()?;
        let current = state.recording_id.unwrap_or_default();
        if current >= self.inner.settings.chapter_count {
            return Ok(false);
        }
        self.change_chapter(current + 1, state.wants_playback()).await?;
        Ok(true)
    }

    /// Loads the preceding chapter. Returns `false` at the first chapter.
    pub async fn previous_chapter(&self) -> Result<bool> {
        let state = self.require_session()?;
        let current = state.recording_id.unwrap_or_default();
        if current <= 1 {
            return Ok(false);
        }
        self.change_chapter(current - 1, state.wants_playback()).await?;
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Player events
    // ------------------------------------------------------------------

    fn apply_position(&self, position: f64) {
        let changed = self.update(|state| {
            state.position = position;
            if state.relocate() {
                state.recording_id.zip(state.current_segment)
            } else {
                None
            }
        });

        if let Some((recording_id, index)) = changed {
            self.emit(SessionEvent::SegmentChanged {
                recording_id,
                index,
            });
        }
    }

    /// Applies a notification from the platform player.
    pub async fn handle_player_event(&self, event: PlayerEvent) {
        if !self.state().has_session() {
            debug!(?event, "Ignoring player event without a session");
            return;
        }

        match event {
            PlayerEvent::Position(position) => {
                if !position.is_finite() {
                    return;
                }
                // Until the new source is ready, positions belong to the old audio
                if self.state().phase == SessionPhase::Loading {
                    debug!(position, "Ignoring position while loading");
                    return;
                }
                self.apply_position(sanitize_position(position));
                self.save_snapshot(false).await;
            }
            PlayerEvent::Duration(duration) => {
                if duration.is_finite() && duration > 0.0 {
                    self.update(|state| {
                        state.duration = Some(duration);
                        state.relocate();
                    });
                }
            }
            PlayerEvent::Ready(ready) => {
                self.update(|state| {
                    state.is_ready = ready;
                    if ready {
                        state.is_loading = false;
                        if state.phase == SessionPhase::Loading {
                            state.phase = SessionPhase::Ready;
                        }
                    }
                });
            }
            PlayerEvent::Playing(playing) => {
                self.update(|state| {
                    state.is_playing = playing;
                    if playing {
                        state.phase = SessionPhase::Playing;
                    } else if state.phase == SessionPhase::Playing {
                        state.phase = SessionPhase::Paused;
                    }
                });
            }
            PlayerEvent::Completed => self.handle_completed().await,
            PlayerEvent::Failed { message } => {
                let recording_id = self.update(|state| {
                    state.is_playing = false;
                    state.is_loading = false;
                    if state.phase == SessionPhase::Playing || state.phase == SessionPhase::Loading {
                        state.phase = SessionPhase::Paused;
                    }
                    state.error_message = Some(message.clone());
                    state.recording_id
                });
                warn!(%message, "Player reported a failure");
                self.emit(SessionEvent::Error {
                    recording_id,
                    message,
                    recoverable: false,
                });
            }
        }
    }

    async fn handle_completed(&self) {
        let state = self.state();
        let Some(recording_id) = state.recording_id else {
            return;
        };
        self.emit(SessionEvent::Completed { recording_id });

        let settings = &self.inner.settings;
        if settings.auto_advance && recording_id < settings.chapter_count {
            info!(next = recording_id + 1, "Advancing to next chapter");
            if let Err(e) = self.change_chapter(recording_id + 1, true).await {
                warn!(error = %e, "Failed to advance chapter");
            }
            return;
        }

        self.update(|state| {
            state.is_playing = false;
            state.phase = SessionPhase::Paused;
            if let Some(duration) = state.duration {
                state.position = duration;
            }
        });
        self.save_snapshot(true).await;
    }

    /// Forwards every event from `events` into [`Self::handle_player_event`]
    /// until the sender is dropped.
    pub fn spawn_event_pump(&self, mut events: mpsc::Receiver<PlayerEvent>) -> JoinHandle<()> {
        let this = self.clone();
        core_async::spawn(async move {
            while let Some(event) = events.recv().await {
                this.handle_player_event(event).await;
            }
            debug!("Player event channel closed");
        })
    }

    // ------------------------------------------------------------------
    // Offline
    // ------------------------------------------------------------------

    /// Downloads the current recording in the background.
    ///
    /// Independent of loads: a later session change does not cancel it.
    /// Failure only records the error message. Returns `None` when a
    /// download of the same recording is already running.
    pub fn download_current_for_offline(&self) -> Result<Option<JoinHandle<()>>> {
        let key = self
            .state()
            .cache_key()
            .ok_or(PlaybackError::NoActiveSession)?;
        if !self.inner.downloads.lock().insert(key) {
            debug!(%key, "Download already in progress");
            return Ok(None);
        }
        self.update(|state| {
            state.is_downloading = true;
            state.error_message = None;
        });

        let this = self.clone();
        Ok(Some(core_async::spawn(async move {
            let result = this.download(key).await;
            this.inner.downloads.lock().remove(&key);
            this.update(|state| {
                if state.cache_key() != Some(key) {
                    return;
                }
                state.is_downloading = false;
                match &result {
                    Ok(_) => state.is_cached = true,
                    Err(e) => state.error_message = Some(e.user_message()),
                }
            });
        })))
    }

    async fn download(&self, key: CacheKey) -> Result<std::path::PathBuf> {
        let cache = &self.inner.cache;
        let url = match cache.resolve_cached_remote_url(key).await {
            Some(url) => url,
            None => {
                let info = self
                    .inner
                    .catalog
                    .fetch_audio_source(key.recording_id, key.performer_id)
                    .await?;
                if let Err(e) = cache.record_remote_url(key, &info.url).await {
                    warn!(error = %e, "Could not record audio URL");
                }
                info.url
            }
        };
        cache.download_if_absent(key, &url).await
    }

    // ------------------------------------------------------------------
    // Sleep timer
    // ------------------------------------------------------------------

    /// Pauses playback after `duration`, replacing any running timer.
    pub fn start_sleep_timer(&self, duration: Duration) -> JoinHandle<()> {
        let ticker = self.clone();
        let firer = self.clone();

        self.inner.sleep_timer.start(
            duration,
            move |remaining| {
                ticker.update(|state| state.sleep_timer_remaining = Some(remaining));
            },
            move || async move {
                let (recording_id, playing) = firer.update(|state| {
                    state.sleep_timer_remaining = None;
                    (state.recording_id, state.is_playing)
                });
                if playing {
                    if let Err(e) = firer.pause().await {
                        warn!(error = %e, "Sleep timer could not pause playback");
                    }
                }
                firer.emit(SessionEvent::SleepTimerFired { recording_id });
            },
        )
    }

    pub fn cancel_sleep_timer(&self) {
        self.inner.sleep_timer.cancel();
        self.update(|state| state.sleep_timer_remaining = None);
    }

    pub fn is_sleep_timer_active(&self) -> bool {
        self.inner.sleep_timer.is_active()
    }
}

fn sanitize_position(position: f64) -> f64 {
    if position.is_finite() {
        position.clamp(0.0, MAX_POSITION_SECONDS)
    } else {
        0.0
    }
}
