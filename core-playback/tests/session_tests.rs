//! Tests for the playback session controller
//!
//! Each test drives a controller wired to in-memory bridges and a mocked
//! catalog, observing it through the state channel and the event bus.

mod common;

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{
    AudioSourceInfo, BridgeError, MediaSource, PlayerEvent, RawTiming, RecitationCatalog,
    Segment,
};
use common::{
    audio_url, harness, harness_with, plain_catalog, segments, wait_for, MemorySettings,
    MockCatalog, PlayerCommand,
};
use core_async::sync::Notify;
use core_playback::{CacheKey, LocatorMode, SessionPhase, SessionRequest, MAX_POSITION_SECONDS};
use core_runtime::events::{CoreEvent, SessionEvent};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn timed_catalog() -> MockCatalog {
    let mut catalog = MockCatalog::new();
    catalog
        .expect_fetch_segments()
        .returning(|_, _| Ok(segments(4)));
    catalog
        .expect_fetch_audio_source()
        .returning(|recording, performer| {
            Ok(AudioSourceInfo::new(audio_url(recording, performer))
                .with_timings(vec![
                    RawTiming::keyed("1:1", 0.0),
                    RawTiming::keyed("1:2", 2000.0),
                    RawTiming::keyed("1:3", 5000.0),
                    RawTiming::keyed("1:4", 9000.0),
                ])
                .with_duration_hint(12.0))
        });
    catalog
}

/// Untimed catalog whose segment requests for `held` wait for `release`.
struct HeldSegmentsCatalog {
    held: u32,
    release: Arc<Notify>,
    held_calls: Arc<AtomicUsize>,
}

#[async_trait]
impl RecitationCatalog for HeldSegmentsCatalog {
    async fn fetch_segments(
        &self,
        recording_id: u32,
        _translation_id: Option<u32>,
    ) -> BridgeResult<Vec<Segment>> {
        if recording_id == self.held {
            self.held_calls.fetch_add(1, Ordering::SeqCst);
            self.release.notified().await;
            return Ok(segments(5));
        }
        Ok(segments(2))
    }

    async fn fetch_audio_source(
        &self,
        recording_id: u32,
        performer_id: u32,
    ) -> BridgeResult<AudioSourceInfo> {
        Ok(AudioSourceInfo::new(audio_url(recording_id, performer_id)))
    }
}

fn session_events(rx: &mut core_async::sync::broadcast::Receiver<CoreEvent>) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let CoreEvent::Session(event) = event {
            events.push(event);
        }
    }
    events
}

#[tokio::test]
async fn test_start_session_loads_remote_source_and_timeline() {
    let h = harness(timed_catalog());

    let generation = h
        .controller
        .start_session(SessionRequest::new(1, 7))
        .await;

    let state = wait_for(&h.controller, |s| {
        s.is_ready && s.locator_mode() == LocatorMode::Precise
    })
    .await;

    assert_eq!(state.generation, generation);
    assert_eq!(state.phase, SessionPhase::Ready);
    assert!(!state.is_loading);
    assert!(!state.is_cached);
    assert_eq!(state.timeline(), &[0.0, 2.0, 5.0, 9.0]);
    assert_eq!(state.current_segment, Some(0));

    assert_eq!(
        h.player.loads(),
        vec![MediaSource::Remote {
            url: audio_url(1, 7)
        }]
    );
    assert_eq!(
        h.controller
            .cache()
            .resolve_cached_remote_url(CacheKey::new(7, 1))
            .await,
        Some(audio_url(1, 7))
    );
}

#[tokio::test]
async fn test_autoplay_starts_in_playing_phase() {
    let h = harness(plain_catalog(3));

    h.controller
        .start_session(SessionRequest::new(1, 7).autoplay(true).starting_at(4.0))
        .await;
    let state = wait_for(&h.controller, |s| s.is_ready).await;

    assert_eq!(state.phase, SessionPhase::Playing);
    assert!(state.is_playing);
    match &h.player.commands()[0] {
        PlayerCommand::Load(_, options) => {
            assert!(options.autoplay);
            assert_eq!(options.start_position, Duration::from_secs(4));
        }
        other => panic!("unexpected command {:?}", other),
    }
}

#[tokio::test]
async fn test_position_events_track_precise_segments() {
    let h = harness(timed_catalog());
    let mut events = h.bus.subscribe();

    h.controller.start_session(SessionRequest::new(1, 7)).await;
    wait_for(&h.controller, |s| s.is_ready && s.locator_mode() == LocatorMode::Precise).await;

    h.controller
        .handle_player_event(PlayerEvent::Position(5.0))
        .await;
    assert_eq!(h.controller.state().current_segment, Some(2));

    h.controller
        .handle_player_event(PlayerEvent::Position(4.999))
        .await;
    assert_eq!(h.controller.state().current_segment, Some(1));

    let changes: Vec<usize> = session_events(&mut events)
        .into_iter()
        .filter_map(|e| match e {
            SessionEvent::SegmentChanged { index, .. } => Some(index),
            _ => None,
        })
        .collect();
    assert!(changes.ends_with(&[2, 1]));
}

#[tokio::test]
async fn test_weighted_fallback_without_timings() {
    let h = harness(plain_catalog(2));

    h.controller.start_session(SessionRequest::new(1, 7)).await;
    wait_for(&h.controller, |s| s.is_ready && s.segments().len() == 2).await;
    assert_eq!(h.controller.state().locator_mode(), LocatorMode::Weighted);

    h.controller
        .handle_player_event(PlayerEvent::Duration(100.0))
        .await;
    h.controller
        .handle_player_event(PlayerEvent::Position(50.0))
        .await;

    assert_eq!(h.controller.state().current_segment, Some(1));
}

#[tokio::test]
async fn test_segment_failure_degrades_silently() {
    let mut catalog = MockCatalog::new();
    catalog
        .expect_fetch_segments()
        .returning(|_, _| Err(BridgeError::Decoding("unexpected shape".into())));
    catalog
        .expect_fetch_audio_source()
        .returning(|recording, performer| Ok(AudioSourceInfo::new(audio_url(recording, performer))));
    let h = harness(catalog);

    h.controller.start_session(SessionRequest::new(1, 7)).await;
    let state = wait_for(&h.controller, |s| s.is_ready).await;

    assert_eq!(state.error_message, None);
    assert!(state.segments().is_empty());
    assert_eq!(state.current_segment, None);
}

#[tokio::test]
async fn test_missing_audio_sets_user_visible_error() {
    let mut catalog = MockCatalog::new();
    catalog
        .expect_fetch_segments()
        .returning(|_, _| Ok(segments(2)));
    catalog
        .expect_fetch_audio_source()
        .returning(|_, _| Err(BridgeError::NotFound("no audio".into())));
    let h = harness(catalog);
    let mut events = h.bus.subscribe();

    h.controller.start_session(SessionRequest::new(1, 7)).await;
    let state = wait_for(&h.controller, |s| s.error_message.is_some()).await;

    assert!(!state.is_loading);
    assert!(!state.is_ready);
    assert_eq!(state.phase, SessionPhase::Idle);
    assert_eq!(
        state.error_message.as_deref(),
        Some("Audio for this recording is not available.")
    );
    assert!(h.player.loads().is_empty());

    let errors: Vec<_> = session_events(&mut events)
        .into_iter()
        .filter(|e| matches!(e, SessionEvent::Error { .. }))
        .collect();
    assert_eq!(
        errors,
        vec![SessionEvent::Error {
            recording_id: Some(1),
            message: "Audio for this recording is not available.".into(),
            recoverable: false,
        }]
    );
}

#[tokio::test]
async fn test_player_load_failure_is_recoverable_when_transient() {
    let h = harness(plain_catalog(2));
    *h.player.fail_loads.lock() = Some(BridgeError::Transport("timeout".into()));

    h.controller.start_session(SessionRequest::new(1, 7)).await;
    let state = wait_for(&h.controller, |s| s.error_message.is_some()).await;

    assert_eq!(
        state.error_message.as_deref(),
        Some("Unable to reach the server. Check your connection and try again.")
    );
}

#[tokio::test]
async fn test_superseded_load_never_overwrites_newer_session() {
    let h = harness(plain_catalog(2));
    let gate = h.player.gate(&audio_url(1, 7));

    h.controller.start_session(SessionRequest::new(1, 7)).await;
    let second = h.controller.start_session(SessionRequest::new(2, 7)).await;
    wait_for(&h.controller, |s| s.is_ready).await;

    // Releasing the first load after the second finished changes nothing
    gate.notify_waiters();
    gate.notify_one();
    tokio::time::sleep(Duration::from_millis(20)).await;

    let state = h.controller.state();
    assert_eq!(state.recording_id, Some(2));
    assert_eq!(state.generation, second);
    assert!(state.is_ready);
    assert_eq!(
        h.player.loads(),
        vec![MediaSource::Remote {
            url: audio_url(2, 7)
        }]
    );
}

#[tokio::test]
async fn test_superseded_timeline_never_replaces_newer_segments() {
    let release = Arc::new(Notify::new());
    let held_calls = Arc::new(AtomicUsize::new(0));
    let h = harness(HeldSegmentsCatalog {
        held: 1,
        release: release.clone(),
        held_calls: held_calls.clone(),
    });

    h.controller.start_session(SessionRequest::new(1, 7)).await;
    tokio::time::timeout(Duration::from_secs(5), async {
        while held_calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("segment request never started");
    let second = h.controller.start_session(SessionRequest::new(2, 7)).await;
    wait_for(&h.controller, |s| s.is_ready && s.segments().len() == 2).await;

    release.notify_one();
    tokio::time::sleep(Duration::from_millis(20)).await;

    let state = h.controller.state();
    assert_eq!(state.recording_id, Some(2));
    assert_eq!(state.generation, second);
    assert_eq!(state.segments().len(), 2);
    assert_eq!(state.locator_mode(), LocatorMode::Weighted);
}

#[tokio::test]
async fn test_uncached_start_asks_catalog_for_source_once() {
    let mut catalog = MockCatalog::new();
    catalog
        .expect_fetch_segments()
        .returning(|_, _| Ok(segments(2)));
    catalog
        .expect_fetch_audio_source()
        .times(1)
        .returning(|recording, performer| Ok(AudioSourceInfo::new(audio_url(recording, performer))));
    let h = harness(catalog);

    h.controller.start_session(SessionRequest::new(1, 7)).await;
    let state = wait_for(&h.controller, |s| s.is_ready && s.segments().len() == 2).await;

    assert_eq!(state.error_message, None);
    assert_eq!(
        h.player.loads(),
        vec![MediaSource::Remote {
            url: audio_url(1, 7)
        }]
    );
}

#[tokio::test]
async fn test_positions_are_ignored_while_next_source_loads() {
    let h = harness(plain_catalog(2));
    let gate = h.player.gate(&audio_url(2, 7));

    h.controller.start_session(SessionRequest::new(1, 7)).await;
    wait_for(&h.controller, |s| s.is_ready).await;
    h.controller
        .handle_player_event(PlayerEvent::Position(30.0))
        .await;

    h.controller.start_session(SessionRequest::new(2, 7)).await;
    // Late report from the previous recording's audio
    h.controller
        .handle_player_event(PlayerEvent::Position(31.0))
        .await;
    let state = h.controller.state();
    assert_eq!(state.phase, SessionPhase::Loading);
    assert_eq!(state.position, 0.0);

    gate.notify_one();
    let state = wait_for(&h.controller, |s| s.is_ready).await;
    assert_eq!(state.position, 0.0);

    h.controller
        .handle_player_event(PlayerEvent::Position(4.0))
        .await;
    assert_eq!(h.controller.state().position, 4.0);
}

#[tokio::test]
async fn test_seek_past_unknown_duration_is_capped() {
    let h = harness(plain_catalog(2));

    h.controller.start_session(SessionRequest::new(1, 7)).await;
    wait_for(&h.controller, |s| s.is_ready).await;
    assert_eq!(h.controller.state().duration, None);

    h.controller.seek(1e300).await.unwrap();

    assert_eq!(h.controller.state().position, MAX_POSITION_SECONDS);
    assert_eq!(
        h.player.commands().last(),
        Some(&PlayerCommand::Seek(Duration::from_secs_f64(MAX_POSITION_SECONDS)))
    );
}

#[tokio::test]
async fn test_position_saves_are_debounced() {
    let h = harness(plain_catalog(2));

    h.controller.start_session(SessionRequest::new(1, 7)).await;
    wait_for(&h.controller, |s| s.is_ready).await;
    let after_start = h.settings.writes();
    assert_eq!(after_start, 1);

    h.clock.advance_millis(5_000);
    h.controller.seek(10.0).await.unwrap();
    assert_eq!(h.settings.writes(), after_start + 1);

    h.clock.advance_millis(900);
    h.controller.seek(12.0).await.unwrap();
    assert_eq!(h.settings.writes(), after_start + 1);

    h.controller.pause().await.unwrap();
    assert_eq!(h.settings.writes(), after_start + 2);

    let saved = h.settings.value("playback.snapshot").unwrap();
    let saved: serde_json::Value = serde_json::from_str(&saved).unwrap();
    assert_eq!(saved["recording_id"], 1);
    assert_eq!(saved["performer_id"], 7);
    assert_eq!(saved["position_seconds"], 12.0);
}

#[tokio::test]
async fn test_restore_resumes_paused_at_saved_position() {
    let settings = Arc::new(MemorySettings::default());
    {
        use bridge_traits::SettingsStore;
        settings
            .set_string(
                "playback.snapshot",
                r#"{"recording_id":3,"performer_id":7,"position_seconds":42.5}"#,
            )
            .await
            .unwrap();
    }
    let h = harness_with(plain_catalog(2), settings, |b| b);

    assert!(h.controller.restore_if_possible().await.unwrap());
    let state = wait_for(&h.controller, |s| s.is_ready).await;

    assert_eq!(state.recording_id, Some(3));
    assert_eq!(state.performer_id, Some(7));
    assert_eq!(state.position, 42.5);
    assert_eq!(state.phase, SessionPhase::Ready);
    match &h.player.commands()[0] {
        PlayerCommand::Load(_, options) => {
            assert!(!options.autoplay);
            assert_eq!(options.start_position, Duration::from_secs_f64(42.5));
        }
        other => panic!("unexpected command {:?}", other),
    }

    // Already active
    assert!(!h.controller.restore_if_possible().await.unwrap());
}

#[tokio::test]
async fn test_restore_caps_oversized_saved_position() {
    let settings = Arc::new(MemorySettings::default());
    {
        use bridge_traits::SettingsStore;
        settings
            .set_string(
                "playback.snapshot",
                r#"{"recording_id":3,"performer_id":7,"position_seconds":1e300}"#,
            )
            .await
            .unwrap();
    }
    let h = harness_with(plain_catalog(2), settings, |b| b);

    assert!(h.controller.restore_if_possible().await.unwrap());
    let state = wait_for(&h.controller, |s| s.is_ready).await;

    assert_eq!(state.phase, SessionPhase::Ready);
    assert_eq!(state.error_message, None);
    assert_eq!(state.position, MAX_POSITION_SECONDS);
    match &h.player.commands()[0] {
        PlayerCommand::Load(_, options) => {
            assert_eq!(
                options.start_position,
                Duration::from_secs_f64(MAX_POSITION_SECONDS)
            );
        }
        other => panic!("unexpected command {:?}", other),
    }
}

#[tokio::test]
async fn test_restore_without_snapshot_does_nothing() {
    let h = harness(plain_catalog(2));
    assert!(!h.controller.restore_if_possible().await.unwrap());
    assert!(!h.controller.state().has_session());
}

#[tokio::test]
async fn test_update_reciter_keeps_position_and_intent() {
    let h = harness(plain_catalog(2));

    h.controller
        .start_session(SessionRequest::new(2, 7).autoplay(true))
        .await;
    wait_for(&h.controller, |s| s.is_ready).await;
    h.controller
        .handle_player_event(PlayerEvent::Position(30.0))
        .await;

    h.controller.update_reciter(9).await.unwrap();
    let state = wait_for(&h.controller, |s| s.performer_id == Some(9) && s.is_ready).await;

    assert_eq!(state.recording_id, Some(2));
    assert_eq!(state.position, 30.0);
    assert!(state.is_playing);
    match h.player.commands().last() {
        Some(PlayerCommand::Load(MediaSource::Remote { url }, options)) => {
            assert_eq!(url, &audio_url(2, 9));
            assert!(options.autoplay);
            assert_eq!(options.start_position, Duration::from_secs(30));
        }
        other => panic!("unexpected command {:?}", other),
    }
}

#[tokio::test]
async fn test_update_reciter_during_autoplay_load_keeps_autoplay() {
    let h = harness(plain_catalog(2));
    let _gate = h.player.gate(&audio_url(2, 7));

    h.controller
        .start_session(SessionRequest::new(2, 7).autoplay(true))
        .await;
    assert_eq!(h.controller.state().phase, SessionPhase::Loading);

    h.controller.update_reciter(9).await.unwrap();
    let state = wait_for(&h.controller, |s| s.performer_id == Some(9) && s.is_ready).await;

    assert!(state.is_playing);
    assert_eq!(state.phase, SessionPhase::Playing);
    match h.player.commands().last() {
        Some(PlayerCommand::Load(MediaSource::Remote { url }, options)) => {
            assert_eq!(url, &audio_url(2, 9));
            assert!(options.autoplay);
        }
        other => panic!("unexpected command {:?}", other),
    }
}

#[tokio::test]
async fn test_commands_without_session_fail() {
    let h = harness(plain_catalog(2));

    assert!(h.controller.play().await.is_err());
    assert!(h.controller.update_reciter(3).await.is_err());
    assert!(h.controller.download_current_for_offline().is_err());
    assert!(h.player.commands().is_empty());
}

#[tokio::test]
async fn test_offline_download_then_local_playback() {
    let h = harness(plain_catalog(2));

    h.controller.start_session(SessionRequest::new(1, 7)).await;
    wait_for(&h.controller, |s| s.is_ready).await;

    let handle = h.controller.download_current_for_offline().unwrap().unwrap();
    // A second request for the same recording joins the running one
    assert!(h.controller.download_current_for_offline().unwrap().is_none());
    handle.await.unwrap();

    let state = h.controller.state();
    assert!(!state.is_downloading);
    assert!(state.is_cached);
    assert_eq!(h.downloader.calls(), 1);

    h.controller.stop().await.unwrap();
    h.controller.start_session(SessionRequest::new(1, 7)).await;
    let state = wait_for(&h.controller, |s| s.is_ready).await;

    assert!(state.is_cached);
    assert!(h.player.loads().last().unwrap().is_local());
}

#[tokio::test]
async fn test_offline_download_failure_sets_message_only() {
    let h = harness(plain_catalog(2));
    *h.downloader.fail_with.lock() = Some("reset".into());

    h.controller.start_session(SessionRequest::new(1, 7)).await;
    wait_for(&h.controller, |s| s.is_ready).await;

    h.controller
        .download_current_for_offline()
        .unwrap()
        .unwrap()
        .await
        .unwrap();

    let state = h.controller.state();
    assert!(!state.is_downloading);
    assert!(!state.is_cached);
    assert!(state.is_ready);
    assert_eq!(
        state.error_message.as_deref(),
        Some("Unable to reach the server. Check your connection and try again.")
    );
}

#[tokio::test]
async fn test_stop_resets_session() {
    let h = harness(plain_catalog(2));
    let mut events = h.bus.subscribe();

    let generation = h
        .controller
        .start_session(SessionRequest::new(1, 7).autoplay(true))
        .await;
    wait_for(&h.controller, |s| s.is_ready).await;
    h.controller.stop().await.unwrap();

    let state = h.controller.state();
    assert_eq!(state.phase, SessionPhase::Idle);
    assert_eq!(state.recording_id, None);
    assert!(state.generation > generation);
    assert_eq!(h.player.commands().last(), Some(&PlayerCommand::Stop));
    assert!(session_events(&mut events).contains(&SessionEvent::Stopped { recording_id: 1 }));
}

#[tokio::test]
async fn test_seek_to_segment_and_skip() {
    let h = harness(timed_catalog());

    h.controller.start_session(SessionRequest::new(1, 7)).await;
    wait_for(&h.controller, |s| s.is_ready && s.locator_mode() == LocatorMode::Precise).await;
    h.controller
        .handle_player_event(PlayerEvent::Duration(12.0))
        .await;

    assert!(h.controller.seek_to_segment(2).await.unwrap());
    assert_eq!(h.controller.state().position, 5.0);
    assert_eq!(h.controller.state().current_segment, Some(2));

    h.controller.skip_forward().await.unwrap();
    assert_eq!(h.controller.state().position, 12.0);

    h.controller.skip_backward().await.unwrap();
    h.controller.skip_backward().await.unwrap();
    assert_eq!(h.controller.state().position, 0.0);
    assert_eq!(
        h.player.commands().last(),
        Some(&PlayerCommand::Seek(Duration::ZERO))
    );
}

#[tokio::test]
async fn test_chapter_navigation_stops_at_bounds() {
    let h = harness_with(plain_catalog(2), Arc::new(MemorySettings::default()), |b| {
        b.chapter_count(3)
    });

    h.controller.start_session(SessionRequest::new(3, 7)).await;
    assert!(!h.controller.next_chapter().await.unwrap());

    assert!(h.controller.previous_chapter().await.unwrap());
    assert!(h.controller.previous_chapter().await.unwrap());
    assert_eq!(h.controller.state().recording_id, Some(1));
    assert!(!h.controller.previous_chapter().await.unwrap());
}

#[tokio::test]
async fn test_completion_advances_to_next_chapter() {
    let h = harness(plain_catalog(2));

    h.controller
        .start_session(SessionRequest::new(1, 7).autoplay(true))
        .await;
    wait_for(&h.controller, |s| s.is_ready).await;

    h.controller.handle_player_event(PlayerEvent::Completed).await;
    let state = wait_for(&h.controller, |s| s.recording_id == Some(2) && s.is_ready).await;

    assert!(state.is_playing);
    assert_eq!(state.position, 0.0);
}

#[tokio::test]
async fn test_completion_without_auto_advance_pauses_at_end() {
    let h = harness_with(plain_catalog(2), Arc::new(MemorySettings::default()), |b| {
        b.auto_advance(false)
    });

    h.controller
        .start_session(SessionRequest::new(1, 7).autoplay(true))
        .await;
    wait_for(&h.controller, |s| s.is_ready).await;
    h.controller
        .handle_player_event(PlayerEvent::Duration(80.0))
        .await;
    let before = h.settings.writes();

    h.controller.handle_player_event(PlayerEvent::Completed).await;

    let state = h.controller.state();
    assert_eq!(state.recording_id, Some(1));
    assert_eq!(state.phase, SessionPhase::Paused);
    assert!(!state.is_playing);
    assert_eq!(state.position, 80.0);
    assert_eq!(h.settings.writes(), before + 1);
}

#[tokio::test]
async fn test_event_pump_applies_events_in_order() {
    let h = harness(timed_catalog());
    h.controller.start_session(SessionRequest::new(1, 7)).await;
    wait_for(&h.controller, |s| s.is_ready && s.locator_mode() == LocatorMode::Precise).await;

    let (tx, rx) = core_async::sync::mpsc::channel(8);
    let pump = h.controller.spawn_event_pump(rx);

    tx.send(PlayerEvent::Playing(true)).await.unwrap();
    tx.send(PlayerEvent::Position(2.5)).await.unwrap();
    tx.send(PlayerEvent::Position(9.5)).await.unwrap();
    drop(tx);
    pump.await.unwrap();

    let state = h.controller.state();
    assert_eq!(state.phase, SessionPhase::Playing);
    assert_eq!(state.position, 9.5);
    assert_eq!(state.current_segment, Some(3));
}

#[tokio::test]
async fn test_player_failure_surfaces_message() {
    let h = harness(plain_catalog(2));
    h.controller
        .start_session(SessionRequest::new(1, 7).autoplay(true))
        .await;
    wait_for(&h.controller, |s| s.is_ready).await;

    h.controller
        .handle_player_event(PlayerEvent::Failed {
            message: "decoder error".into(),
        })
        .await;

    let state = h.controller.state();
    assert!(!state.is_playing);
    assert_eq!(state.error_message.as_deref(), Some("decoder error"));
}

#[tokio::test(start_paused = true)]
async fn test_sleep_timer_pauses_playback() {
    let h = harness(plain_catalog(2));
    let mut events = h.bus.subscribe();

    h.controller
        .start_session(SessionRequest::new(1, 7).autoplay(true))
        .await;
    h.controller.play().await.unwrap();

    h.controller
        .start_sleep_timer(Duration::from_secs(3))
        .await
        .unwrap();

    let state = h.controller.state();
    assert!(!state.is_playing);
    assert_eq!(state.phase, SessionPhase::Paused);
    assert_eq!(state.sleep_timer_remaining, None);
    assert!(h.player.commands().contains(&PlayerCommand::Pause));
    assert!(session_events(&mut events)
        .contains(&SessionEvent::SleepTimerFired { recording_id: Some(1) }));
}

#[tokio::test(start_paused = true)]
async fn test_sleep_timer_counts_down_and_cancels() {
    let h = harness(plain_catalog(2));
    h.controller.start_session(SessionRequest::new(1, 7)).await;

    let handle = h.controller.start_sleep_timer(Duration::from_secs(60));
    tokio::time::sleep(Duration::from_millis(1500)).await;

    assert_eq!(
        h.controller.state().sleep_timer_remaining,
        Some(Duration::from_secs(59))
    );
    assert!(h.controller.is_sleep_timer_active());

    h.controller.cancel_sleep_timer();
    handle.await.unwrap();

    assert_eq!(h.controller.state().sleep_timer_remaining, None);
    assert!(!h.controller.is_sleep_timer_active());
    assert!(!h.player.commands().contains(&PlayerCommand::Pause));
}
