//! In-memory bridges shared by the playback integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::{
    AudioSourceInfo, Downloader, FileMetadata, FileSystemAccess, LoadOptions, ManualClock,
    MediaPlayer, MediaSource, RecitationCatalog, Segment, SettingsStore,
};
use bytes::Bytes;
use core_async::sync::{watch, Notify};
use core_playback::{CacheConfig, ContentCache, SessionController, SessionState};
use core_runtime::config::CoreConfig;
use core_runtime::events::EventBus;
use mockall::mock;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

mock! {
    pub Catalog {}

    #[async_trait]
    impl RecitationCatalog for Catalog {
        async fn fetch_segments(
            &self,
            recording_id: u32,
            translation_id: Option<u32>,
        ) -> BridgeResult<Vec<Segment>>;

        async fn fetch_audio_source(
            &self,
            recording_id: u32,
            performer_id: u32,
        ) -> BridgeResult<AudioSourceInfo>;
    }
}

pub fn segments(count: usize) -> Vec<Segment> {
    (1..=count)
        .map(|n| Segment::new(n as u32, format!("1:{}", n), "x".repeat(10)))
        .collect()
}

pub fn audio_url(recording_id: u32, performer_id: u32) -> String {
    format!("https://cdn.example.test/{}/{:03}.mp3", performer_id, recording_id)
}

/// Catalog that serves `count` equal segments and an untimed source for
/// every recording.
pub fn plain_catalog(count: usize) -> MockCatalog {
    let mut catalog = MockCatalog::new();
    catalog
        .expect_fetch_segments()
        .returning(move |_, _| Ok(segments(count)));
    catalog
        .expect_fetch_audio_source()
        .returning(|recording, performer| Ok(AudioSourceInfo::new(audio_url(recording, performer))));
    catalog
}

// ----------------------------------------------------------------------------
// File system
// ----------------------------------------------------------------------------

pub struct MemoryFileSystem {
    root: PathBuf,
    files: Mutex<HashMap<PathBuf, Bytes>>,
    dirs: Mutex<HashSet<PathBuf>>,
    pub fail_writes: Mutex<bool>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self {
            root: PathBuf::from("/mem"),
            files: Mutex::new(HashMap::new()),
            dirs: Mutex::new(HashSet::new()),
            fail_writes: Mutex::new(false),
        }
    }

    pub fn cache_root(&self) -> PathBuf {
        self.root.join("cache")
    }

    pub fn file(&self, path: &Path) -> Option<Bytes> {
        self.files.lock().get(path).cloned()
    }

    pub fn insert(&self, path: PathBuf, data: &'static [u8]) {
        self.files.lock().insert(path, Bytes::from_static(data));
    }

    pub fn remove(&self, path: &Path) {
        self.files.lock().remove(path);
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<_> = self.files.lock().keys().cloned().collect();
        paths.sort();
        paths
    }
}

#[async_trait]
impl FileSystemAccess for MemoryFileSystem {
    async fn get_cache_directory(&self) -> BridgeResult<PathBuf> {
        Ok(self.cache_root())
    }

    async fn exists(&self, path: &Path) -> BridgeResult<bool> {
        Ok(self.files.lock().contains_key(path) || self.dirs.lock().contains(path))
    }

    async fn metadata(&self, path: &Path) -> BridgeResult<FileMetadata> {
        let data = self
            .file(path)
            .ok_or_else(|| BridgeError::NotFound(path.display().to_string()))?;
        Ok(FileMetadata {
            size: data.len() as u64,
            created_at: None,
            modified_at: None,
            is_directory: false,
        })
    }

    async fn create_dir_all(&self, path: &Path) -> BridgeResult<()> {
        self.dirs.lock().insert(path.to_path_buf());
        Ok(())
    }

    async fn read_file(&self, path: &Path) -> BridgeResult<Bytes> {
        self.file(path)
            .ok_or_else(|| BridgeError::NotFound(path.display().to_string()))
    }

    async fn write_file(&self, path: &Path, data: Bytes) -> BridgeResult<()> {
        if *self.fail_writes.lock() {
            return Err(BridgeError::OperationFailed("disk full".into()));
        }
        self.files.lock().insert(path.to_path_buf(), data);
        Ok(())
    }

    async fn delete_file(&self, path: &Path) -> BridgeResult<()> {
        self.files
            .lock()
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| BridgeError::NotFound(path.display().to_string()))
    }

    async fn rename(&self, from: &Path, to: &Path) -> BridgeResult<()> {
        let mut files = self.files.lock();
        let data = files
            .remove(from)
            .ok_or_else(|| BridgeError::NotFound(from.display().to_string()))?;
        files.insert(to.to_path_buf(), data);
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Downloader
// ----------------------------------------------------------------------------

/// Writes a fixed body into the shared file system for any URL.
pub struct FakeDownloader {
    fs: Arc<MemoryFileSystem>,
    calls: AtomicUsize,
    pub fail_with: Mutex<Option<String>>,
}

impl FakeDownloader {
    pub fn new(fs: Arc<MemoryFileSystem>) -> Self {
        Self {
            fs,
            calls: AtomicUsize::new(0),
            fail_with: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Downloader for FakeDownloader {
    async fn download(&self, _url: &str) -> BridgeResult<PathBuf> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        // Lets concurrent callers interleave like a network transfer would
        tokio::task::yield_now().await;
        if let Some(message) = self.fail_with.lock().clone() {
            return Err(BridgeError::Transport(message));
        }
        let path = PathBuf::from(format!("/mem/tmp/{}.part", n));
        self.fs.insert(path.clone(), b"ID3-audio");
        Ok(path)
    }
}

// ----------------------------------------------------------------------------
// Media player
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    Load(MediaSource, LoadOptions),
    Play,
    Pause,
    Seek(Duration),
    Stop,
}

/// Records every command. Loads of a gated URL block until released.
#[derive(Default)]
pub struct RecordingPlayer {
    commands: Mutex<Vec<PlayerCommand>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    pub fail_loads: Mutex<Option<BridgeError>>,
}

impl RecordingPlayer {
    pub fn commands(&self) -> Vec<PlayerCommand> {
        self.commands.lock().clone()
    }

    pub fn loads(&self) -> Vec<MediaSource> {
        self.commands()
            .into_iter()
            .filter_map(|c| match c {
                PlayerCommand::Load(source, _) => Some(source),
                _ => None,
            })
            .collect()
    }

    pub fn gate(&self, url: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates.lock().insert(url.to_string(), notify.clone());
        notify
    }

    fn record(&self, command: PlayerCommand) {
        self.commands.lock().push(command);
    }
}

#[async_trait]
impl MediaPlayer for RecordingPlayer {
    async fn load(&self, source: MediaSource, options: LoadOptions) -> BridgeResult<()> {
        if let Some(err) = self.fail_loads.lock().take() {
            return Err(err);
        }
        let gate = match &source {
            MediaSource::Remote { url } => self.gates.lock().get(url).cloned(),
            MediaSource::LocalFile { .. } => None,
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.record(PlayerCommand::Load(source, options));
        Ok(())
    }

    async fn play(&self) -> BridgeResult<()> {
        self.record(PlayerCommand::Play);
        Ok(())
    }

    async fn pause(&self) -> BridgeResult<()> {
        self.record(PlayerCommand::Pause);
        Ok(())
    }

    async fn seek(&self, position: Duration) -> BridgeResult<()> {
        self.record(PlayerCommand::Seek(position));
        Ok(())
    }

    async fn stop(&self) -> BridgeResult<()> {
        self.record(PlayerCommand::Stop);
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Settings
// ----------------------------------------------------------------------------

#[derive(Default)]
pub struct MemorySettings {
    values: Mutex<HashMap<String, String>>,
    writes: AtomicUsize,
}

impl MemorySettings {
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }
}

#[async_trait]
impl SettingsStore for MemorySettings {
    async fn set_string(&self, key: &str, value: &str) -> BridgeResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get_string(&self, key: &str) -> BridgeResult<Option<String>> {
        Ok(self.value(key))
    }

    async fn delete(&self, key: &str) -> BridgeResult<()> {
        self.values.lock().remove(key);
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Harness
// ----------------------------------------------------------------------------

pub struct Harness {
    pub controller: SessionController,
    pub player: Arc<RecordingPlayer>,
    pub settings: Arc<MemorySettings>,
    pub fs: Arc<MemoryFileSystem>,
    pub downloader: Arc<FakeDownloader>,
    pub clock: Arc<ManualClock>,
    pub bus: EventBus,
}

pub fn cache_over(fs: Arc<MemoryFileSystem>, downloader: Arc<FakeDownloader>) -> ContentCache {
    ContentCache::new(CacheConfig::default(), fs, downloader)
}

pub fn harness(catalog: impl RecitationCatalog + 'static) -> Harness {
    harness_with(catalog, Arc::new(MemorySettings::default()), |builder| builder)
}

pub fn harness_with(
    catalog: impl RecitationCatalog + 'static,
    settings: Arc<MemorySettings>,
    customize: impl FnOnce(core_runtime::config::CoreConfigBuilder) -> core_runtime::config::CoreConfigBuilder,
) -> Harness {
    let player = Arc::new(RecordingPlayer::default());
    let fs = Arc::new(MemoryFileSystem::new());
    let downloader = Arc::new(FakeDownloader::new(fs.clone()));
    let clock = Arc::new(ManualClock::new(0));
    let bus = EventBus::new(256);

    let builder = CoreConfig::builder()
        .catalog(Arc::new(catalog))
        .media_player(player.clone())
        .settings_store(settings.clone())
        .file_system(fs.clone())
        .downloader(downloader.clone())
        .clock(clock.clone())
        .event_bus(bus.clone());
    let config = customize(builder).build().expect("valid test config");

    let cache = Arc::new(cache_over(fs.clone(), downloader.clone()).with_event_bus(bus.clone()));
    let controller = SessionController::new(&config, cache);

    Harness {
        controller,
        player,
        settings,
        fs,
        downloader,
        clock,
        bus,
    }
}

/// Waits until the session state satisfies `predicate`.
pub async fn wait_for(
    controller: &SessionController,
    predicate: impl FnMut(&SessionState) -> bool,
) -> SessionState {
    let mut rx: watch::Receiver<SessionState> = controller.subscribe();
    let state = tokio::time::timeout(Duration::from_secs(5), rx.wait_for(predicate))
        .await
        .expect("state condition timed out")
        .expect("controller dropped")
        .clone();
    state
}
