//! Content cache manager

use super::config::CacheConfig;
use super::index::{extension_from_url, CacheEntry, CacheIndex, CacheKey};
use crate::error::{PlaybackError, Result};
use bridge_traits::{BridgeError, Downloader, FileSystemAccess};
use bytes::Bytes;
use chrono::Utc;
use core_async::sync::{Mutex, MutexGuard};
use core_runtime::events::{CacheEvent, CoreEvent, EventBus};
use core_runtime::logging::{redact_url, strip_path};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

fn cache_io(err: BridgeError) -> PlaybackError {
    PlaybackError::CacheIo(err.to_string())
}

fn display_path(path: &Path) -> String {
    strip_path(&path.to_string_lossy()).to_string()
}

/// Durable map from (performer, recording) to a local file and source URL.
///
/// The index is loaded on first use and every mutation rewrites it through
/// a temporary file and a rename. Index mutations are serialized by an async
/// mutex; downloads run outside the lock.
pub struct ContentCache {
    config: CacheConfig,
    fs: Arc<dyn FileSystemAccess>,
    downloader: Arc<dyn Downloader>,
    event_bus: Option<EventBus>,
    index: Mutex<Option<CacheIndex>>,
}

impl ContentCache {
    /// Create a new cache.
    ///
    /// Nothing touches storage until the first call.
    pub fn new(
        config: CacheConfig,
        fs: Arc<dyn FileSystemAccess>,
        downloader: Arc<dyn Downloader>,
    ) -> Self {
        Self {
            config,
            fs,
            downloader,
            event_bus: None,
            index: Mutex::new(None),
        }
    }

    /// Set event bus for download and purge events.
    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn emit(&self, event: CacheEvent) {
        if let Some(bus) = &self.event_bus {
            let _ = bus.emit(CoreEvent::Cache(event));
        }
    }

    async fn root(&self) -> Result<PathBuf> {
        let base = self.fs.get_cache_directory().await.map_err(cache_io)?;
        let root = base.join(&self.config.cache_directory);
        self.fs.create_dir_all(&root).await.map_err(cache_io)?;
        Ok(root)
    }

    fn index_path(&self, root: &Path) -> PathBuf {
        root.join(&self.config.index_file_name)
    }

    async fn read_index(&self) -> CacheIndex {
        let root = match self.root().await {
            Ok(root) => root,
            Err(e) => {
                warn!(error = %e, "Cache directory unavailable, starting with empty index");
                return CacheIndex::default();
            }
        };
        let path = self.index_path(&root);

        match self.fs.exists(&path).await {
            Ok(true) => {}
            Ok(false) => return CacheIndex::default(),
            Err(e) => {
                warn!(error = %e, "Could not probe cache index");
                return CacheIndex::default();
            }
        }

        let data = match self.fs.read_file(&path).await {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, "Could not read cache index");
                return CacheIndex::default();
            }
        };

        match CacheIndex::from_json(&data) {
            Ok(index) => {
                debug!(entries = index.len(), "Loaded cache index");
                index
            }
            Err(e) => {
                warn!(error = %e, "Cache index is corrupt, starting empty");
                CacheIndex::default()
            }
        }
    }

    /// Locks the index, loading it on first use.
    async fn lock_index(&self) -> MutexGuard<'_, Option<CacheIndex>> {
        let mut guard = self.index.lock().await;
        if guard.is_none() {
            *guard = Some(self.read_index().await);
        }
        guard
    }

    async fn persist(&self, index: &CacheIndex) -> Result<()> {
        let root = self.root().await?;
        let path = self.index_path(&root);
        let tmp = root.join(format!("{}.tmp", self.config.index_file_name));

        let data = index.to_json()?;
        self.fs
            .write_file(&tmp, Bytes::from(data))
            .await
            .map_err(cache_io)?;
        self.fs.rename(&tmp, &path).await.map_err(cache_io)?;

        debug!(entries = index.len(), "Persisted cache index");
        Ok(())
    }

    async fn persist_or_warn(&self, index: &CacheIndex) {
        if let Err(e) = self.persist(index).await {
            warn!(error = %e, "Failed to persist cache index");
        }
    }

    /// Local path for `key`, if its file is present.
    ///
    /// An entry whose downloaded file has disappeared is purged and the index
    /// rewritten.
    #[instrument(skip(self, key), fields(key = %key))]
    pub async fn resolve_local_file(&self, key: CacheKey) -> Option<PathBuf> {
        let mut guard = self.lock_index().await;
        let index = guard.as_mut()?;
        let entry = index.get(&key)?.clone();

        let root = match self.root().await {
            Ok(root) => root,
            Err(e) => {
                warn!(error = %e, "Cache directory unavailable");
                return None;
            }
        };
        let path = root.join(&entry.local_file_name);

        match self.fs.exists(&path).await {
            Ok(true) => return Some(path),
            Ok(false) => {}
            Err(e) => {
                warn!(error = %e, file = %display_path(&path), "Could not probe cached file");
                return None;
            }
        }

        if entry.is_downloaded() {
            info!(file = %display_path(&path), "Cached file missing, purging entry");
            index.remove(&key);
            self.persist_or_warn(index).await;
            self.emit(CacheEvent::EntryPurged {
                key: key.to_string(),
            });
        }

        None
    }

    /// Remote URL last recorded for `key`.
    pub async fn resolve_cached_remote_url(&self, key: CacheKey) -> Option<String> {
        let guard = self.lock_index().await;
        guard
            .as_ref()
            .and_then(|index| index.get(&key))
            .map(|entry| entry.remote_url.clone())
    }

    fn derived_file_name(&self, key: CacheKey, url: &str) -> String {
        let ext = extension_from_url(url).unwrap_or_else(|| self.config.default_extension.clone());
        key.file_name(&ext)
    }

    /// Remembers the remote URL for `key`.
    ///
    /// An existing local file name is kept so a downloaded file stays
    /// reachable when its source URL changes.
    #[instrument(skip(self, key, url), fields(key = %key, url = %redact_url(url)))]
    pub async fn record_remote_url(&self, key: CacheKey, url: &str) -> Result<()> {
        let mut guard = self.lock_index().await;
        let Some(index) = guard.as_mut() else {
            return Ok(());
        };

        let entry = match index.get(&key) {
            Some(existing) if existing.remote_url == url => return Ok(()),
            Some(existing) => CacheEntry {
                remote_url: url.to_string(),
                ..existing.clone()
            },
            None => CacheEntry {
                recording_id: key.recording_id,
                performer_id: key.performer_id,
                remote_url: url.to_string(),
                local_file_name: self.derived_file_name(key, url),
                created_at: Utc::now(),
                downloaded_at: None,
            },
        };

        index.upsert(entry);
        self.persist(index).await
    }

    /// Whether a local file is available for `key`.
    pub async fn is_cached(&self, key: CacheKey) -> bool {
        self.resolve_local_file(key).await.is_some()
    }

    /// Downloads `url` for `key` unless a valid local file already exists.
    ///
    /// The download lands in a temporary file which is renamed onto the
    /// destination, so concurrent duplicate requests never leave a partial
    /// file behind. Returns the final local path.
    #[instrument(skip(self, key, url), fields(key = %key, url = %redact_url(url)))]
    pub async fn download_if_absent(&self, key: CacheKey, url: &str) -> Result<PathBuf> {
        if let Some(existing) = self.resolve_local_file(key).await {
            debug!("Already cached");
            return Ok(existing);
        }

        info!("Starting offline download");
        self.emit(CacheEvent::DownloadStarted {
            key: key.to_string(),
        });

        match self.download_and_store(key, url).await {
            Ok((path, bytes)) => {
                info!(file = %display_path(&path), bytes, "Offline download complete");
                self.emit(CacheEvent::DownloadCompleted {
                    key: key.to_string(),
                    bytes,
                });
                Ok(path)
            }
            Err(e) => {
                warn!(error = %e, "Offline download failed");
                self.emit(CacheEvent::DownloadFailed {
                    key: key.to_string(),
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn download_and_store(&self, key: CacheKey, url: &str) -> Result<(PathBuf, u64)> {
        let tmp = self.downloader.download(url).await?;

        let file_name = {
            let guard = self.lock_index().await;
            guard
                .as_ref()
                .and_then(|index| index.get(&key))
                .map(|entry| entry.local_file_name.clone())
                .unwrap_or_else(|| self.derived_file_name(key, url))
        };

        let root = match self.root().await {
            Ok(root) => root,
            Err(e) => {
                let _ = self.fs.delete_file(&tmp).await;
                return Err(e);
            }
        };
        let dest = root.join(&file_name);

        if let Err(e) = self.fs.rename(&tmp, &dest).await {
            let _ = self.fs.delete_file(&tmp).await;
            return Err(cache_io(e));
        }

        let bytes = self
            .fs
            .metadata(&dest)
            .await
            .map(|meta| meta.size)
            .unwrap_or_default();

        let mut guard = self.lock_index().await;
        if let Some(index) = guard.as_mut() {
            let now = Utc::now();
            let created_at = index.get(&key).map(|e| e.created_at).unwrap_or(now);
            index.upsert(CacheEntry {
                recording_id: key.recording_id,
                performer_id: key.performer_id,
                remote_url: url.to_string(),
                local_file_name: file_name,
                created_at,
                downloaded_at: Some(now),
            });
            self.persist(index).await?;
        }

        Ok((dest, bytes))
    }

    /// Snapshot of all indexed entries.
    pub async fn entries(&self) -> Vec<CacheEntry> {
        let guard = self.lock_index().await;
        guard
            .as_ref()
            .map(|index| index.entries().cloned().collect())
            .unwrap_or_default()
    }

    /// Deletes the file and the entry for `key`. Returns whether an entry existed.
    #[instrument(skip(self, key), fields(key = %key))]
    pub async fn remove(&self, key: CacheKey) -> Result<bool> {
        let mut guard = self.lock_index().await;
        let Some(index) = guard.as_mut() else {
            return Ok(false);
        };
        let Some(entry) = index.remove(&key) else {
            return Ok(false);
        };

        self.delete_entry_file(&entry).await;
        self.persist(index).await?;
        info!("Removed cached recording");
        Ok(true)
    }

    /// Deletes every cached file and empties the index. Returns the number of
    /// entries removed.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<usize> {
        let mut guard = self.lock_index().await;
        let Some(index) = guard.as_mut() else {
            return Ok(0);
        };

        let removed = index.clear();
        for entry in &removed {
            self.delete_entry_file(entry).await;
        }
        self.persist(index).await?;

        info!(count = removed.len(), "Cleared offline cache");
        Ok(removed.len())
    }

    async fn delete_entry_file(&self, entry: &CacheEntry) {
        let Ok(root) = self.root().await else {
            return;
        };
        let path = root.join(&entry.local_file_name);
        if matches!(self.fs.exists(&path).await, Ok(true)) {
            if let Err(e) = self.fs.delete_file(&path).await {
                warn!(error = %e, file = %display_path(&path), "Failed to delete cached file");
            }
        }
    }
}
