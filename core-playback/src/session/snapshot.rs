//! Resumable playback snapshot with throttled writes.

use crate::error::{PlaybackError, Result};
use bridge_traits::{Clock, SettingsStore};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Where the listener left off.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    pub recording_id: u32,
    pub performer_id: u32,
    pub position_seconds: f64,
}

/// Persists the single [`PlaybackSnapshot`] under one settings key.
///
/// Unforced saves within `min_interval` of the previous save are dropped;
/// forced saves always write.
pub struct SnapshotStore {
    settings: Arc<dyn SettingsStore>,
    clock: Arc<dyn Clock>,
    key: String,
    min_interval: Duration,
    last_saved_at: Mutex<Option<i64>>,
}

impl SnapshotStore {
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        clock: Arc<dyn Clock>,
        key: impl Into<String>,
        min_interval: Duration,
    ) -> Self {
        Self {
            settings,
            clock,
            key: key.into(),
            min_interval,
            last_saved_at: Mutex::new(None),
        }
    }

    /// Claims the write slot. Returns `false` when an unforced save is too soon.
    fn claim(&self, force: bool) -> bool {
        let now = self.clock.unix_timestamp_millis();
        let mut last = self.last_saved_at.lock();

        if !force {
            if let Some(previous) = *last {
                if now.saturating_sub(previous) < self.min_interval.as_millis() as i64 {
                    return false;
                }
            }
        }

        *last = Some(now);
        true
    }

    /// Writes `snapshot` unless throttled. Returns whether a write happened.
    pub async fn save(&self, snapshot: &PlaybackSnapshot, force: bool) -> Result<bool> {
        if !self.claim(force) {
            return Ok(false);
        }

        let json = serde_json::to_string(snapshot)?;
        self.settings
            .set_string(&self.key, &json)
            .await
            .map_err(|e| PlaybackError::Persistence(e.to_string()))?;

        debug!(
            recording = snapshot.recording_id,
            performer = snapshot.performer_id,
            position = snapshot.position_seconds,
            force,
            "Saved playback snapshot"
        );
        Ok(true)
    }

    /// Reads the stored snapshot. A malformed value reads as absent.
    pub async fn load(&self) -> Result<Option<PlaybackSnapshot>> {
        let Some(json) = self
            .settings
            .get_string(&self.key)
            .await
            .map_err(|e| PlaybackError::Persistence(e.to_string()))?
        else {
            return Ok(None);
        };

        match serde_json::from_str::<PlaybackSnapshot>(&json) {
            Ok(snapshot) if snapshot.position_seconds.is_finite() => Ok(Some(snapshot)),
            Ok(_) => Ok(None),
            Err(e) => {
                warn!(error = %e, "Ignoring malformed playback snapshot");
                Ok(None)
            }
        }
    }

    pub async fn clear(&self) -> Result<()> {
        self.settings
            .delete(&self.key)
            .await
            .map_err(|e| PlaybackError::Persistence(e.to_string()))
    }
}
