//! Persisted cache index.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::Result;

const INDEX_VERSION: u32 = 1;

/// Identifies one performer's rendition of one recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub performer_id: u32,
    pub recording_id: u32,
}

impl CacheKey {
    pub fn new(performer_id: u32, recording_id: u32) -> Self {
        Self {
            performer_id,
            recording_id,
        }
    }

    /// Local file name used for this key: `<performer>_<recording>.<ext>`.
    pub fn file_name(&self, extension: &str) -> String {
        format!("{}_{}.{}", self.performer_id, self.recording_id, extension)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.performer_id, self.recording_id)
    }
}

/// One indexed recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub recording_id: u32,
    pub performer_id: u32,
    pub remote_url: String,
    pub local_file_name: String,
    pub created_at: DateTime<Utc>,
    /// Set once the file has been stored locally.
    #[serde(default)]
    pub downloaded_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    pub fn key(&self) -> CacheKey {
        CacheKey::new(self.performer_id, self.recording_id)
    }

    pub fn is_downloaded(&self) -> bool {
        self.downloaded_at.is_some()
    }
}

#[derive(Serialize, Deserialize)]
struct IndexFile {
    version: u32,
    entries: Vec<CacheEntry>,
}

/// In-memory view of the index file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheIndex {
    entries: BTreeMap<CacheKey, CacheEntry>,
}

impl CacheIndex {
    pub fn get(&self, key: &CacheKey) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    pub fn upsert(&mut self, entry: CacheEntry) {
        self.entries.insert(entry.key(), entry);
    }

    pub fn remove(&mut self, key: &CacheKey) -> Option<CacheEntry> {
        self.entries.remove(key)
    }

    pub fn clear(&mut self) -> Vec<CacheEntry> {
        std::mem::take(&mut self.entries).into_values().collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &CacheEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        let file = IndexFile {
            version: INDEX_VERSION,
            entries: self.entries.values().cloned().collect(),
        };
        Ok(serde_json::to_vec_pretty(&file)?)
    }

    pub fn from_json(data: &[u8]) -> Result<Self> {
        let file: IndexFile = serde_json::from_slice(data)?;
        let entries = file
            .entries
            .into_iter()
            .map(|entry| (entry.key(), entry))
            .collect();
        Ok(Self { entries })
    }
}

pub(crate) fn is_valid_extension(ext: &str) -> bool {
    (1..=5).contains(&ext.len()) && ext.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Extension of the last path segment of `url`, if it is 1-5 ASCII
/// alphanumerics.
pub fn extension_from_url(url: &str) -> Option<String> {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    let path = match without_query.find("://") {
        Some(idx) => {
            let rest = &without_query[idx + 3..];
            rest.find('/').map(|slash| &rest[slash..]).unwrap_or("")
        }
        None => without_query,
    };

    let last_segment = path.rsplit('/').next()?;
    let (_, ext) = last_segment.rsplit_once('.')?;

    is_valid_extension(ext).then(|| ext.to_ascii_lowercase())
}
