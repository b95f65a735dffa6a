//! Recitation catalog contract.
//!
//! The catalog is the REST collaborator that knows which segments a
//! recording contains and where a performer's rendition of it can be
//! streamed from. Upstream responses come in many shapes; implementations
//! absorb that variance and hand the core only the normalized types below.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One unit of recited text within a recording (a verse).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Upstream identifier.
    pub id: u32,
    /// Stable key in `"chapter:verse"` form, used to match timing anchors.
    pub key: String,
    /// Original text.
    pub text: String,
    /// Optional translation shown alongside the text.
    pub translation: Option<String>,
}

impl Segment {
    pub fn new(id: u32, key: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id,
            key: key.into(),
            text: text.into(),
            translation: None,
        }
    }

    pub fn with_translation(mut self, translation: impl Into<String>) -> Self {
        self.translation = Some(translation.into());
        self
    }

    /// Relative spoken-length estimate: the character count, never below 1.
    pub fn weight(&self) -> f64 {
        self.text.chars().count().max(1) as f64
    }
}

/// Raw timing record exactly as the catalog received it.
///
/// The unit of `start` is unknown (seconds or milliseconds) and records may
/// identify their segment by key, by ordinal, or not at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTiming {
    pub segment_key: Option<String>,
    pub ordinal: Option<i64>,
    pub start: f64,
}

impl RawTiming {
    pub fn keyed(key: impl Into<String>, start: f64) -> Self {
        Self {
            segment_key: Some(key.into()),
            ordinal: None,
            start,
        }
    }

    pub fn ordinal(ordinal: i64, start: f64) -> Self {
        Self {
            segment_key: None,
            ordinal: Some(ordinal),
            start,
        }
    }
}

/// Playable source for a (recording, performer) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioSourceInfo {
    /// Remote media URL.
    pub url: String,
    /// Sparse, possibly noisy timing records.
    pub timings: Vec<RawTiming>,
    /// Total duration in seconds, when upstream reports one.
    pub duration_hint: Option<f64>,
}

impl AudioSourceInfo {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timings: Vec::new(),
            duration_hint: None,
        }
    }

    pub fn with_timings(mut self, timings: Vec<RawTiming>) -> Self {
        self.timings = timings;
        self
    }

    pub fn with_duration_hint(mut self, seconds: f64) -> Self {
        self.duration_hint = Some(seconds);
        self
    }
}

/// Remote catalog of recordings, segments and performer audio.
///
/// # Errors
///
/// Implementations return [`BridgeError::Transport`](crate::BridgeError::Transport)
/// when the API is unreachable or answers with a non-2xx status,
/// [`BridgeError::Decoding`](crate::BridgeError::Decoding) when no known
/// response shape matched, and
/// [`BridgeError::NotFound`](crate::BridgeError::NotFound) when the
/// performer has no audio for the recording.
#[async_trait]
pub trait RecitationCatalog: Send + Sync {
    /// Ordered segments of a recording, optionally with a translation.
    async fn fetch_segments(
        &self,
        recording_id: u32,
        translation_id: Option<u32>,
    ) -> Result<Vec<Segment>>;

    /// Audio URL and timing data for one performer's rendition.
    async fn fetch_audio_source(
        &self,
        recording_id: u32,
        performer_id: u32,
    ) -> Result<AudioSourceInfo>;
}
