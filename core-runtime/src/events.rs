//! # Event Bus System
//!
//! Provides an event-driven architecture for the Recital Player Core using
//! `tokio::sync::broadcast`. Hosts subscribe to session and cache events
//! without polling the session state.
//!
//! ## Overview
//!
//! The event bus system consists of:
//! - **Event Types**: Strongly-typed enums for the session and the offline cache
//! - **EventBus**: Central broadcast channel for publishing events
//! - **EventStream**: Wrapper for consuming events with filtering
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────┐   emit    ┌───────────┐
//! │ SessionController  ├──────────>│           │    subscribe    ┌────────────┐
//! └────────────────────┘           │ EventBus  ├────────────────>│ Subscriber │
//! ┌────────────────────┐   emit    │ (broadcast│                 └────────────┘
//! │ ContentCache       ├──────────>│  channel) │
//! └────────────────────┘           └───────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, SessionEvent};
//!
//! let event_bus = EventBus::new(100);
//! let mut subscriber = event_bus.subscribe();
//!
//! event_bus
//!     .emit(CoreEvent::Session(SessionEvent::Played { recording_id: 1 }))
//!     .ok();
//!
//! assert!(subscriber.try_recv().is_ok());
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: Subscriber was too slow and missed `n` events.
//!   This is non-fatal; the subscriber can continue receiving new events.
//! - **`RecvError::Closed`**: All senders have been dropped. This indicates shutdown.
//!
//! Emitting with no subscribers returns an error that publishers ignore.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
///
/// Subscribers that can't keep up will receive `RecvError::Lagged`.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Playback session events
    Session(SessionEvent),
    /// Offline cache events
    Cache(CacheEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Session(e) => e.description(),
            CoreEvent::Cache(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Session(SessionEvent::Error { .. }) => EventSeverity::Error,
            CoreEvent::Cache(CacheEvent::DownloadFailed { .. }) => EventSeverity::Error,
            CoreEvent::Cache(CacheEvent::EntryPurged { .. }) => EventSeverity::Warning,
            CoreEvent::Session(SessionEvent::Ready { .. }) => EventSeverity::Info,
            CoreEvent::Session(SessionEvent::Completed { .. }) => EventSeverity::Info,
            CoreEvent::Session(SessionEvent::SleepTimerFired { .. }) => EventSeverity::Info,
            CoreEvent::Cache(CacheEvent::DownloadCompleted { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Debug-level events (verbose)
    Debug,
    /// Informational events
    Info,
    /// Warning events
    Warning,
    /// Error events
    Error,
}

// ============================================================================
// Session Events
// ============================================================================

/// Events emitted by the playback session controller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum SessionEvent {
    /// A new load began for a (recording, performer) pair.
    LoadStarted {
        recording_id: u32,
        performer_id: u32,
        /// Load generation; later loads carry larger values.
        generation: u64,
    },
    /// The media player accepted the source.
    Ready {
        recording_id: u32,
        /// Whether the source was a locally cached file.
        from_cache: bool,
    },
    /// Segments (and possibly a precise timeline) were published.
    TimelineUpdated {
        recording_id: u32,
        /// Number of segments in the session.
        segments: usize,
        /// `true` when per-segment start times are available.
        precise: bool,
    },
    /// The active segment changed.
    SegmentChanged {
        recording_id: u32,
        index: usize,
    },
    /// Playback started or resumed.
    Played { recording_id: u32 },
    /// Playback paused.
    Paused {
        recording_id: u32,
        /// Position when paused (milliseconds).
        position_ms: u64,
    },
    /// Session stopped and cleared.
    Stopped { recording_id: u32 },
    /// The recording played to its end.
    Completed { recording_id: u32 },
    /// The sleep timer elapsed and paused playback.
    SleepTimerFired { recording_id: Option<u32> },
    /// A user-visible failure.
    Error {
        recording_id: Option<u32>,
        message: String,
        /// Whether retrying may succeed.
        recoverable: bool,
    },
}

impl SessionEvent {
    fn description(&self) -> &str {
        match self {
            SessionEvent::LoadStarted { .. } => "Session load started",
            SessionEvent::Ready { .. } => "Audio source ready",
            SessionEvent::TimelineUpdated { .. } => "Segment timeline updated",
            SessionEvent::SegmentChanged { .. } => "Current segment changed",
            SessionEvent::Played { .. } => "Playback started",
            SessionEvent::Paused { .. } => "Playback paused",
            SessionEvent::Stopped { .. } => "Playback stopped",
            SessionEvent::Completed { .. } => "Recording completed",
            SessionEvent::SleepTimerFired { .. } => "Sleep timer fired",
            SessionEvent::Error { .. } => "Playback error",
        }
    }
}

// ============================================================================
// Cache Events
// ============================================================================

/// Events emitted by the offline content cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum CacheEvent {
    /// An index entry pointed at a missing file and was removed.
    EntryPurged { key: String },
    /// A download began.
    DownloadStarted { key: String },
    /// A download finished and the file was moved into place.
    DownloadCompleted {
        key: String,
        /// Size of the stored file in bytes.
        bytes: u64,
    },
    /// A download failed.
    DownloadFailed { key: String, message: String },
}

impl CacheEvent {
    fn description(&self) -> &str {
        match self {
            CacheEvent::EntryPurged { .. } => "Stale cache entry purged",
            CacheEvent::DownloadStarted { .. } => "Offline download started",
            CacheEvent::DownloadCompleted { .. } => "Offline download completed",
            CacheEvent::DownloadFailed { .. } => "Offline download failed",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Uses `tokio::sync::broadcast` internally, which provides:
/// - Multiple producers (clone the `EventBus`)
/// - Multiple consumers (each `subscribe()` creates a new receiver)
/// - Lagging detection (slow subscribers get `RecvError::Lagged`)
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Creates a new event bus with the default buffer size.
    #[allow(clippy::should_implement_trait)]
    pub fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error if there are no active subscribers.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with predicate filtering.
///
/// # Example
///
/// ```rust
/// use core_runtime::events::{CoreEvent, EventBus, EventStream};
///
/// let event_bus = EventBus::new(100);
/// let cache_only = EventStream::new(event_bus.subscribe())
///     .filter(|event| matches!(event, CoreEvent::Cache(_)));
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    /// Creates a new event stream from a receiver.
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` will be returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Receives the next event that passes the filter (if any).
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n` events.
    /// Returns `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without blocking.
    ///
    /// Returns `None` if no matching events are currently available.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        match &self.filter {
            Some(filter) => filter(event),
            None => true,
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
