//! # Playback Session
//!
//! The single active listening session: which recording and performer are
//! loaded, where playback is, which segment is being recited, and what to
//! restore on the next launch.
//!
//! - [`SessionController`] drives loads, transport commands and player events.
//! - [`SessionState`] is the observable state, published over a `watch` channel.
//! - [`SnapshotStore`] persists the resumable position with throttled writes.

mod controller;
mod sleep_timer;
mod snapshot;
mod state;

pub use controller::SessionController;
pub use snapshot::{PlaybackSnapshot, SnapshotStore};
pub use state::{SessionPhase, SessionRequest, SessionState, MAX_POSITION_SECONDS};
