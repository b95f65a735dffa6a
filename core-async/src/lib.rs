//! Async runtime facade for the Recital Player Core.
//!
//! Every `core-*` and `bridge-*` crate reaches the executor through this
//! crate instead of naming Tokio directly. That keeps the choice of runtime
//! in one place and gives the session controller, the content cache and the
//! bridges a shared vocabulary for tasks, timers, locks and cancellation.
//!
//! # Modules
//!
//! - `task`: spawning background work (loads, downloads, countdowns)
//! - `time`: sleeps, timeouts and instants
//! - `sync`: locks, channels and [`sync::CancellationToken`]
//! - `runtime`: `block_on` for synchronous entry points and test harnesses
//!
//! # Examples
//!
//! ```rust
//! use core_async::sync::CancellationToken;
//! use core_async::time::{sleep, Duration};
//!
//! async fn countdown(token: CancellationToken) {
//!     core_async::select! {
//!         _ = token.cancelled() => {}
//!         _ = sleep(Duration::from_secs(1)) => {}
//!     }
//! }
//! ```

// Re-export the async entry-point/test macros so downstream crates never need
// direct Tokio dependencies.
pub use core_async_macros::{main, test};

pub mod runtime;
pub mod sync;
pub mod task;
pub mod time;

pub use task::spawn;
pub use time::{sleep, Duration, Instant};

/// Re-exported so callers can race futures against cancellation without a
/// direct Tokio dependency.
pub use tokio::select;
