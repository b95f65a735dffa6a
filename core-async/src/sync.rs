//! Synchronization primitives.
//!
//! All primitives are async-aware Tokio types: holding a [`Mutex`] guard
//! across an `.await` does not block the executor, which is what the content
//! cache relies on to keep index mutations single-writer while disk writes
//! are in flight.
//!
//! [`CancellationToken`] comes from `tokio-util` and is the cooperative
//! cancellation handle used for superseded loads and sleep timers.
//!
//! # Examples
//!
//! ```rust
//! use core_async::sync::{watch, CancellationToken};
//!
//! let (tx, rx) = watch::channel(0u32);
//! tx.send_replace(1);
//! assert_eq!(*rx.borrow(), 1);
//!
//! let token = CancellationToken::new();
//! let child = token.child_token();
//! token.cancel();
//! assert!(child.is_cancelled());
//! ```

pub use tokio::sync::{
    broadcast, mpsc, oneshot, watch, Mutex, MutexGuard, Notify, OnceCell, RwLock,
    RwLockReadGuard, RwLockWriteGuard, Semaphore, SemaphorePermit,
};

pub use tokio_util::sync::CancellationToken;
