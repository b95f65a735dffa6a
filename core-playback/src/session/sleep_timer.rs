//! Countdown that pauses playback when it runs out.

use core_async::sync::CancellationToken;
use core_async::task::JoinHandle;
use core_async::time::{sleep, Duration};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

const TICK: Duration = Duration::from_secs(1);

/// Whole seconds in `duration`, rounded up.
pub(crate) fn whole_seconds(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_nanos() > 0)
}

#[derive(Default)]
struct Armed {
    id: u64,
    token: Option<CancellationToken>,
}

/// At most one running countdown. Starting a new one cancels the previous.
#[derive(Default, Clone)]
pub(crate) struct SleepTimer {
    armed: Arc<Mutex<Armed>>,
}

impl SleepTimer {
    /// Starts a countdown of `duration`.
    ///
    /// `on_tick` receives the remaining time in whole seconds, first
    /// immediately and then once per second. `on_fire` runs once the count
    /// reaches zero, unless the timer was cancelled or replaced first.
    pub(crate) fn start<T, F, Fut>(&self, duration: Duration, on_tick: T, on_fire: F) -> JoinHandle<()>
    where
        T: Fn(Duration) + Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let id = {
            let mut armed = self.armed.lock();
            if let Some(previous) = armed.token.replace(token.clone()) {
                previous.cancel();
            }
            armed.id += 1;
            armed.id
        };

        let armed = self.armed.clone();
        core_async::spawn(async move {
            let mut remaining = whole_seconds(duration);
            debug!(seconds = remaining, "Sleep timer started");

            while remaining > 0 {
                on_tick(Duration::from_secs(remaining));
                core_async::select! {
                    _ = token.cancelled() => return,
                    _ = sleep(TICK) => {}
                }
                remaining -= 1;
            }

            {
                let mut armed = armed.lock();
                if armed.id != id || token.is_cancelled() {
                    return;
                }
                armed.token = None;
            }

            debug!("Sleep timer fired");
            on_fire().await;
        })
    }

    /// Cancels the running countdown. Returns whether one was active.
    pub(crate) fn cancel(&self) -> bool {
        match self.armed.lock().token.take() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.armed.lock().token.is_some()
    }
}
