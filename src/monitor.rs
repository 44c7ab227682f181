//! # Periodic background runner.
//!
//! A [`Monitor`] re-invokes one zero-argument task on a fixed interval until
//! it is shut down or dropped.
//!
//! ```text
//! background(task) ──► spawn loop {
//!                        paused? → wait(resume | shutdown)
//!                        task.spawn().await          (panics caught)
//!                        sleep(interval) racing shutdown
//!                      }
//! ```
//!
//! ## Rules
//! - Only the first `background` call binds a task; later calls are rejected.
//! - The first invocation happens immediately.
//! - `stop()` holds the loop before its next invocation; `start()` releases it.

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::subscribers::panic_message;
use crate::tasks::TaskRef;

/// Periodic runner for one fixed task.
pub struct Monitor {
    interval: Duration,
    task: Mutex<Option<TaskRef>>,
    pause: watch::Sender<bool>,
    token: CancellationToken,
}

impl Monitor {
    /// Creates a monitor with a one-second interval.
    pub fn new() -> Self {
        Self::with_interval(Duration::from_secs(1))
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            task: Mutex::new(None),
            pause: watch::Sender::new(false),
            token: CancellationToken::new(),
        }
    }

    /// Creates a monitor using [`Config::monitor_interval`].
    pub fn from_config(cfg: &Config) -> Self {
        Self::with_interval(cfg.monitor_interval)
    }

    /// Binds `task` and starts the loop. Returns `false` if a task was
    /// already bound; the loop keeps running the first one.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn background(&self, task: TaskRef) -> bool {
        let mut bound = self.task.lock();
        if let Some(current) = bound.as_ref() {
            tracing::debug!(
                bound = current.name(),
                rejected = task.name(),
                "monitor already has a task"
            );
            return false;
        }
        *bound = Some(task.clone());
        drop(bound);

        let interval = self.interval;
        let mut pause = self.pause.subscribe();
        let token = self.token.clone();

        tokio::spawn(async move {
            loop {
                let paused = *pause.borrow_and_update();
                if paused {
                    select! {
                        _ = resumed(&mut pause) => {}
                        _ = token.cancelled() => break,
                    }
                }
                if token.is_cancelled() {
                    break;
                }

                let call = AssertUnwindSafe(async { task.spawn().await }).catch_unwind();
                if let Err(payload) = call.await {
                    tracing::warn!(
                        task = task.name(),
                        info = %panic_message(&*payload),
                        "monitor task panicked"
                    );
                }

                select! {
                    _ = time::sleep(interval) => {}
                    _ = token.cancelled() => break,
                }
            }
        });
        true
    }

    /// Holds the loop before its next invocation.
    pub fn stop(&self) {
        self.pause.send_replace(true);
    }

    /// Releases a held loop.
    pub fn start(&self) {
        self.pause.send_replace(false);
    }

    pub fn is_paused(&self) -> bool {
        *self.pause.borrow()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Stops the loop for good.
    pub fn shutdown(&self) {
        self.token.cancel();
    }
}

async fn resumed(pause: &mut watch::Receiver<bool>) {
    let _ = pause.wait_for(|paused| !*paused).await;
}

impl Default for Monitor {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
