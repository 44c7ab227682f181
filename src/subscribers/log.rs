//! # LogWriter: event renderer over `tracing`
//!
//! A subscriber that turns incoming [`Event`]s into `tracing` records under
//! the `delegator` target. Install any `tracing` subscriber (for example
//! `tracing_subscriber::fmt`) to see them.
//!
//! ## Levels
//! ```text
//! debug  dispatched / returned
//! info   run started / completed / cancelled, pass completed, paused / resumed
//! warn   pattern fault, subscriber overflow
//! error  load fault, run faulted, task / subscriber panicked
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let engine = e.engine.as_deref().unwrap_or("-");
        let task = e.task.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");

        match e.kind {
            EventKind::RunStarted => {
                tracing::info!(target: "delegator", engine, pattern = ?e.pattern, "run started");
            }
            EventKind::RunCompleted => {
                tracing::info!(target: "delegator", engine, passes = ?e.pass, "run completed");
            }
            EventKind::RunCancelled => {
                tracing::info!(target: "delegator", engine, passes = ?e.pass, "run cancelled");
            }
            EventKind::RunFaulted => {
                tracing::error!(target: "delegator", engine, reason, "run faulted");
            }
            EventKind::PatternFault => {
                tracing::warn!(target: "delegator", engine, pattern = ?e.pattern, reason, "pattern fault");
            }
            EventKind::LoadFault => {
                tracing::error!(target: "delegator", engine, callable = task, reason, "load fault");
            }
            EventKind::PassStarting => {
                tracing::debug!(target: "delegator", engine, pass = ?e.pass, "pass starting");
            }
            EventKind::PassCompleted => {
                tracing::info!(target: "delegator", engine, pass = ?e.pass, "pass completed");
            }
            EventKind::Paused => {
                tracing::info!(target: "delegator", engine, index = ?e.index, pass = ?e.pass, "paused");
            }
            EventKind::Resumed => {
                tracing::info!(target: "delegator", engine, index = ?e.index, pass = ?e.pass, "resumed");
            }
            EventKind::TaskDispatched => {
                tracing::debug!(
                    target: "delegator",
                    engine, task, index = ?e.index, pass = ?e.pass, delay_ms = ?e.delay_ms,
                    "dispatched"
                );
            }
            EventKind::TaskReturned => {
                tracing::debug!(
                    target: "delegator",
                    engine, task, index = ?e.index, pass = ?e.pass, outputs = ?e.outputs,
                    "returned"
                );
            }
            EventKind::TaskPanicked => {
                tracing::error!(target: "delegator", engine, task, index = ?e.index, reason, "task panicked");
            }
            EventKind::SubscriberOverflow => {
                tracing::warn!(target: "delegator", subscriber = task, reason, "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                tracing::error!(target: "delegator", subscriber = task, reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
