//! # One pass over the queue.
//!
//! [`run_pass`] walks a frozen queue snapshot once, dispatching each task in
//! order and collecting its outputs into a fresh [`Returns`].
//!
//! ## Per-entry flow
//! ```text
//! cancel set?  ── yes ──► Cancelled
//!     │ no
//! paused?      ── yes ──► publish Paused ─► wait(resume | cancel) ─► publish Resumed
//!     │
//! delay > 0?   ── yes ──► sleep(delay) racing cancel
//!     │
//! publish TaskDispatched ─► task.spawn().await (panics caught)
//!     │                           ├─► panic  → publish TaskPanicked → Panicked
//!     │                           └─► outputs → record → publish TaskReturned
//!     ▼
//! next entry
//! ```
//!
//! ## Rules
//! - Tasks of one pass run strictly one after another.
//! - Cancellation is observed between tasks and during delays, never mid-task.
//! - A task that completes always gets an entry, even with zero outputs.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::{select, time};

use crate::core::queue::Entry;
use crate::core::returns::Returns;
use crate::core::signals::Signals;
use crate::error::DelegateError;
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::panic_message;

/// How a single pass ended.
pub(crate) enum PassOutcome {
    Completed(Returns),
    Cancelled,
    Panicked(DelegateError),
}

/// Shared context of every pass in one run.
pub(crate) struct PassCtx<'a> {
    pub signals: &'a Signals,
    pub bus: &'a Bus,
    pub engine: Option<&'a Arc<str>>,
}

impl PassCtx<'_> {
    fn event(&self, kind: EventKind, pass: u64) -> Event {
        Event::new(kind).with_engine_opt(self.engine).with_pass(pass)
    }
}

/// Executes one pass over `entries`.
pub(crate) async fn run_pass(ctx: &PassCtx<'_>, entries: &[Entry], pass: u64) -> PassOutcome {
    let cancel = ctx.signals.cancel_token();
    let mut returns = Returns::new(pass);

    for (index, entry) in entries.iter().enumerate() {
        if cancel.is_cancelled() {
            return PassOutcome::Cancelled;
        }

        if ctx.signals.is_paused() {
            ctx.bus
                .publish(ctx.event(EventKind::Paused, pass).with_index(index));
            select! {
                _ = ctx.signals.resumed() => {}
                _ = cancel.cancelled() => return PassOutcome::Cancelled,
            }
            ctx.bus
                .publish(ctx.event(EventKind::Resumed, pass).with_index(index));
        }

        if !entry.delay.is_zero() {
            select! {
                _ = time::sleep(entry.delay) => {}
                _ = cancel.cancelled() => return PassOutcome::Cancelled,
            }
        }

        ctx.bus.publish(
            ctx.event(EventKind::TaskDispatched, pass)
                .with_task(Arc::clone(&entry.name))
                .with_index(index)
                .with_delay(entry.delay),
        );

        let call = AssertUnwindSafe(async { entry.task.spawn().await }).catch_unwind();
        match call.await {
            Ok(outputs) => {
                ctx.bus.publish(
                    ctx.event(EventKind::TaskReturned, pass)
                        .with_task(Arc::clone(&entry.name))
                        .with_index(index)
                        .with_outputs(outputs.len()),
                );
                returns.record(index, outputs);
            }
            Err(payload) => {
                let info = panic_message(&*payload);
                ctx.bus.publish(
                    ctx.event(EventKind::TaskPanicked, pass)
                        .with_task(Arc::clone(&entry.name))
                        .with_index(index)
                        .with_reason(info.clone()),
                );
                return PassOutcome::Panicked(DelegateError::TaskPanicked {
                    index,
                    name: entry.name.to_string(),
                    info,
                });
            }
        }
    }
    PassOutcome::Completed(returns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::queue::Queue;
    use crate::tasks::{Outputs, TaskFn, Value};
    use std::time::Duration;

    async fn explode() -> Outputs {
        panic!("kaboom")
    }

    fn entries() -> Arc<[Entry]> {
        let mut q = Queue::default();
        q.push(TaskFn::arc("one", || async { vec![Value::Int(1)] }), "one");
        q.push(TaskFn::arc("void", || async { Outputs::new() }), "void");
        q.snapshot()
    }

    #[tokio::test]
    async fn test_pass_records_every_task() {
        let signals = Signals::new();
        let bus = Bus::new(64);
        let ctx = PassCtx {
            signals: &signals,
            bus: &bus,
            engine: None,
        };

        match run_pass(&ctx, &entries(), 1).await {
            PassOutcome::Completed(r) => {
                assert_eq!(r.pass(), 1);
                assert_eq!(r.get(0, 0), Ok(&Value::Int(1)));
                assert_eq!(r.output_count(1), Some(0));
            }
            _ => panic!("expected a completed pass"),
        }
    }

    #[tokio::test]
    async fn test_cancelled_before_first_dispatch() {
        let signals = Signals::new();
        signals.cancel_token().cancel();
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let ctx = PassCtx {
            signals: &signals,
            bus: &bus,
            engine: None,
        };

        assert!(matches!(
            run_pass(&ctx, &entries(), 1).await,
            PassOutcome::Cancelled
        ));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_is_honoured_before_dispatch() {
        let mut q = Queue::default();
        q.push(TaskFn::arc("late", || async { Outputs::new() }), "late");
        q.set_delay(Duration::from_millis(40), 0);

        let signals = Signals::new();
        let bus = Bus::new(64);
        let ctx = PassCtx {
            signals: &signals,
            bus: &bus,
            engine: None,
        };

        let started = time::Instant::now();
        assert!(matches!(
            run_pass(&ctx, &q.snapshot(), 1).await,
            PassOutcome::Completed(_)
        ));
        assert!(started.elapsed() >= Duration::from_millis(40));
    }

    #[tokio::test]
    async fn test_panicking_task_is_reported() {
        let mut q = Queue::default();
        q.push(TaskFn::arc("bad", explode), "bad fn() -> ()");

        let signals = Signals::new();
        let bus = Bus::new(64);
        let ctx = PassCtx {
            signals: &signals,
            bus: &bus,
            engine: None,
        };

        match run_pass(&ctx, &q.snapshot(), 1).await {
            PassOutcome::Panicked(err) => assert_eq!(
                err,
                DelegateError::TaskPanicked {
                    index: 0,
                    name: "bad fn() -> ()".into(),
                    info: "kaboom".into(),
                }
            ),
            _ => panic!("expected a panicked pass"),
        }
    }
}
