//! # RunLoop: executes a resolved plan.
//!
//! One [`RunLoop`] drives one run of an engine. The same future is either
//! awaited on the caller's task (inline launch) or handed to `tokio::spawn`
//! (detached launch), so both launches share identical semantics.
//!
//! ## Event flow
//! ```text
//! RunStarted [→ PatternFault]
//!   loop per plan {
//!     cancel set? → break
//!     PassStarting → run_pass() → publish snapshot → PassCompleted
//!     [inter-pass sleep racing cancel]
//!   }
//! RunCompleted | RunCancelled | RunFaulted
//! ```
//!
//! ## Plans
//! ```text
//! Skip              no pass
//! Once              1 pass
//! Forever           passes until cancelled
//! Repeat(n)         n passes
//! Delayed(d)        sleep d, 1 pass
//! Ticks{every, n}   n passes, `every` between consecutive passes
//! ```
//!
//! ## Rules
//! - Passes run **sequentially**; the pass counter is 1-based and monotonic.
//! - The mailbox is retired before each pass, so only the latest snapshot stays buffered.
//! - A pattern fault never stops the degraded pass; it is reported once the pass is done.

use std::sync::Arc;
use std::time::Duration;

use tokio::{select, time};

use crate::core::pattern::{PatternKind, Plan};
use crate::core::queue::Entry;
use crate::core::returns::Mailbox;
use crate::core::runner::{PassCtx, PassOutcome, run_pass};
use crate::core::signals::Signals;
use crate::error::DelegateError;
use crate::events::{Bus, Event, EventKind};

/// How a whole run ended.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RunOutcome {
    Completed,
    Cancelled,
    Faulted(DelegateError),
}

/// Everything one run needs, frozen when the run is launched.
pub(crate) struct RunLoop {
    pub entries: Arc<[Entry]>,
    pub plan: Plan,
    pub pattern: PatternKind,
    /// Rejected pattern arguments, if any.
    pub fault: Option<DelegateError>,
    /// Deposit `fault` into every published snapshot (detached launches).
    pub deposit: bool,
    pub signals: Arc<Signals>,
    pub mailbox: Arc<Mailbox>,
    pub bus: Bus,
    pub engine: Option<Arc<str>>,
}

enum Step {
    Continue,
    Stop(RunOutcome),
}

impl RunLoop {
    /// Runs every planned pass, then publishes the terminal event.
    pub async fn run(self) -> RunOutcome {
        self.bus.publish(
            self.event(EventKind::RunStarted)
                .with_pattern(self.pattern),
        );
        if let Some(fault) = &self.fault {
            self.bus.publish(
                self.event(EventKind::PatternFault)
                    .with_pattern(self.pattern)
                    .with_reason(fault.to_string()),
            );
        }

        let mut pass: u64 = 0;
        let outcome = self.drive(&mut pass).await;

        let terminal = match &outcome {
            RunOutcome::Completed => self.event(EventKind::RunCompleted).with_pass(pass),
            RunOutcome::Cancelled => self.event(EventKind::RunCancelled).with_pass(pass),
            RunOutcome::Faulted(e) => self
                .event(EventKind::RunFaulted)
                .with_pass(pass)
                .with_reason(e.to_string()),
        };
        self.bus.publish(terminal);
        outcome
    }

    async fn drive(&self, pass: &mut u64) -> RunOutcome {
        match self.plan {
            Plan::Skip => RunOutcome::Completed,
            Plan::Once => self.single(pass).await,
            Plan::Delayed(d) => {
                if !self.pause_between(d).await {
                    return RunOutcome::Cancelled;
                }
                self.single(pass).await
            }
            Plan::Forever => loop {
                if let Step::Stop(outcome) = self.step(pass).await {
                    return outcome;
                }
                tokio::task::yield_now().await;
            },
            Plan::Repeat(n) => {
                for _ in 0..n {
                    if let Step::Stop(outcome) = self.step(pass).await {
                        return outcome;
                    }
                    tokio::task::yield_now().await;
                }
                RunOutcome::Completed
            }
            Plan::Ticks { every, count } => {
                for i in 0..count {
                    if i > 0 && !self.pause_between(every).await {
                        return RunOutcome::Cancelled;
                    }
                    if let Step::Stop(outcome) = self.step(pass).await {
                        return outcome;
                    }
                }
                RunOutcome::Completed
            }
        }
    }

    /// One pass, then the pattern fault (if any) becomes the outcome.
    async fn single(&self, pass: &mut u64) -> RunOutcome {
        match self.step(pass).await {
            Step::Stop(outcome) => outcome,
            Step::Continue => match &self.fault {
                Some(fault) => RunOutcome::Faulted(fault.clone()),
                None => RunOutcome::Completed,
            },
        }
    }

    async fn step(&self, pass: &mut u64) -> Step {
        if self.signals.cancel_token().is_cancelled() {
            return Step::Stop(RunOutcome::Cancelled);
        }
        *pass += 1;
        self.mailbox.retire();
        self.bus
            .publish(self.event(EventKind::PassStarting).with_pass(*pass));

        let ctx = PassCtx {
            signals: &self.signals,
            bus: &self.bus,
            engine: self.engine.as_ref(),
        };
        match run_pass(&ctx, &self.entries, *pass).await {
            PassOutcome::Completed(mut returns) => {
                if self.deposit {
                    if let Some(fault) = &self.fault {
                        returns.deposit(fault.clone());
                    }
                }
                self.mailbox.publish(returns).await;
                self.bus
                    .publish(self.event(EventKind::PassCompleted).with_pass(*pass));
                Step::Continue
            }
            PassOutcome::Cancelled => Step::Stop(RunOutcome::Cancelled),
            PassOutcome::Panicked(e) => Step::Stop(RunOutcome::Faulted(e)),
        }
    }

    /// Sleeps `d` unless cancelled first; returns false on cancellation.
    async fn pause_between(&self, d: Duration) -> bool {
        let cancel = self.signals.cancel_token();
        select! {
            _ = time::sleep(d) => true,
            _ = cancel.cancelled() => false,
        }
    }

    fn event(&self, kind: EventKind) -> Event {
        Event::new(kind).with_engine_opt(self.engine.as_ref())
    }
}
