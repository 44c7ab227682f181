//! # Delegator: the engine handle.
//!
//! A [`Delegator`] owns one queue, one pattern, one return mailbox and its
//! signal primitives. The handle is cheap to clone; every clone drives the
//! same engine.
//!
//! ## Lifecycle
//! ```text
//! build ──► load / quick / same / load_task / join / set_time / set_pattern
//!             │
//!             ▼
//!        run(Launch::Inline)   ──► RunLoop awaited here ──► Ok | Err(fault)
//!        run(Launch::Detached) ──► RunLoop spawned     ──► Ok (returns at once)
//!             │                        ▲
//!             │      stop / start / sleep / over (detached only)
//!             ▼
//!        wait() / get_returns()
//! ```
//!
//! ## Rules
//! - A load or inline pattern fault **latches** the engine: builder calls
//!   become no-ops and `run`/`get_returns` return the same fault.
//! - After a detached launch, builder calls are ignored and a second `run`
//!   fails with [`DelegateError::AlreadyLaunched`].
//! - Signal calls are no-ops unless a detached run was launched.
//! - `Launch::Detached` on an inline-only engine runs inline.
//! - Dropping an inline `run` future before it finishes settles the run as
//!   [`RunState::Cancelled`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::core::builder::DelegatorBuilder;
use crate::core::pattern::{Pattern, PatternKind};
use crate::core::queue::Queue;
use crate::core::returns::{Mailbox, Returns};
use crate::core::run_loop::{RunLoop, RunOutcome};
use crate::core::signals::{RunState, Signals};
use crate::error::DelegateError;
use crate::events::{Bus, Event, EventKind};
use crate::tasks::{BoundTask, Callable, TaskRef, Value};

/// Whether an engine may launch detached runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Runs are always awaited on the caller's task.
    #[default]
    Inline,
    /// Runs may be spawned onto a detached Tokio task.
    Detachable,
}

/// How [`Delegator::run`] executes the run loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launch {
    /// Await the whole run before returning.
    Inline,
    /// Spawn the run and return immediately (detachable engines only).
    Detached,
}

/// Handle to a delegation engine.
#[derive(Clone)]
pub struct Delegator {
    inner: Arc<Inner>,
}

struct Inner {
    mode: Mode,
    name: Option<Arc<str>>,
    shared: Mutex<Shared>,
    signals: Arc<Signals>,
    mailbox: Arc<Mailbox>,
    bus: Bus,
    listener: CancellationToken,
}

#[derive(Default)]
struct Shared {
    queue: Queue,
    pattern: Pattern,
    /// Latched fault; the engine is inert while set.
    fault: Option<DelegateError>,
    /// Terminal fault of the most recent run.
    last_fault: Option<DelegateError>,
    /// Runtime of the detached run, once launched.
    launched: Option<Handle>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.listener.cancel();
    }
}

impl Delegator {
    /// Creates an inline-only engine with the default configuration.
    pub fn new() -> Self {
        DelegatorBuilder::new(Config::default()).build()
    }

    /// Creates an engine that may launch detached runs.
    pub fn detachable() -> Self {
        DelegatorBuilder::new(Config::default())
            .with_mode(Mode::Detachable)
            .build()
    }

    /// Starts building an engine from `cfg`.
    pub fn builder(cfg: Config) -> DelegatorBuilder {
        DelegatorBuilder::new(cfg)
    }

    pub(crate) fn from_parts(
        mode: Mode,
        name: Option<Arc<str>>,
        bus: Bus,
        listener: CancellationToken,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                mode,
                name,
                shared: Mutex::new(Shared::default()),
                signals: Arc::new(Signals::new()),
                mailbox: Arc::new(Mailbox::new()),
                bus,
                listener,
            }),
        }
    }

    // ---- builder calls ----

    /// Binds `callable` to `args` and appends it to the queue.
    ///
    /// Missing primitive arguments are default-filled; a missing argument of
    /// another kind latches a [`DelegateError::LoadFault`].
    pub fn load(&self, callable: &Callable, args: impl IntoIterator<Item = Value>) -> &Self {
        self.edit("load", |shared| match BoundTask::bind(callable, args) {
            Ok(task) => {
                let descriptor = task.descriptor().to_string();
                shared.queue.push(Arc::new(task), descriptor);
            }
            Err(fault) => self.latch(shared, callable.name(), fault),
        })
    }

    /// Loads each callable with no arguments.
    pub fn quick<'c>(&self, callables: impl IntoIterator<Item = &'c Callable>) -> &Self {
        for callable in callables {
            self.load(callable, std::iter::empty());
        }
        self
    }

    /// Loads `n` independent copies of `callable` bound to the same arguments.
    pub fn same(&self, callable: &Callable, n: usize, args: impl IntoIterator<Item = Value>) -> &Self {
        let args: Vec<Value> = args.into_iter().collect();
        for _ in 0..n {
            self.load(callable, args.iter().cloned());
        }
        self
    }

    /// Appends a pre-bound task; its name is used as the descriptor.
    pub fn load_task(&self, task: TaskRef) -> &Self {
        self.edit("load_task", |shared| {
            let descriptor = task.name().to_string();
            shared.queue.push(task, descriptor);
        })
    }

    /// Appends every entry of `other`, in order. `other` is left unchanged.
    pub fn join(&self, other: &Delegator) -> &Self {
        let theirs = other.inner.shared.lock().queue.clone();
        self.edit("join", |shared| shared.queue.extend_from(&theirs))
    }

    /// Sets the pre-dispatch delay of the entry at `index`, or of every entry
    /// when `index` is negative or past the end.
    pub fn set_time(&self, delay: Duration, index: isize) -> &Self {
        self.edit("set_time", |shared| shared.queue.set_delay(delay, index))
    }

    /// Selects the run pattern. Integer codes outside `0..=3` select
    /// [`PatternKind::Ineffective`].
    pub fn set_pattern(
        &self,
        kind: impl Into<PatternKind>,
        args: impl IntoIterator<Item = Value>,
    ) -> &Self {
        let pattern = Pattern::new(kind.into(), args.into_iter().collect());
        self.edit("set_pattern", |shared| shared.pattern = pattern)
    }

    fn edit(&self, op: &'static str, f: impl FnOnce(&mut Shared)) -> &Self {
        let mut shared = self.inner.shared.lock();
        if shared.fault.is_some() {
            return self;
        }
        if shared.launched.is_some() {
            tracing::debug!(engine = ?self.inner.name, op, "builder call ignored after detached launch");
            return self;
        }
        f(&mut *shared);
        self
    }

    fn latch(&self, shared: &mut Shared, callable: &str, fault: DelegateError) {
        self.inner.bus.publish(
            self.event(EventKind::LoadFault)
                .with_task(callable)
                .with_reason(fault.to_string()),
        );
        shared.fault = Some(fault);
    }

    // ---- running ----

    /// Executes the queue under the selected pattern.
    ///
    /// Inline launches return once the run has finished, with the run's fault
    /// if any. Detached launches return as soon as the run is spawned; faults
    /// then surface through [`get_returns`](Self::get_returns) and
    /// [`Returns::back_error`].
    pub async fn run(&self, launch: Launch) -> Result<(), DelegateError> {
        let detached = launch == Launch::Detached && self.inner.mode == Mode::Detachable;

        let run_loop = {
            let mut shared = self.inner.shared.lock();
            if let Some(fault) = &shared.fault {
                return Err(fault.clone());
            }
            if shared.launched.is_some() {
                return Err(DelegateError::AlreadyLaunched);
            }
            if self.inner.signals.state() == RunState::Running {
                return Err(DelegateError::Busy);
            }
            if detached {
                shared.launched = Some(Handle::current());
            }
            shared.last_fault = None;
            self.inner.signals.set_state(RunState::Running);

            let (plan, fault) = shared.pattern.plan();
            RunLoop {
                entries: shared.queue.snapshot(),
                plan,
                pattern: shared.pattern.kind(),
                fault,
                deposit: detached,
                signals: Arc::clone(&self.inner.signals),
                mailbox: Arc::clone(&self.inner.mailbox),
                bus: self.inner.bus.clone(),
                engine: self.inner.name.clone(),
            }
        };

        if detached {
            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move {
                let outcome = run_loop.run().await;
                let _ = inner.settle(outcome, true);
            });
            return Ok(());
        }

        let guard = InlineRun {
            inner: &self.inner,
            settled: false,
        };
        let outcome = run_loop.run().await;
        guard.finish(outcome)
    }

    // ---- signals ----

    /// Pauses the detached run at its next dispatch boundary.
    pub fn stop(&self) {
        if self.live().is_some() {
            self.inner.signals.pause();
        }
    }

    /// Resumes a paused detached run. No-op when not paused.
    pub fn start(&self) {
        if self.live().is_some() {
            self.inner.signals.resume();
        }
    }

    /// Pauses the detached run for `d`, without blocking the caller.
    pub fn sleep(&self, d: Duration) {
        if let Some(rt) = self.live() {
            let signals = Arc::clone(&self.inner.signals);
            rt.spawn(async move {
                signals.pause();
                tokio::time::sleep(d).await;
                signals.resume();
            });
        }
    }

    /// Cancels the detached run before its next dispatch or pass. Never blocks.
    pub fn over(&self) {
        if self.live().is_some() {
            self.inner.signals.cancel_token().cancel();
        }
    }

    /// Waits until the detached run reaches a terminal state.
    pub async fn wait(&self) {
        if self.live().is_some() {
            self.inner.signals.settled().await;
        }
    }

    fn live(&self) -> Option<Handle> {
        self.inner.shared.lock().launched.clone()
    }

    // ---- results ----

    /// Takes the latest buffered pass snapshot.
    ///
    /// A latched fault is returned without waiting. A run in flight is awaited
    /// first. When nothing is buffered, the last run's fault is returned if it
    /// had one, otherwise [`DelegateError::NoReturns`].
    pub async fn get_returns(&self) -> Result<Returns, DelegateError> {
        if let Some(fault) = self.fault() {
            return Err(fault);
        }
        self.inner.signals.settled().await;

        match self.inner.mailbox.take().await {
            Some(returns) => Ok(returns),
            None => Err(self
                .inner
                .shared
                .lock()
                .last_fault
                .clone()
                .unwrap_or(DelegateError::NoReturns)),
        }
    }

    // ---- inspection ----

    /// Prints the first `n` descriptors, one per line; all of them when `n`
    /// is negative or exceeds the queue length.
    pub fn show_members(&self, n: isize) {
        let members = self.members();
        let shown = usize::try_from(n)
            .ok()
            .filter(|n| *n <= members.len())
            .unwrap_or(members.len());
        for (i, descriptor) in members.iter().take(shown).enumerate() {
            println!("#{}: {descriptor}", i + 1);
        }
    }

    /// Descriptors of the queued tasks, in order.
    pub fn members(&self) -> Vec<String> {
        self.inner.shared.lock().queue.names()
    }

    pub fn len(&self) -> usize {
        self.inner.shared.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pre-dispatch delays of the queued tasks, in order.
    pub fn delays(&self) -> Vec<Duration> {
        self.inner.shared.lock().queue.delays()
    }

    /// Currently selected pattern.
    pub fn pattern(&self) -> Pattern {
        self.inner.shared.lock().pattern.clone()
    }

    pub fn state(&self) -> RunState {
        self.inner.signals.state()
    }

    /// The latched fault, if the engine is inert.
    pub fn fault(&self) -> Option<DelegateError> {
        self.inner.shared.lock().fault.clone()
    }

    pub fn mode(&self) -> Mode {
        self.inner.mode
    }

    pub fn name(&self) -> Option<&str> {
        self.inner.name.as_deref()
    }

    /// Subscribes to this engine's events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.inner.bus.subscribe()
    }

    fn event(&self, kind: EventKind) -> Event {
        Event::new(kind).with_engine_opt(self.inner.name.as_ref())
    }
}

impl Inner {
    /// Records how a run ended and publishes the terminal state.
    fn settle(&self, outcome: RunOutcome, detached: bool) -> Result<(), DelegateError> {
        let mut shared = self.shared.lock();
        let (state, result) = match outcome {
            RunOutcome::Completed => (RunState::Completed, Ok(())),
            RunOutcome::Cancelled => (RunState::Cancelled, Ok(())),
            RunOutcome::Faulted(fault) => {
                if !detached && fault.is_latching() {
                    shared.fault = Some(fault.clone());
                }
                shared.last_fault = Some(fault.clone());
                (RunState::Faulted, Err(fault))
            }
        };
        self.signals.set_state(state);
        result
    }
}

/// Settles an inline run whose future is dropped before it finishes, so the
/// engine leaves `Running` and stays usable.
struct InlineRun<'a> {
    inner: &'a Inner,
    settled: bool,
}

impl InlineRun<'_> {
    fn finish(mut self, outcome: RunOutcome) -> Result<(), DelegateError> {
        self.settled = true;
        self.inner.settle(outcome, false)
    }
}

impl Drop for InlineRun<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        tracing::debug!(engine = ?self.inner.name, "inline run dropped before completion");
        self.inner.bus.publish(
            Event::new(EventKind::RunCancelled).with_engine_opt(self.inner.name.as_ref()),
        );
        let _ = self.inner.settle(RunOutcome::Cancelled, false);
    }
}

impl Default for Delegator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Delegator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delegator")
            .field("name", &self.inner.name)
            .field("mode", &self.inner.mode)
            .field("len", &self.len())
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::ParamKind;

    fn echo() -> Callable {
        Callable::from_fn("echo", [ParamKind::Int, ParamKind::Str], |args: &[Value]| {
            args.to_vec()
        })
    }

    #[tokio::test]
    async fn test_inline_run_then_returns() {
        let d = Delegator::new();
        d.load(&echo(), [Value::Int(7)]).load(&echo(), []);

        d.run(Launch::Inline).await.unwrap();
        let r = d.get_returns().await.unwrap();
        assert_eq!(r.get(0, 0), Ok(&Value::Int(7)));
        assert_eq!(r.get(0, 1), Ok(&Value::from("")));
        assert_eq!(r.get(1, 0), Ok(&Value::Int(0)));
        assert_eq!(d.state(), RunState::Completed);

        // the snapshot was consumed
        assert_eq!(d.get_returns().await, Err(DelegateError::NoReturns));
    }

    #[tokio::test]
    async fn test_detached_on_inline_engine_runs_inline() {
        let d = Delegator::new();
        d.load(&echo(), [Value::Int(1)]);

        d.run(Launch::Detached).await.unwrap();
        assert_eq!(d.state(), RunState::Completed);
        // signals stay inert without a detached launch
        d.over();
        d.wait().await;
        assert!(d.run(Launch::Inline).await.is_ok());
    }

    #[tokio::test]
    async fn test_builder_calls_ignored_after_detached_launch() {
        let d = Delegator::detachable();
        d.load(&echo(), []);
        d.run(Launch::Detached).await.unwrap();
        d.load(&echo(), []).set_time(Duration::from_secs(1), -1);

        d.wait().await;
        assert_eq!(d.len(), 1);
        assert_eq!(d.delays(), vec![Duration::ZERO]);
        assert_eq!(d.run(Launch::Inline).await, Err(DelegateError::AlreadyLaunched));
    }

    #[test]
    fn test_out_of_range_code_selects_ineffective() {
        let d = Delegator::new();
        d.set_pattern(7, [Value::Int(1)]);
        assert_eq!(d.pattern().kind(), PatternKind::Ineffective);
        assert!(d.pattern().args().is_empty());
    }

    #[test]
    fn test_join_self_duplicates_queue() {
        let d = Delegator::new();
        d.load(&echo(), []);
        d.join(&d.clone());
        assert_eq!(d.len(), 2);
    }
}
