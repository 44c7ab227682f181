//! # Runtime events emitted by delegator engines.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Run events**: one per run (started, completed, cancelled, faulted)
//! - **Pass events**: one traversal of the queue (starting, completed)
//! - **Dispatch events**: one per task call, plus pause/resume at dispatch boundaries
//! - **Subscriber events**: overflow and panics inside subscriber workers
//!
//! The [`Event`] struct carries metadata such as the engine name, task
//! descriptor, queue position, pass number and delay.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use delegator::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TaskDispatched)
//!     .with_engine("billing")
//!     .with_task("charge fn(int) -> ()")
//!     .with_index(2)
//!     .with_pass(1)
//!     .with_delay(Duration::from_millis(50));
//!
//! assert_eq!(ev.kind, EventKind::TaskDispatched);
//! assert_eq!(ev.index, Some(2));
//! assert_eq!(ev.delay_ms, Some(50));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::core::PatternKind;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets: `task` (subscriber name), `reason` (panic message).
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `task` (subscriber name), `reason`.
    SubscriberOverflow,

    // === Run events ===
    /// A run began (inline or detached).
    ///
    /// Sets: `engine`, `pattern`.
    RunStarted,

    /// The run finished every planned pass.
    ///
    /// Sets: `engine`, `pass` (passes completed).
    RunCompleted,

    /// The run stopped because the cancel gate was set.
    ///
    /// Sets: `engine`, `pass` (passes completed).
    RunCancelled,

    /// The run ended with a fault (pattern parameters or task panic).
    ///
    /// Sets: `engine`, `reason`.
    RunFaulted,

    /// Pattern arguments were rejected; the run degrades to a single pass.
    ///
    /// Sets: `engine`, `pattern`, `reason`.
    PatternFault,

    /// A callable could not be bound; the engine is now inert.
    ///
    /// Sets: `engine`, `task` (callable name), `reason`.
    LoadFault,

    // === Pass events ===
    /// A pass is about to traverse the queue.
    ///
    /// Sets: `engine`, `pass` (1-based).
    PassStarting,

    /// A pass finished and its snapshot was published.
    ///
    /// Sets: `engine`, `pass`.
    PassCompleted,

    // === Dispatch events ===
    /// The pause gate held the run at a dispatch boundary.
    ///
    /// Sets: `engine`, `index`, `pass`.
    Paused,

    /// The pause gate released the run.
    ///
    /// Sets: `engine`, `index`, `pass`.
    Resumed,

    /// A task is being invoked.
    ///
    /// Sets: `engine`, `task`, `index`, `pass`, `delay_ms` (configured delay).
    TaskDispatched,

    /// A task returned.
    ///
    /// Sets: `engine`, `task`, `index`, `pass`, `outputs` (output count).
    TaskReturned,

    /// A task panicked; the run is aborted.
    ///
    /// Sets: `engine`, `task`, `index`, `pass`, `reason`.
    TaskPanicked,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the emitting engine, if it has one.
    pub engine: Option<Arc<str>>,
    /// Task descriptor (or subscriber name for subscriber events).
    pub task: Option<Arc<str>>,
    /// Queue position (0-based).
    pub index: Option<u32>,
    /// Pass number (1-based).
    pub pass: Option<u64>,
    /// Configured delay before dispatch in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Number of outputs a task returned.
    pub outputs: Option<u32>,
    /// Pattern governing the run.
    pub pattern: Option<PatternKind>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            engine: None,
            task: None,
            index: None,
            pass: None,
            delay_ms: None,
            outputs: None,
            pattern: None,
            reason: None,
        }
    }

    /// Attaches the engine name, if any.
    #[inline]
    pub fn with_engine_opt(mut self, engine: Option<&Arc<str>>) -> Self {
        self.engine = engine.cloned();
        self
    }

    /// Attaches an engine name.
    #[inline]
    pub fn with_engine(mut self, engine: impl Into<Arc<str>>) -> Self {
        self.engine = Some(engine.into());
        self
    }

    /// Attaches a task descriptor.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a queue position.
    #[inline]
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(u32::try_from(index).unwrap_or(u32::MAX));
        self
    }

    /// Attaches a pass number.
    #[inline]
    pub fn with_pass(mut self, pass: u64) -> Self {
        self.pass = Some(pass);
        self
    }

    /// Attaches a delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches an output count.
    #[inline]
    pub fn with_outputs(mut self, n: usize) -> Self {
        self.outputs = Some(u32::try_from(n).unwrap_or(u32::MAX));
        self
    }

    /// Attaches the pattern kind.
    #[inline]
    pub fn with_pattern(mut self, pattern: PatternKind) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_task(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_task(subscriber)
            .with_reason(info)
    }

    /// True for the three kinds that end a run.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.kind,
            EventKind::RunCompleted | EventKind::RunCancelled | EventKind::RunFaulted
        )
    }
}
