//! # delegator
//!
//! **Delegator** queues heterogeneous callables, runs the queue under a
//! timing/repetition pattern, and hands back what each call returned.
//!
//! A run can be awaited on the caller's task or detached onto a Tokio task;
//! detached runs can be paused, resumed and cancelled between dispatches.
//! Around the engine the crate ships a name-keyed [`Registry`], a periodic
//! [`Monitor`] and a fixed-capacity worker [`Pool`].
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   Callable + args        Callable + args        TaskRef
//!         │                      │                   │
//!         ▼                      ▼                   │
//!   ┌────────────┐         ┌────────────┐            │
//!   │ BoundTask  │         │ BoundTask  │            │
//!   └─────┬──────┘         └─────┬──────┘            │
//!         ▼                      ▼                   ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Delegator (engine handle)                                        │
//! │  - Queue    (task, delay, descriptor) in load order               │
//! │  - Pattern  Normal | Cycle | TimeOut | Tick | Ineffective         │
//! │  - Signals  pause gate, cancel gate, run state                    │
//! │  - Mailbox  capacity-one slot holding the latest Returns          │
//! └──────┬─────────────────────────────────────────────┬──────────────┘
//!        │ run(Launch)                                 │ get_returns()
//!        ▼                                             ▼
//! ┌──────────────────────┐                      ┌────────────────┐
//! │ RunLoop (plan)       │ ── publish pass ───► │    Returns     │
//! │  └─► run_pass()      │                      │ get / back_err │
//! └──────┬───────────────┘                      └────────────────┘
//!        │ Publishes
//!        │ - RunStarted / RunCompleted / RunCancelled / RunFaulted
//!        │ - PassStarting / PassCompleted
//!        │ - TaskDispatched / TaskReturned / Paused / Resumed
//!        ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! │                  (capacity: Config::bus_capacity)                 │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │  subscriber_listener   │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                             SubscriberSet
//!                          ┌────────┼────────┐
//!                          ▼        ▼        ▼
//!                      LogWriter  sub2     subN
//! ```
//!
//! ### Lifecycle of one run
//! ```text
//! run(launch) ──► resolve Pattern into Plan ──► RunLoop::run()
//!
//! publish RunStarted
//! loop per plan {
//!   ├─► cancel gate set? ─► RunCancelled, exit
//!   ├─► publish PassStarting
//!   ├─► run_pass()
//!   │     for each entry:
//!   │       ├─ cancel? ─► exit
//!   │       ├─ paused? ─► wait for start() (or cancel)
//!   │       ├─ sleep(entry delay) (cancellable)
//!   │       └─ call task, record outputs
//!   ├─► publish snapshot into the mailbox (replacing any unread one)
//!   └─► inter-pass sleep (TimeOut: before the pass; Tick: between passes)
//! }
//! publish RunCompleted | RunFaulted
//! ```
//!
//! ## Features
//! | Area              | Description                                                    | Key types / traits                         |
//! |-------------------|----------------------------------------------------------------|--------------------------------------------|
//! | **Engine**        | Build a queue, pick a pattern, run inline or detached.         | [`Delegator`], [`Launch`], [`PatternKind`] |
//! | **Tasks**         | Callables with declared signatures, or pre-bound closures.     | [`Callable`], [`TaskFn`], [`TaskRef`]      |
//! | **Returns**       | Per-pass outputs indexed by task and output position.          | [`Returns`], [`Value`]                     |
//! | **Subscriber API**| Hook into engine events (logging, metrics, custom handlers).   | [`Subscribe`], [`Event`]                   |
//! | **Collaborators** | Named engines, periodic runner, worker pool.                   | [`Registry`], [`Monitor`], [`Pool`]        |
//! | **Errors**        | Typed errors with stable labels.                               | [`DelegateError`], [`RegistryError`]       |
//! | **Configuration** | Centralize bus and monitor settings.                           | [`Config`]                                 |
//!
//! ## Optional features
//! - `logging`: exports [`LogWriter`], a subscriber rendering events through `tracing`.
//!
//! ## Example
//! ```rust
//! use delegator::{Callable, Delegator, Launch, ParamKind, PatternKind, Value};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), delegator::DelegateError> {
//!     let greet = Callable::from_fn("greet", [ParamKind::Str], |args: &[Value]| {
//!         let who = args[0].as_str().unwrap_or("nobody");
//!         vec![Value::from(format!("hello, {who}"))]
//!     })
//!     .with_returns([ParamKind::Str]);
//!
//!     let engine = Delegator::new();
//!     engine
//!         .load(&greet, [Value::from("world")])
//!         .set_pattern(PatternKind::Cycle, [Value::Int(2)]);
//!
//!     engine.run(Launch::Inline).await?;
//!
//!     let returns = engine.get_returns().await?;
//!     assert_eq!(returns.pass(), 2);
//!     assert_eq!(returns.get(0, 0)?.as_str(), Some("hello, world"));
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod monitor;
mod pool;
mod registry;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use config::Config;
pub use crate::core::{
    Delegator, DelegatorBuilder, Launch, Mode, Pattern, PatternKind, RUN_FOREVER, Returns,
    RunState,
};
pub use error::{DelegateError, PoolError, RegistryError};
pub use events::{Bus, Event, EventKind};
pub use monitor::Monitor;
pub use pool::Pool;
pub use registry::{Registry, Target};
pub use subscribers::{Subscribe, SubscriberSet};
pub use tasks::{BoundTask, BoxTaskFuture, Callable, Outputs, ParamKind, Task, TaskFn, TaskRef, Value};

// Optional: expose a built-in subscriber rendering events through `tracing`.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
