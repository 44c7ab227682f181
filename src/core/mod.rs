//! Engine core: queue, patterns, run loop and the engine handle.
//!
//! The public API from this module is [`Delegator`] plus the value types it
//! exchanges with callers ([`Pattern`], [`Returns`], [`RunState`], ...).
//!
//! Internal modules:
//! - [`queue`]: ordered entries `(task, delay, descriptor)`;
//! - [`pattern`]: pattern selection and resolution into a pass plan;
//! - [`signals`]: pause / cancel / state gates;
//! - [`returns`]: per-pass snapshot and the capacity-one mailbox;
//! - [`runner`]: executes one pass with pause, delay and cancellation;
//! - [`run_loop`]: executes a whole plan and publishes run events;
//! - [`delegator`]: the engine handle, launch modes and builder calls.

mod builder;
mod delegator;
mod pattern;
mod queue;
mod returns;
mod run_loop;
mod runner;
mod signals;

pub use builder::DelegatorBuilder;
pub use delegator::{Delegator, Launch, Mode};
pub use pattern::{Pattern, PatternKind, RUN_FOREVER};
pub use returns::Returns;
pub use signals::RunState;
