//! Engine events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the engine handle, the run loop and
//! subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Delegator` (load faults), `RunLoop` (run and pass events),
//!   `run_pass` (dispatch events), `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the subscriber listener spawned by `DelegatorBuilder::build`
//!   (fans out to `SubscriberSet`) and any receiver from `Delegator::subscribe`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
