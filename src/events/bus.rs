//! # Per-engine event bus.
//!
//! Every [`Delegator`](crate::Delegator) owns one [`Bus`]. The engine handle
//! publishes `LoadFault`; the run loop publishes run and pass events;
//! `run_pass` publishes dispatch, pause and panic events; subscriber workers
//! publish overflow and panic reports back onto the same bus.
//!
//! ```text
//! Delegator / RunLoop / run_pass ──► Bus ──┬─► subscriber listener ─► SubscriberSet
//!                                          └─► Delegator::subscribe() receivers
//! ```
//!
//! Publishing never waits: with no receiver attached the event is simply
//! discarded, and a receiver that falls more than `Config::bus_capacity`
//! events behind sees `Lagged` (the listener logs it and carries on).

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for engine events.
///
/// Cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    ///
    /// If there are no receivers, the event is dropped.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that will observe subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
