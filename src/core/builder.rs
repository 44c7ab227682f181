use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

use crate::{
    config::Config,
    events::Bus,
    subscribers::{Subscribe, SubscriberSet},
};

use super::delegator::{Delegator, Mode};

/// Builder for constructing a [`Delegator`] with optional features.
pub struct DelegatorBuilder {
    cfg: Config,
    mode: Mode,
    name: Option<Arc<str>>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl DelegatorBuilder {
    /// Creates a new builder with the given configuration (inline-only mode).
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            mode: Mode::Inline,
            name: None,
            subscribers: Vec::new(),
        }
    }

    /// Selects whether the engine may launch detached runs.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Names the engine; the name is attached to every event it publishes.
    pub fn with_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive engine events (runs, passes, dispatches, faults)
    /// through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the engine.
    ///
    /// Must be called inside a Tokio runtime when subscribers were set: the
    /// subscriber workers and the bus listener are spawned here.
    pub fn build(self) -> Delegator {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let listener = CancellationToken::new();

        if !self.subscribers.is_empty() {
            let set = SubscriberSet::new(self.subscribers, bus.clone());
            subscriber_listener(&bus, set, listener.clone());
        }
        Delegator::from_parts(self.mode, self.name, bus, listener)
    }
}

/// Forwards bus events to the subscriber set until the engine is dropped.
fn subscriber_listener(bus: &Bus, set: SubscriberSet, token: CancellationToken) {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                res = rx.recv() => match res {
                    Ok(ev) => set.emit(&ev),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "subscriber listener lagged behind the bus");
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = token.cancelled() => break,
            }
        }
        set.shutdown().await;
    });
}
