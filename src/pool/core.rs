//! # Pool: batch dispatch over a fixed set of slots.
//!
//! ```text
//! assign(batch) ─► enabled? ─► claim first idle Slot ─► spawn every task
//!                                                          │ BatchGuard per task
//!                                                          ▼
//!                        last guard of the batch dropped ─► Slot::release
//!                        every guard dropped             ─► in_flight - 1
//! ```
//!
//! `in_flight` is a `watch` counter: [`Pool::wait`] is a barrier that
//! resolves once it reads zero. Guards run on drop, so a panicking task
//! still frees its share of the slot.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use futures::FutureExt;
use tokio::sync::watch;

use crate::error::PoolError;
use crate::subscribers::panic_message;
use crate::tasks::TaskRef;

use super::slot::Slot;

/// Fixed-capacity worker pool.
///
/// Each [`assign`](Pool::assign) call binds a whole batch to one idle slot
/// and runs the batch's tasks concurrently. The slot is freed when the last
/// task of its batch finishes. Cloning shares the pool.
#[derive(Clone)]
pub struct Pool {
    inner: Arc<PoolInner>,
}

struct PoolInner {
    slots: Box<[Slot]>,
    enabled: AtomicBool,
    in_flight: watch::Sender<usize>,
}

/// Held by every task of a batch; the last one to drop frees the slot.
struct BatchGuard {
    pool: Arc<PoolInner>,
    slot: usize,
    remaining: Arc<AtomicUsize>,
}

impl Drop for BatchGuard {
    fn drop(&mut self) {
        if self.remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.pool.slots[self.slot].release();
        }
        self.pool.in_flight.send_modify(|n| *n = n.saturating_sub(1));
    }
}

impl Pool {
    /// Creates a pool with `capacity` slots, all idle and enabled.
    pub fn new(capacity: usize) -> Result<Self, PoolError> {
        if capacity == 0 {
            return Err(PoolError::ZeroCapacity);
        }
        Ok(Self {
            inner: Arc::new(PoolInner {
                slots: (0..capacity).map(|_| Slot::new()).collect(),
                enabled: AtomicBool::new(true),
                in_flight: watch::Sender::new(0),
            }),
        })
    }

    /// Dispatches `tasks` on the first idle slot.
    ///
    /// Returns `false` without running anything when the pool is disabled,
    /// when every slot is busy, or when `tasks` is empty.
    /// Must be called inside a Tokio runtime.
    pub fn assign(&self, tasks: Vec<TaskRef>) -> bool {
        if !self.is_enabled() {
            tracing::debug!(tasks = tasks.len(), "pool disabled, batch dropped");
            return false;
        }
        if tasks.is_empty() {
            return false;
        }
        let Some(slot) = self.inner.slots.iter().position(Slot::try_claim) else {
            tracing::debug!(tasks = tasks.len(), "no idle slot, batch dropped");
            return false;
        };

        let remaining = Arc::new(AtomicUsize::new(tasks.len()));
        self.inner.in_flight.send_modify(|n| *n += tasks.len());

        for task in tasks {
            let guard = BatchGuard {
                pool: Arc::clone(&self.inner),
                slot,
                remaining: Arc::clone(&remaining),
            };
            tokio::spawn(async move {
                let _guard = guard;
                let call = AssertUnwindSafe(async { task.spawn().await }).catch_unwind();
                if let Err(payload) = call.await {
                    tracing::warn!(
                        task = task.name(),
                        slot,
                        info = %panic_message(&*payload),
                        "pool task panicked"
                    );
                }
            });
        }
        true
    }

    /// Waits until every dispatched task has finished.
    pub async fn wait(&self) {
        let mut rx = self.inner.in_flight.subscribe();
        let _ = rx.wait_for(|n| *n == 0).await;
    }

    /// Disables an enabled pool, or enables a disabled one.
    pub fn trigger(&self) {
        self.inner.enabled.fetch_xor(true, Ordering::AcqRel);
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.load(Ordering::Acquire)
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.inner.slots.len()
    }

    /// Number of busy slots.
    pub fn now(&self) -> usize {
        self.inner.slots.iter().filter(|s| s.is_busy()).count()
    }

    /// Number of dispatched tasks that have not finished yet.
    pub fn in_flight(&self) -> usize {
        *self.inner.in_flight.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::{Outputs, TaskFn};

    fn noop() -> TaskRef {
        TaskFn::arc("noop", || async { Outputs::new() })
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert_eq!(Pool::new(0).err(), Some(PoolError::ZeroCapacity));
        assert_eq!(Pool::new(3).map(|p| p.len()).ok(), Some(3));
    }

    #[tokio::test]
    async fn test_disabled_pool_drops_batches() {
        let pool = Pool::new(1).unwrap();
        pool.trigger();
        assert!(!pool.is_enabled());
        assert!(!pool.assign(vec![noop()]));
        assert_eq!(pool.in_flight(), 0);

        pool.trigger();
        assert!(pool.assign(vec![noop(), noop()]));
        pool.wait().await;
        assert_eq!(pool.now(), 0);
    }

    #[tokio::test]
    async fn test_empty_batch_claims_nothing() {
        let pool = Pool::new(1).unwrap();
        assert!(!pool.assign(Vec::new()));
        assert_eq!(pool.now(), 0);
    }
}
