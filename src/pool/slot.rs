//! Slot occupancy.
//!
//! A slot is claimed with a single compare-exchange (`idle → busy`), so two
//! concurrent `assign` calls never bind the same slot. The batch guard that
//! observes the last finished task releases it.

use std::sync::atomic::{AtomicBool, Ordering};

/// Occupancy flag of one pool slot.
pub(super) struct Slot {
    busy: AtomicBool,
}

impl Slot {
    /// Creates a new idle slot.
    pub fn new() -> Self {
        Self {
            busy: AtomicBool::new(false),
        }
    }

    /// Marks the slot busy if it was idle.
    pub fn try_claim(&self) -> bool {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn release(&self) {
        self.busy.store(false, Ordering::Release);
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}
