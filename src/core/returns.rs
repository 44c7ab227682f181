//! # Return store.
//!
//! [`Returns`] is the snapshot of one pass: task position → output position →
//! captured value. A task that completed always has an entry, even when it
//! produced no outputs.
//!
//! [`Mailbox`] is the capacity-one handoff slot between the run loop and
//! [`Delegator::get_returns`](crate::Delegator::get_returns).
//!
//! ## Handoff rules
//! ```text
//! RunLoop, before each pass:  retire()   drop any unconsumed snapshot
//! RunLoop, after each pass:   publish()  blocks only while the slot is full
//! get_returns():              take()     non-blocking, after the run settled
//! ```

use std::collections::BTreeMap;

use tokio::sync::{Mutex, mpsc};

use crate::error::DelegateError;
use crate::tasks::{Outputs, Value};

/// Read-only outputs of one pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Returns {
    pass: u64,
    vals: BTreeMap<usize, BTreeMap<usize, Value>>,
    fault: Option<DelegateError>,
}

impl Returns {
    pub(crate) fn new(pass: u64) -> Self {
        Self {
            pass,
            ..Self::default()
        }
    }

    /// Records the outputs of the task at `task`.
    pub(crate) fn record(&mut self, task: usize, outputs: Outputs) {
        self.vals.insert(task, outputs.into_iter().enumerate().collect());
    }

    /// Deposits a deferred fault into this snapshot.
    pub(crate) fn deposit(&mut self, fault: DelegateError) {
        self.fault = Some(fault);
    }

    /// Returns output `output` of the task at position `task`.
    pub fn get(&self, task: usize, output: usize) -> Result<&Value, DelegateError> {
        self.vals
            .get(&task)
            .and_then(|outs| outs.get(&output))
            .ok_or(DelegateError::NotFound { task, output })
    }

    /// Returns every output of the task at position `task`, in order.
    pub fn outputs(&self, task: usize) -> Option<Vec<&Value>> {
        self.vals.get(&task).map(|outs| outs.values().collect())
    }

    /// Number of outputs the task at `task` produced (`None` if it never completed).
    pub fn output_count(&self, task: usize) -> Option<usize> {
        self.vals.get(&task).map(BTreeMap::len)
    }

    /// Number of tasks with a recorded entry.
    pub fn len(&self) -> usize {
        self.vals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vals.is_empty()
    }

    /// 1-based number of the pass that produced this snapshot.
    pub fn pass(&self) -> u64 {
        self.pass
    }

    /// The fault a detached run deposited alongside this snapshot, if any.
    ///
    /// Only `TimeOut`/`Tick` runs with rejected arguments deposit one.
    pub fn back_error(&self) -> Option<&DelegateError> {
        self.fault.as_ref()
    }
}

/// Capacity-one snapshot handoff.
pub(crate) struct Mailbox {
    tx: mpsc::Sender<Returns>,
    rx: Mutex<mpsc::Receiver<Returns>>,
}

impl Mailbox {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(1);
        Self {
            tx,
            rx: Mutex::new(rx),
        }
    }

    /// Places a snapshot in the slot, waiting while a previous one is unconsumed.
    pub async fn publish(&self, returns: Returns) {
        // the mailbox owns both ends, so the channel never closes
        let _ = self.tx.send(returns).await;
    }

    /// Drops an unconsumed snapshot, if any.
    pub fn retire(&self) {
        if let Ok(mut rx) = self.rx.try_lock() {
            while rx.try_recv().is_ok() {}
        }
    }

    /// Takes the buffered snapshot without waiting.
    pub async fn take(&self) -> Option<Returns> {
        self.rx.lock().await.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Returns {
        let mut r = Returns::new(1);
        r.record(0, vec![Value::Int(1), Value::from("one")]);
        r.record(1, Vec::new());
        r
    }

    #[test]
    fn test_get_hits_and_misses() {
        let r = sample();
        assert_eq!(r.get(0, 1), Ok(&Value::from("one")));
        assert_eq!(r.get(0, 2), Err(DelegateError::NotFound { task: 0, output: 2 }));
        assert_eq!(r.get(1, 0), Err(DelegateError::NotFound { task: 1, output: 0 }));
        assert_eq!(r.get(2, 0), Err(DelegateError::NotFound { task: 2, output: 0 }));
    }

    #[test]
    fn test_void_task_keeps_empty_entry() {
        let r = sample();
        assert_eq!(r.len(), 2);
        assert_eq!(r.output_count(1), Some(0));
        assert_eq!(r.output_count(2), None);
        assert_eq!(r.outputs(0).unwrap(), vec![&Value::Int(1), &Value::from("one")]);
        assert!(r.back_error().is_none());
    }

    #[tokio::test]
    async fn test_mailbox_holds_latest_after_retire() {
        let mb = Mailbox::new();
        assert!(mb.take().await.is_none());

        mb.publish(Returns::new(1)).await;
        mb.retire();
        mb.publish(Returns::new(2)).await;

        assert_eq!(mb.take().await.map(|r| r.pass()), Some(2));
        assert!(mb.take().await.is_none());
    }
}
