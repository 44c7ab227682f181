//! # Ordered task queue.
//!
//! Each [`Entry`] carries a task, its pre-dispatch delay and its descriptor,
//! so the task, delay and name sequences always share one length.

use std::sync::Arc;
use std::time::Duration;

use crate::tasks::TaskRef;

/// One queued call.
#[derive(Clone)]
pub(crate) struct Entry {
    pub task: TaskRef,
    pub delay: Duration,
    pub name: Arc<str>,
}

/// Append-only list of entries, frozen into a snapshot when a run starts.
#[derive(Clone, Default)]
pub(crate) struct Queue {
    entries: Vec<Entry>,
}

impl Queue {
    /// Appends a task with zero delay.
    pub fn push(&mut self, task: TaskRef, name: impl Into<Arc<str>>) {
        self.entries.push(Entry {
            task,
            delay: Duration::ZERO,
            name: name.into(),
        });
    }

    /// Appends every entry of `other`, sharing its tasks.
    pub fn extend_from(&mut self, other: &Queue) {
        self.entries.extend(other.entries.iter().cloned());
    }

    /// Sets the delay of one entry, or of all entries when `index` is out of range.
    pub fn set_delay(&mut self, delay: Duration, index: isize) {
        match usize::try_from(index).ok().filter(|i| *i < self.entries.len()) {
            Some(i) => self.entries[i].delay = delay,
            None => self.entries.iter_mut().for_each(|e| e.delay = delay),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.to_string()).collect()
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.entries.iter().map(|e| e.delay).collect()
    }

    /// Freezes the current entries for one run.
    pub fn snapshot(&self) -> Arc<[Entry]> {
        Arc::from(self.entries.as_slice())
    }
}
