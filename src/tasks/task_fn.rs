//! # Function-backed task (`TaskFn`)
//!
//! [`TaskFn`] wraps a closure `F: Fn() -> Fut`, producing a fresh future per
//! spawn. Use it when the caller already holds a pre-bound zero-argument
//! closure: pool and monitor jobs, or [`Delegator::load_task`](crate::Delegator::load_task).
//!
//! ## Concurrency semantics
//! - Each call to [`Task::spawn`] creates a **new** future owning its own state.
//! - There is no hidden mutation between spawns; share state explicitly with `Arc<...>`.
//!
//! ## Example
//! ```rust
//! use delegator::{TaskFn, TaskRef, Value};
//!
//! let t: TaskRef = TaskFn::arc("ping", || async { vec![Value::from("pong")] });
//! assert_eq!(t.name(), "ping");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use crate::tasks::task::{BoxTaskFuture, Outputs, Task};

/// Function-backed task implementation.
///
/// Wraps a closure that *creates* a new future per spawn.
#[derive(Debug)]
pub struct TaskFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> TaskFn<F> {
    /// Creates a new function-backed task.
    ///
    /// Prefer [`TaskFn::arc`] when you immediately need a [`TaskRef`](crate::TaskRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self { name: name.into(), f }
    }

    /// Creates the task and returns it as a shared handle (`Arc<dyn Task>`).
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F, Fut> Task for TaskFn<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Outputs> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn spawn(&self) -> BoxTaskFuture {
        Box::pin((self.f)())
    }
}
