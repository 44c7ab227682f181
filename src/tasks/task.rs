//! # Task abstraction.
//!
//! A [`Task`] is a named, zero-argument unit that produces a future of its
//! outputs each time it is spawned. The common handle type is [`TaskRef`],
//! an `Arc<dyn Task>` that queues, pools and monitors share freely.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::tasks::value::Value;

/// Values captured from one call, in output order.
pub type Outputs = Vec<Value>;

/// Boxed future returned by [`Task::spawn`].
pub type BoxTaskFuture = Pin<Box<dyn Future<Output = Outputs> + Send + 'static>>;

/// Shared handle to a task object.
pub type TaskRef = Arc<dyn Task>;

/// # Zero-argument, repeatable unit of work.
///
/// Each call to [`spawn`](Task::spawn) creates a **fresh** future; a task may be
/// spawned many times (once per pass) and must not rely on hidden mutation
/// between spawns.
///
/// # Example
/// ```
/// use delegator::{BoxTaskFuture, Task, Value};
///
/// struct Answer;
///
/// impl Task for Answer {
///     fn name(&self) -> &str { "answer" }
///
///     fn spawn(&self) -> BoxTaskFuture {
///         Box::pin(async { vec![Value::Int(42)] })
///     }
/// }
/// ```
pub trait Task: Send + Sync + 'static {
    /// Returns a stable, human-readable task name.
    fn name(&self) -> &str;

    /// Creates a new future that performs one call and yields its outputs.
    fn spawn(&self) -> BoxTaskFuture;
}
