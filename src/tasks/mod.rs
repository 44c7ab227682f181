//! # Task abstractions and the task binder.
//!
//! This module provides the task-related types:
//! - [`Value`] / [`ParamKind`] - dynamically typed payload and its closed kind set
//! - [`Task`] - trait for zero-argument units producing outputs
//! - [`TaskFn`] - closure-backed task implementation
//! - [`TaskRef`] - shared reference to a task (`Arc<dyn Task>`)
//! - [`Callable`] - caller-supplied callable with a declared signature
//! - [`BoundTask`] - callable closed over its arguments

mod bound;
mod callable;
mod task;
mod task_fn;
mod value;

pub use bound::BoundTask;
pub use callable::Callable;
pub use task::{BoxTaskFuture, Outputs, Task, TaskRef};
pub use task_fn::TaskFn;
pub use value::{ParamKind, Value};
