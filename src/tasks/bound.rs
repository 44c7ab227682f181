//! # Task binder.
//!
//! [`BoundTask::bind`] closes a [`Callable`] over positional arguments,
//! producing a zero-argument [`Task`].
//!
//! ## Rules
//! - Supplied arguments are bound as-is, in order.
//! - Missing arguments are filled from [`ParamKind::default_value`].
//! - A missing argument whose kind has no default is a load fault.
//! - Arguments beyond the declared arity are ignored.

use crate::error::DelegateError;
use crate::tasks::callable::Callable;
use crate::tasks::task::{BoxTaskFuture, Task};
use crate::tasks::value::Value;

/// A callable closed over its arguments, ready to invoke with no further input.
#[derive(Debug, Clone)]
pub struct BoundTask {
    callable: Callable,
    args: Vec<Value>,
    descriptor: String,
}

impl BoundTask {
    /// Binds `args` to `callable`, default-filling missing primitive parameters.
    pub fn bind(
        callable: &Callable,
        args: impl IntoIterator<Item = Value>,
    ) -> Result<Self, DelegateError> {
        let mut supplied = args.into_iter();
        let mut bound = Vec::with_capacity(callable.arity());

        for (index, kind) in callable.params().iter().enumerate() {
            let value = match supplied.next() {
                Some(v) => v,
                None => kind.default_value().ok_or_else(|| DelegateError::LoadFault {
                    callable: callable.name().to_string(),
                    index,
                    kind: *kind,
                })?,
            };
            bound.push(value);
        }

        Ok(Self {
            descriptor: format!("{} {}", callable.name(), callable.signature()),
            callable: callable.clone(),
            args: bound,
        })
    }

    /// Human-readable `name + signature` string.
    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    /// The bound argument vector (after default substitution).
    pub fn args(&self) -> &[Value] {
        &self.args
    }
}

impl Task for BoundTask {
    fn name(&self) -> &str {
        self.callable.name()
    }

    fn spawn(&self) -> BoxTaskFuture {
        self.callable.call(self.args.clone())
    }
}
