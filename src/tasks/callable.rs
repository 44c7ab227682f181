//! # Caller-supplied callables.
//!
//! A [`Callable`] is what the caller hands to
//! [`Delegator::load`](crate::Delegator::load): a name, the declared kinds of
//! its positional parameters, optionally the declared kinds of its outputs,
//! and a body taking the bound argument vector.
//!
//! Bodies come in two flavours:
//! - [`Callable::new`] for `async` bodies (`Fn(Vec<Value>) -> Fut`);
//! - [`Callable::from_fn`] for plain bodies (`Fn(&[Value]) -> Vec<Value>`).
//!
//! Plain bodies run when the pass polls them, never at bind time.
//!
//! ## Example
//! ```rust
//! use delegator::{Callable, ParamKind, Value};
//!
//! let add = Callable::from_fn("add", [ParamKind::Int, ParamKind::Int], |args: &[Value]| {
//!     let a = args[0].as_int().unwrap_or_default();
//!     let b = args[1].as_int().unwrap_or_default();
//!     vec![Value::Int(a + b)]
//! })
//! .with_returns([ParamKind::Int]);
//!
//! assert_eq!(add.signature(), "fn(int, int) -> (int)");
//! ```

use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::tasks::task::{BoxTaskFuture, Outputs};
use crate::tasks::value::{ParamKind, Value};

type Body = Arc<dyn Fn(Vec<Value>) -> BoxTaskFuture + Send + Sync>;

/// A named callable with a declared signature.
///
/// Cloning is cheap: the body is shared.
#[derive(Clone)]
pub struct Callable {
    name: Cow<'static, str>,
    params: Vec<ParamKind>,
    returns: Vec<ParamKind>,
    body: Body,
}

impl Callable {
    /// Creates a callable with an `async` body.
    pub fn new<F, Fut>(
        name: impl Into<Cow<'static, str>>,
        params: impl IntoIterator<Item = ParamKind>,
        f: F,
    ) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Outputs> + Send + 'static,
    {
        Self {
            name: name.into(),
            params: params.into_iter().collect(),
            returns: Vec::new(),
            body: Arc::new(move |args| Box::pin(f(args))),
        }
    }

    /// Creates a callable with a plain (non-async) body.
    pub fn from_fn<F>(
        name: impl Into<Cow<'static, str>>,
        params: impl IntoIterator<Item = ParamKind>,
        f: F,
    ) -> Self
    where
        F: Fn(&[Value]) -> Outputs + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Self {
            name: name.into(),
            params: params.into_iter().collect(),
            returns: Vec::new(),
            body: Arc::new(move |args| {
                let f = Arc::clone(&f);
                Box::pin(async move { f(&args) })
            }),
        }
    }

    /// Declares the kinds of the outputs (used only for the descriptor).
    pub fn with_returns(mut self, returns: impl IntoIterator<Item = ParamKind>) -> Self {
        self.returns = returns.into_iter().collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared parameter kinds, in positional order.
    pub fn params(&self) -> &[ParamKind] {
        &self.params
    }

    /// Number of declared parameters.
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Renders the signature, e.g. `fn(int, str) -> (bool)`.
    pub fn signature(&self) -> String {
        let join = |kinds: &[ParamKind]| {
            kinds
                .iter()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };
        format!("fn({}) -> ({})", join(&self.params), join(&self.returns))
    }

    /// Starts one call with an already-bound argument vector.
    pub(crate) fn call(&self, args: Vec<Value>) -> BoxTaskFuture {
        (self.body)(args)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("returns", &self.returns)
            .finish_non_exhaustive()
    }
}
