//! Error types used by the delegator engine and its collaborators.
//!
//! This module defines three error enums:
//!
//! - [`DelegateError`]: errors raised by a single engine (loading, pattern
//!   arguments, return lookups, task panics).
//! - [`RegistryError`]: errors raised by the [`Registry`](crate::Registry).
//! - [`PoolError`]: errors raised when constructing a [`Pool`](crate::Pool).
//!
//! All types provide `as_label` (stable snake_case label for logs) and are
//! `Clone`, so one fault can be latched in the engine and handed to several callers.

use thiserror::Error;

use crate::core::PatternKind;
use crate::tasks::ParamKind;

/// # Errors produced by a delegator engine.
///
/// `LoadFault` and `PatternParam` are the two "latching" faults: once an
/// engine records one, it stays inert and every later builder or run call
/// returns the same fault. The remaining variants are plain call errors.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DelegateError {
    /// A queued callable's parameter was missing and its kind has no default value.
    #[error("load fault: parameter #{index} of `{callable}` is `{kind}` and has no default value")]
    LoadFault {
        /// Name of the callable being loaded.
        callable: String,
        /// Position of the parameter that could not be filled.
        index: usize,
        /// Declared kind of that parameter.
        kind: ParamKind,
    },

    /// `TimeOut` or `Tick` was selected with missing or mistyped arguments.
    ///
    /// The engine still performs exactly one pass before surfacing this.
    #[error("{pattern} pattern parameter fault: {reason}")]
    PatternParam {
        /// Pattern whose arguments were rejected.
        pattern: PatternKind,
        /// What the pattern expected.
        reason: &'static str,
    },

    /// Requested task/output position has no recorded value in the snapshot.
    #[error("no return value recorded for task {task}, output {output}")]
    NotFound {
        /// Task position (0-based).
        task: usize,
        /// Output position (0-based).
        output: usize,
    },

    /// No return snapshot is buffered (nothing ran, or it was already taken).
    #[error("no return snapshot available")]
    NoReturns,

    /// `run` was called after a detached run had already been launched.
    #[error("a detached run has already been launched on this engine")]
    AlreadyLaunched,

    /// `run` was called while another run of the same engine is in flight.
    #[error("a run is already in flight on this engine")]
    Busy,

    /// A queued task panicked; the run was aborted.
    #[error("task #{index} `{name}` panicked: {info}")]
    TaskPanicked {
        /// Queue position of the task.
        index: usize,
        /// Descriptor of the task.
        name: String,
        /// Panic payload rendered as text.
        info: String,
    },
}

impl DelegateError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use delegator::DelegateError;
    ///
    /// let err = DelegateError::NotFound { task: 3, output: 0 };
    /// assert_eq!(err.as_label(), "returns_not_found");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DelegateError::LoadFault { .. } => "load_fault",
            DelegateError::PatternParam { .. } => "pattern_param_fault",
            DelegateError::NotFound { .. } => "returns_not_found",
            DelegateError::NoReturns => "returns_empty",
            DelegateError::AlreadyLaunched => "already_launched",
            DelegateError::Busy => "run_in_flight",
            DelegateError::TaskPanicked { .. } => "task_panicked",
        }
    }

    /// Indicates whether this fault latches the engine into its inert state.
    ///
    /// ```
    /// use delegator::{DelegateError, PatternKind};
    ///
    /// let fault = DelegateError::PatternParam { pattern: PatternKind::Tick, reason: "missing" };
    /// assert!(fault.is_latching());
    /// assert!(!DelegateError::NoReturns.is_latching());
    /// ```
    pub fn is_latching(&self) -> bool {
        matches!(
            self,
            DelegateError::LoadFault { .. } | DelegateError::PatternParam { .. }
        )
    }
}

/// # Errors produced by the engine registry.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    /// An engine is already registered under this name.
    #[error("an engine named `{name}` is already registered")]
    NameTaken {
        /// The colliding name.
        name: String,
    },

    /// No engine is registered under this name.
    #[error("no engine named `{name}` is registered")]
    NotFound {
        /// The missing name.
        name: String,
    },

    /// Position is past the end of the registry.
    #[error("index {index} is out of range for {len} registered engines")]
    IndexOutOfRange {
        /// Requested position.
        index: usize,
        /// Number of registered engines.
        len: usize,
    },

    /// The target engine itself failed.
    #[error(transparent)]
    Engine(#[from] DelegateError),
}

impl RegistryError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RegistryError::NameTaken { .. } => "registry_name_taken",
            RegistryError::NotFound { .. } => "registry_not_found",
            RegistryError::IndexOutOfRange { .. } => "registry_index_out_of_range",
            RegistryError::Engine(e) => e.as_label(),
        }
    }
}

/// # Errors produced when building a worker pool.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    /// A pool needs at least one slot.
    #[error("pool capacity must be at least 1")]
    ZeroCapacity,
}
