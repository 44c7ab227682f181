//! # Registry of named engines.
//!
//! ```text
//! register(engine, "billing") ─┐
//! register(engine, "reports") ─┼─► IndexMap<name, Delegator>   (registration order)
//!                              │
//! execute("billing", launch) ──┤   one engine by name
//! flow(-1, launch) ────────────┤   every engine, in order, stop at first failure
//! back_return("reports" | 1) ──┘   latest snapshot of one engine
//! ```

mod core;
mod target;

pub use self::core::Registry;
pub use target::Target;
