//! # Worker pool.
//!
//! ```text
//! assign([t1, t2, t3]) ──► first idle slot ──► spawn t1, t2, t3
//!                              │                   │
//!                              │   last one done ◄─┘
//!                              ▼
//!                          slot idle again
//! ```
//!
//! ## Rules
//! - A batch occupies exactly one slot until **all** of its tasks finish.
//! - A disabled pool, or a pool with no idle slot, drops the batch.
//! - `wait()` covers every task dispatched so far, across all slots.

mod core;
mod slot;

pub use self::core::Pool;
