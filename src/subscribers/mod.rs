//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`]
//! fan-out used to deliver engine events to user code.
//!
//! ## Architecture
//! ```text
//! RunLoop ── publish(Event) ──► Bus ──► subscriber listener ──► SubscriberSet::emit(&Event)
//!                                                                 ┌─────────┼─────────┐
//!                                                                 ▼         ▼         ▼
//!                                                              LogWriter  Metrics   Custom
//! ```
//!
//! Enable the `logging` feature for the built-in [`LogWriter`].

mod set;
mod subscribe;

#[cfg(feature = "logging")]
mod log;

pub(crate) use set::panic_message;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
