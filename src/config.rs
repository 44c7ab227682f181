//! # Engine configuration.
//!
//! Provides [`Config`], the settings shared by engines and their collaborators.
//!
//! Config is used in two ways:
//! 1. **Engine creation**: `Delegator::builder(config)`
//! 2. **Monitor creation**: `Monitor::from_config(&config)`
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1 by [`Config::bus_capacity_clamped`]
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use delegator::Config;
//!
//! let mut cfg = Config::default();
//! cfg.bus_capacity = 256;
//! cfg.monitor_interval = Duration::from_millis(500);
//!
//! assert_eq!(cfg.bus_capacity_clamped(), 256);
//! ```

use std::time::Duration;

/// Settings for engines and collaborators.
///
/// ## Field semantics
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped)
/// - `monitor_interval`: period between two invocations of a monitor's task
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Receivers that lag behind more than `bus_capacity` events observe
    /// `Lagged` and skip older items.
    pub bus_capacity: usize,

    /// Interval at which a [`Monitor`](crate::Monitor) re-invokes its task.
    pub monitor_interval: Duration,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `bus_capacity = 1024`
    /// - `monitor_interval = 1s`
    fn default() -> Self {
        Self {
            bus_capacity: 1024,
            monitor_interval: Duration::from_secs(1),
        }
    }
}
