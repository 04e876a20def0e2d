//! Simulation errors.

use thiserror::Error;

/// Errors reported by the simulation core.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    /// An event was requested at a negative offset from the current time.
    #[error("invalid duration {delay}: events cannot be scheduled in the past")]
    InvalidDuration {
        /// Requested offset from the current simulation time.
        delay: f64,
    },
    /// A resource pool was created without any capacity.
    #[error("invalid capacity {capacity}: resource pool must have at least one unit")]
    InvalidCapacity {
        /// Requested pool capacity.
        capacity: u32,
    },
}
