//! Asynchronous processes.

pub(crate) mod channel;
pub(crate) mod executor;
pub(crate) mod promise;
pub(crate) mod task;
pub mod timer;

pub use task::ProcessId;
pub use timer::TimerFuture;
