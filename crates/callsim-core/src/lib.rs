//! Discrete-event simulation core with cooperative processes.
//!
//! Simulated activities are plain Rust futures spawned into a [`Simulation`]. A process suspends on
//! timers ([`SimulationContext::sleep`]) and on requests to capacity-limited resources ([`ResourcePool`]),
//! and is resumed when the corresponding event is dispatched. Events are dispatched in time order,
//! equal-time events in the order they were scheduled.
//!
//! ```rust
//! use std::rc::Rc;
//! use callsim_core::{ResourcePool, SimError, Simulation};
//!
//! let mut sim = Simulation::new(42);
//! let pool = Rc::new(ResourcePool::new(2, sim.create_context("desk")).unwrap());
//!
//! for i in 0..3 {
//!     let pool = pool.clone();
//!     let ctx = sim.create_context(format!("client-{}", i));
//!     sim.spawn(async move {
//!         ctx.sleep(i as f64)?.await;
//!         pool.acquire().granted().await;
//!         ctx.sleep(10.)?.await;
//!         pool.release();
//!         Ok::<(), SimError>(())
//!     });
//! }
//!
//! sim.run_until(100.).unwrap();
//! // the third client waits until the first one leaves at time 10
//! assert_eq!(pool.stats().promoted_grants, 1);
//! assert_eq!(sim.live_process_count(), 0);
//! ```

#![warn(missing_docs)]

pub mod context;
pub mod error;
pub mod event;
pub mod log;
pub mod process;
pub mod resource;
pub mod simulation;
mod state;

pub use colored;
pub use context::SimulationContext;
pub use error::SimError;
pub use event::EventId;
pub use process::{ProcessId, TimerFuture};
pub use resource::{AcquireRequest, AwaitResult, GrantFuture, PoolStats, RequestId, RequestStatus, ResourcePool};
pub use simulation::Simulation;
