//! Call center queueing model built on `callsim-core`.
//!
//! Customers arrive as a Poisson stream, wait for one of a fixed number of agents and hang up
//! if nobody answers within the abandonment threshold. A scenario run reports mean wait,
//! estimated queue length, agent utilization and the numbers of handled and abandoned calls.
//!
//! ```rust
//! use callsim::config::ScenarioParameters;
//! use callsim::scenario::ScenarioRunner;
//!
//! let report = ScenarioRunner::new("base", ScenarioParameters::new(3, 0.3), 42).run().unwrap();
//! let summary = report.summary();
//! assert!(summary.utilization_percent > 0.);
//! assert_eq!(
//!     report.arrived(),
//!     summary.calls_handled + summary.calls_abandoned + report.queue_len as u64 + report.in_use as u64
//! );
//! ```

pub mod arrivals;
pub mod config;
pub mod customer;
pub mod error;
pub mod experiment;
pub mod sampler;
pub mod scenario;
pub mod stats;

pub use config::{RawConfig, ScenarioParameters};
pub use error::ScenarioError;
pub use experiment::{render_table, Experiment, ScenarioResult};
pub use scenario::{ScenarioReport, ScenarioRunner, ScenarioSummary};
