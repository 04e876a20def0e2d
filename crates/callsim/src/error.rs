//! Scenario errors.

use std::path::PathBuf;

use thiserror::Error;

use callsim_core::SimError;

/// Errors which abort a single scenario.
///
/// Parameter errors are detected before the run starts, simulation errors abort the run.
/// Other scenarios of an experiment are not affected.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// The simulation run failed.
    #[error(transparent)]
    Sim(#[from] SimError),
    /// A distribution parameter is not positive or not finite.
    #[error("invalid {parameter} {value}: distribution parameter must be positive and finite")]
    Sampling {
        /// Name of the parameter.
        parameter: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// A time parameter is out of range.
    #[error("invalid {parameter} {value}: time parameter is out of range")]
    InvalidDuration {
        /// Name of the parameter.
        parameter: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// The agent count is not positive.
    #[error("invalid agent count {agents}: at least one agent is required")]
    InvalidCapacity {
        /// Rejected agent count.
        agents: i64,
    },
    /// The config file can't be read.
    #[error("can't read config from file {}: {source}", .path.display())]
    Io {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The scenario run was interrupted by a panic.
    #[error("scenario {label} aborted")]
    Aborted {
        /// Label of the scenario.
        label: String,
    },
    /// The config can't be parsed.
    #[error("can't parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
