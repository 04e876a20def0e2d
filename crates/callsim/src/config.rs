//! Experiment configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ScenarioError;

/// Default random seed.
pub const DEFAULT_SEED: u64 = 42;
/// Default simulation horizon in minutes.
pub const DEFAULT_HORIZON: f64 = 120.;
/// Default mean service time in minutes.
pub const DEFAULT_MEAN_SERVICE_TIME: f64 = 5.;
/// Default time after which a waiting customer hangs up, in minutes.
pub const DEFAULT_ABANDONMENT_THRESHOLD: f64 = 5.;

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_horizon() -> f64 {
    DEFAULT_HORIZON
}

fn default_mean_service_time() -> f64 {
    DEFAULT_MEAN_SERVICE_TIME
}

fn default_abandonment_threshold() -> f64 {
    DEFAULT_ABANDONMENT_THRESHOLD
}

/// Scenario entry of YAML config.
///
/// Optional fields override the experiment-wide values.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawScenario {
    pub label: String,
    pub agents: i64,
    pub arrival_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_service_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abandonment_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizon: Option<f64>,
}

/// YAML-serializable experiment config.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawConfig {
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_horizon")]
    pub horizon: f64,
    #[serde(default = "default_mean_service_time")]
    pub mean_service_time: f64,
    #[serde(default = "default_abandonment_threshold")]
    pub abandonment_threshold: f64,
    #[serde(default)]
    pub scenarios: Vec<RawScenario>,
}

impl Default for RawConfig {
    /// Base staffing, more agents and a busy hour, two hours each.
    fn default() -> Self {
        let scenario = |label: &str, agents, arrival_rate| RawScenario {
            label: label.to_string(),
            agents,
            arrival_rate,
            mean_service_time: None,
            abandonment_threshold: None,
            horizon: None,
        };
        Self {
            seed: DEFAULT_SEED,
            horizon: DEFAULT_HORIZON,
            mean_service_time: DEFAULT_MEAN_SERVICE_TIME,
            abandonment_threshold: DEFAULT_ABANDONMENT_THRESHOLD,
            scenarios: vec![
                scenario("Scenario 1 - Base", 3, 0.3),
                scenario("Scenario 2 - More Agents", 5, 0.3),
                scenario("Scenario 3 - Busy", 3, 0.5),
            ],
        }
    }
}

impl RawConfig {
    /// Parses config from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ScenarioError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Loads config from YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&yaml)
    }

    /// Resolves the parameters of each scenario, in config order.
    pub fn scenarios(&self) -> Vec<(String, Result<ScenarioParameters, ScenarioError>)> {
        self.scenarios
            .iter()
            .map(|s| (s.label.clone(), self.resolve(s)))
            .collect()
    }

    fn resolve(&self, scenario: &RawScenario) -> Result<ScenarioParameters, ScenarioError> {
        if scenario.agents <= 0 || scenario.agents > u32::MAX as i64 {
            return Err(ScenarioError::InvalidCapacity {
                agents: scenario.agents,
            });
        }
        let params = ScenarioParameters {
            agents: scenario.agents as u32,
            arrival_rate: scenario.arrival_rate,
            mean_service_time: scenario.mean_service_time.unwrap_or(self.mean_service_time),
            abandonment_threshold: scenario.abandonment_threshold.unwrap_or(self.abandonment_threshold),
            horizon: scenario.horizon.unwrap_or(self.horizon),
        };
        params.validate()?;
        Ok(params)
    }
}

/// Parameters of a single scenario run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScenarioParameters {
    /// Number of agents answering calls.
    pub agents: u32,
    /// Mean number of calls per minute.
    pub arrival_rate: f64,
    /// Mean call duration in minutes.
    pub mean_service_time: f64,
    /// Time after which a waiting customer hangs up.
    pub abandonment_threshold: f64,
    /// Simulated time in minutes.
    pub horizon: f64,
}

impl ScenarioParameters {
    /// Creates parameters with default service time, abandonment threshold and horizon.
    pub fn new(agents: u32, arrival_rate: f64) -> Self {
        Self {
            agents,
            arrival_rate,
            mean_service_time: DEFAULT_MEAN_SERVICE_TIME,
            abandonment_threshold: DEFAULT_ABANDONMENT_THRESHOLD,
            horizon: DEFAULT_HORIZON,
        }
    }

    /// Checks that all parameters are in range.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.agents == 0 {
            return Err(ScenarioError::InvalidCapacity { agents: 0 });
        }
        if !(self.arrival_rate.is_finite() && self.arrival_rate > 0.) {
            return Err(ScenarioError::Sampling {
                parameter: "arrival_rate",
                value: self.arrival_rate,
            });
        }
        if !(self.mean_service_time.is_finite() && self.mean_service_time > 0.) {
            return Err(ScenarioError::Sampling {
                parameter: "mean_service_time",
                value: self.mean_service_time,
            });
        }
        if !(self.abandonment_threshold.is_finite() && self.abandonment_threshold >= 0.) {
            return Err(ScenarioError::InvalidDuration {
                parameter: "abandonment_threshold",
                value: self.abandonment_threshold,
            });
        }
        if !(self.horizon.is_finite() && self.horizon > 0.) {
            return Err(ScenarioError::InvalidDuration {
                parameter: "horizon",
                value: self.horizon,
            });
        }
        Ok(())
    }
}
