//! Random sampling of inter-arrival and service times.

use rand::prelude::*;
use rand_distr::Exp;
use rand_pcg::Pcg64;

use crate::error::ScenarioError;

/// Creates exponential distribution with the specified rate.
///
/// Fails with [`ScenarioError::Sampling`] if the rate is not positive or not finite.
pub fn exponential(parameter: &'static str, rate: f64) -> Result<Exp<f64>, ScenarioError> {
    if !(rate.is_finite() && rate > 0.) {
        return Err(ScenarioError::Sampling { parameter, value: rate });
    }
    Exp::new(rate).map_err(|_| ScenarioError::Sampling { parameter, value: rate })
}

/// Creates exponential distribution with the specified mean.
pub fn exponential_with_mean(parameter: &'static str, mean: f64) -> Result<Exp<f64>, ScenarioError> {
    if !(mean.is_finite() && mean > 0.) {
        return Err(ScenarioError::Sampling { parameter, value: mean });
    }
    exponential(parameter, 1. / mean)
}

/// Exponential sampler with its own random number generator.
///
/// Used for the arrival stream, so that arrival times depend only on the seed and the rate
/// and not on what else is sampled during the run.
pub struct ExpSampler {
    dist: Exp<f64>,
    rng: Pcg64,
}

impl ExpSampler {
    /// Creates a sampler with the specified rate and seed.
    pub fn new(parameter: &'static str, rate: f64, seed: u64) -> Result<Self, ScenarioError> {
        Ok(Self {
            dist: exponential(parameter, rate)?,
            rng: Pcg64::seed_from_u64(seed),
        })
    }

    /// Returns the next sample.
    pub fn sample(&mut self) -> f64 {
        self.rng.sample(self.dist)
    }
}
