//! Running a single scenario.

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;
use serde::Serialize;

use callsim_core::{PoolStats, ResourcePool, Simulation};

use crate::arrivals::ArrivalGenerator;
use crate::config::ScenarioParameters;
use crate::error::ScenarioError;
use crate::sampler::{exponential_with_mean, ExpSampler};
use crate::stats::{CustomerRecord, StatisticsCollector, StatsSnapshot};

// Arrivals are sampled from a separate generator so that scenarios which differ only in staffing
// see the same stream of calls.
const ARRIVAL_SEED_OFFSET: u64 = 0x9E37_79B9_7F4A_7C15;

/// Metrics derived from the statistics of a finished run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScenarioMetrics {
    /// Mean wait of served customers, zero if nobody was served.
    pub avg_wait: f64,
    /// Mean queue length estimated by Little's law.
    pub avg_queue_len: f64,
    /// Fraction of agent time spent on completed calls.
    pub utilization: f64,
    pub handled: u64,
    pub abandoned: u64,
}

impl ScenarioMetrics {
    /// Derives metrics from statistics snapshot and scenario parameters.
    pub fn derive(stats: &StatsSnapshot, params: &ScenarioParameters) -> Self {
        let avg_wait = stats.mean_wait();
        Self {
            avg_wait,
            avg_queue_len: params.arrival_rate * avg_wait,
            utilization: stats.handled as f64 * params.mean_service_time / (params.horizon * params.agents as f64),
            handled: stats.handled,
            abandoned: stats.abandoned,
        }
    }
}

/// Summary row of a scenario, rounded for presentation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScenarioSummary {
    pub label: String,
    pub agents: u32,
    pub arrival_rate: f64,
    pub avg_wait: f64,
    pub queue_length: f64,
    pub utilization_percent: f64,
    pub calls_handled: u64,
    pub calls_abandoned: u64,
}

fn round_to(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale).round() / scale
}

impl ScenarioSummary {
    pub fn new(label: &str, params: &ScenarioParameters, metrics: &ScenarioMetrics) -> Self {
        Self {
            label: label.to_string(),
            agents: params.agents,
            arrival_rate: params.arrival_rate,
            avg_wait: round_to(metrics.avg_wait, 2),
            queue_length: round_to(metrics.avg_queue_len, 2),
            utilization_percent: round_to(metrics.utilization * 100., 1),
            calls_handled: metrics.handled,
            calls_abandoned: metrics.abandoned,
        }
    }
}

/// Full state of a finished run.
#[derive(Clone, Debug)]
pub struct ScenarioReport {
    pub label: String,
    pub params: ScenarioParameters,
    pub stats: StatsSnapshot,
    pub metrics: ScenarioMetrics,
    pub customers: Vec<CustomerRecord>,
    pub pool_stats: PoolStats,
    /// Agents busy at the horizon.
    pub in_use: u32,
    /// Customers waiting at the horizon.
    pub queue_len: usize,
    pub event_count: u64,
    /// Processes still running at the horizon: the arrival generator and customers in the system.
    pub live_processes: usize,
}

impl ScenarioReport {
    pub fn summary(&self) -> ScenarioSummary {
        ScenarioSummary::new(&self.label, &self.params, &self.metrics)
    }

    /// Returns the number of customers who arrived during the run.
    pub fn arrived(&self) -> u64 {
        self.customers.len() as u64
    }
}

/// Runs one scenario: a pool of agents, a stream of customers and a statistics collector.
pub struct ScenarioRunner {
    label: String,
    params: ScenarioParameters,
    seed: u64,
}

impl ScenarioRunner {
    pub fn new(label: &str, params: ScenarioParameters, seed: u64) -> Self {
        Self {
            label: label.to_string(),
            params,
            seed,
        }
    }

    /// Runs the simulation up to the horizon and collects the results.
    ///
    /// Parameters are validated before the simulation starts.
    pub fn run(&self) -> Result<ScenarioReport, ScenarioError> {
        let params = &self.params;
        params.validate()?;
        let service_time = exponential_with_mean("mean_service_time", params.mean_service_time)?;
        let gaps = ExpSampler::new(
            "arrival_rate",
            params.arrival_rate,
            self.seed.wrapping_add(ARRIVAL_SEED_OFFSET),
        )?;

        let mut sim = Simulation::new(self.seed);
        let agents = Rc::new(ResourcePool::new(params.agents, sim.create_context("agents"))?);
        let stats = Rc::new(RefCell::new(StatisticsCollector::new()));
        let generator = ArrivalGenerator::new(
            sim.create_context("arrivals"),
            sim.create_context("customer"),
            agents.clone(),
            stats.clone(),
            gaps,
            service_time,
            params.abandonment_threshold,
        );
        sim.spawn(generator.run());
        sim.run_until(params.horizon)?;

        let stats = stats.borrow();
        let snapshot = stats.snapshot();
        let metrics = ScenarioMetrics::derive(&snapshot, params);
        debug!(
            "{}: {} arrived, {} handled, {} abandoned, {} events",
            self.label,
            stats.arrived(),
            snapshot.handled,
            snapshot.abandoned,
            sim.event_count()
        );
        let report = ScenarioReport {
            label: self.label.clone(),
            params: params.clone(),
            stats: snapshot,
            metrics,
            customers: stats.customers().to_vec(),
            pool_stats: agents.stats(),
            in_use: agents.in_use(),
            queue_len: agents.queue_len(),
            event_count: sim.event_count(),
            live_processes: sim.live_process_count(),
        };
        Ok(report)
    }
}
