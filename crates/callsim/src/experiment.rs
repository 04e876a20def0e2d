//! Tool for running multiple scenarios.

use std::path::Path;
use std::sync::mpsc::channel;

use log::info;
use serde_json::{json, Value};
use threadpool::ThreadPool;

use crate::config::{RawConfig, ScenarioParameters};
use crate::error::ScenarioError;
use crate::scenario::{ScenarioRunner, ScenarioSummary};

/// Result of one scenario of an experiment.
#[derive(Debug)]
pub struct ScenarioResult {
    pub label: String,
    pub result: Result<ScenarioSummary, ScenarioError>,
}

impl ScenarioResult {
    /// Returns the summary as JSON object, or an object with the error message if the scenario failed.
    pub fn to_json(&self) -> Value {
        match &self.result {
            Ok(summary) => json!(summary),
            Err(err) => json!({"label": self.label, "error": err.to_string()}),
        }
    }
}

/// A set of scenarios sharing the random seed.
pub struct Experiment {
    seed: u64,
    scenarios: Vec<(String, Result<ScenarioParameters, ScenarioError>)>,
}

impl Experiment {
    pub fn new(config: &RawConfig) -> Self {
        Self {
            seed: config.seed,
            scenarios: config.scenarios(),
        }
    }

    /// Loads experiment from YAML config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        Ok(Self::new(&RawConfig::from_file(path)?))
    }

    /// Replaces the seed from config.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn labels(&self) -> Vec<&str> {
        self.scenarios.iter().map(|(label, _)| label.as_str()).collect()
    }

    /// Runs all scenarios using `num_threads` threads.
    ///
    /// Results are returned in config order. A failed scenario does not affect the others.
    pub fn run(self, num_threads: usize) -> Vec<ScenarioResult> {
        let labels: Vec<String> = self.scenarios.iter().map(|(label, _)| label.clone()).collect();
        let pool = ThreadPool::new(num_threads.max(1));
        let (tx, rx) = channel();
        for (id, (label, params)) in self.scenarios.into_iter().enumerate() {
            let tx = tx.clone();
            let seed = self.seed;
            pool.execute(move || {
                info!("Running {}...", label);
                let result = params.and_then(|params| {
                    let report = ScenarioRunner::new(&label, params, seed).run()?;
                    Ok(report.summary())
                });
                tx.send((id, ScenarioResult { label, result })).unwrap();
            });
        }
        drop(tx);
        // the channel is closed once every job has finished or panicked
        collect_results(labels, rx.iter())
    }
}

// Orders results by scenario index, scenarios without a result are reported as aborted.
fn collect_results(labels: Vec<String>, received: impl Iterator<Item = (usize, ScenarioResult)>) -> Vec<ScenarioResult> {
    let mut slots: Vec<Option<ScenarioResult>> = labels.iter().map(|_| None).collect();
    for (id, result) in received {
        slots[id] = Some(result);
    }
    labels
        .into_iter()
        .zip(slots)
        .map(|(label, slot)| {
            slot.unwrap_or_else(|| ScenarioResult {
                result: Err(ScenarioError::Aborted { label: label.clone() }),
                label,
            })
        })
        .collect()
}

const HEADERS: [&str; 8] = [
    "Scenario",
    "Agents",
    "Arrival Rate",
    "Avg Wait (min)",
    "Queue Length",
    "Utilization (%)",
    "Calls Handled",
    "Abandoned Calls",
];

/// Renders results as a text table, failed scenarios are shown with their error.
pub fn render_table(results: &[ScenarioResult]) -> String {
    let rows: Vec<Result<[String; 8], String>> = results
        .iter()
        .map(|r| match &r.result {
            Ok(s) => Ok([
                s.label.clone(),
                s.agents.to_string(),
                s.arrival_rate.to_string(),
                format!("{:.2}", s.avg_wait),
                format!("{:.2}", s.queue_length),
                format!("{:.1}", s.utilization_percent),
                s.calls_handled.to_string(),
                s.calls_abandoned.to_string(),
            ]),
            Err(err) => Err(format!("{}: error: {}", r.label, err)),
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in rows.iter().flatten() {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.len());
        }
    }

    let mut table = String::from("=== Simulation Results Summary ===\n");
    let format_row = |cells: &[String]| {
        cells
            .iter()
            .zip(widths.iter())
            .enumerate()
            .map(|(i, (cell, width))| {
                if i == 0 {
                    format!("{:<width$}", cell, width = *width)
                } else {
                    format!("{:>width$}", cell, width = *width)
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
    };
    table.push_str(&format_row(&HEADERS.map(String::from)));
    table.push('\n');
    for row in rows {
        match row {
            Ok(cells) => table.push_str(&format_row(&cells)),
            Err(line) => table.push_str(&line),
        }
        table.push('\n');
    }
    table
}
