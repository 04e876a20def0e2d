//! Per-run statistics.

use serde::Serialize;

/// Customer identifier, assigned sequentially from 1 in arrival order.
pub type CustomerId = u64;

/// Stage reached by a customer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Outcome {
    /// Waiting for an agent.
    Waiting,
    /// Talking to an agent.
    InService,
    /// The call is completed.
    Served,
    /// Hung up before an agent was available.
    Abandoned,
}

/// Record of a single customer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CustomerRecord {
    pub id: CustomerId,
    pub arrival: f64,
    pub outcome: Outcome,
    /// Time at which the customer got an agent or hung up.
    pub resolved_at: Option<f64>,
}

/// Read-only view of the collected statistics.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StatsSnapshot {
    /// Wait durations of served customers in the order they got an agent.
    pub waits: Vec<f64>,
    /// Number of completed calls.
    pub handled: u64,
    /// Number of customers who hung up.
    pub abandoned: u64,
}

impl StatsSnapshot {
    /// Returns the mean wait of served customers or zero if nobody was served.
    pub fn mean_wait(&self) -> f64 {
        if self.waits.is_empty() {
            0.
        } else {
            self.waits.iter().sum::<f64>() / self.waits.len() as f64
        }
    }
}

/// Accumulates customer outcomes of one scenario run.
#[derive(Default)]
pub struct StatisticsCollector {
    stats: StatsSnapshot,
    customers: Vec<CustomerRecord>,
}

impl StatisticsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_arrival(&mut self, id: CustomerId, time: f64) {
        assert!(
            self.customers.last().map_or(true, |last| last.id < id),
            "customer {} arrived out of order",
            id
        );
        self.customers.push(CustomerRecord {
            id,
            arrival: time,
            outcome: Outcome::Waiting,
            resolved_at: None,
        });
    }

    /// Records that the customer got an agent after waiting `wait`.
    pub fn record_served(&mut self, id: CustomerId, time: f64, wait: f64) {
        self.stats.waits.push(wait);
        let record = self.record_mut(id);
        record.outcome = Outcome::InService;
        record.resolved_at = Some(time);
    }

    /// Records that the customer's call is completed.
    pub fn record_handled(&mut self, id: CustomerId) {
        self.stats.handled += 1;
        self.record_mut(id).outcome = Outcome::Served;
    }

    /// Records that the customer hung up.
    pub fn record_abandoned(&mut self, id: CustomerId, time: f64) {
        self.stats.abandoned += 1;
        let record = self.record_mut(id);
        record.outcome = Outcome::Abandoned;
        record.resolved_at = Some(time);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        self.stats.clone()
    }

    pub fn customers(&self) -> &[CustomerRecord] {
        &self.customers
    }

    /// Returns the number of arrived customers.
    pub fn arrived(&self) -> u64 {
        self.customers.len() as u64
    }

    /// Returns the number of customers with the specified outcome.
    pub fn count(&self, outcome: Outcome) -> u64 {
        self.customers.iter().filter(|c| c.outcome == outcome).count() as u64
    }

    fn record_mut(&mut self, id: CustomerId) -> &mut CustomerRecord {
        match self.customers.binary_search_by_key(&id, |c| c.id) {
            Ok(pos) => &mut self.customers[pos],
            Err(_) => panic!("unknown customer {}", id),
        }
    }
}
