//! Simulation events.

use std::cmp::Ordering;

use crate::process::promise::Promise;

/// Event identifier.
///
/// Identifiers are assigned in the order events are scheduled and are used to break ties between
/// events with equal time: the event scheduled earlier is dispatched first.
pub type EventId = u64;

/// Scheduled activation of a suspended process.
pub struct Event {
    /// Unique event identifier.
    pub id: EventId,
    /// Time at which the event is dispatched.
    pub time: f64,
    /// Wake-up slot of the process resumed by this event.
    pub(crate) promise: Promise,
}

impl Eq for Event {}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        other.time.total_cmp(&self.time).then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
