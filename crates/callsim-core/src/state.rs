use std::collections::BinaryHeap;
use std::future::Future;

use rand::prelude::*;
use rand_pcg::Pcg64;
use rustc_hash::FxHashSet;

use crate::error::SimError;
use crate::event::{Event, EventId};
use crate::log::{log_incorrect_event, log_process_failure};
use crate::process::channel::Sender;
use crate::process::promise::Promise;
use crate::process::task::{ProcessId, Task};

pub(crate) struct SimulationState {
    clock: f64,
    rand: Pcg64,
    events: BinaryHeap<Event>,
    canceled_events: FxHashSet<EventId>,
    event_count: u64,
    spawner: Sender<Task>,
    process_count: u64,
    failure: Option<SimError>,
}

impl SimulationState {
    pub fn new(seed: u64, spawner: Sender<Task>) -> Self {
        Self {
            clock: 0.0,
            rand: Pcg64::seed_from_u64(seed),
            events: BinaryHeap::new(),
            canceled_events: FxHashSet::default(),
            event_count: 0,
            spawner,
            process_count: 0,
            failure: None,
        }
    }

    pub fn time(&self) -> f64 {
        self.clock
    }

    pub fn set_time(&mut self, time: f64) {
        self.clock = time;
    }

    pub fn rand(&mut self) -> f64 {
        self.rand.gen_range(0.0..1.0)
    }

    pub fn sample_from_distribution<T, Dist: Distribution<T>>(&mut self, dist: &Dist) -> T {
        dist.sample(&mut self.rand)
    }

    // Events ----------------------------------------------------------------------------------------------------------

    pub fn add_event(&mut self, promise: Promise, delay: f64) -> Result<EventId, SimError> {
        // NaN delays are rejected too
        if !(delay >= 0.) {
            log_incorrect_event(self.clock, delay, "negative delay");
            return Err(SimError::InvalidDuration { delay });
        }
        let event_id = self.event_count;
        self.events.push(Event {
            id: event_id,
            time: self.clock + delay,
            promise,
        });
        self.event_count += 1;
        Ok(event_id)
    }

    pub fn schedule(&mut self, promise: Promise, time: f64) -> Result<EventId, SimError> {
        self.add_event(promise, time - self.clock)
    }

    pub fn add_event_now(&mut self, promise: Promise) -> EventId {
        let event_id = self.event_count;
        self.events.push(Event {
            id: event_id,
            time: self.clock,
            promise,
        });
        self.event_count += 1;
        event_id
    }

    pub fn next_event(&mut self) -> Option<Event> {
        while let Some(event) = self.events.pop() {
            if !self.canceled_events.remove(&event.id) {
                self.clock = event.time;
                return Some(event);
            }
        }
        None
    }

    pub fn peek_event(&mut self) -> Option<&Event> {
        loop {
            let event_id = self.events.peek()?.id;
            if self.canceled_events.remove(&event_id) {
                self.events.pop();
            } else {
                return self.events.peek();
            }
        }
    }

    pub fn cancel_event(&mut self, id: EventId) {
        self.canceled_events.insert(id);
    }

    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    pub fn pending_event_count(&self) -> usize {
        self.events.len().saturating_sub(self.canceled_events.len())
    }

    // Processes -------------------------------------------------------------------------------------------------------

    pub fn spawn(&mut self, future: impl Future<Output = ()> + 'static) -> ProcessId {
        let id = self.process_count;
        self.process_count += 1;
        self.spawner.send(Task::new(id, future));
        id
    }

    pub fn process_count(&self) -> u64 {
        self.process_count
    }

    // Only the first failure is kept, later ones are consequences of the aborted run.
    pub fn fail(&mut self, process_name: &str, error: SimError) {
        log_process_failure(self.clock, process_name, &error);
        if self.failure.is_none() {
            self.failure = Some(error);
        }
    }

    pub fn take_failure(&mut self) -> Option<SimError> {
        self.failure.take()
    }
}
