//! Accessing simulation from components and processes.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use rand::prelude::Distribution;

use crate::error::SimError;
use crate::process::promise::Promise;
use crate::process::task::ProcessId;
use crate::process::timer::TimerFuture;
use crate::state::SimulationState;

/// A facade for accessing the simulation state and producing events from simulation components.
///
/// Contexts are cheap handles: cloning one gives another handle to the same simulation with the same name.
#[derive(Clone)]
pub struct SimulationContext {
    name: Rc<str>,
    sim_state: Rc<RefCell<SimulationState>>,
}

impl SimulationContext {
    pub(crate) fn new(name: &str, sim_state: Rc<RefCell<SimulationState>>) -> Self {
        Self {
            name: Rc::from(name),
            sim_state,
        }
    }

    /// Returns the name of component associated with this context.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current simulation time.
    pub fn time(&self) -> f64 {
        self.sim_state.borrow().time()
    }

    /// Returns a random value from the specified distribution
    /// using the simulation-wide random number generator.
    pub fn sample_from_distribution<T, Dist: Distribution<T>>(&self, dist: &Dist) -> T {
        self.sim_state.borrow_mut().sample_from_distribution(dist)
    }

    /// Returns a future that completes after `duration` of simulation time.
    ///
    /// Fails with [`SimError::InvalidDuration`] if `duration` is negative.
    /// Dropping the future before it completes cancels the underlying event.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use callsim_core::{SimError, Simulation};
    ///
    /// let mut sim = Simulation::new(123);
    /// let ctx = sim.create_context("comp");
    ///
    /// sim.spawn(async move {
    ///     ctx.sleep(5.)?.await;
    ///     assert_eq!(ctx.time(), 5.);
    ///     assert!(ctx.sleep(-1.).is_err());
    ///     Ok::<(), SimError>(())
    /// });
    ///
    /// sim.step_until_no_events().unwrap();
    /// assert_eq!(sim.time(), 5.);
    /// ```
    pub fn sleep(&self, duration: f64) -> Result<TimerFuture, SimError> {
        let promise = Promise::new();
        let event_id = self.sim_state.borrow_mut().add_event(promise.clone(), duration)?;
        Ok(TimerFuture::new(event_id, promise, self.sim_state.clone()))
    }

    /// Returns a future that completes at the specified simulation time.
    ///
    /// Fails with [`SimError::InvalidDuration`] if `time` is in the past.
    pub fn sleep_until(&self, time: f64) -> Result<TimerFuture, SimError> {
        let promise = Promise::new();
        let event_id = self.sim_state.borrow_mut().schedule(promise.clone(), time)?;
        Ok(TimerFuture::new(event_id, promise, self.sim_state.clone()))
    }

    /// Spawns a new process.
    ///
    /// The process is first polled before the next event is dispatched, i.e. at the current simulation time.
    /// If the process finishes with an error, the simulation run is aborted and the error is returned
    /// from [`Simulation::run_until`](crate::Simulation::run_until).
    pub fn spawn(&self, future: impl Future<Output = Result<(), SimError>> + 'static) -> ProcessId {
        let sim_state = self.sim_state.clone();
        let name = self.name.clone();
        self.sim_state.borrow_mut().spawn(async move {
            if let Err(err) = future.await {
                sim_state.borrow_mut().fail(&name, err);
            }
        })
    }

    // Schedules the completion of the promise at the current time.
    pub(crate) fn wake_now(&self, promise: Promise) {
        self.sim_state.borrow_mut().add_event_now(promise);
    }
}
