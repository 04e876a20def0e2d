//! Simulation configuration and execution.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use log::{debug, trace};
use serde_json::json;

use crate::context::SimulationContext;
use crate::error::SimError;
use crate::log::get_colored;
use crate::process::channel::channel;
use crate::process::executor::Executor;
use crate::process::task::ProcessId;
use crate::state::SimulationState;

/// Represents a simulation, provides methods for its configuration and execution.
///
/// Simulated activities are written as async processes which suspend on timers and resource requests.
/// The simulation owns the clock and the event queue: each step dispatches the earliest pending event,
/// advances the clock to its time and resumes the process waiting for it.
pub struct Simulation {
    sim_state: Rc<RefCell<SimulationState>>,
    executor: Executor,
}

impl Simulation {
    /// Creates a new simulation with specified random seed.
    pub fn new(seed: u64) -> Self {
        let (spawner, spawned) = channel();
        Self {
            sim_state: Rc::new(RefCell::new(SimulationState::new(seed, spawner))),
            executor: Executor::new(spawned),
        }
    }

    /// Creates a new simulation context with specified name.
    ///
    /// Contexts are lightweight: many processes may share one context and log under its name.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use callsim_core::Simulation;
    ///
    /// let mut sim = Simulation::new(123);
    /// let comp_ctx = sim.create_context("comp");
    /// assert_eq!(comp_ctx.name(), "comp");
    /// assert_eq!(comp_ctx.time(), 0.);
    /// ```
    pub fn create_context<S>(&mut self, name: S) -> SimulationContext
    where
        S: AsRef<str>,
    {
        let ctx = SimulationContext::new(name.as_ref(), self.sim_state.clone());
        debug!(
            target: "simulation",
            "[{:.3} {} simulation] Created context: {}",
            self.time(),
            get_colored("DEBUG", colored::Color::Blue),
            json!({"name": ctx.name()})
        );
        ctx
    }

    /// Spawns a new process.
    ///
    /// The process is first polled on the next step at the current simulation time.
    /// A process which returns an error aborts the run, see [`run_until`](Self::run_until).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::cell::Cell;
    /// use std::rc::Rc;
    /// use callsim_core::{SimError, Simulation};
    ///
    /// let mut sim = Simulation::new(123);
    /// let ctx = sim.create_context("comp");
    /// let done = Rc::new(Cell::new(false));
    /// let flag = done.clone();
    ///
    /// sim.spawn(async move {
    ///     ctx.sleep(10.)?.await;
    ///     flag.set(true);
    ///     Ok::<(), SimError>(())
    /// });
    ///
    /// sim.step_until_no_events().unwrap();
    /// assert!(done.get());
    /// assert_eq!(sim.time(), 10.);
    /// ```
    pub fn spawn(&mut self, future: impl Future<Output = Result<(), SimError>> + 'static) -> ProcessId {
        let sim_state = self.sim_state.clone();
        self.sim_state.borrow_mut().spawn(async move {
            if let Err(err) = future.await {
                sim_state.borrow_mut().fail("simulation", err);
            }
        })
    }

    /// Returns the current simulation time.
    pub fn time(&self) -> f64 {
        self.sim_state.borrow().time()
    }

    /// Performs a single step through the simulation.
    ///
    /// First lets all runnable processes make progress at the current time. Then takes the next event from the queue,
    /// advances the simulation time to event time and resumes the process waiting for this event.
    ///
    /// Returns `true` if some pending event was found and `false` otherwise.
    /// The latter means that there are no pending events, so no progress can be made.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use callsim_core::{SimError, Simulation};
    ///
    /// let mut sim = Simulation::new(123);
    /// let ctx = sim.create_context("comp");
    /// sim.spawn(async move {
    ///     ctx.sleep(1.2)?.await;
    ///     Ok::<(), SimError>(())
    /// });
    /// assert!(sim.step());
    /// assert_eq!(sim.time(), 1.2);
    /// assert!(!sim.step());
    /// ```
    pub fn step(&mut self) -> bool {
        self.executor.process_tasks();
        let next = self.sim_state.borrow_mut().next_event();
        if let Some(event) = next {
            trace!(
                target: "simulation",
                "[{:.3} {} simulation] {}",
                event.time,
                get_colored("EVENT", colored::Color::BrightBlack),
                json!({"id": event.id})
            );
            event.promise.complete();
            self.executor.process_tasks();
            true
        } else {
            false
        }
    }

    /// Steps through the simulation until there are no pending events left.
    ///
    /// Stops early and returns the error if some process has failed.
    pub fn step_until_no_events(&mut self) -> Result<(), SimError> {
        while self.step() {
            self.check_failure()?;
        }
        self.check_failure()
    }

    /// Runs the simulation until the specified time.
    ///
    /// All events with time not above `horizon` are dispatched, including events scheduled
    /// during the run at exactly `horizon`. Afterwards the clock is set to `horizon` and remaining
    /// events stay in the queue, so the run can be resumed with a later horizon.
    ///
    /// Returns an error if `horizon` is before the current time or some process has failed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use callsim_core::{SimError, Simulation};
    ///
    /// let mut sim = Simulation::new(123);
    /// let ctx = sim.create_context("comp");
    /// sim.spawn(async move {
    ///     while ctx.time() < 100. {
    ///         ctx.sleep(3.)?.await;
    ///     }
    ///     Ok::<(), SimError>(())
    /// });
    ///
    /// sim.run_until(10.).unwrap();
    /// assert_eq!(sim.time(), 10.);
    /// assert_eq!(sim.event_count(), 4); // timers at 3, 6, 9 have fired, the one at 12 is pending
    /// assert!(sim.run_until(5.).is_err());
    /// ```
    pub fn run_until(&mut self, horizon: f64) -> Result<(), SimError> {
        let now = self.time();
        if !(horizon >= now) {
            return Err(SimError::InvalidDuration { delay: horizon - now });
        }
        loop {
            self.executor.process_tasks();
            self.check_failure()?;
            match self.sim_state.borrow_mut().peek_event() {
                Some(event) if event.time <= horizon => {}
                _ => break,
            }
            self.step();
        }
        if horizon > self.time() {
            self.sim_state.borrow_mut().set_time(horizon);
        }
        Ok(())
    }

    fn check_failure(&mut self) -> Result<(), SimError> {
        match self.sim_state.borrow_mut().take_failure() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Returns a random float in the range _[0, 1)_
    /// using the simulation-wide random number generator.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use callsim_core::Simulation;
    ///
    /// let mut sim = Simulation::new(123);
    /// let f: f64 = sim.rand();
    /// assert!(f >= 0.0 && f < 1.0);
    /// ```
    pub fn rand(&mut self) -> f64 {
        self.sim_state.borrow_mut().rand()
    }

    /// Returns the total number of created events.
    ///
    /// Note that cancelled events are also counted here.
    pub fn event_count(&self) -> u64 {
        self.sim_state.borrow().event_count()
    }

    /// Returns the number of events waiting in the queue, not counting cancelled ones.
    pub fn pending_event_count(&self) -> usize {
        self.sim_state.borrow().pending_event_count()
    }

    /// Returns the total number of spawned processes.
    pub fn process_count(&self) -> u64 {
        self.sim_state.borrow().process_count()
    }

    /// Returns the number of processes which have not finished yet.
    pub fn live_process_count(&self) -> usize {
        self.executor.live_count()
    }
}
