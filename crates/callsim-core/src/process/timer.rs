//! Timers suspending a process for a span of simulation time.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use crate::event::EventId;
use crate::state::SimulationState;

use super::promise::Promise;

/// Future that completes when its timer event is dispatched.
///
/// Returned by [`SimulationContext::sleep`](crate::SimulationContext::sleep)
/// and [`SimulationContext::sleep_until`](crate::SimulationContext::sleep_until).
/// Dropping a pending timer cancels its event, so an abandoned wait leaves nothing in the event queue.
pub struct TimerFuture {
    event_id: EventId,
    promise: Promise,
    sim_state: Rc<RefCell<SimulationState>>,
}

impl TimerFuture {
    pub(crate) fn new(event_id: EventId, promise: Promise, sim_state: Rc<RefCell<SimulationState>>) -> Self {
        Self {
            event_id,
            promise,
            sim_state,
        }
    }

    /// Returns true if the timer has fired.
    pub fn is_completed(&self) -> bool {
        self.promise.is_completed()
    }
}

impl Future for TimerFuture {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.promise.poll(cx)
    }
}

impl Drop for TimerFuture {
    fn drop(&mut self) {
        if !self.promise.is_completed() {
            self.sim_state.borrow_mut().cancel_event(self.event_id);
        }
    }
}
