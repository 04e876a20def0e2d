//! Capacity-limited resource shared by processes.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use futures::{select_biased, FutureExt};

use crate::context::SimulationContext;
use crate::error::SimError;
use crate::log_debug;
use crate::process::promise::Promise;

/// Identifier of acquire request, unique within a pool.
pub type RequestId = u64;

/// State of acquire request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestStatus {
    /// Waiting in the pool queue.
    Pending,
    /// A resource unit is assigned to the request.
    Granted,
    /// Removed from the queue before it could be granted.
    Withdrawn,
}

/// Outcome of waiting for a request with a time limit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AwaitResult {
    /// The grant was delivered before the time limit.
    Granted,
    /// The time limit elapsed first.
    Timeout {
        /// The time limit that elapsed.
        timeout: f64,
    },
}

/// Counters accumulated by a resource pool over its lifetime.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Number of acquire calls.
    pub requests: u64,
    /// Requests granted on acquire without waiting.
    pub immediate_grants: u64,
    /// Requests granted from the queue on release.
    pub promoted_grants: u64,
    /// Pending requests removed from the queue.
    pub withdrawals: u64,
    /// Number of release calls.
    pub releases: u64,
    /// Maximum number of simultaneously used units.
    pub peak_in_use: u32,
    /// Maximum queue length.
    pub peak_queue_len: usize,
}

impl PoolStats {
    /// Returns the total number of granted requests.
    pub fn grants(&self) -> u64 {
        self.immediate_grants + self.promoted_grants
    }
}

struct RequestSlot {
    id: RequestId,
    requested_at: f64,
    status: RequestStatus,
    promise: Promise,
}

struct PoolState {
    in_use: u32,
    queue: VecDeque<Rc<RefCell<RequestSlot>>>,
    next_request_id: RequestId,
    stats: PoolStats,
}

/// A pool of `capacity` interchangeable resource units with a FIFO queue of pending requests.
///
/// The pool is shared between processes by reference (usually via `Rc`), all operations take `&self`.
///
/// # Examples
///
/// ```rust
/// use std::rc::Rc;
/// use callsim_core::{AwaitResult, ResourcePool, SimError, Simulation};
///
/// let mut sim = Simulation::new(123);
/// let pool = Rc::new(ResourcePool::new(1, sim.create_context("pool")).unwrap());
///
/// for i in 0..2 {
///     let pool = pool.clone();
///     let ctx = sim.create_context(format!("user-{}", i));
///     sim.spawn(async move {
///         let request = pool.acquire();
///         match request.with_timeout(3.).await? {
///             AwaitResult::Granted => {
///                 ctx.sleep(5.)?.await;
///                 pool.release();
///             }
///             AwaitResult::Timeout { .. } => {
///                 pool.withdraw(&request);
///             }
///         }
///         Ok::<(), SimError>(())
///     });
/// }
///
/// sim.step_until_no_events().unwrap();
/// assert_eq!(pool.stats().immediate_grants, 1);
/// assert_eq!(pool.stats().withdrawals, 1);
/// assert_eq!(pool.in_use(), 0);
/// ```
pub struct ResourcePool {
    capacity: u32,
    state: RefCell<PoolState>,
    ctx: SimulationContext,
}

impl ResourcePool {
    /// Creates a pool with the specified number of units.
    ///
    /// Fails with [`SimError::InvalidCapacity`] if `capacity` is zero.
    pub fn new(capacity: u32, ctx: SimulationContext) -> Result<Self, SimError> {
        if capacity == 0 {
            return Err(SimError::InvalidCapacity { capacity });
        }
        Ok(Self {
            capacity,
            state: RefCell::new(PoolState {
                in_use: 0,
                queue: VecDeque::new(),
                next_request_id: 0,
                stats: PoolStats::default(),
            }),
            ctx,
        })
    }

    /// Requests a resource unit without blocking.
    ///
    /// If a unit is free and nobody is waiting, the returned request is already granted.
    /// Otherwise the request is appended to the queue in pending state.
    pub fn acquire(&self) -> AcquireRequest {
        let mut state = self.state.borrow_mut();
        let id = state.next_request_id;
        state.next_request_id += 1;
        state.stats.requests += 1;

        let promise = Promise::new();
        let mut slot = RequestSlot {
            id,
            requested_at: self.ctx.time(),
            status: RequestStatus::Pending,
            promise: promise.clone(),
        };
        let granted = state.in_use < self.capacity && state.queue.is_empty();
        if granted {
            slot.status = RequestStatus::Granted;
            state.in_use += 1;
            state.stats.immediate_grants += 1;
            state.stats.peak_in_use = state.stats.peak_in_use.max(state.in_use);
            promise.complete();
        }
        let slot = Rc::new(RefCell::new(slot));
        if !granted {
            state.queue.push_back(slot.clone());
            state.stats.peak_queue_len = state.stats.peak_queue_len.max(state.queue.len());
        }
        log_debug!(
            self.ctx,
            "request {} {} (in use: {}/{}, queue: {})",
            id,
            if granted { "granted" } else { "queued" },
            state.in_use,
            self.capacity,
            state.queue.len()
        );

        AcquireRequest {
            slot,
            ctx: self.ctx.clone(),
        }
    }

    /// Returns a unit to the pool.
    ///
    /// If some requests are waiting, the unit is immediately assigned to the head of the queue
    /// and its owner is resumed at the current time.
    ///
    /// Panics if no units are in use.
    pub fn release(&self) {
        let mut state = self.state.borrow_mut();
        assert!(state.in_use > 0, "release of idle resource pool {}", self.ctx.name());
        state.in_use -= 1;
        state.stats.releases += 1;

        if let Some(slot) = state.queue.pop_front() {
            let mut slot = slot.borrow_mut();
            slot.status = RequestStatus::Granted;
            self.ctx.wake_now(slot.promise.clone());
            state.in_use += 1;
            state.stats.promoted_grants += 1;
            state.stats.peak_in_use = state.stats.peak_in_use.max(state.in_use);
            log_debug!(
                self.ctx,
                "request {} granted after waiting {:.3} (queue: {})",
                slot.id,
                self.ctx.time() - slot.requested_at,
                state.queue.len()
            );
        }
    }

    /// Removes a pending request from the queue and returns its previous status.
    ///
    /// Withdrawing a granted or already withdrawn request has no effect.
    /// A returned [`RequestStatus::Granted`] means that the caller holds a unit and must release it.
    pub fn withdraw(&self, request: &AcquireRequest) -> RequestStatus {
        let mut slot = request.slot.borrow_mut();
        let previous = slot.status;
        match previous {
            RequestStatus::Pending => {
                let mut state = self.state.borrow_mut();
                state.queue.retain(|queued| !Rc::ptr_eq(queued, &request.slot));
                state.stats.withdrawals += 1;
                slot.status = RequestStatus::Withdrawn;
                log_debug!(
                    self.ctx,
                    "request {} withdrawn after waiting {:.3} (queue: {})",
                    slot.id,
                    self.ctx.time() - slot.requested_at,
                    state.queue.len()
                );
            }
            RequestStatus::Granted | RequestStatus::Withdrawn => {}
        }
        previous
    }

    /// Returns the total number of units.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Returns the number of units currently assigned to requests.
    pub fn in_use(&self) -> u32 {
        self.state.borrow().in_use
    }

    /// Returns the number of pending requests.
    pub fn queue_len(&self) -> usize {
        self.state.borrow().queue.len()
    }

    /// Returns a snapshot of pool counters.
    pub fn stats(&self) -> PoolStats {
        self.state.borrow().stats.clone()
    }
}

/// Handle of a request issued by [`ResourcePool::acquire`].
///
/// The handle and the pool queue share the request state, the owner uses the handle
/// to wait for the grant or to withdraw the request.
pub struct AcquireRequest {
    slot: Rc<RefCell<RequestSlot>>,
    ctx: SimulationContext,
}

impl AcquireRequest {
    /// Returns the request id.
    pub fn id(&self) -> RequestId {
        self.slot.borrow().id
    }

    /// Returns the current request status.
    pub fn status(&self) -> RequestStatus {
        self.slot.borrow().status
    }

    /// Returns the time at which the request was issued.
    pub fn requested_at(&self) -> f64 {
        self.slot.borrow().requested_at
    }

    /// Returns true if a unit is assigned to the request.
    pub fn is_granted(&self) -> bool {
        self.status() == RequestStatus::Granted
    }

    /// Returns a future that completes once the grant is delivered to the owner.
    ///
    /// A request granted on acquire completes immediately. A request promoted on release
    /// completes when the wake-up event scheduled by the release is dispatched.
    pub fn granted(&self) -> GrantFuture {
        GrantFuture {
            promise: self.slot.borrow().promise.clone(),
        }
    }

    /// Waits for the grant at most `timeout` time units.
    ///
    /// The two outcomes race through the event queue: whichever of the release and the timer
    /// is dispatched first wins, equal-time events being ordered by scheduling order.
    /// A unit assigned by a release dispatched before the timer counts as granted even if its
    /// wake-up event is still queued. The losing timer is cancelled. The request is not withdrawn
    /// on timeout, the caller does it with [`ResourcePool::withdraw`].
    ///
    /// Fails with [`SimError::InvalidDuration`] if `timeout` is negative.
    pub async fn with_timeout(&self, timeout: f64) -> Result<AwaitResult, SimError> {
        if self.granted().is_completed() {
            return Ok(AwaitResult::Granted);
        }
        let mut grant = self.granted().fuse();
        let mut timer = self.ctx.sleep(timeout)?.fuse();
        let result = select_biased! {
            _ = grant => AwaitResult::Granted,
            _ = timer => AwaitResult::Timeout { timeout },
        };
        if self.is_granted() {
            return Ok(AwaitResult::Granted);
        }
        Ok(result)
    }
}

/// Future that completes when the grant of a request is delivered.
pub struct GrantFuture {
    promise: Promise,
}

impl GrantFuture {
    /// Returns true if the grant has been delivered.
    pub fn is_completed(&self) -> bool {
        self.promise.is_completed()
    }
}

impl Future for GrantFuture {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.promise.poll(cx)
    }
}
