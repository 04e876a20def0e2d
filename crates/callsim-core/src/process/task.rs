use std::future::Future;
use std::pin::Pin;
use std::sync::mpsc::SyncSender;
use std::sync::Arc;

use futures::task::ArcWake;

/// Process identifier.
pub type ProcessId = u64;

pub(crate) type BoxedFuture = Pin<Box<dyn Future<Output = ()>>>;

// Represents a process spawned via Simulation::spawn or SimulationContext::spawn
// which has not yet been taken over by the executor.
pub(crate) struct Task {
    pub id: ProcessId,
    pub future: BoxedFuture,
}

impl Task {
    pub fn new(id: ProcessId, future: impl Future<Output = ()> + 'static) -> Self {
        Self {
            id,
            future: Box::pin(future),
        }
    }
}

// Waker of a single process.
// Waking only enqueues the process id, the executor polls the process on its next pass.
pub(crate) struct TaskWaker {
    pub id: ProcessId,
    pub ready: SyncSender<ProcessId>,
}

impl ArcWake for TaskWaker {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self
            .ready
            .try_send(arc_self.id)
            .expect("too many processes woken between two event dispatches");
    }
}
