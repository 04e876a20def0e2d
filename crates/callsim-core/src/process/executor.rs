use std::sync::mpsc::{sync_channel, Receiver as ReadyReceiver, SyncSender};
use std::sync::Arc;
use std::task::Context;

use futures::task::waker_ref;
use log::trace;
use rustc_hash::FxHashMap;

use super::channel::Receiver;
use super::task::{BoxedFuture, ProcessId, Task, TaskWaker};

const MAX_READY_PROCESSES: usize = 10_000;

struct LiveProcess {
    future: BoxedFuture,
    waker: Arc<TaskWaker>,
}

// Owns the live processes and polls them when they are spawned or woken up.
// A process is removed from the live set as soon as its future completes.
pub(crate) struct Executor {
    spawned: Receiver<Task>,
    ready: ReadyReceiver<ProcessId>,
    ready_sender: SyncSender<ProcessId>,
    live: FxHashMap<ProcessId, LiveProcess>,
}

impl Executor {
    pub fn new(spawned: Receiver<Task>) -> Self {
        let (ready_sender, ready) = sync_channel(MAX_READY_PROCESSES);
        Self {
            spawned,
            ready,
            ready_sender,
            live: FxHashMap::default(),
        }
    }

    // Polls spawned and woken processes until none of them can make progress.
    // Returns the number of polls performed.
    pub fn process_tasks(&mut self) -> usize {
        let mut polls = 0;
        loop {
            self.adopt_spawned();
            match self.ready.try_recv() {
                Ok(id) => {
                    self.poll(id);
                    polls += 1;
                }
                Err(_) => {
                    if self.spawned.is_empty() {
                        return polls;
                    }
                }
            }
        }
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    fn adopt_spawned(&mut self) {
        while let Some(task) = self.spawned.try_recv() {
            let waker = Arc::new(TaskWaker {
                id: task.id,
                ready: self.ready_sender.clone(),
            });
            self.live.insert(
                task.id,
                LiveProcess {
                    future: task.future,
                    waker,
                },
            );
            self.ready_sender
                .try_send(task.id)
                .expect("too many processes spawned between two event dispatches");
            trace!(target: "simulation", "process {} spawned", task.id);
        }
    }

    fn poll(&mut self, id: ProcessId) {
        // Wake-ups of already finished processes are ignored.
        let Some(process) = self.live.get_mut(&id) else {
            return;
        };
        let finished = {
            let waker = waker_ref(&process.waker);
            let mut async_ctx = Context::from_waker(&waker);
            process.future.as_mut().poll(&mut async_ctx).is_ready()
        };
        if finished {
            self.live.remove(&id);
            trace!(target: "simulation", "process {} finished, {} still live", id, self.live.len());
        }
    }
}
