use std::cell::RefCell;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

/// Wake-up slot shared between a suspended process and the event that resumes it.
///
/// The scheduler completes the promise when the corresponding event is dispatched,
/// which wakes the process that is awaiting it.
#[derive(Clone, Default)]
pub(crate) struct Promise {
    state: Rc<RefCell<AwaitState>>,
}

#[derive(Default)]
struct AwaitState {
    completed: bool,
    waker: Option<Waker>,
}

impl Promise {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_completed(&self) -> bool {
        self.state.borrow().completed
    }

    pub fn complete(&self) {
        // Take waker out of the state first so that the borrow is released before waking.
        let waker = {
            let mut state = self.state.borrow_mut();
            state.completed = true;
            state.waker.take()
        };
        if let Some(waker) = waker {
            waker.wake();
        }
    }

    pub fn poll(&self, cx: &mut Context) -> Poll<()> {
        let mut state = self.state.borrow_mut();
        if state.completed {
            Poll::Ready(())
        } else {
            state.waker = Some(cx.waker().clone());
            Poll::Pending
        }
    }
}
