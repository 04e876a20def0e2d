//! Single-threaded queue connecting process spawners with the executor.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

pub(crate) struct Receiver<T> {
    items: Rc<RefCell<VecDeque<T>>>,
}

impl<T> Receiver<T> {
    pub fn try_recv(&self) -> Option<T> {
        self.items.borrow_mut().pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

#[derive(Clone)]
pub(crate) struct Sender<T> {
    items: Rc<RefCell<VecDeque<T>>>,
}

impl<T> Sender<T> {
    pub fn send(&self, item: T) {
        self.items.borrow_mut().push_back(item);
    }
}

// Items are received in the order they were sent.
pub(crate) fn channel<T>() -> (Sender<T>, Receiver<T>) {
    let items = Rc::new(RefCell::new(VecDeque::new()));
    (Sender { items: items.clone() }, Receiver { items })
}
