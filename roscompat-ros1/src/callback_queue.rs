//! Callback queue drained by `spin`.
//!
//! Every event of the ROS1 backend becomes one entry in the queue: a
//! delivered message, or a subscriber connecting to a publisher that asked
//! for connect callbacks. Entries are weak, so a callback whose owner was
//! dropped before the next spin is skipped.

use std::{cell::RefCell, collections::VecDeque, rc::Weak};

/// Something the callback queue can call.
pub(crate) trait CallbackInterface {
    /// Run the callback. Returns `false` when there was nothing to do.
    fn call(&self) -> bool;
}

/// FIFO of pending callbacks.
#[derive(Default)]
pub(crate) struct CallbackQueue {
    callbacks: RefCell<VecDeque<Weak<dyn CallbackInterface>>>,
}

impl CallbackQueue {
    pub(crate) fn add_callback(&self, callback: Weak<dyn CallbackInterface>) {
        self.callbacks.borrow_mut().push_back(callback);
    }

    pub(crate) fn len(&self) -> usize {
        self.callbacks.borrow().len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.callbacks.borrow().is_empty()
    }

    /// Call every callback queued before this call.
    ///
    /// Callbacks queued while draining wait for the next call. Returns the
    /// number of callbacks that did work.
    pub(crate) fn call_available(&self) -> usize {
        let available = self.len();
        let mut processed = 0;

        for _ in 0..available {
            // the borrow ends before the callback runs, callbacks may queue more
            let Some(entry) = self.callbacks.borrow_mut().pop_front() else {
                break;
            };
            match entry.upgrade() {
                Some(callback) => {
                    if callback.call() {
                        processed += 1;
                    }
                }
                None => tracing::trace!("skipping callback of a dropped entity"),
            }
        }

        processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::Cell, rc::Rc};

    struct Counter {
        calls: Cell<usize>,
    }

    impl CallbackInterface for Counter {
        fn call(&self) -> bool {
            self.calls.set(self.calls.get() + 1);
            true
        }
    }

    fn counter() -> Rc<Counter> {
        Rc::new(Counter {
            calls: Cell::new(0),
        })
    }

    #[test]
    fn test_fifo_and_count() {
        let queue = CallbackQueue::default();
        let a = counter();
        let weak = Rc::downgrade(&a) as Weak<dyn CallbackInterface>;
        queue.add_callback(weak.clone());
        queue.add_callback(weak);

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.call_available(), 2);
        assert_eq!(a.calls.get(), 2);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_dropped_owner_skipped() {
        let queue = CallbackQueue::default();
        let a = counter();
        let weak = Rc::downgrade(&a) as Weak<dyn CallbackInterface>;
        queue.add_callback(weak);
        drop(a);

        assert_eq!(queue.call_available(), 0);
        assert!(queue.is_empty());
    }

    struct Requeue {
        queue: Rc<CallbackQueue>,
        this: RefCell<Weak<dyn CallbackInterface>>,
    }

    impl CallbackInterface for Requeue {
        fn call(&self) -> bool {
            self.queue.add_callback(self.this.borrow().clone());
            true
        }
    }

    #[test]
    fn test_callbacks_queued_while_draining_wait() {
        let queue = Rc::new(CallbackQueue::default());
        let placeholder: Weak<dyn CallbackInterface> = Weak::<Counter>::new();
        let requeue = Rc::new(Requeue {
            queue: Rc::clone(&queue),
            this: RefCell::new(placeholder),
        });
        let weak = Rc::downgrade(&requeue) as Weak<dyn CallbackInterface>;
        *requeue.this.borrow_mut() = weak.clone();
        queue.add_callback(weak);

        assert_eq!(queue.call_available(), 1);
        assert_eq!(queue.len(), 1);
    }
}
