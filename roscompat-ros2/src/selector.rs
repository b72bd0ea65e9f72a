//! Event selector driving subscriptions and timers.
//!
//! The selector holds one poll handler per subscription and the executor
//! timers. [`Selector::dispatch`] runs every ready handler once; the blocking
//! wait around it lives in the node's `spin_once`.
//!
//! Handlers may register new handlers or timers while being dispatched; those
//! join at the next dispatch.

use std::{
    cell::{Cell, RefCell},
    time::{Duration, Instant},
};

/// Result of a callback execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackResult {
    /// Callback executed successfully, keep it registered.
    Ok,

    /// Remove this callback from the selector.
    Remove,
}

/// A subscription poll handler. `None` means nothing was ready.
pub(crate) type PollHandler = Box<dyn FnMut() -> Option<CallbackResult>>;

/// A timer entry.
struct Timer {
    id: u64,
    period: Duration,
    next_fire: Instant,
    handler: Box<dyn FnMut() -> CallbackResult>,
}

/// Event selector of a runtime.
#[derive(Default)]
pub struct Selector {
    /// Subscriber handlers that poll and process messages.
    subscriber_handlers: RefCell<Vec<PollHandler>>,
    /// Timers with their next fire time.
    timers: RefCell<Vec<Timer>>,
    next_timer_id: Cell<u64>,
}

impl Selector {
    /// Create a new selector.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_subscriber_handler(&self, handler: PollHandler) {
        self.subscriber_handlers.borrow_mut().push(handler);
    }

    /// Add a timer with the given period. The first expiry is one period
    /// from now.
    ///
    /// Returns the timer ID.
    pub fn add_timer(&self, period: Duration, handler: Box<dyn FnMut() -> CallbackResult>) -> u64 {
        let id = self.next_timer_id.get() + 1;
        self.next_timer_id.set(id);
        self.timers.borrow_mut().push(Timer {
            id,
            period,
            next_fire: Instant::now() + period,
            handler,
        });
        tracing::trace!(id, ?period, "timer added");
        id
    }

    /// Number of registered timers.
    pub fn timer_count(&self) -> usize {
        self.timers.borrow().len()
    }

    /// Number of registered subscription handlers.
    pub fn subscriber_count(&self) -> usize {
        self.subscriber_handlers.borrow().len()
    }

    /// Earliest timer expiry.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.borrow().iter().map(|t| t.next_fire).min()
    }

    /// Poll every subscription, then fire expired timers.
    ///
    /// Returns the number of handlers that did work.
    pub fn dispatch(&self) -> usize {
        let mut processed = 0;

        let mut handlers = std::mem::take(&mut *self.subscriber_handlers.borrow_mut());
        handlers.retain_mut(|handler| match handler() {
            Some(CallbackResult::Ok) => {
                processed += 1;
                true
            }
            Some(CallbackResult::Remove) => false,
            None => true,
        });
        {
            let mut slot = self.subscriber_handlers.borrow_mut();
            handlers.append(&mut slot);
            *slot = handlers;
        }

        let now = Instant::now();
        let mut timers = std::mem::take(&mut *self.timers.borrow_mut());
        timers.retain_mut(|timer| {
            if now < timer.next_fire {
                return true;
            }
            timer.next_fire = now + timer.period;
            processed += 1;
            match (timer.handler)() {
                CallbackResult::Ok => true,
                CallbackResult::Remove => {
                    tracing::trace!(id = timer.id, "timer removed");
                    false
                }
            }
        });
        {
            let mut slot = self.timers.borrow_mut();
            timers.append(&mut slot);
            *slot = timers;
        }

        processed
    }
}
