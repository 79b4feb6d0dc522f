use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use futures_util::future::{AbortHandle, Abortable};
use tracing::trace;

use crate::runtime::Runtime;

/// Identifies one armed timer of a [`Debouncer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct PendingTimer {
    id: TimerId,
    abort: AbortHandle,
}

/// Coalesces bursts of events into a single delayed action.
///
/// At most one timer is armed at any time. Scheduling a new action cancels the pending one
/// first, and a cancelled action never runs.
pub struct Debouncer {
    runtime: Rc<dyn Runtime>,
    next_id: Cell<u64>,
    pending: Rc<RefCell<Option<PendingTimer>>>,
}

impl Debouncer {
    pub fn new(runtime: Rc<dyn Runtime>) -> Self {
        Debouncer {
            runtime,
            next_id: Cell::new(0),
            pending: Rc::new(RefCell::new(None)),
        }
    }

    /// Arms a timer that runs `action` once `delay` has passed without another call to
    /// `schedule` or [`cancel`](Self::cancel).
    pub fn schedule<F>(&self, delay: Duration, action: F) -> TimerId
    where
        F: FnOnce() + 'static,
    {
        self.cancel();

        let id = TimerId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        let (abort, registration) = AbortHandle::new_pair();
        *self.pending.borrow_mut() = Some(PendingTimer { id, abort });

        let sleep = Abortable::new(self.runtime.sleep(delay), registration);
        let pending = Rc::downgrade(&self.pending);
        self.runtime.spawn(Box::pin(async move {
            if sleep.await.is_err() {
                trace!(timer = %id, "debounce timer cancelled");
                return;
            }
            let Some(pending) = pending.upgrade() else {
                return;
            };
            {
                let mut slot = pending.borrow_mut();
                if slot.as_ref().is_some_and(|timer| timer.id == id) {
                    *slot = None;
                }
            }
            trace!(timer = %id, "debounce timer fired");
            action();
        }));
        id
    }

    /// Cancels the pending timer, if any. Returns whether a timer was pending.
    pub fn cancel(&self) -> bool {
        match self.pending.borrow_mut().take() {
            Some(timer) => {
                timer.abort.abort();
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.pending.borrow().is_some()
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for Debouncer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debouncer")
            .field("pending", &self.pending.borrow().as_ref().map(|timer| timer.id))
            .finish_non_exhaustive()
    }
}
