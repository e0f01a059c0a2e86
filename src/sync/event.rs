//! Auto- and manual-reset events.
//!
//! An [`Event`] lets one thread tell one or more other threads that something
//! happened. Waiters block until the event becomes signaled.
//!
//! * An **auto-reset** event hands the signal to exactly one waiter and goes
//!   back to unsignaled as part of that waiter's wake-up. If nobody is waiting
//!   when [`Event::set`] is called, the next call to [`Event::wait`] consumes
//!   the signal and returns immediately.
//! * A **manual-reset** event stays signaled after [`Event::set`], releasing
//!   every current and future waiter until [`Event::reset`] is called.
//!
//! The signaled flag is a single boolean: setting an already signaled event
//! does not queue a second signal.

use crate::error::{Error, Result};
use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// Initial state of an [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventState {
    Set,
    #[default]
    Unset,
}

/// A synchronization object that allows one thread to signal one or more
/// other threads.
///
/// Share an event between threads by wrapping it in an [`Arc`](std::sync::Arc)
/// or declaring it `static`; the borrow checker guarantees an event is not
/// dropped while a thread is still blocked on it.
pub struct Event {
    signaled: Mutex<bool>,
    cond: Condvar,
    auto_reset: bool,
}

impl Event {
    /// Create an unsignaled event. With `auto_reset` the event resets itself
    /// after each successful wait.
    pub const fn new(auto_reset: bool) -> Self {
        Self::with_state(auto_reset, EventState::Unset)
    }

    pub const fn with_state(auto_reset: bool, state: EventState) -> Self {
        Self {
            signaled: Mutex::new(matches!(state, EventState::Set)),
            cond: Condvar::new(),
            auto_reset,
        }
    }

    pub fn is_auto_reset(&self) -> bool {
        self.auto_reset
    }

    /// Peek at the current state without consuming it.
    pub fn is_set(&self) -> bool {
        *self.signaled.lock()
    }

    /// Signal the event.
    ///
    /// Auto-reset: at most one waiting thread resumes. Manual-reset: all
    /// waiting threads resume and later waits return at once.
    pub fn set(&self) {
        let mut signaled = self.signaled.lock();
        *signaled = true;
        if self.auto_reset {
            self.cond.notify_one();
        } else {
            self.cond.notify_all();
        }
    }

    /// Wait for the event to become signaled.
    pub fn wait(&self) {
        self.wait_impl(None);
    }

    /// Wait up to `millis` milliseconds, failing with [`Error::Timeout`] if
    /// the event is not signaled in time.
    pub fn wait_for(&self, millis: u64) -> Result<()> {
        if self.wait_impl(Some(Duration::from_millis(millis))) {
            Ok(())
        } else {
            Err(Error::Timeout)
        }
    }

    /// Wait up to `millis` milliseconds. Returns `false` on timeout.
    ///
    /// A timeout of zero polls without blocking.
    pub fn try_wait(&self, millis: u64) -> bool {
        self.wait_impl(Some(Duration::from_millis(millis)))
    }

    /// Reset to unsignaled. Threads already blocked keep waiting.
    pub fn reset(&self) {
        *self.signaled.lock() = false;
    }

    fn wait_impl(&self, timeout: Option<Duration>) -> bool {
        let mut signaled = self.signaled.lock();

        if timeout != Some(Duration::ZERO) {
            // a deadline past the end of Instant waits without one
            let deadline = timeout.and_then(|t| Instant::now().checked_add(t));
            while !*signaled {
                match deadline {
                    Some(deadline) => {
                        if self.cond.wait_until(&mut signaled, deadline).timed_out() {
                            break;
                        }
                    }
                    None => self.cond.wait(&mut signaled),
                }
            }
        }

        if !*signaled {
            return false;
        }
        if self.auto_reset {
            *signaled = false;
        }
        true
    }
}

impl Default for Event {
    fn default() -> Self {
        Self::new(true)
    }
}

impl std::fmt::Debug for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Event")
            .field("signaled", &self.is_set())
            .field("auto_reset", &self.auto_reset)
            .finish()
    }
}
