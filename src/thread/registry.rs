//! Per-OS-thread lookup from the running thread to its managed state.
//!
//! Each slot is written only by its own thread, from the entry procedure,
//! and read by code running on that thread.

use super::state::ThreadState;
use std::cell::RefCell;
use std::sync::Arc;

thread_local! {
    static CURRENT: RefCell<Option<Arc<ThreadState>>> = const { RefCell::new(None) };
}

/// Record `state` as the managed thread running on the calling OS thread.
pub(crate) fn register(state: Arc<ThreadState>) {
    CURRENT.with(|slot| {
        let previous = slot.borrow_mut().replace(state);
        debug_assert!(previous.is_none(), "OS thread registered twice");
    });
}

pub(crate) fn lookup() -> Option<Arc<ThreadState>> {
    // try_with: lookups made while thread-locals are being torn down see nothing
    CURRENT
        .try_with(|slot| slot.borrow().clone())
        .ok()
        .flatten()
}

pub(crate) fn deregister() {
    let _ = CURRENT.try_with(|slot| slot.borrow_mut().take());
}

/// Whether the calling OS thread runs `state`.
pub(crate) fn is_current(state: &Arc<ThreadState>) -> bool {
    CURRENT
        .try_with(|slot| {
            slot.borrow()
                .as_ref()
                .is_some_and(|current| Arc::ptr_eq(current, state))
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thread::{PanicStrategy, Priority};
    use std::thread;

    fn state() -> Arc<ThreadState> {
        Arc::new(ThreadState::new(
            None,
            None,
            Priority::Normal,
            PanicStrategy::default(),
        ))
    }

    #[test]
    fn test_unregistered_thread_has_no_entry() {
        thread::spawn(|| assert!(lookup().is_none())).join().unwrap();
    }

    #[test]
    fn test_register_lookup_deregister() {
        thread::spawn(|| {
            let s = state();
            register(s.clone());

            let found = lookup().unwrap();
            assert!(Arc::ptr_eq(&found, &s));
            assert!(is_current(&s));

            deregister();
            assert!(lookup().is_none());
            assert!(!is_current(&s));
        })
        .join()
        .unwrap();
    }

    #[test]
    fn test_slots_are_per_thread() {
        let s = state();
        let registered = s.clone();
        thread::spawn(move || {
            register(registered.clone());
            thread::spawn(|| assert!(lookup().is_none())).join().unwrap();
            deregister();
        })
        .join()
        .unwrap();

        assert!(!is_current(&s));
    }
}
