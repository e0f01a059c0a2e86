//! Managed threads.
//!
//! This module provides [`ThreadHandle`], which runs a work item on its own OS
//! thread with a cached [`Priority`], timed join and a per-thread registry
//! answering "which managed thread am I on?".

pub mod handle;
pub mod panic_handler;
pub mod priority;
pub(crate) mod registry;
pub mod state;

pub use handle::ThreadHandle;
pub use panic_handler::{PanicHandler, PanicInfo, PanicStrategy};
pub use priority::Priority;
pub use state::{Status, ThreadId};

use std::time::Duration;

/// Suspend the calling thread for `millis` milliseconds.
pub fn sleep(millis: u64) {
    std::thread::sleep(Duration::from_millis(millis));
}

/// Give up the rest of the calling thread's time slice.
pub fn yield_now() {
    std::thread::yield_now();
}

/// The handle of the managed thread the caller runs on, if any.
pub fn current() -> Option<ThreadHandle> {
    ThreadHandle::current()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_sleep_waits() {
        let start = Instant::now();
        sleep(20);
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_yield_and_zero_sleep_return() {
        yield_now();
        sleep(0);
    }
}
