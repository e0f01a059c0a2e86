//! Managed thread handle.
//!
//! A [`ThreadHandle`] starts one OS thread at a time running a work item and
//! lets other threads control its priority and wait for it to finish. The
//! handle and the running thread share a [`ThreadState`]; dropping the handle
//! while the thread runs neither blocks nor stops it.
//!
//! ```
//! use veda_sync::{Priority, ThreadHandle};
//!
//! let mut handle = ThreadHandle::new();
//! handle.start(|| {
//!     let me = ThreadHandle::current().unwrap();
//!     assert!(me.is_running());
//! })?;
//! handle.set_priority(Priority::Normal)?;
//! handle.join()?;
//! assert!(!handle.is_running());
//! # Ok::<(), veda_sync::Error>(())
//! ```

use super::panic_handler::PanicHandler;
use super::priority::{apply_native, current_native, Priority};
use super::registry;
use super::state::{Status, ThreadId, ThreadState};
use crate::config::{self, ThreadConfig};
use crate::error::{Error, Result};
use std::sync::Arc;
use std::thread;

macro_rules! thread_trace {
    ($($arg:tt)*) => {
        tracing::trace!(target: "veda_sync::thread", $($arg)*);
    };
}

/// Handle to a managed OS thread.
///
/// Clones share the same thread. Two handles compare equal when they refer to
/// the same started thread, so the handle returned by
/// [`ThreadHandle::current`] equals the one that started the calling thread.
#[derive(Debug, Clone)]
pub struct ThreadHandle {
    state: Arc<ThreadState>,
}

impl ThreadHandle {
    /// A handle that has not been started, with default settings.
    pub fn new() -> Self {
        Self::from_config_unchecked(&ThreadConfig::default())
    }

    pub fn with_config(config: &ThreadConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_config_unchecked(config))
    }

    fn from_config_unchecked(config: &ThreadConfig) -> Self {
        Self {
            state: Arc::new(ThreadState::new(
                config.name.clone(),
                config.stack_size,
                config.priority,
                config.panic_strategy,
            )),
        }
    }

    /// Start a new OS thread running `work`.
    ///
    /// Returns once the thread has launched, not once it finishes. Fails with
    /// [`Error::AlreadyRunning`] if this handle's thread is still running and
    /// with [`Error::SystemResource`] if the OS refuses to create a thread. A
    /// finished handle may be started again; it then gets a new id.
    pub fn start<F>(&mut self, work: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        if self.state.status() == Status::Finished {
            self.state = Arc::new(self.state.successor());
        }

        let name = self.state.name();
        let stack_size = {
            let mut inner = self.state.lock();
            if inner.status != Status::NotStarted {
                return Err(Error::AlreadyRunning);
            }
            inner.status = Status::Running;
            inner.work = Some(Box::new(work));
            inner.stack_size
        };

        let mut builder = thread::Builder::new().name(name.clone());
        if let Some(size) = stack_size {
            builder = builder.stack_size(size);
        }

        let entry_state = Arc::clone(&self.state);
        match builder.spawn(move || entry(entry_state)) {
            Ok(join_handle) => {
                // A join that runs before this store finds no handle to reap.
                // A later join reaps it; if none comes the thread ends detached.
                self.state.lock().join_handle = Some(join_handle);
            }
            Err(e) => {
                let mut inner = self.state.lock();
                inner.status = Status::NotStarted;
                inner.work = None;
                drop(inner);
                tracing::warn!(thread_id = %self.state.id, %name, error = %e, "cannot create thread");
                return Err(Error::SystemResource(e));
            }
        }

        self.state.started.wait();
        thread_trace!(thread_id = %self.state.id, %name, "thread started");
        Ok(())
    }

    /// Process-unique id of the thread this handle runs (or will run next).
    pub fn id(&self) -> ThreadId {
        self.state.id
    }

    pub fn name(&self) -> String {
        self.state.name()
    }

    /// Name used for the next start. Fails with [`Error::AlreadyRunning`]
    /// while the thread runs, since the OS name cannot follow.
    pub fn set_name<S: Into<String>>(&mut self, name: S) -> Result<()> {
        let name = name.into();
        config::validate_name(&name)?;
        let mut inner = self.state.lock();
        if inner.status == Status::Running {
            return Err(Error::AlreadyRunning);
        }
        inner.name = Some(name);
        Ok(())
    }

    pub fn stack_size(&self) -> Option<usize> {
        self.state.lock().stack_size
    }

    /// Stack size used for the next start. Fails with
    /// [`Error::AlreadyRunning`] while the thread runs.
    pub fn set_stack_size(&mut self, size: usize) -> Result<()> {
        config::validate_stack_size(size)?;
        let mut inner = self.state.lock();
        if inner.status == Status::Running {
            return Err(Error::AlreadyRunning);
        }
        inner.stack_size = Some(size);
        Ok(())
    }

    /// The priority last requested for this thread, whether or not the OS
    /// accepted it.
    pub fn priority(&self) -> Priority {
        self.state.priority()
    }

    /// Request a new priority.
    ///
    /// The cached value always changes. If the thread is running the OS is
    /// asked to apply it at once; a refusal is returned as
    /// [`Error::PriorityRejected`] and the cached value is kept.
    pub fn set_priority(&self, priority: Priority) -> Result<()> {
        let mut inner = self.state.lock();
        inner.priority = priority;

        // native is cleared under this lock before the thread exits
        if let (Status::Running, Some(native)) = (inner.status, inner.native) {
            apply_native(native, priority).map_err(|code| {
                tracing::warn!(thread_id = %self.state.id, %priority, code, "priority rejected");
                Error::PriorityRejected { priority, code }
            })?;
        }
        Ok(())
    }

    /// Block until the thread has finished.
    ///
    /// Returns at once for a handle that was never started. Fails with
    /// [`Error::SelfJoin`] when called from the thread itself.
    pub fn join(&self) -> Result<()> {
        if registry::is_current(&self.state) {
            return Err(Error::SelfJoin);
        }
        if self.state.status() == Status::NotStarted {
            return Ok(());
        }

        self.state.done.wait();
        self.reap();
        Ok(())
    }

    /// Wait up to `millis` milliseconds for the thread to finish, failing with
    /// [`Error::Timeout`] if it is still running.
    pub fn join_for(&self, millis: u64) -> Result<()> {
        if registry::is_current(&self.state) {
            return Err(Error::SelfJoin);
        }
        if self.try_join(millis) {
            Ok(())
        } else {
            Err(Error::Timeout)
        }
    }

    /// Wait up to `millis` milliseconds for the thread to finish. Returns
    /// `false` if it is still running, including when called from the thread
    /// itself.
    pub fn try_join(&self, millis: u64) -> bool {
        if registry::is_current(&self.state) {
            return false;
        }
        if self.state.status() == Status::NotStarted {
            return true;
        }

        if self.state.done.try_wait(millis) {
            self.reap();
            true
        } else {
            false
        }
    }

    /// True from a successful [`start`](Self::start) until the work item is
    /// over.
    pub fn is_running(&self) -> bool {
        self.state.status() == Status::Running
    }

    /// Whether the last run of the work item ended in a panic.
    pub fn has_panicked(&self) -> bool {
        self.state.lock().panicked
    }

    /// The handle of the managed thread the caller is running on, or `None`
    /// if the calling thread was not started through a `ThreadHandle`.
    pub fn current() -> Option<ThreadHandle> {
        registry::lookup().map(|state| ThreadHandle { state })
    }

    pub fn current_id() -> Option<ThreadId> {
        registry::lookup().map(|state| state.id)
    }

    pub fn sleep(millis: u64) {
        super::sleep(millis);
    }

    pub fn yield_now() {
        super::yield_now();
    }

    // Release the OS thread once the work item is done.
    fn reap(&self) {
        let join_handle = self.state.lock().join_handle.take();
        if let Some(join_handle) = join_handle {
            // a propagated panic is already recorded in the state
            let _ = join_handle.join();
        }
    }
}

impl Default for ThreadHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ThreadHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl Eq for ThreadHandle {}

/// Fires the completion signal and clears the registry slot on every way out
/// of the entry procedure, unwinding included.
struct CompletionGuard {
    state: Arc<ThreadState>,
    panicked: bool,
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        let panicked = self.panicked || thread::panicking();
        self.state.finish(panicked);
        registry::deregister();
        thread_trace!(thread_id = %self.state.id, panicked, "thread finished");
    }
}

fn entry(state: Arc<ThreadState>) {
    let mut guard = CompletionGuard {
        state: Arc::clone(&state),
        panicked: false,
    };
    registry::register(Arc::clone(&state));

    let strategy = {
        let mut inner = state.lock();
        let native = current_native();
        inner.native = Some(native);
        if let Err(code) = apply_native(native, inner.priority) {
            tracing::warn!(thread_id = %state.id, priority = %inner.priority, code, "priority rejected");
        }
        inner.panic_strategy
    };
    state.started.set();

    if let Some(work) = state.take_work() {
        let handler = PanicHandler::new(strategy);
        if handler.execute(work).is_err() {
            guard.panicked = true;
        }
    }
}
