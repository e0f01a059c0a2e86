//! Shared record behind a [`ThreadHandle`](super::ThreadHandle).
//!
//! A `ThreadState` is owned jointly by the handle that started the thread and
//! by the thread's entry procedure, so it stays alive until both are done with
//! it. Every mutable field sits behind one lock.

use super::panic_handler::PanicStrategy;
use super::priority::{NativeThread, Priority};
use crate::sync::Event;
use parking_lot::{Mutex, MutexGuard};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::JoinHandle;

static THREAD_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of a managed thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ThreadId(u64);

impl ThreadId {
    fn next() -> Self {
        ThreadId(THREAD_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of one thread state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    NotStarted,
    Running,
    Finished,
}

pub(crate) type WorkItem = Box<dyn FnOnce() + Send + 'static>;

pub(crate) struct Inner {
    pub(crate) name: Option<String>,
    pub(crate) stack_size: Option<usize>,
    pub(crate) priority: Priority,
    pub(crate) panic_strategy: PanicStrategy,
    pub(crate) status: Status,
    pub(crate) work: Option<WorkItem>,
    pub(crate) native: Option<NativeThread>,
    pub(crate) join_handle: Option<JoinHandle<()>>,
    pub(crate) panicked: bool,
}

pub(crate) struct ThreadState {
    pub(crate) id: ThreadId,
    inner: Mutex<Inner>,
    /// Fired by the new thread once it is registered and about to run.
    pub(crate) started: Event,
    /// Completion signal, fired exactly once when the work item is over.
    pub(crate) done: Event,
}

impl ThreadState {
    pub(crate) fn new(
        name: Option<String>,
        stack_size: Option<usize>,
        priority: Priority,
        panic_strategy: PanicStrategy,
    ) -> Self {
        let id = ThreadId::next();
        Self {
            id,
            inner: Mutex::new(Inner {
                name,
                stack_size,
                priority,
                panic_strategy,
                status: Status::NotStarted,
                work: None,
                native: None,
                join_handle: None,
                panicked: false,
            }),
            started: Event::new(true),
            done: Event::new(false),
        }
    }

    /// A fresh state carrying over this one's settings under a new id.
    pub(crate) fn successor(&self) -> Self {
        let inner = self.inner.lock();
        Self::new(
            inner.name.clone(),
            inner.stack_size,
            inner.priority,
            inner.panic_strategy,
        )
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock()
    }

    pub(crate) fn status(&self) -> Status {
        self.inner.lock().status
    }

    pub(crate) fn priority(&self) -> Priority {
        self.inner.lock().priority
    }

    /// The configured name, or `#<id>` when none was given.
    pub(crate) fn name(&self) -> String {
        self.inner
            .lock()
            .name
            .clone()
            .unwrap_or_else(|| format!("#{}", self.id))
    }

    pub(crate) fn take_work(&self) -> Option<WorkItem> {
        self.inner.lock().work.take()
    }

    /// Move to `Finished` and fire the completion signal. Only the first call
    /// has any effect.
    pub(crate) fn finish(&self, panicked: bool) {
        {
            let mut inner = self.inner.lock();
            if inner.status == Status::Finished {
                return;
            }
            inner.status = Status::Finished;
            inner.native = None;
            inner.panicked |= panicked;
        }
        self.done.set();
    }
}

impl fmt::Debug for ThreadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("ThreadState")
            .field("id", &self.id)
            .field("name", &inner.name)
            .field("priority", &inner.priority)
            .field("status", &inner.status)
            .finish()
    }
}
