//! Convenient imports for common use cases.

pub use crate::config::{ThreadConfig, ThreadConfigBuilder};
pub use crate::error::{Error, Result};
pub use crate::sync::{Event, EventState};
pub use crate::thread::{sleep, yield_now, PanicStrategy, Priority, ThreadHandle, ThreadId};
