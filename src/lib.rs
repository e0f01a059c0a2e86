//! VEDA sync - events and managed threads
//!
//! Low-level building blocks for the VEDA runtime: a cross-thread signaling
//! [`Event`] and a [`ThreadHandle`] that runs a work item on its own OS thread.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use veda_sync::prelude::*;
//!
//! let ready = Arc::new(Event::new(true));
//!
//! let mut worker = ThreadHandle::new();
//! let signal = ready.clone();
//! worker.start(move || signal.set())?;
//!
//! ready.wait();
//! worker.join()?;
//! # Ok::<(), veda_sync::Error>(())
//! ```
//!
//! # Features
//!
//! - **Events**: auto-reset (wake one) and manual-reset (wake all) signaling
//! - **Managed threads**: start, timed join, running status, cached priority
//! - **Current thread lookup**: [`ThreadHandle::current`] from any code on a
//!   managed thread
//! - **Panic policy**: a panicking work item still completes its thread

// Lint configuration
#![warn(missing_debug_implementations)]

pub mod config;
pub mod error;
pub mod prelude;
pub mod sync;
pub mod thread;

pub use config::{ThreadConfig, ThreadConfigBuilder};
pub use error::{Error, Result};
pub use sync::{Event, EventState};
pub use thread::{PanicStrategy, Priority, ThreadHandle, ThreadId};
