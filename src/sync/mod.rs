//! Thread signaling primitives.

pub mod event;

pub use event::{Event, EventState};
