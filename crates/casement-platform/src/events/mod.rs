//! Abstract event model.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! Runtime code is responsible for translating native events into [`Event`]s
//! and posting them into the queue; applications poll them back out through
//! their platform handle.

mod queue;
mod types;

pub use types::{Event, Key, Modifiers, MouseButton};

pub(crate) use queue::EventQueue;
