//! Command marshaling and the native event pump.
//!
//! Callers post [`command::Command`] values through a bounded channel from
//! any thread; the owner thread drains them once per loop turn alongside
//! native event polling and turns them into native calls plus abstract
//! events.

pub(crate) mod command;
pub(crate) mod pump;
mod winit;

pub use self::winit::Platform;

pub(crate) use self::winit::WakeUp;
