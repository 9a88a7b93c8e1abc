//! Casement platform crate.
//!
//! This crate owns the native event loop and marshals window commands onto
//! the thread that runs it. Embedding renderers plug in through
//! [`crate::core::RenderPump`]; applications talk to the platform through
//! [`crate::core::PlatformHandle`].

pub mod config;
pub mod core;
pub mod events;
pub mod input;
pub mod runtime;
pub mod window;

pub mod logging;
