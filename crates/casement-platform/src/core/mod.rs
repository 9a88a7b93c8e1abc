//! Application-facing surface.
//!
//! [`PlatformHandle`] is what the embedded application holds; [`RenderPump`]
//! is what the embedding renderer implements on the owner thread.

mod app;
mod ctx;

pub use app::{RenderProgress, RenderPump};
pub use ctx::PlatformHandle;
