use std::sync::Arc;

use winit::window::Window;

use crate::window::WindowHandle;

/// Progress report from the embedding renderer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RenderProgress {
    /// Frames are still being produced.
    Active,
    /// Nothing left to present; shutdown may complete.
    Idle,
}

/// Owner-thread contract implemented by the embedding renderer.
///
/// The platform calls `frame` once per loop turn. After exit has been
/// requested, the loop keeps pumping until `frame` reports
/// [`RenderProgress::Idle`]; only then does it tear down windows and return.
pub trait RenderPump {
    fn frame(&mut self) -> RenderProgress;

    /// A native window materialized for `handle`. The renderer may keep a
    /// clone of the `Arc` (e.g. to build a surface), but must drop it again
    /// on `window_destroyed`: the native window lives as long as any clone.
    fn window_created(&mut self, handle: WindowHandle, window: &Arc<Window>) {
        let _ = (handle, window);
    }

    /// The native window behind `handle` is going away.
    fn window_destroyed(&mut self, handle: WindowHandle) {
        let _ = handle;
    }
}

/// Headless pump for embedders that render nowhere.
impl RenderPump for () {
    fn frame(&mut self) -> RenderProgress {
        RenderProgress::Idle
    }
}
