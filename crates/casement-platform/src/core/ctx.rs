use std::sync::Arc;

use crossbeam_channel::{Sender, TrySendError};
use parking_lot::Mutex;
use winit::event_loop::EventLoopProxy;

use crate::events::{Event, EventQueue};
use crate::runtime::WakeUp;
use crate::runtime::command::{Command, CreateInfo};
use crate::window::{HandleAlloc, WindowFlags, WindowHandle};

/// The application's view of the platform.
///
/// Cloneable and `Send`; any thread may post commands or poll events.
/// Command posting never blocks: commands ride a bounded channel to the
/// owner thread and take effect asynchronously.
#[derive(Clone)]
pub struct PlatformHandle {
    alloc: Arc<Mutex<HandleAlloc>>,
    queue: EventQueue,
    commands: Sender<Command>,
    wake: EventLoopProxy<WakeUp>,
}

impl PlatformHandle {
    pub(crate) fn new(
        alloc: Arc<Mutex<HandleAlloc>>,
        queue: EventQueue,
        commands: Sender<Command>,
        wake: EventLoopProxy<WakeUp>,
    ) -> Self {
        Self {
            alloc,
            queue,
            commands,
            wake,
        }
    }

    /// Pops the next event, if any.
    pub fn poll(&self) -> Option<Event> {
        self.queue.poll()
    }

    /// Pops the next event only when it targets `window` (or is
    /// [`Event::Exit`]).
    pub fn poll_window(&self, window: WindowHandle) -> Option<Event> {
        self.queue.poll_window(window)
    }

    /// Requests a new window.
    ///
    /// The returned handle is usable immediately; the native window exists
    /// once the corresponding created [`Event::Window`] is observed. `None`
    /// means the window table is exhausted.
    pub fn create_window(
        &self,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        flags: WindowFlags,
        title: &str,
    ) -> Option<WindowHandle> {
        let handle = self.alloc.lock().alloc()?;
        let info = CreateInfo {
            position: Some((x, y)),
            width,
            height,
            flags,
            title: title.to_string(),
        };
        if !self.post(Command::CreateWindow {
            handle,
            info: Box::new(info),
        }) {
            self.alloc.lock().free(handle);
            return None;
        }
        Some(handle)
    }

    /// Requests destruction of a window.
    ///
    /// The handle index is released by the owner thread once the native
    /// destroy has been processed, never earlier, so a racing
    /// `create_window` cannot observe events meant for the old window.
    pub fn destroy_window(&self, handle: WindowHandle) {
        if handle == WindowHandle::DEFAULT {
            log::warn!("refusing to destroy the default window");
            return;
        }
        self.post(Command::DestroyWindow { handle });
    }

    pub fn set_window_pos(&self, handle: WindowHandle, x: i32, y: i32) {
        self.post(Command::SetPosition { handle, x, y });
    }

    pub fn set_window_size(&self, handle: WindowHandle, width: u32, height: u32) {
        self.post(Command::SetSize {
            handle,
            width,
            height,
        });
    }

    pub fn set_window_title(&self, handle: WindowHandle, title: &str) {
        self.post(Command::SetTitle {
            handle,
            title: title.to_string(),
        });
    }

    pub fn toggle_window_frame(&self, handle: WindowHandle) {
        self.post(Command::ToggleFrame { handle });
    }

    pub fn set_mouse_lock(&self, handle: WindowHandle, locked: bool) {
        self.post(Command::SetMouseLock { handle, locked });
    }

    /// Internal: posted by the runtime when the application entry returns.
    pub(crate) fn post_exit(&self) {
        self.post(Command::Exit);
    }

    fn post(&self, command: Command) -> bool {
        match self.commands.try_send(command) {
            Ok(()) => {
                // Wake the owner loop so the command is drained promptly.
                let _ = self.wake.send_event(WakeUp);
                true
            }
            Err(TrySendError::Full(command)) => {
                log::warn!("command channel full, dropping {command:?}");
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                log::debug!("platform loop is gone, command dropped");
                false
            }
        }
    }
}
