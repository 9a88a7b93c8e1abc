use crossbeam_channel::{Receiver, Sender, bounded};

use crate::window::{WindowFlags, WindowHandle};

/// Capacity of the command channel. Posting beyond this drops the command
/// rather than blocking the caller.
const COMMAND_QUEUE_DEPTH: usize = 64;

/// Detail record for window creation.
#[derive(Debug, Clone)]
pub(crate) struct CreateInfo {
    /// `None` lets the window system place the window.
    pub position: Option<(i32, i32)>,
    pub width: u32,
    pub height: u32,
    pub flags: WindowFlags,
    pub title: String,
}

/// Commands marshaled from caller threads onto the owner thread.
///
/// Variable-length payloads ride in the variant; ownership transfers through
/// the channel and is released by `Drop` once the command is processed.
#[derive(Debug)]
pub(crate) enum Command {
    CreateWindow {
        handle: WindowHandle,
        info: Box<CreateInfo>,
    },
    DestroyWindow {
        handle: WindowHandle,
    },
    SetPosition {
        handle: WindowHandle,
        x: i32,
        y: i32,
    },
    SetSize {
        handle: WindowHandle,
        width: u32,
        height: u32,
    },
    SetTitle {
        handle: WindowHandle,
        title: String,
    },
    ToggleFrame {
        handle: WindowHandle,
    },
    SetMouseLock {
        handle: WindowHandle,
        locked: bool,
    },

    /// Internal: the embedded application's entry point returned.
    Exit,
}

pub(crate) fn command_channel() -> (Sender<Command>, Receiver<Command>) {
    bounded(COMMAND_QUEUE_DEPTH)
}
