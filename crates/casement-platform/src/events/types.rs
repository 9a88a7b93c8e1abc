use std::fmt;

use crate::window::WindowHandle;

/// Keyboard key identifier.
///
/// The runtime maps native keycodes into these variants through the key
/// translation table; codes with no mapping come through as `Key::None`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    /// Unmapped or unidentified key.
    None,

    // Common control keys
    Escape,
    Enter,
    Tab,
    Backspace,
    Space,

    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    Print,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    Plus,
    Minus,

    // Letters
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    // Digits
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    // Numeric keypad
    NumPad0, NumPad1, NumPad2, NumPad3, NumPad4,
    NumPad5, NumPad6, NumPad7, NumPad8, NumPad9,

    // Function keys
    F1, F2, F3, F4, F5, F6,
    F7, F8, F9, F10, F11, F12,
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Mouse button identifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u16),
}

/// Modifier keys state.
///
/// This is stored as booleans rather than bitflags to keep it explicit and stable.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// Abstract events produced by the platform loop.
///
/// Only the owner thread produces these; any thread may poll them.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The platform is shutting down. No further events follow.
    Exit,

    /// Pointer movement, button, or wheel activity.
    ///
    /// `button` is `None` for plain motion and wheel updates; `wheel` is the
    /// accumulated scroll value for the window.
    Mouse {
        window: WindowHandle,
        x: i32,
        y: i32,
        wheel: i32,
        button: Option<MouseButton>,
        down: bool,
    },

    Key {
        window: WindowHandle,
        key: Key,
        modifiers: Modifiers,
        down: bool,
    },

    /// Window lifetime notification. `created == false` signals destruction,
    /// including a failed creation; pollers observe the handle dying.
    Window {
        window: WindowHandle,
        created: bool,
    },

    /// Size change carrying the corrected (policy-applied) dimensions.
    Size {
        window: WindowHandle,
        width: u32,
        height: u32,
    },
}

impl Event {
    /// The window this event targets, if any. `Exit` targets every consumer.
    pub fn window(&self) -> Option<WindowHandle> {
        match self {
            Event::Exit => None,
            Event::Mouse { window, .. }
            | Event::Key { window, .. }
            | Event::Window { window, .. }
            | Event::Size { window, .. } => Some(*window),
        }
    }
}
