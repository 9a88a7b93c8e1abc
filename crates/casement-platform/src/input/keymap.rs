use winit::event::MouseButton as WinitMouseButton;
use winit::keyboard::{KeyCode, ModifiersState};

use crate::events::{Key, Modifiers, MouseButton};

/// The fixed native-code → abstract-key pairs the table is built from.
const PAIRS: &[(KeyCode, Key)] = &[
    (KeyCode::Escape, Key::Escape),
    (KeyCode::Enter, Key::Enter),
    (KeyCode::Tab, Key::Tab),
    (KeyCode::Backspace, Key::Backspace),
    (KeyCode::Space, Key::Space),
    (KeyCode::Insert, Key::Insert),
    (KeyCode::Delete, Key::Delete),
    (KeyCode::Home, Key::Home),
    (KeyCode::End, Key::End),
    (KeyCode::PageUp, Key::PageUp),
    (KeyCode::PageDown, Key::PageDown),
    (KeyCode::PrintScreen, Key::Print),
    (KeyCode::ArrowUp, Key::ArrowUp),
    (KeyCode::ArrowDown, Key::ArrowDown),
    (KeyCode::ArrowLeft, Key::ArrowLeft),
    (KeyCode::ArrowRight, Key::ArrowRight),
    (KeyCode::NumpadAdd, Key::Plus),
    (KeyCode::NumpadSubtract, Key::Minus),
    (KeyCode::KeyA, Key::A),
    (KeyCode::KeyB, Key::B),
    (KeyCode::KeyC, Key::C),
    (KeyCode::KeyD, Key::D),
    (KeyCode::KeyE, Key::E),
    (KeyCode::KeyF, Key::F),
    (KeyCode::KeyG, Key::G),
    (KeyCode::KeyH, Key::H),
    (KeyCode::KeyI, Key::I),
    (KeyCode::KeyJ, Key::J),
    (KeyCode::KeyK, Key::K),
    (KeyCode::KeyL, Key::L),
    (KeyCode::KeyM, Key::M),
    (KeyCode::KeyN, Key::N),
    (KeyCode::KeyO, Key::O),
    (KeyCode::KeyP, Key::P),
    (KeyCode::KeyQ, Key::Q),
    (KeyCode::KeyR, Key::R),
    (KeyCode::KeyS, Key::S),
    (KeyCode::KeyT, Key::T),
    (KeyCode::KeyU, Key::U),
    (KeyCode::KeyV, Key::V),
    (KeyCode::KeyW, Key::W),
    (KeyCode::KeyX, Key::X),
    (KeyCode::KeyY, Key::Y),
    (KeyCode::KeyZ, Key::Z),
    (KeyCode::Digit0, Key::Digit0),
    (KeyCode::Digit1, Key::Digit1),
    (KeyCode::Digit2, Key::Digit2),
    (KeyCode::Digit3, Key::Digit3),
    (KeyCode::Digit4, Key::Digit4),
    (KeyCode::Digit5, Key::Digit5),
    (KeyCode::Digit6, Key::Digit6),
    (KeyCode::Digit7, Key::Digit7),
    (KeyCode::Digit8, Key::Digit8),
    (KeyCode::Digit9, Key::Digit9),
    (KeyCode::Numpad0, Key::NumPad0),
    (KeyCode::Numpad1, Key::NumPad1),
    (KeyCode::Numpad2, Key::NumPad2),
    (KeyCode::Numpad3, Key::NumPad3),
    (KeyCode::Numpad4, Key::NumPad4),
    (KeyCode::Numpad5, Key::NumPad5),
    (KeyCode::Numpad6, Key::NumPad6),
    (KeyCode::Numpad7, Key::NumPad7),
    (KeyCode::Numpad8, Key::NumPad8),
    (KeyCode::Numpad9, Key::NumPad9),
    (KeyCode::F1, Key::F1),
    (KeyCode::F2, Key::F2),
    (KeyCode::F3, Key::F3),
    (KeyCode::F4, Key::F4),
    (KeyCode::F5, Key::F5),
    (KeyCode::F6, Key::F6),
    (KeyCode::F7, Key::F7),
    (KeyCode::F8, Key::F8),
    (KeyCode::F9, Key::F9),
    (KeyCode::F10, Key::F10),
    (KeyCode::F11, Key::F11),
    (KeyCode::F12, Key::F12),
];

/// Key translation table.
///
/// A 256-entry array indexed by the low byte of the native code, written
/// once from [`PAIRS`]. Unmapped codes read back as [`Key::None`]; out of
/// range codes are masked, never rejected.
pub(crate) struct KeyMap {
    table: [Key; 256],
}

impl KeyMap {
    pub fn new() -> Self {
        let mut table = [Key::None; 256];
        for &(code, key) in PAIRS {
            table[(code as u32 & 0xff) as usize] = key;
        }
        Self { table }
    }

    #[inline]
    pub fn translate(&self, code: u32) -> Key {
        self.table[(code & 0xff) as usize]
    }
}

pub(crate) fn map_modifiers(m: ModifiersState) -> Modifiers {
    Modifiers {
        shift: m.shift_key(),
        ctrl: m.control_key(),
        alt: m.alt_key(),
        meta: m.super_key(),
    }
}

pub(crate) fn map_mouse_button(b: WinitMouseButton) -> MouseButton {
    match b {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Back,
        WinitMouseButton::Forward => MouseButton::Forward,
        WinitMouseButton::Other(v) => MouseButton::Other(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_pair_translates_to_its_key() {
        let map = KeyMap::new();
        for &(code, key) in PAIRS {
            assert_eq!(map.translate(code as u32), key, "{code:?}");
        }
    }

    #[test]
    fn unmapped_codes_translate_to_none() {
        let map = KeyMap::new();
        let mapped: Vec<u32> = PAIRS.iter().map(|&(code, _)| code as u32 & 0xff).collect();
        for code in 0..256u32 {
            if !mapped.contains(&code) {
                assert_eq!(map.translate(code), Key::None, "code {code}");
            }
        }
    }

    #[test]
    fn out_of_range_codes_are_masked() {
        let map = KeyMap::new();
        let code = KeyCode::Escape as u32;
        assert_eq!(map.translate(code | 0xff00), map.translate(code));
    }
}
