//! Native input translation.

mod keymap;

pub(crate) use keymap::{KeyMap, map_modifiers, map_mouse_button};
