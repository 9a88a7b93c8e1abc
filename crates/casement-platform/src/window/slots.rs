use super::{WindowFlags, WindowHandle};
use crate::config::PlatformConfig;

/// Owner-thread-only state behind one window handle.
#[derive(Debug)]
pub(crate) struct Slot {
    pub flags: WindowFlags,

    /// Current corrected size in physical pixels.
    pub width: u32,
    pub height: u32,

    /// Width:height ratio enforced while `flags.aspect_ratio` is set.
    pub aspect: f32,

    /// Last observed pointer position, used for button events that carry no
    /// position of their own.
    pub pointer: (i32, i32),

    /// Accumulated wheel value.
    pub wheel: i32,
}

/// Fixed-capacity table of window slots, indexed by handle.
pub(crate) struct SlotTable {
    slots: Box<[Option<Slot>]>,
    min_width: u32,
    min_height: u32,
}

impl SlotTable {
    pub fn new(config: &PlatformConfig) -> Self {
        let mut slots = Vec::with_capacity(config.max_windows as usize);
        slots.resize_with(config.max_windows as usize, || None);
        Self {
            slots: slots.into_boxed_slice(),
            min_width: config.min_width,
            min_height: config.min_height,
        }
    }

    pub fn insert(&mut self, handle: WindowHandle, flags: WindowFlags, width: u32, height: u32, aspect: f32) {
        if let Some(entry) = self.slots.get_mut(handle.index()) {
            *entry = Some(Slot {
                flags,
                width,
                height,
                aspect,
                pointer: (0, 0),
                wheel: 0,
            });
        }
    }

    pub fn remove(&mut self, handle: WindowHandle) -> Option<Slot> {
        self.slots.get_mut(handle.index())?.take()
    }

    pub fn get(&self, handle: WindowHandle) -> Option<&Slot> {
        self.slots.get(handle.index())?.as_ref()
    }

    pub fn get_mut(&mut self, handle: WindowHandle) -> Option<&mut Slot> {
        self.slots.get_mut(handle.index())?.as_mut()
    }

    /// Runs the resize policy for one window.
    ///
    /// Returns the corrected size when it differs from the slot's current
    /// size (or `force` is set), updating the slot; `None` means no-op.
    /// Aspect-locked slots get ratio correction; others take the request
    /// clamped to 1×1.
    pub fn apply_resize(
        &mut self,
        handle: WindowHandle,
        width: u32,
        height: u32,
        force: bool,
    ) -> Option<(u32, u32)> {
        let min = (self.min_width, self.min_height);
        let slot = self.get_mut(handle)?;

        let (width, height) = if slot.flags.aspect_ratio {
            corrected_size(width, height, slot.aspect, min.0, min.1)
        } else {
            (width.max(1), height.max(1))
        };

        if !force && width == slot.width && height == slot.height {
            return None;
        }

        slot.width = width;
        slot.height = height;
        Some((width, height))
    }
}

/// Aspect-preserving size correction.
///
/// A request narrower than tall is treated as portrait: width is clamped to
/// the minimum and height derived from it. Otherwise height is clamped and
/// width derived. Either way the result satisfies `width / height == aspect`
/// up to integer rounding.
fn corrected_size(width: u32, height: u32, aspect: f32, min_width: u32, min_height: u32) -> (u32, u32) {
    if width < height {
        let width = width.max(min_width);
        let height = (width as f32 / aspect).round() as u32;
        (width, height)
    } else {
        let height = height.max(min_height);
        let width = (height as f32 * aspect).round() as u32;
        (width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ASPECT: f32 = 16.0 / 9.0;

    fn table() -> SlotTable {
        SlotTable::new(&PlatformConfig::default())
    }

    fn locked_slot(table: &mut SlotTable, idx: u16) -> WindowHandle {
        let handle = WindowHandle::new(idx);
        let flags = WindowFlags {
            aspect_ratio: true,
            frame: true,
        };
        table.insert(handle, flags, 1280, 720, ASPECT);
        handle
    }

    // ── corrected_size ───────────────────────────────────────────────────

    #[test]
    fn portrait_request_clamps_width_and_derives_height() {
        // 100 < 300 takes the portrait branch; width is clamped to the
        // minimum (320) and height recomputed from the ratio.
        let (w, h) = corrected_size(100, 300, ASPECT, 320, 180);
        assert_eq!((w, h), (320, 180));
        assert!((w as f32 / h as f32 - ASPECT).abs() < 0.01);
    }

    #[test]
    fn landscape_request_clamps_height_and_derives_width() {
        let (w, h) = corrected_size(2000, 90, ASPECT, 320, 180);
        assert_eq!((w, h), (320, 180));

        let (w, h) = corrected_size(500, 450, ASPECT, 320, 180);
        assert_eq!((w, h), (800, 450));
    }

    // ── apply_resize ─────────────────────────────────────────────────────

    #[test]
    fn resize_reports_corrected_not_requested_values() {
        let mut table = table();
        let handle = locked_slot(&mut table, 0);

        assert_eq!(table.apply_resize(handle, 100, 300, false), Some((320, 180)));
        let slot = table.get(handle).unwrap();
        assert_eq!((slot.width, slot.height), (320, 180));
    }

    #[test]
    fn repeated_resize_is_a_noop() {
        let mut table = table();
        let handle = locked_slot(&mut table, 0);

        assert!(table.apply_resize(handle, 100, 300, false).is_some());
        assert_eq!(table.apply_resize(handle, 100, 300, false), None);

        // force overrides the no-op check.
        assert_eq!(table.apply_resize(handle, 100, 300, true), Some((320, 180)));
    }

    #[test]
    fn unlocked_slot_takes_the_request() {
        let mut table = table();
        let handle = WindowHandle::new(1);
        table.insert(handle, WindowFlags::default(), 400, 400, ASPECT);

        assert_eq!(table.apply_resize(handle, 123, 456, false), Some((123, 456)));
        assert_eq!(table.apply_resize(handle, 0, 0, false), Some((1, 1)));
    }

    #[test]
    fn resize_of_a_dead_handle_is_ignored() {
        let mut table = table();
        assert_eq!(table.apply_resize(WindowHandle::new(5), 100, 100, true), None);
    }
}
