use std::sync::Arc;

use parking_lot::Mutex;

use super::command::{Command, CreateInfo};
use crate::config::PlatformConfig;
use crate::events::{Event, EventQueue, Modifiers, MouseButton};
use crate::input::KeyMap;
use crate::window::{HandleAlloc, SlotTable, WindowFlags, WindowHandle};

/// Native window operations, as the pump sees them.
///
/// The winit runtime implements this against real windows; tests implement
/// it with a mock, so the dispatch and bookkeeping logic runs without a
/// display. Implementations are keyed by our own handles; the pump never
/// sees native identities.
pub(crate) trait WindowSys {
    fn create_window(&mut self, handle: WindowHandle, info: &CreateInfo) -> anyhow::Result<()>;
    fn destroy_window(&mut self, handle: WindowHandle);
    fn set_position(&mut self, handle: WindowHandle, x: i32, y: i32);
    fn set_size(&mut self, handle: WindowHandle, width: u32, height: u32);
    fn set_title(&mut self, handle: WindowHandle, title: &str);
    fn set_decorated(&mut self, handle: WindowHandle, decorated: bool);
    fn set_mouse_lock(&mut self, handle: WindowHandle, locked: bool);
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum PumpState {
    Stopped,
    Running,
    /// Exit has been posted; the loop keeps pumping the renderer until it
    /// reports idle.
    Draining,
}

/// The platform-free core of the event loop.
///
/// Owns the slot table and the producer side of the event queue; consumes
/// commands and translated native input. All native effects go through
/// [`WindowSys`]. Owner thread only, except for the shared handle allocator.
pub(crate) struct Pump {
    config: PlatformConfig,
    alloc: Arc<Mutex<HandleAlloc>>,
    slots: SlotTable,
    queue: EventQueue,
    keymap: KeyMap,
    modifiers: Modifiers,
    state: PumpState,
}

impl Pump {
    pub fn new(config: PlatformConfig, alloc: Arc<Mutex<HandleAlloc>>, queue: EventQueue) -> Self {
        let slots = SlotTable::new(&config);
        Self {
            config,
            alloc,
            slots,
            queue,
            keymap: KeyMap::new(),
            modifiers: Modifiers::default(),
            state: PumpState::Stopped,
        }
    }

    pub fn state(&self) -> PumpState {
        self.state
    }

    /// Stopped → Running. Returns false when already started (winit may
    /// resume more than once on some platforms).
    pub fn start(&mut self) -> bool {
        if self.state != PumpState::Stopped {
            return false;
        }
        self.state = PumpState::Running;
        true
    }

    /// Running → Draining; posts the final `Exit` event exactly once.
    pub fn request_exit(&mut self) {
        if self.state == PumpState::Draining {
            return;
        }
        self.state = PumpState::Draining;
        self.queue.post(Event::Exit);
    }

    pub fn alloc_handle(&self) -> Option<WindowHandle> {
        self.alloc.lock().alloc()
    }

    /// Creation record for the eagerly-created default window.
    pub fn default_create_info(&self) -> CreateInfo {
        CreateInfo {
            position: None,
            width: self.config.width,
            height: self.config.height,
            flags: WindowFlags {
                aspect_ratio: true,
                frame: true,
            },
            title: self.config.title.clone(),
        }
    }

    /// Performs one command: native call, slot bookkeeping, events.
    pub fn dispatch(&mut self, command: Command, sys: &mut dyn WindowSys) {
        match command {
            Command::CreateWindow { handle, info } => self.create_window(handle, &info, sys),
            Command::DestroyWindow { handle } => self.destroy_window(handle, sys),
            Command::SetPosition { handle, x, y } => {
                if self.slots.get(handle).is_some() {
                    sys.set_position(handle, x, y);
                } else {
                    log::debug!("set_position for dead window {handle:?}");
                }
            }
            Command::SetSize { handle, width, height } => {
                self.apply_resize(handle, width, height, false, sys);
            }
            Command::SetTitle { handle, title } => {
                if self.slots.get(handle).is_some() {
                    sys.set_title(handle, &title);
                } else {
                    log::debug!("set_title for dead window {handle:?}");
                }
            }
            Command::ToggleFrame { handle } => {
                if let Some(slot) = self.slots.get_mut(handle) {
                    slot.flags.frame = !slot.flags.frame;
                    let frame = slot.flags.frame;
                    sys.set_decorated(handle, frame);
                } else {
                    log::debug!("toggle_frame for dead window {handle:?}");
                }
            }
            Command::SetMouseLock { handle, locked } => {
                if self.slots.get(handle).is_some() {
                    sys.set_mouse_lock(handle, locked);
                } else {
                    log::debug!("set_mouse_lock for dead window {handle:?}");
                }
            }
            Command::Exit => self.request_exit(),
        }
    }

    fn create_window(&mut self, handle: WindowHandle, info: &CreateInfo, sys: &mut dyn WindowSys) {
        match sys.create_window(handle, info) {
            Ok(()) => {
                self.slots
                    .insert(handle, info.flags, info.width, info.height, self.config.aspect_ratio);
                self.queue.post(Event::Window {
                    window: handle,
                    created: true,
                });
                self.queue.post(Event::Size {
                    window: handle,
                    width: info.width,
                    height: info.height,
                });
            }
            Err(err) => {
                log::error!("window creation failed for {handle:?}: {err:#}");
                self.alloc.lock().free(handle);
                self.queue.post(Event::Window {
                    window: handle,
                    created: false,
                });
            }
        }
    }

    /// Destroys the native window, then releases the handle index. Freeing
    /// here, after the destroy is processed, is what makes the index safe
    /// to reuse.
    fn destroy_window(&mut self, handle: WindowHandle, sys: &mut dyn WindowSys) {
        if self.slots.remove(handle).is_none() {
            log::debug!("destroy for dead window {handle:?}");
            return;
        }
        self.queue.post(Event::Window {
            window: handle,
            created: false,
        });
        sys.destroy_window(handle);
        self.alloc.lock().free(handle);
    }

    /// Resize policy entry point, shared by commands and native resize
    /// notifications. Applies the corrected size to the native window and
    /// posts it; no-ops post nothing.
    pub fn apply_resize(
        &mut self,
        handle: WindowHandle,
        width: u32,
        height: u32,
        force: bool,
        sys: &mut dyn WindowSys,
    ) {
        if let Some((width, height)) = self.slots.apply_resize(handle, width, height, force) {
            sys.set_size(handle, width, height);
            self.queue.post(Event::Size {
                window: handle,
                width,
                height,
            });
        }
    }

    pub fn modifiers_changed(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    pub fn pointer_moved(&mut self, handle: WindowHandle, x: i32, y: i32) {
        let Some(slot) = self.slots.get_mut(handle) else {
            return;
        };
        slot.pointer = (x, y);
        let wheel = slot.wheel;
        self.queue.post(Event::Mouse {
            window: handle,
            x,
            y,
            wheel,
            button: None,
            down: false,
        });
    }

    pub fn pointer_button(&mut self, handle: WindowHandle, button: MouseButton, down: bool) {
        let Some(slot) = self.slots.get(handle) else {
            return;
        };
        let (x, y) = slot.pointer;
        let wheel = slot.wheel;
        self.queue.post(Event::Mouse {
            window: handle,
            x,
            y,
            wheel,
            button: Some(button),
            down,
        });
    }

    pub fn pointer_wheel(&mut self, handle: WindowHandle, delta: i32) {
        let Some(slot) = self.slots.get_mut(handle) else {
            return;
        };
        slot.wheel += delta;
        let (x, y) = slot.pointer;
        let wheel = slot.wheel;
        self.queue.post(Event::Mouse {
            window: handle,
            x,
            y,
            wheel,
            button: None,
            down: false,
        });
    }

    pub fn key(&mut self, handle: WindowHandle, code: u32, down: bool) {
        if self.slots.get(handle).is_none() {
            return;
        }
        let key = self.keymap.translate(code);
        self.queue.post(Event::Key {
            window: handle,
            key,
            modifiers: self.modifiers,
            down,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MockSys {
        created: Vec<WindowHandle>,
        destroyed: Vec<WindowHandle>,
        sizes: Vec<(WindowHandle, u32, u32)>,
        decorated: Vec<(WindowHandle, bool)>,
        locks: Vec<(WindowHandle, bool)>,
        fail_create: bool,
    }

    impl WindowSys for MockSys {
        fn create_window(&mut self, handle: WindowHandle, _info: &CreateInfo) -> anyhow::Result<()> {
            if self.fail_create {
                anyhow::bail!("no display");
            }
            self.created.push(handle);
            Ok(())
        }

        fn destroy_window(&mut self, handle: WindowHandle) {
            self.destroyed.push(handle);
        }

        fn set_position(&mut self, _handle: WindowHandle, _x: i32, _y: i32) {}

        fn set_size(&mut self, handle: WindowHandle, width: u32, height: u32) {
            self.sizes.push((handle, width, height));
        }

        fn set_title(&mut self, _handle: WindowHandle, _title: &str) {}

        fn set_decorated(&mut self, handle: WindowHandle, decorated: bool) {
            self.decorated.push((handle, decorated));
        }

        fn set_mouse_lock(&mut self, handle: WindowHandle, locked: bool) {
            self.locks.push((handle, locked));
        }
    }

    struct Fixture {
        pump: Pump,
        sys: MockSys,
        queue: EventQueue,
    }

    fn fixture() -> Fixture {
        let config = PlatformConfig::default();
        let alloc = Arc::new(Mutex::new(HandleAlloc::new(config.max_windows)));
        let queue = EventQueue::new();
        let mut pump = Pump::new(config, alloc, queue.clone());
        pump.start();
        Fixture {
            pump,
            sys: MockSys::default(),
            queue,
        }
    }

    /// Caller-side half of `create_window`: allocate, then post.
    fn create(f: &mut Fixture, title: &str) -> WindowHandle {
        let handle = f.pump.alloc_handle().expect("handle");
        let info = CreateInfo {
            position: Some((0, 0)),
            width: 640,
            height: 360,
            flags: WindowFlags {
                aspect_ratio: true,
                frame: true,
            },
            title: title.to_string(),
        };
        f.pump.dispatch(
            Command::CreateWindow {
                handle,
                info: Box::new(info),
            },
            &mut f.sys,
        );
        handle
    }

    // ── creation sequence ────────────────────────────────────────────────

    #[test]
    fn creation_emits_window_then_size() {
        let mut f = fixture();
        let handle = create(&mut f, "one");

        assert_eq!(f.sys.created, vec![handle]);
        assert_eq!(
            f.queue.poll(),
            Some(Event::Window {
                window: handle,
                created: true
            })
        );
        assert_eq!(
            f.queue.poll(),
            Some(Event::Size {
                window: handle,
                width: 640,
                height: 360
            })
        );
        assert_eq!(f.queue.poll(), None);
    }

    #[test]
    fn failed_creation_frees_the_handle_and_reports_destruction() {
        let mut f = fixture();
        f.sys.fail_create = true;
        let handle = create(&mut f, "doomed");

        assert_eq!(
            f.queue.poll(),
            Some(Event::Window {
                window: handle,
                created: false
            })
        );
        // The index is back in the pool.
        assert_eq!(f.pump.alloc_handle(), Some(handle));
    }

    // ── destruction and handle reuse ─────────────────────────────────────

    #[test]
    fn destroy_frees_only_after_dispatch() {
        let mut f = fixture();
        let first = create(&mut f, "first");

        // Caller posts the destroy but the owner has not processed it yet:
        // a concurrent create must not reuse the index.
        let second = f.pump.alloc_handle().expect("handle");
        assert_ne!(first, second);

        f.pump.dispatch(Command::DestroyWindow { handle: first }, &mut f.sys);
        assert_eq!(f.sys.destroyed, vec![first]);

        // Now the index is reusable.
        assert_eq!(f.pump.alloc_handle(), Some(first));
    }

    #[test]
    fn destroy_posts_a_destruction_event_before_the_native_teardown() {
        let mut f = fixture();
        let handle = create(&mut f, "w");
        while f.queue.poll().is_some() {}

        f.pump.dispatch(Command::DestroyWindow { handle }, &mut f.sys);
        assert_eq!(
            f.queue.poll(),
            Some(Event::Window {
                window: handle,
                created: false
            })
        );
    }

    #[test]
    fn commands_for_dead_handles_are_noops() {
        let mut f = fixture();
        let dead = WindowHandle::new(5);

        f.pump.dispatch(Command::DestroyWindow { handle: dead }, &mut f.sys);
        f.pump.dispatch(
            Command::SetSize {
                handle: dead,
                width: 100,
                height: 100,
            },
            &mut f.sys,
        );
        f.pump.dispatch(Command::ToggleFrame { handle: dead }, &mut f.sys);

        assert!(f.sys.destroyed.is_empty());
        assert!(f.sys.sizes.is_empty());
        assert_eq!(f.queue.poll(), None);
    }

    // ── resize dispatch ──────────────────────────────────────────────────

    #[test]
    fn resize_applies_corrected_size_to_the_native_window() {
        let mut f = fixture();
        let handle = create(&mut f, "w");
        while f.queue.poll().is_some() {}

        f.pump.dispatch(
            Command::SetSize {
                handle,
                width: 100,
                height: 300,
            },
            &mut f.sys,
        );

        assert_eq!(f.sys.sizes, vec![(handle, 320, 180)]);
        assert_eq!(
            f.queue.poll(),
            Some(Event::Size {
                window: handle,
                width: 320,
                height: 180
            })
        );

        // A second identical request is a no-op: no call, no event.
        f.pump.dispatch(
            Command::SetSize {
                handle,
                width: 100,
                height: 300,
            },
            &mut f.sys,
        );
        assert_eq!(f.sys.sizes.len(), 1);
        assert_eq!(f.queue.poll(), None);
    }

    // ── frame toggle ─────────────────────────────────────────────────────

    #[test]
    fn toggle_frame_flips_decorations() {
        let mut f = fixture();
        let handle = create(&mut f, "w");

        f.pump.dispatch(Command::ToggleFrame { handle }, &mut f.sys);
        f.pump.dispatch(Command::ToggleFrame { handle }, &mut f.sys);
        assert_eq!(f.sys.decorated, vec![(handle, false), (handle, true)]);
    }

    // ── input routing ────────────────────────────────────────────────────

    #[test]
    fn button_events_reuse_the_last_pointer_position() {
        let mut f = fixture();
        let handle = create(&mut f, "w");
        while f.queue.poll().is_some() {}

        f.pump.pointer_moved(handle, 10, 20);
        f.pump.pointer_button(handle, MouseButton::Left, true);

        assert_eq!(
            f.queue.poll(),
            Some(Event::Mouse {
                window: handle,
                x: 10,
                y: 20,
                wheel: 0,
                button: None,
                down: false
            })
        );
        assert_eq!(
            f.queue.poll(),
            Some(Event::Mouse {
                window: handle,
                x: 10,
                y: 20,
                wheel: 0,
                button: Some(MouseButton::Left),
                down: true
            })
        );
    }

    #[test]
    fn wheel_accumulates_per_window() {
        let mut f = fixture();
        let a = create(&mut f, "a");
        let b = create(&mut f, "b");
        while f.queue.poll().is_some() {}

        f.pump.pointer_wheel(a, 2);
        f.pump.pointer_wheel(a, -1);
        f.pump.pointer_wheel(b, 5);

        let wheel_of = |event: Option<Event>| match event {
            Some(Event::Mouse { window, wheel, .. }) => (window, wheel),
            other => panic!("unexpected event {other:?}"),
        };
        assert_eq!(wheel_of(f.queue.poll()), (a, 2));
        assert_eq!(wheel_of(f.queue.poll()), (a, 1));
        assert_eq!(wheel_of(f.queue.poll()), (b, 5));
    }

    #[test]
    fn input_for_dead_windows_is_dropped() {
        let mut f = fixture();
        f.pump.pointer_moved(WindowHandle::new(3), 1, 1);
        f.pump.key(WindowHandle::new(3), 0, true);
        assert_eq!(f.queue.poll(), None);
    }

    // ── exit ─────────────────────────────────────────────────────────────

    #[test]
    fn exit_is_posted_once() {
        let mut f = fixture();
        f.pump.request_exit();
        f.pump.dispatch(Command::Exit, &mut f.sys);
        f.pump.request_exit();

        assert_eq!(f.pump.state(), PumpState::Draining);
        assert_eq!(f.queue.poll(), Some(Event::Exit));
        assert_eq!(f.queue.poll(), None);
    }
}
