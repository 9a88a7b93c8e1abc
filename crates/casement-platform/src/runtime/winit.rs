use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use anyhow::{Context, Result};
use crossbeam_channel::Receiver;
use parking_lot::Mutex;
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{CursorGrabMode, Window, WindowId};

use super::command::{Command, CreateInfo, command_channel};
use super::pump::{Pump, PumpState, WindowSys};
use crate::config::PlatformConfig;
use crate::core::{PlatformHandle, RenderProgress, RenderPump};
use crate::events::EventQueue;
use crate::input::{map_modifiers, map_mouse_button};
use crate::window::{HandleAlloc, WindowHandle};

/// User-event payload: a wake signal telling the loop to drain commands.
#[derive(Debug)]
pub(crate) struct WakeUp;

/// Pixel-delta scrolls are folded into line units at this granularity.
const WHEEL_PIXELS_PER_LINE: f64 = 16.0;

/// The native event loop is process-global, so only one platform loop may
/// be live at a time.
static RUNNING: AtomicBool = AtomicBool::new(false);

/// Entry point for the platform loop.
pub struct Platform;

impl Platform {
    /// Runs the platform loop on the calling thread (the owner thread).
    ///
    /// Eagerly creates the default window, hands it to `render`, then spawns
    /// `entry` on a secondary thread with a [`PlatformHandle`]. The loop
    /// runs until the entry returns or a window close is requested, drains
    /// `render` to [`RenderProgress::Idle`], joins the entry thread, and
    /// tears the native windows down.
    ///
    /// The entry must return promptly once it observes
    /// [`crate::events::Event::Exit`]; the owner thread joins it during
    /// shutdown.
    pub fn run<R, F>(config: PlatformConfig, render: R, entry: F) -> Result<()>
    where
        R: RenderPump,
        F: FnOnce(PlatformHandle) -> Result<()> + Send + 'static,
    {
        if RUNNING
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Acquire)
            .is_err()
        {
            anyhow::bail!("a platform loop is already running in this process");
        }

        let result = Self::run_inner(config, render, entry);
        RUNNING.store(false, Ordering::Release);
        result
    }

    fn run_inner<R, F>(config: PlatformConfig, render: R, entry: F) -> Result<()>
    where
        R: RenderPump,
        F: FnOnce(PlatformHandle) -> Result<()> + Send + 'static,
    {
        let event_loop = EventLoop::<WakeUp>::with_user_event()
            .build()
            .context("failed to create winit EventLoop")?;

        let (commands_tx, commands_rx) = command_channel();
        let alloc = Arc::new(Mutex::new(HandleAlloc::new(config.max_windows)));
        let queue = EventQueue::new();
        let handle = PlatformHandle::new(
            alloc.clone(),
            queue.clone(),
            commands_tx,
            event_loop.create_proxy(),
        );

        let mut state = PlatformApp {
            pump: Pump::new(config, alloc, queue),
            commands: commands_rx,
            render,
            entry: Some((entry, handle)),
            windows: WindowMap::default(),
            app_thread: None,
        };

        event_loop
            .run_app(&mut state)
            .context("event loop terminated with error")
    }
}

/// Native windows owned by the loop, with the reverse index used to route
/// native events back to our handles.
#[derive(Default)]
struct WindowMap {
    by_handle: HashMap<WindowHandle, Arc<Window>>,
    by_id: HashMap<WindowId, WindowHandle>,
}

impl WindowMap {
    fn insert(&mut self, handle: WindowHandle, window: Arc<Window>) {
        self.by_id.insert(window.id(), handle);
        self.by_handle.insert(handle, window);
    }

    fn remove(&mut self, handle: WindowHandle) -> Option<Arc<Window>> {
        let window = self.by_handle.remove(&handle)?;
        self.by_id.remove(&window.id());
        Some(window)
    }

    fn get(&self, handle: WindowHandle) -> Option<&Arc<Window>> {
        self.by_handle.get(&handle)
    }

    fn handle_of(&self, id: WindowId) -> Option<WindowHandle> {
        self.by_id.get(&id).copied()
    }

    fn handles(&self) -> Vec<WindowHandle> {
        self.by_handle.keys().copied().collect()
    }

    fn clear(&mut self) {
        self.by_handle.clear();
        self.by_id.clear();
    }
}

/// [`WindowSys`] over winit, valid for the duration of one callback.
struct WinitSys<'a> {
    event_loop: &'a ActiveEventLoop,
    windows: &'a mut WindowMap,
}

impl WinitSys<'_> {
    fn window(&self, handle: WindowHandle) -> Option<&Arc<Window>> {
        let window = self.windows.get(handle);
        if window.is_none() {
            log::debug!("no native window for {handle:?}");
        }
        window
    }
}

impl WindowSys for WinitSys<'_> {
    fn create_window(&mut self, handle: WindowHandle, info: &CreateInfo) -> Result<()> {
        let mut attrs = Window::default_attributes()
            .with_title(info.title.clone())
            .with_inner_size(PhysicalSize::new(info.width.max(1), info.height.max(1)))
            .with_decorations(info.flags.frame);
        if let Some((x, y)) = info.position {
            attrs = attrs.with_position(PhysicalPosition::new(x, y));
        }

        let window = self
            .event_loop
            .create_window(attrs)
            .context("failed to create native window")?;
        self.windows.insert(handle, Arc::new(window));
        Ok(())
    }

    fn destroy_window(&mut self, handle: WindowHandle) {
        // The window closes once every Arc clone is gone; the renderer is
        // told to drop its clones before this runs.
        if self.windows.remove(handle).is_none() {
            log::debug!("no native window for {handle:?}");
        }
    }

    fn set_position(&mut self, handle: WindowHandle, x: i32, y: i32) {
        if let Some(window) = self.window(handle) {
            window.set_outer_position(PhysicalPosition::new(x, y));
        }
    }

    fn set_size(&mut self, handle: WindowHandle, width: u32, height: u32) {
        if let Some(window) = self.window(handle) {
            let _ = window.request_inner_size(PhysicalSize::new(width, height));
        }
    }

    fn set_title(&mut self, handle: WindowHandle, title: &str) {
        if let Some(window) = self.window(handle) {
            window.set_title(title);
        }
    }

    fn set_decorated(&mut self, handle: WindowHandle, decorated: bool) {
        if let Some(window) = self.window(handle) {
            window.set_decorations(decorated);
        }
    }

    fn set_mouse_lock(&mut self, handle: WindowHandle, locked: bool) {
        let Some(window) = self.window(handle) else {
            return;
        };

        let grabbed = if locked {
            // Some platforms only support one of the two grab modes.
            window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
        } else {
            window.set_cursor_grab(CursorGrabMode::None)
        };

        match grabbed {
            Ok(()) => window.set_cursor_visible(!locked),
            Err(err) => log::warn!("cursor grab failed for {handle:?}: {err}"),
        }
    }
}

struct PlatformApp<R, F> {
    pump: Pump,
    commands: Receiver<Command>,
    render: R,

    /// Entry point and its handle, consumed on first resume.
    entry: Option<(F, PlatformHandle)>,

    windows: WindowMap,
    app_thread: Option<JoinHandle<()>>,
}

impl<R, F> PlatformApp<R, F>
where
    R: RenderPump,
    F: FnOnce(PlatformHandle) -> Result<()> + Send + 'static,
{
    fn drain_commands(&mut self, event_loop: &ActiveEventLoop) {
        while let Ok(command) = self.commands.try_recv() {
            let created = match &command {
                Command::CreateWindow { handle, .. } => Some(*handle),
                _ => None,
            };

            // The renderer must release its surface before the native
            // window goes away.
            if let Command::DestroyWindow { handle } = &command {
                self.render.window_destroyed(*handle);
            }

            let mut sys = WinitSys {
                event_loop,
                windows: &mut self.windows,
            };
            self.pump.dispatch(command, &mut sys);

            if let Some(handle) = created {
                if let Some(window) = self.windows.get(handle) {
                    self.render.window_created(handle, window);
                }
            }
        }
    }

    fn spawn_app_thread(&mut self) {
        let Some((entry, handle)) = self.entry.take() else {
            return;
        };

        let exit_handle = handle.clone();
        let spawned = std::thread::Builder::new()
            .name("casement-app".to_string())
            .spawn(move || {
                if let Err(err) = entry(handle) {
                    log::error!("application entry returned an error: {err:#}");
                }
                exit_handle.post_exit();
            });

        match spawned {
            Ok(thread) => self.app_thread = Some(thread),
            Err(err) => {
                log::error!("failed to spawn the application thread: {err}");
                self.pump.request_exit();
            }
        }
    }

    /// Completes the drain: joins the entry thread, releases windows, exits
    /// the native loop.
    fn finish(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(thread) = self.app_thread.take() {
            if thread.join().is_err() {
                log::error!("application thread panicked");
            }
        }

        for handle in self.windows.handles() {
            self.render.window_destroyed(handle);
        }
        self.windows.clear();

        event_loop.exit();
    }
}

impl<R, F> ApplicationHandler<WakeUp> for PlatformApp<R, F>
where
    R: RenderPump,
    F: FnOnce(PlatformHandle) -> Result<()> + Send + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if !self.pump.start() {
            return;
        }

        event_loop.set_control_flow(ControlFlow::Poll);

        // The default window exists before the application runs.
        let Some(default) = self.pump.alloc_handle() else {
            log::error!("window table has zero capacity");
            self.pump.request_exit();
            event_loop.exit();
            return;
        };
        let info = self.pump.default_create_info();
        let (width, height) = (info.width, info.height);

        {
            let mut sys = WinitSys {
                event_loop,
                windows: &mut self.windows,
            };
            self.pump.dispatch(
                Command::CreateWindow {
                    handle: default,
                    info: Box::new(info),
                },
                &mut sys,
            );
        }

        let Some(window) = self.windows.get(default) else {
            // Without the default window there is nothing to run; the entry
            // was never spawned, so exit without draining.
            self.pump.request_exit();
            event_loop.exit();
            return;
        };
        self.render.window_created(default, window);

        // Force the initial resolution through the resize policy so the
        // renderer observes a Size event even if the window system adjusted
        // the requested size.
        let mut sys = WinitSys {
            event_loop,
            windows: &mut self.windows,
        };
        self.pump.apply_resize(default, width, height, true, &mut sys);

        self.spawn_app_thread();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(handle) = self.windows.handle_of(window_id) else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => self.pump.request_exit(),

            WindowEvent::Resized(size) => {
                let mut sys = WinitSys {
                    event_loop,
                    windows: &mut self.windows,
                };
                self.pump
                    .apply_resize(handle, size.width, size.height, false, &mut sys);
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.pump
                    .pointer_moved(handle, position.x as i32, position.y as i32);
            }

            WindowEvent::MouseInput { state, button, .. } => {
                let down = matches!(state, ElementState::Pressed);
                self.pump.pointer_button(handle, map_mouse_button(button), down);
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y as i32,
                    MouseScrollDelta::PixelDelta(pos) => (pos.y / WHEEL_PIXELS_PER_LINE) as i32,
                };
                if lines != 0 {
                    self.pump.pointer_wheel(handle, lines);
                }
            }

            WindowEvent::ModifiersChanged(m) => {
                self.pump.modifiers_changed(map_modifiers(m.state()));
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    let down = matches!(event.state, ElementState::Pressed);
                    self.pump.key(handle, code as u32, down);
                }
            }

            _ => {}
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, _wake: WakeUp) {
        self.drain_commands(event_loop);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        // Commands may have raced the wake signal; drain once per turn.
        self.drain_commands(event_loop);

        let progress = self.render.frame();

        if self.pump.state() == PumpState::Draining && progress == RenderProgress::Idle {
            self.finish(event_loop);
        }
    }
}
