mod gpu;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Result;

use casement_platform::config::PlatformConfig;
use casement_platform::core::PlatformHandle;
use casement_platform::events::{Event, Key};
use casement_platform::logging::{LoggingConfig, init_logging};
use casement_platform::runtime::Platform;
use casement_platform::window::{WindowFlags, WindowHandle};

use crate::gpu::ClearRenderer;

/// The application thread polls; it never blocks on the platform.
const POLL_INTERVAL: Duration = Duration::from_millis(4);

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    log::info!("casement demo");
    log::info!("  N: open a second window     D: destroy it");
    log::info!("  F: toggle the window frame  L: toggle mouse lock");
    log::info!("  T: retitle                  Esc: quit");

    let config = PlatformConfig {
        title: "casement demo".to_string(),
        ..PlatformConfig::default()
    };

    let shutdown = Arc::new(AtomicBool::new(false));
    let renderer = ClearRenderer::new(shutdown.clone());

    Platform::run(config, renderer, move |platform| {
        let result = app_main(&platform);
        shutdown.store(true, Ordering::Release);
        result
    })
}

fn app_main(platform: &PlatformHandle) -> Result<()> {
    let mut satellite: Option<WindowHandle> = None;
    let mut locked = false;

    loop {
        while let Some(event) = platform.poll() {
            match event {
                Event::Exit => return Ok(()),

                Event::Key {
                    window,
                    key,
                    down: true,
                    ..
                } => match key {
                    Key::Escape => return Ok(()),

                    Key::N if satellite.is_none() => {
                        satellite = platform.create_window(
                            120,
                            120,
                            640,
                            360,
                            WindowFlags::default(),
                            "casement satellite",
                        );
                        if satellite.is_none() {
                            log::warn!("window table exhausted");
                        }
                    }

                    Key::D => {
                        if let Some(handle) = satellite.take() {
                            platform.destroy_window(handle);
                        }
                    }

                    Key::F => platform.toggle_window_frame(window),

                    Key::L => {
                        locked = !locked;
                        platform.set_mouse_lock(window, locked);
                    }

                    Key::T => platform.set_window_title(window, "casement (retitled)"),

                    _ => {}
                },

                Event::Window { window, created } => {
                    log::info!(
                        "window {window:?} {}",
                        if created { "created" } else { "destroyed" }
                    );
                }

                Event::Size {
                    window,
                    width,
                    height,
                } => {
                    log::debug!("window {window:?} resized to {width}x{height}");
                }

                _ => {}
            }
        }

        std::thread::sleep(POLL_INTERVAL);
    }
}
