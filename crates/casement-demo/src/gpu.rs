//! Minimal wgpu embedder: one surface per platform window, cleared every
//! frame. Stands in for the real rendering library the platform layer is
//! built to host.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use winit::window::Window;

use casement_platform::core::{RenderProgress, RenderPump};
use casement_platform::window::WindowHandle;

/// Clear-screen renderer driven by the platform loop.
///
/// `shutdown` is set by the application thread when it is done; the next
/// `frame` call releases every surface and reports idle so the platform can
/// finish draining.
pub struct ClearRenderer {
    windows: HashMap<WindowHandle, WindowGpu>,
    shutdown: Arc<AtomicBool>,
    frame_index: u64,
}

impl ClearRenderer {
    pub fn new(shutdown: Arc<AtomicBool>) -> Self {
        Self {
            windows: HashMap::new(),
            shutdown,
            frame_index: 0,
        }
    }
}

impl RenderPump for ClearRenderer {
    fn frame(&mut self) -> RenderProgress {
        if self.shutdown.load(Ordering::Acquire) {
            // Drop surfaces (and our window clones) before the platform
            // tears the native windows down.
            self.windows.clear();
            return RenderProgress::Idle;
        }

        self.frame_index = self.frame_index.wrapping_add(1);
        let pulse = (self.frame_index % 600) as f64 / 600.0;
        let clear = wgpu::Color {
            r: 0.04,
            g: 0.05 + 0.08 * pulse,
            b: 0.12,
            a: 1.0,
        };

        for gpu in self.windows.values_mut() {
            gpu.draw(clear);
        }
        RenderProgress::Active
    }

    fn window_created(&mut self, handle: WindowHandle, window: &Arc<Window>) {
        match pollster::block_on(WindowGpu::new(window.clone())) {
            Ok(gpu) => {
                self.windows.insert(handle, gpu);
            }
            Err(err) => log::error!("GPU initialization failed for {handle:?}: {err:#}"),
        }
    }

    fn window_destroyed(&mut self, handle: WindowHandle) {
        self.windows.remove(&handle);
    }
}

/// wgpu objects bound to one window.
struct WindowGpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
}

impl WindowGpu {
    /// Adapter/device acquisition is asynchronous under wgpu.
    async fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // The surface holds its own window clone, so it is 'static.
        let surface = instance
            .create_surface(window.clone())
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("casement-demo device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .first()
            .copied()
            .context("no supported surface formats")?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
        })
    }

    /// wgpu cannot configure a 0×0 surface; minimized windows skip frames.
    fn resize_if_needed(&mut self) -> bool {
        let size = self.window.inner_size();
        if size.width == 0 || size.height == 0 {
            return false;
        }
        if size.width != self.config.width || size.height != self.config.height {
            self.config.width = size.width;
            self.config.height = size.height;
            self.surface.configure(&self.device, &self.config);
        }
        true
    }

    fn draw(&mut self, clear: wgpu::Color) {
        if !self.resize_if_needed() {
            return;
        }

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("surface out of memory");
                return;
            }
            // Transient; skip the frame.
            Err(_) => return,
        };

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("casement-demo encoder"),
            });

        {
            let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("casement-demo clear pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
    }
}
