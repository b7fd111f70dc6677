use std::sync::Arc;

use anyhow::{Context, Result};
use winit::window::Window;

use super::surface::{self, SurfaceErrorAction};
use super::GpuInit;
use crate::coords::Viewport;
use crate::core::AppControl;
use crate::lifecycle::RenderSurface;
use crate::paint::Color;
use crate::render::{to_wgpu_color, RenderCtx, RenderTarget};

/// One acquired swapchain image and the encoder recording into it.
struct GpuFrame {
    surface_texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
    encoder: wgpu::CommandEncoder,
}

/// Window render surface: wgpu device, swapchain and depth buffer.
///
/// Created detached. [`Gpu::attach`] configures the swapchain; until then (and
/// after [`Gpu::detach`]) frames are skipped. Sizes are tracked in logical
/// pixels and converted with the current pixel ratio.
pub struct Gpu {
    window: Arc<Window>,

    instance: wgpu::Instance,
    surface: wgpu::Surface<'static>,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    viewport: Viewport,
    depth_view: Option<wgpu::TextureView>,
    attached: bool,
}

impl Gpu {
    /// Creates a device and surface for `window`, sized to `viewport`.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(window: Arc<Window>, viewport: Viewport, init: GpuInit) -> Result<Self> {
        anyhow::ensure!(viewport.is_valid(), "invalid viewport {viewport:?}");

        let GpuInit {
            backends,
            power_preference,
            force_fallback_adapter,
            prefer_srgb,
            present_mode,
            alpha_mode,
            required_features,
            required_limits,
            desired_maximum_frame_latency,
        } = init;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends,
            ..Default::default()
        });

        // Owning the window through `Arc` gives the surface a 'static lifetime.
        let surface = instance
            .create_surface(window.clone())
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("washi-engine device"),
                required_features,
                required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let caps = surface.get_capabilities(&adapter);
        let format = surface::choose_surface_format(&caps, prefer_srgb)
            .context("no supported surface formats")?;
        let alpha_mode = surface::choose_alpha_mode(&caps, alpha_mode);

        let (width, height) = viewport.physical_size();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency,
        };

        log::info!(
            "gpu: {} ({:?}), surface {:?} {}x{}",
            adapter.get_info().name,
            adapter.get_info().backend,
            format,
            width,
            height
        );

        Ok(Self {
            window,
            instance,
            surface,
            adapter,
            device,
            queue,
            config,
            viewport,
            depth_view: None,
            attached: false,
        })
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    pub fn instance(&self) -> &wgpu::Instance {
        &self.instance
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Configures the swapchain and depth buffer; frames render from now on.
    pub fn attach(&mut self) {
        self.attached = true;
        self.reconfigure();
        self.window.request_redraw();
    }

    /// Stops presenting. GPU objects stay alive until the surface is dropped.
    pub fn detach(&mut self) {
        self.attached = false;
        self.depth_view = None;
    }

    fn reconfigure(&mut self) {
        if !self.attached {
            return;
        }
        let (width, height) = self.viewport.physical_size();
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = Some(surface::create_depth_view(&self.device, width, height));
    }

    fn begin_frame(&self) -> std::result::Result<GpuFrame, wgpu::SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("washi frame encoder"),
            });

        Ok(GpuFrame { surface_texture, view, encoder })
    }

    fn submit(&self, frame: GpuFrame) {
        self.queue.submit(std::iter::once(frame.encoder.finish()));
        drop(frame.view);
        frame.surface_texture.present();
    }

    fn handle_surface_error(&mut self, err: wgpu::SurfaceError) -> SurfaceErrorAction {
        let action = surface::map_surface_error(&err);
        match action {
            SurfaceErrorAction::Reconfigure => {
                log::debug!("gpu: surface {err}; reconfiguring");
                self.reconfigure();
            }
            SurfaceErrorAction::SkipFrame => log::trace!("gpu: surface {err}; skipping frame"),
            SurfaceErrorAction::Fatal => log::error!("gpu: surface {err}"),
        }
        action
    }

    /// Clears color and depth, calls `draw` with a ready [`RenderCtx`] and
    /// [`RenderTarget`], then presents the frame.
    pub fn render<F>(&mut self, clear: Color, draw: F) -> AppControl
    where
        F: FnOnce(&RenderCtx<'_>, &mut RenderTarget<'_>),
    {
        if !self.attached || self.depth_view.is_none() {
            log::trace!("gpu: render on a detached surface skipped");
            return AppControl::Continue;
        }

        let mut frame = match self.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                return match self.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => AppControl::Exit,
                    _ => AppControl::Continue,
                };
            }
        };

        let Some(depth_view) = self.depth_view.as_ref() else {
            return AppControl::Continue;
        };

        // Clear pass; dropped before the encoder is borrowed again.
        {
            let _rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("washi clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(to_wgpu_color(clear)),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }

        let rctx = RenderCtx::new(&self.device, &self.queue, self.config.format, self.viewport);

        // RenderTarget borrows frame.encoder; dropped before submit() takes frame.
        {
            let mut target = RenderTarget::new(&mut frame.encoder, &frame.view, depth_view);
            draw(&rctx, &mut target);
        }

        self.window.pre_present_notify();
        self.submit(frame);

        AppControl::Continue
    }
}

impl RenderSurface for Gpu {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn set_size(&mut self, width: f32, height: f32) {
        self.viewport.width = width;
        self.viewport.height = height;
        if self.viewport.is_valid() {
            self.reconfigure();
        } else {
            // wgpu cannot configure a 0x0 surface; wait for a real size.
            log::trace!("gpu: deferring configure for {width}x{height}");
        }
    }

    fn set_pixel_ratio(&mut self, ratio: f32) {
        if ratio.is_finite() && ratio > 0.0 {
            self.viewport.pixel_ratio = ratio;
        }
    }
}
