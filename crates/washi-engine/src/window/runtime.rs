use std::sync::Arc;

use anyhow::{Context, Result};

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::coords::Viewport;
use crate::device::{Gpu, GpuInit};
use crate::input::platform::translate_window_event;
use crate::input::{InputEvent, InputState, Key, KeyState};
use crate::lifecycle::{
    Display, DisplayEvent, LifecycleManager, ListenerId, ListenerKind, Listeners, SceneRegistry,
};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    /// Scene started as soon as the window exists.
    pub initial_trigger: Option<char>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "washi".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            initial_trigger: None,
        }
    }
}

/// The native [`Display`]: one `winit` window, one fresh [`Gpu`] per scene.
pub struct WindowDisplay {
    window: Arc<Window>,
    gpu_init: GpuInit,
    listeners: Listeners,
}

impl WindowDisplay {
    pub fn new(window: Arc<Window>, gpu_init: GpuInit) -> Self {
        Self { window, gpu_init, listeners: Listeners::default() }
    }

    pub fn window(&self) -> &Window {
        &self.window
    }
}

fn window_viewport(window: &Window) -> Viewport {
    let scale = window.scale_factor();
    let logical: LogicalSize<f64> = window.inner_size().to_logical(scale);
    Viewport::new(logical.width as f32, logical.height as f32, scale as f32)
}

impl Display for WindowDisplay {
    type Surface = Gpu;

    fn viewport(&self) -> Viewport {
        window_viewport(&self.window)
    }

    fn create_surface(&mut self, viewport: Viewport) -> Result<Gpu> {
        // Adapter/device acquisition is async under wgpu; block here.
        pollster::block_on(Gpu::new(self.window.clone(), viewport, self.gpu_init.clone()))
    }

    fn attach(&mut self, surface: &mut Gpu) {
        surface.attach();
    }

    fn detach(&mut self, surface: &mut Gpu) {
        surface.detach();
    }

    fn add_listener(&mut self, kind: ListenerKind) -> ListenerId {
        self.listeners.add(kind)
    }

    fn remove_listener(&mut self, id: ListenerId) {
        if !self.listeners.remove(id) {
            log::warn!("window: removing unknown listener {id:?}");
        }
    }

    fn listener_count(&self, kind: ListenerKind) -> usize {
        self.listeners.count(kind)
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens a window and runs the event loop until it closes, a scene
    /// returns `AppControl::Exit`, or Escape is pressed.
    pub fn run(config: RuntimeConfig, gpu_init: GpuInit, registry: SceneRegistry<Gpu>) -> Result<()> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState {
            config,
            gpu_init,
            registry: Some(registry),
            manager: None,
            input: InputState::default(),
        };

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        Ok(())
    }
}

struct AppState {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    /// Moved into the manager once the window exists.
    registry: Option<SceneRegistry<Gpu>>,
    manager: Option<LifecycleManager<WindowDisplay>>,
    input: InputState,
}

impl AppState {
    fn create_manager(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let registry = self.registry.take().unwrap_or_default();
        let display = WindowDisplay::new(Arc::new(window), self.gpu_init.clone());
        let mut manager = LifecycleManager::new(display, registry);

        if let Some(key) = self.config.initial_trigger {
            match manager.trigger(key) {
                Ok(true) => {}
                Ok(false) => log::warn!("runtime: no scene registered for '{key}'"),
                Err(e) => log::error!("runtime: {e:#}"),
            }
        }

        self.manager = Some(manager);
        Ok(())
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(manager) = self.manager.as_mut() {
            manager.stop();
        }
        event_loop.exit();
    }

    /// Typed trigger symbols become scene swaps; everything else is forwarded.
    fn route_input(manager: &mut LifecycleManager<WindowDisplay>, ev: InputEvent) {
        if let InputEvent::Key { key, state: KeyState::Pressed, repeat: false, .. } = &ev {
            if let Some(symbol) = key.trigger_symbol() {
                if manager.registry().contains(symbol) {
                    manager.handle_event(DisplayEvent::Trigger(symbol));
                    return;
                }
            }
        }
        manager.handle_event(DisplayEvent::Input(ev));
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.manager.is_some() {
            return;
        }

        if let Err(e) = self.create_manager(event_loop) {
            log::error!("failed to create window: {e:#}");
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw; scenes animate every frame.
        if let Some(manager) = self.manager.as_ref() {
            manager.display().window().request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(manager) = self.manager.as_mut() else {
            return;
        };

        let scale = manager.display().window().scale_factor();
        if let Some(ev) = translate_window_event(scale, &self.input, &event) {
            self.input.apply_event(&ev);

            if matches!(ev, InputEvent::Key { key: Key::Escape, state: KeyState::Pressed, .. }) {
                log::info!("runtime: escape pressed, shutting down");
                self.shutdown(event_loop);
                return;
            }

            Self::route_input(manager, ev);
        }

        match &event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),

            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                let viewport = manager.display().viewport();
                manager.handle_event(DisplayEvent::Resized(viewport));
                manager.display().window().request_redraw();
            }

            WindowEvent::RedrawRequested => {
                if manager.frame().is_exit() {
                    self.shutdown(event_loop);
                }
            }

            _ => {}
        }
    }
}
