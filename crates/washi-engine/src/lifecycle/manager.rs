use anyhow::Context;

use super::display::{Display, DisplayEvent, ListenerId, ListenerKind, RenderSurface};
use super::registry::SceneRegistry;
use crate::core::AppControl;
use crate::scene::{Camera, Scene};
use crate::time::{FrameClock, FrameTime};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SceneState {
    /// Built by its factory, no frame advanced yet.
    Constructed,
    /// Advanced at least once.
    Running,
    /// `release` has run; the scene must never advance again.
    Released,
}

/// An owned scene plus its lifecycle state.
///
/// Enforces the scene contract: `release` runs exactly once and nothing
/// advances a released scene. Violations are programmer errors and panic.
pub struct SceneHandle<S> {
    scene: Box<dyn Scene<S>>,
    state: SceneState,
}

impl<S> SceneHandle<S> {
    pub fn new(scene: Box<dyn Scene<S>>) -> Self {
        Self { scene, state: SceneState::Constructed }
    }

    pub fn state(&self) -> SceneState {
        self.state
    }

    pub fn camera(&self) -> &Camera {
        self.scene.camera()
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        self.scene.camera_mut()
    }

    pub fn advance(&mut self, surface: &mut S, time: FrameTime) -> AppControl {
        assert!(
            self.state != SceneState::Released,
            "advance_frame called on a released scene"
        );
        self.state = SceneState::Running;
        self.scene.advance_frame(surface, time)
    }

    pub fn handle_input(&mut self, event: &crate::input::InputEvent) {
        if self.state != SceneState::Released {
            self.scene.handle_input(event);
        }
    }

    pub fn release(&mut self, surface: &mut S) {
        assert!(self.state != SceneState::Released, "scene released twice");
        self.scene.release(surface);
        self.state = SceneState::Released;
    }
}

struct Active<S> {
    scene: SceneHandle<S>,
    surface: S,
    resize_listener: ListenerId,
    input_listener: ListenerId,
}

/// A trigger that arrived while the display had no usable size.
struct Pending {
    key: char,
    resize_listener: ListenerId,
}

/// Owns the active scene and its render surface, and drives the frame loop.
///
/// Single-threaded: every operation takes `&mut self`, so a swap cannot begin
/// while another is in progress. Swaps fully release the outgoing scene before
/// the incoming factory runs.
///
/// A trigger received while the display is minimized (zero-sized viewport)
/// is held back and replayed on the next resize to a valid size. The current
/// scene, if any, keeps running until then.
pub struct LifecycleManager<D: Display> {
    display: D,
    registry: SceneRegistry<D::Surface>,
    active: Option<Active<D::Surface>>,
    pending: Option<Pending>,
    trigger_listener: Option<ListenerId>,
    clock: FrameClock,
}

impl<D: Display> LifecycleManager<D> {
    pub fn new(mut display: D, registry: SceneRegistry<D::Surface>) -> Self {
        let trigger_listener = Some(display.add_listener(ListenerKind::Trigger));
        log::debug!("lifecycle: listening for triggers {:?}", registry.keys().collect::<Vec<_>>());
        Self {
            display,
            registry,
            active: None,
            pending: None,
            trigger_listener,
            clock: FrameClock::default(),
        }
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn registry(&self) -> &SceneRegistry<D::Surface> {
        &self.registry
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn scene_state(&self) -> Option<SceneState> {
        self.active.as_ref().map(|a| a.scene.state())
    }

    pub fn camera(&self) -> Option<&Camera> {
        self.active.as_ref().map(|a| a.scene.camera())
    }

    pub fn surface(&self) -> Option<&D::Surface> {
        self.active.as_ref().map(|a| &a.surface)
    }

    /// The trigger waiting for the display to get a size, if any.
    pub fn pending_trigger(&self) -> Option<char> {
        self.pending.as_ref().map(|p| p.key)
    }

    /// Creates a surface for the current viewport, attaches it and builds a
    /// scene on it with `factory`.
    ///
    /// Fails without creating a surface if the display has no usable size.
    /// If the factory fails the surface is detached and dropped, no listeners
    /// are registered, and the manager stays idle.
    ///
    /// # Panics
    /// If a scene is already active; use [`LifecycleManager::swap`].
    pub fn start<F>(&mut self, factory: F) -> anyhow::Result<()>
    where
        F: FnOnce(&mut D::Surface) -> anyhow::Result<Box<dyn Scene<D::Surface>>>,
    {
        assert!(self.active.is_none(), "start called while a scene is active");

        let viewport = self.display.viewport();
        anyhow::ensure!(viewport.is_valid(), "display has no usable size: {viewport:?}");
        let mut surface = self
            .display
            .create_surface(viewport)
            .context("failed to create render surface")?;
        self.display.attach(&mut surface);

        let scene = match factory(&mut surface) {
            Ok(scene) => scene,
            Err(err) => {
                self.display.detach(&mut surface);
                drop(surface);
                return Err(err.context("scene factory failed"));
            }
        };

        let mut scene = SceneHandle::new(scene);
        scene.camera_mut().set_aspect(viewport.aspect());

        let resize_listener = self.display.add_listener(ListenerKind::Resize);
        let input_listener = self.display.add_listener(ListenerKind::Input);

        self.clock.reset();
        self.active = Some(Active { scene, surface, resize_listener, input_listener });

        log::info!("lifecycle: scene started ({}x{})", viewport.width, viewport.height);
        Ok(())
    }

    /// Detaches the surface, removes the scene's listeners, then releases it.
    ///
    /// Safe to call with no active scene and before any frame was rendered.
    pub fn stop(&mut self) {
        let Some(mut active) = self.active.take() else {
            log::debug!("lifecycle: stop with no active scene");
            return;
        };

        self.display.detach(&mut active.surface);
        self.display.remove_listener(active.resize_listener);
        self.display.remove_listener(active.input_listener);
        active.scene.release(&mut active.surface);

        log::info!("lifecycle: scene released");
    }

    /// [`stop`](Self::stop) then [`start`](Self::start).
    pub fn swap<F>(&mut self, factory: F) -> anyhow::Result<()>
    where
        F: FnOnce(&mut D::Surface) -> anyhow::Result<Box<dyn Scene<D::Surface>>>,
    {
        self.stop();
        self.start(factory)
    }

    /// Swaps to the scene registered under `key`.
    ///
    /// Returns `Ok(false)` for an unregistered key, which is ignored. While
    /// the display has no usable size the swap is deferred; a later trigger
    /// replaces a deferred one.
    pub fn trigger(&mut self, key: char) -> anyhow::Result<bool> {
        let Some(factory) = self.registry.get(key) else {
            log::trace!("lifecycle: no scene for trigger '{key}'");
            return Ok(false);
        };

        if !self.display.viewport().is_valid() {
            let resize_listener = match self.pending.take() {
                Some(pending) => pending.resize_listener,
                None => self.display.add_listener(ListenerKind::Resize),
            };
            self.pending = Some(Pending { key, resize_listener });
            log::info!("lifecycle: trigger '{key}' deferred until the display has a size");
            return Ok(true);
        }
        self.clear_pending();

        log::info!("lifecycle: trigger '{key}'");
        self.swap(|surface| factory(surface))
            .with_context(|| format!("failed to start scene '{key}'"))?;
        Ok(true)
    }

    fn clear_pending(&mut self) -> Option<char> {
        let pending = self.pending.take()?;
        self.display.remove_listener(pending.resize_listener);
        Some(pending.key)
    }

    /// Advances the active scene by one frame. Idle managers do nothing.
    pub fn frame(&mut self) -> AppControl {
        let Some(active) = self.active.as_mut() else {
            return AppControl::Continue;
        };
        let time = self.clock.tick();
        log::trace!("lifecycle: frame {} dt={:?}", time.frame_index, time.dt);
        active.scene.advance(&mut active.surface, time)
    }

    /// Routes one display event. Events for listeners that are not
    /// registered are dropped.
    pub fn handle_event(&mut self, event: DisplayEvent) {
        if self.display.listener_count(event.kind()) == 0 {
            return;
        }

        match event {
            DisplayEvent::Resized(viewport) => {
                if let Some(active) = self.active.as_mut() {
                    active.surface.set_pixel_ratio(viewport.pixel_ratio);
                    active.surface.set_size(viewport.width, viewport.height);
                    active.scene.camera_mut().set_aspect(viewport.aspect());
                }
                if !viewport.is_valid() {
                    return;
                }
                if let Some(key) = self.clear_pending() {
                    log::debug!("lifecycle: replaying deferred trigger '{key}'");
                    if let Err(err) = self.trigger(key) {
                        log::error!("lifecycle: {err:#}");
                    }
                }
            }
            DisplayEvent::Trigger(key) => {
                if let Err(err) = self.trigger(key) {
                    log::error!("lifecycle: {err:#}");
                }
            }
            DisplayEvent::Input(input) => {
                if let Some(active) = self.active.as_mut() {
                    active.scene.handle_input(&input);
                }
            }
        }
    }
}

impl<D: Display> Drop for LifecycleManager<D> {
    fn drop(&mut self) {
        self.stop();
        self.clear_pending();
        if let Some(id) = self.trigger_listener.take() {
            self.display.remove_listener(id);
        }
    }
}
