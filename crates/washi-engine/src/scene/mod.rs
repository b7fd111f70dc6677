//! Scene modules.
//!
//! A scene owns a camera, a [`Stage`] of drawables and whatever GPU state it
//! needs to render them. It is generic over the render surface `S` it is lent
//! each call, so the lifecycle can be driven headless in tests.

mod camera;
mod mesh;
mod stage;

pub use camera::Camera;
pub use mesh::{CubeFace, Mesh, MeshId, Vertex};
pub use stage::{Drawable, DrawableId, Stage};

use crate::core::AppControl;
use crate::input::InputEvent;
use crate::time::FrameTime;

/// Contract between a scene and the lifecycle manager.
///
/// The manager calls [`Scene::advance_frame`] once per display refresh while
/// the scene is active and [`Scene::release`] exactly once when it is swapped
/// out. The surface is only lent for the duration of a call.
pub trait Scene<S> {
    /// Updates animated state, then renders the current camera view once.
    fn advance_frame(&mut self, surface: &mut S, time: FrameTime) -> AppControl;

    fn camera(&self) -> &Camera;

    fn camera_mut(&mut self) -> &mut Camera;

    /// Input that is not a scene trigger.
    fn handle_input(&mut self, event: &InputEvent) {
        let _ = event;
    }

    /// Frees GPU resources. Must not fail.
    fn release(&mut self, surface: &mut S);
}
