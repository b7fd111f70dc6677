//! Demo scenes, one per trigger key.

mod card;
mod cube;
mod fold;

use std::path::PathBuf;

use washi_engine::core::AppControl;
use washi_engine::device::Gpu;
use washi_engine::input::{InputEvent, InputState};
use washi_engine::lifecycle::SceneRegistry;
use washi_engine::render::MeshRenderer;
use washi_engine::scene::{Camera, Stage};

/// Radians of orbit per logical pixel dragged.
const ORBIT_SPEED: f32 = 0.008;

pub fn registry(assets: PathBuf) -> SceneRegistry<Gpu> {
    SceneRegistry::new()
        .register('1', |_: &mut Gpu| cube::CubeScene::build())
        .register('2', |_: &mut Gpu| fold::FoldScene::build())
        .register('3', move |_: &mut Gpu| card::CardScene::build(assets.clone()))
}

/// Camera, drawables and renderer shared by every demo scene.
struct View {
    camera: Camera,
    stage: Stage,
    renderer: MeshRenderer,
    input: InputState,
}

impl View {
    fn new(camera: Camera, stage: Stage) -> Self {
        Self { camera, stage, renderer: MeshRenderer::new(), input: InputState::default() }
    }

    fn render(&mut self, gpu: &mut Gpu) -> AppControl {
        let Self { camera, stage, renderer, .. } = self;
        gpu.render(stage.clear_color(), |ctx, target| renderer.render(ctx, target, camera, stage))
    }

    /// Left-drag orbits the camera around its target.
    fn orbit_on_drag(&mut self, event: &InputEvent) {
        if let Some(drag) = self.input.apply_event(event) {
            self.camera.orbit(-drag.dx * ORBIT_SPEED, drag.dy * ORBIT_SPEED);
        }
    }

    fn release(&mut self) {
        self.renderer.release();
        self.stage.clear();
    }
}
