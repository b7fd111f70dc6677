use std::sync::Arc;

use glam::{Mat4, Vec3};
use washi_engine::core::AppControl;
use washi_engine::device::Gpu;
use washi_engine::input::{InputEvent, Key, KeyState};
use washi_engine::lifecycle::RenderSurface;
use washi_engine::material::{dot_grid, seigaiha, MaterialOptions};
use washi_engine::paint::Color;
use washi_engine::scene::{Camera, CubeFace, DrawableId, Mesh, Scene, Stage};
use washi_engine::time::FrameTime;

use super::View;

const SPIN_SPEED: f32 = 0.6;
const TILT: f32 = 0.35;

/// Rotating cube: dot grid on the four sides, seigaiha on top and bottom.
pub struct CubeScene {
    view: View,
    drawables: [DrawableId; 2],
    angle: f32,
    paused: bool,
}

impl CubeScene {
    pub fn build() -> anyhow::Result<Box<dyn Scene<Gpu>>> {
        let sides = Arc::new(Mesh::cuboid_faces(
            Vec3::ONE,
            &[CubeFace::PosX, CubeFace::NegX, CubeFace::PosZ, CubeFace::NegZ],
        ));
        let caps = Arc::new(Mesh::cuboid_faces(Vec3::ONE, &[CubeFace::PosY, CubeFace::NegY]));

        let dots = dot_grid(&MaterialOptions::new().with_density(6.0).with_radius(0.3))?;
        let waves = seigaiha(
            &MaterialOptions::new()
                .with_outer_radius(0.125)
                .with_spacing(0.25, 0.125)
                .with_vertical_stagger(0.0625),
        )?;

        let mut stage = Stage::new(Color::from_hex(0x1b1d22));
        let drawables = [
            stage.add(sides, dots, Mat4::IDENTITY),
            stage.add(caps, waves, Mat4::IDENTITY),
        ];

        let camera = Camera::perspective(45.0, 16.0 / 9.0, 0.1, 100.0)
            .looking_at(Vec3::new(0.0, 1.2, 3.2), Vec3::ZERO);

        log::debug!("cube: {} drawables", stage.len());
        Ok(Box::new(Self { view: View::new(camera, stage), drawables, angle: 0.0, paused: false }))
    }

    fn transform(&self) -> Mat4 {
        Mat4::from_rotation_x(TILT) * Mat4::from_rotation_y(self.angle)
    }
}

impl Scene<Gpu> for CubeScene {
    fn advance_frame(&mut self, gpu: &mut Gpu, time: FrameTime) -> AppControl {
        if !self.paused {
            self.angle = (self.angle + time.dt * SPIN_SPEED) % std::f32::consts::TAU;
        }

        let transform = self.transform();
        for id in self.drawables {
            if let Some(d) = self.view.stage.get_mut(id) {
                d.transform = transform;
            }
        }

        if time.frame_index == 0 {
            log::trace!("cube: first frame at {:?}", gpu.viewport());
        }
        self.view.render(gpu)
    }

    fn camera(&self) -> &Camera {
        &self.view.camera
    }

    fn camera_mut(&mut self) -> &mut Camera {
        &mut self.view.camera
    }

    fn handle_input(&mut self, event: &InputEvent) {
        if let InputEvent::Key { key: Key::Space, state: KeyState::Pressed, repeat: false, .. } = event {
            self.paused = !self.paused;
        }
        self.view.orbit_on_drag(event);
    }

    fn release(&mut self, _gpu: &mut Gpu) {
        self.view.release();
    }
}
