use std::sync::Arc;

use glam::{Mat4, Vec2, Vec3};
use washi_engine::core::AppControl;
use washi_engine::device::Gpu;
use washi_engine::input::InputEvent;
use washi_engine::material::{dot_grid, seigaiha, ClipPlane, MaterialOptions, RenderSide};
use washi_engine::paint::Color;
use washi_engine::scene::{Camera, DrawableId, Mesh, Scene, Stage};
use washi_engine::time::FrameTime;

use super::View;

/// Largest fold angle, radians.
const MAX_FOLD: f32 = 2.6;
const FOLD_SPEED: f32 = 0.8;

/// A square panel folded along the X axis.
///
/// Both halves draw the same plane mesh; clipping planes cut each copy down
/// to its half. The upper half's plane turns with its hinge.
pub struct FoldScene {
    view: View,
    upper: [DrawableId; 2],
}

impl FoldScene {
    pub fn build() -> anyhow::Result<Box<dyn Scene<Gpu>>> {
        let panel = Arc::new(Mesh::plane(Vec2::splat(2.0)));

        let front = MaterialOptions::new().with_side(RenderSide::Front);
        let back = MaterialOptions::new()
            .with_side(RenderSide::Back)
            .with_colors(Color::from_hex(0x2d2a32), Color::from_hex(0xe8e2d0));

        let lower = front.clone().with_clipping_planes(vec![ClipPlane::new(Vec3::NEG_Y, 0.0)]);
        let lower_back = back.clone().with_clipping_planes(vec![ClipPlane::new(Vec3::NEG_Y, 0.0)]);

        let mut stage = Stage::new(Color::from_hex(0x101418));
        stage.add(panel.clone(), seigaiha(&lower)?, Mat4::IDENTITY);
        stage.add(panel.clone(), dot_grid(&lower_back)?, Mat4::IDENTITY);

        let upper_plane = vec![ClipPlane::new(Vec3::Y, 0.0)];
        let upper = [
            stage.add(panel.clone(), seigaiha(&front.with_clipping_planes(upper_plane.clone()))?, Mat4::IDENTITY),
            stage.add(panel, dot_grid(&back.with_clipping_planes(upper_plane))?, Mat4::IDENTITY),
        ];

        let camera = Camera::perspective(45.0, 16.0 / 9.0, 0.1, 100.0)
            .looking_at(Vec3::new(2.4, 1.0, 3.6), Vec3::ZERO);

        Ok(Box::new(Self { view: View::new(camera, stage), upper }))
    }
}

/// Rotation about the hinge and the world-space plane keeping the folded half.
fn hinge(angle: f32) -> (Mat4, ClipPlane) {
    let rotation = Mat4::from_rotation_x(-angle);
    (rotation, ClipPlane::new(rotation.transform_vector3(Vec3::Y), 0.0))
}

impl Scene<Gpu> for FoldScene {
    fn advance_frame(&mut self, gpu: &mut Gpu, time: FrameTime) -> AppControl {
        let t = (time.elapsed * FOLD_SPEED).sin() * 0.5 + 0.5;
        let (transform, plane) = hinge(t * MAX_FOLD);

        for id in self.upper {
            let Some(d) = self.view.stage.get_mut(id) else { continue };
            d.transform = transform;
            if let Err(e) = d.material.set_clipping_planes(vec![plane]) {
                log::warn!("fold: {e}");
            }
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
        self.view.orbit_on_drag(event);
    }

    fn release(&mut self, _gpu: &mut Gpu) {
        self.view.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hinge_plane_keeps_the_rotated_upper_half() {
        let (rotation, plane) = hinge(1.0);
        let upper_point = rotation.transform_point3(Vec3::new(0.3, 0.5, 0.0));
        let lower_point = rotation.transform_point3(Vec3::new(0.3, -0.5, 0.0));
        assert!(plane.keeps(upper_point));
        assert!(!plane.keeps(lower_point));
    }

    #[test]
    fn flat_hinge_is_identity() {
        let (rotation, plane) = hinge(0.0);
        assert_eq!(rotation, Mat4::IDENTITY);
        assert!(plane.normal.abs_diff_eq(Vec3::Y, 1e-6));
    }
}
