use std::f32::consts::PI;
use std::path::PathBuf;
use std::sync::Arc;

use glam::{Mat4, Vec2, Vec3};
use washi_engine::asset::{ImageHandle, ImageLoader};
use washi_engine::core::AppControl;
use washi_engine::device::Gpu;
use washi_engine::input::InputEvent;
use washi_engine::material::{bind, contact_card, dot_grid, MaterialFactory, MaterialOptions, RenderSide};
use washi_engine::paint::Color;
use washi_engine::scene::{Camera, DrawableId, Mesh, Scene, Stage};
use washi_engine::time::FrameTime;

use super::View;

const CARD_SIZE: Vec2 = Vec2::new(1.6, 1.0);
/// Art sits just off the card body so depth testing keeps it on top.
const ART_OFFSET: f32 = 0.002;
const SWAY: f32 = 0.5;

/// Business card with distance-field art on both faces.
///
/// The six MSDF layers decode in the background; until they land the card
/// shows only its dot-grid body.
pub struct CardScene {
    view: View,
    drawables: [DrawableId; 3],
}

impl CardScene {
    pub fn build(assets: PathBuf) -> anyhow::Result<Box<dyn Scene<Gpu>>> {
        let loader = ImageLoader::new(assets);
        let layers = |face: &str| -> Vec<ImageHandle> {
            (0..3).map(|i| loader.load(format!("card/{face}-{i}.png"))).collect()
        };

        let art = bind(
            contact_card,
            MaterialOptions::new()
                .with_footprint(CARD_SIZE.x, CARD_SIZE.y)
                .with_tint(Color::from_hex(0x1c1a24)),
        );
        let front = art.create(&MaterialOptions::new().with_layers(layers("front")))?;
        let back = art.create(&MaterialOptions::new().with_layers(layers("back")))?;

        let body = dot_grid(
            &MaterialOptions::new()
                .with_side(RenderSide::Both)
                .with_density(24.0)
                .with_radius(0.12)
                .with_colors(Color::from_hex(0xd9d2c0), Color::from_hex(0xf4f1ea)),
        )?;

        let card = Arc::new(Mesh::rounded_card(CARD_SIZE, 0.06, 8));
        let mut stage = Stage::new(Color::from_hex(0x2a2f3a));
        let drawables = [
            stage.add(card.clone(), body, Mat4::IDENTITY),
            stage.add(card.clone(), front, Mat4::IDENTITY),
            stage.add(card, back, Mat4::IDENTITY),
        ];

        let camera = Camera::perspective(40.0, 16.0 / 9.0, 0.1, 100.0)
            .looking_at(Vec3::new(0.0, 0.0, 2.6), Vec3::ZERO);

        let mut scene = Self { view: View::new(camera, stage), drawables };
        scene.place(0.0);
        Ok(Box::new(scene))
    }

    fn place(&mut self, angle: f32) {
        let body = Mat4::from_rotation_y(angle);
        let transforms = [
            body,
            body * Mat4::from_translation(Vec3::Z * ART_OFFSET),
            // Back art faces -Z so it reads correctly from behind.
            body * Mat4::from_rotation_y(PI) * Mat4::from_translation(Vec3::Z * ART_OFFSET),
        ];
        for (id, transform) in self.drawables.into_iter().zip(transforms) {
            if let Some(d) = self.view.stage.get_mut(id) {
                d.transform = transform;
            }
        }
    }
}

impl Scene<Gpu> for CardScene {
    fn advance_frame(&mut self, gpu: &mut Gpu, time: FrameTime) -> AppControl {
        self.place(time.elapsed * SWAY);
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
        // Pending decodes are not cancelled; their slots are simply dropped.
        self.view.release();
    }
}
