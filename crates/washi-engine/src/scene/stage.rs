use std::sync::Arc;

use glam::Mat4;

use super::Mesh;
use crate::material::Material;
use crate::paint::Color;

/// Index of a drawable within its [`Stage`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct DrawableId(usize);

/// A mesh skinned with a material at a world transform.
#[derive(Debug, Clone)]
pub struct Drawable {
    pub mesh: Arc<Mesh>,
    pub material: Material,
    pub transform: Mat4,
    pub visible: bool,
}

/// Drawables owned by one scene, in insertion order.
///
/// Opaque drawables render before transparent ones; order is otherwise stable.
#[derive(Debug, Clone)]
pub struct Stage {
    drawables: Vec<Drawable>,
    clear_color: Color,
}

impl Default for Stage {
    fn default() -> Self {
        Self::new(Color::BLACK)
    }
}

impl Stage {
    pub fn new(clear_color: Color) -> Self {
        Self { drawables: Vec::new(), clear_color }
    }

    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    pub fn add(&mut self, mesh: Arc<Mesh>, material: Material, transform: Mat4) -> DrawableId {
        self.drawables.push(Drawable { mesh, material, transform, visible: true });
        DrawableId(self.drawables.len() - 1)
    }

    pub fn get(&self, id: DrawableId) -> Option<&Drawable> {
        self.drawables.get(id.0)
    }

    pub fn get_mut(&mut self, id: DrawableId) -> Option<&mut Drawable> {
        self.drawables.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.drawables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DrawableId, &Drawable)> {
        self.drawables.iter().enumerate().map(|(i, d)| (DrawableId(i), d))
    }

    /// Visible drawables in paint order: opaque first, then transparent.
    pub fn iter_in_paint_order(&self) -> impl Iterator<Item = (DrawableId, &Drawable)> {
        let pass = |transparent: bool| {
            self.drawables
                .iter()
                .enumerate()
                .filter(move |(_, d)| d.visible && d.material.is_transparent() == transparent)
                .map(|(i, d)| (DrawableId(i), d))
        };
        pass(false).chain(pass(true))
    }

    /// Drops every drawable. Materials and meshes go with them.
    pub fn clear(&mut self) {
        self.drawables.clear();
    }
}
