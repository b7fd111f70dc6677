use glam::{Vec2, Vec3};

use crate::asset::ImageHandle;
use crate::paint::Color;

/// Which faces of a mesh a material is drawn on.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum RenderSide {
    #[default]
    Front,
    Back,
    Both,
}

/// World-space plane `normal · p + constant = 0`.
///
/// A point is kept when `normal · p + constant >= 0`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClipPlane {
    pub normal: Vec3,
    pub constant: f32,
}

impl ClipPlane {
    pub const fn new(normal: Vec3, constant: f32) -> Self {
        Self { normal, constant }
    }

    /// Plane through `point` keeping the half-space `normal` points into.
    pub fn through(point: Vec3, normal: Vec3) -> Self {
        let normal = normal.normalize_or_zero();
        Self { normal, constant: -normal.dot(point) }
    }

    #[inline]
    pub fn distance(&self, p: Vec3) -> f32 {
        self.normal.dot(p) + self.constant
    }

    #[inline]
    pub fn keeps(&self, p: Vec3) -> bool {
        self.distance(p) >= 0.0
    }

    pub(crate) fn to_array(self) -> [f32; 4] {
        [self.normal.x, self.normal.y, self.normal.z, self.constant]
    }
}

/// Options accepted by every material factory.
///
/// Every field is optional; a factory substitutes its own documented default
/// for anything left unset and ignores fields it does not understand.
/// Factories receive options by shared reference and never mutate them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialOptions {
    pub side: Option<RenderSide>,
    pub clipping_planes: Option<Vec<ClipPlane>>,

    /// First pattern color (dot foreground, seigaiha outer band).
    pub color_a: Option<Color>,
    /// Second pattern color (dot background, seigaiha inner band).
    pub color_b: Option<Color>,

    // dot grid
    pub radius: Option<f32>,
    pub density: Option<f32>,

    // seigaiha
    pub outer_radius: Option<f32>,
    pub vertical_spacing: Option<f32>,
    pub horizontal_spacing: Option<f32>,
    pub vertical_stagger: Option<f32>,

    // distance field
    pub layers: Option<Vec<ImageHandle>>,
    pub footprint: Option<Vec2>,
    pub tint: Option<Color>,
}

impl MaterialOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field-by-field merge: any field set in `overrides` wins over `self`.
    pub fn merged(&self, overrides: &MaterialOptions) -> MaterialOptions {
        fn pick<T: Clone>(base: &Option<T>, over: &Option<T>) -> Option<T> {
            over.as_ref().or(base.as_ref()).cloned()
        }

        MaterialOptions {
            side: pick(&self.side, &overrides.side),
            clipping_planes: pick(&self.clipping_planes, &overrides.clipping_planes),
            color_a: pick(&self.color_a, &overrides.color_a),
            color_b: pick(&self.color_b, &overrides.color_b),
            radius: pick(&self.radius, &overrides.radius),
            density: pick(&self.density, &overrides.density),
            outer_radius: pick(&self.outer_radius, &overrides.outer_radius),
            vertical_spacing: pick(&self.vertical_spacing, &overrides.vertical_spacing),
            horizontal_spacing: pick(&self.horizontal_spacing, &overrides.horizontal_spacing),
            vertical_stagger: pick(&self.vertical_stagger, &overrides.vertical_stagger),
            layers: pick(&self.layers, &overrides.layers),
            footprint: pick(&self.footprint, &overrides.footprint),
            tint: pick(&self.tint, &overrides.tint),
        }
    }

    pub fn with_side(mut self, side: RenderSide) -> Self {
        self.side = Some(side);
        self
    }

    pub fn with_clipping_planes(mut self, planes: impl Into<Vec<ClipPlane>>) -> Self {
        self.clipping_planes = Some(planes.into());
        self
    }

    pub fn with_colors(mut self, a: Color, b: Color) -> Self {
        self.color_a = Some(a);
        self.color_b = Some(b);
        self
    }

    pub fn with_color_a(mut self, c: Color) -> Self {
        self.color_a = Some(c);
        self
    }

    pub fn with_color_b(mut self, c: Color) -> Self {
        self.color_b = Some(c);
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.density = Some(density);
        self
    }

    pub fn with_outer_radius(mut self, r: f32) -> Self {
        self.outer_radius = Some(r);
        self
    }

    pub fn with_spacing(mut self, horizontal: f32, vertical: f32) -> Self {
        self.horizontal_spacing = Some(horizontal);
        self.vertical_spacing = Some(vertical);
        self
    }

    pub fn with_vertical_stagger(mut self, stagger: f32) -> Self {
        self.vertical_stagger = Some(stagger);
        self
    }

    pub fn with_layers(mut self, layers: impl Into<Vec<ImageHandle>>) -> Self {
        self.layers = Some(layers.into());
        self
    }

    pub fn with_footprint(mut self, width: f32, height: f32) -> Self {
        self.footprint = Some(Vec2::new(width, height));
        self
    }

    pub fn with_tint(mut self, tint: Color) -> Self {
        self.tint = Some(tint);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_win_field_by_field() {
        let base = MaterialOptions::new().with_radius(0.2).with_density(4.0);
        let over = MaterialOptions::new().with_density(8.0).with_side(RenderSide::Back);
        let m = base.merged(&over);
        assert_eq!(m.radius, Some(0.2));
        assert_eq!(m.density, Some(8.0));
        assert_eq!(m.side, Some(RenderSide::Back));
        assert_eq!(m.color_a, None);
    }

    #[test]
    fn merge_with_empty_is_identity() {
        let base = MaterialOptions::new()
            .with_colors(Color::RED, Color::BLACK)
            .with_footprint(2.0, 3.0);
        assert_eq!(base.merged(&MaterialOptions::default()), base);
        assert_eq!(MaterialOptions::default().merged(&base), base);
    }

    #[test]
    fn merge_leaves_inputs_untouched() {
        let base = MaterialOptions::new().with_radius(0.1);
        let over = MaterialOptions::new().with_radius(0.3);
        let _ = base.merged(&over);
        assert_eq!(base.radius, Some(0.1));
        assert_eq!(over.radius, Some(0.3));
    }

    #[test]
    fn clip_plane_through_point() {
        let p = ClipPlane::through(Vec3::new(0.0, 1.0, 0.0), Vec3::NEG_Y);
        assert!(p.keeps(Vec3::ZERO));
        assert!(p.keeps(Vec3::new(0.0, 1.0, 0.0)));
        assert!(!p.keeps(Vec3::new(0.0, 1.5, 0.0)));
    }
}
