//! Procedural materials.
//!
//! A [`Material`] is a program kind, its uniform values and render state. It
//! is created by a [`MaterialFactory`] from [`MaterialOptions`] and turned into
//! GPU objects lazily by [`crate::render::MeshRenderer`]. Every kind can also
//! be shaded on the CPU with the same math as its WGSL program.

mod distance_field;
mod error;
mod factory;
mod options;
mod pattern;

use std::sync::atomic::{AtomicU64, Ordering};

use glam::{Vec2, Vec3};

pub use distance_field::{
    coverage_alpha, median3, remap_uv, signed_distance, ContactCardUniforms, DistanceFieldLayer,
    DistanceFieldUniforms, MIN_FWIDTH,
};
pub use error::MaterialError;
pub use factory::*;
pub use options::{ClipPlane, MaterialOptions, RenderSide};
pub use pattern::{DotGridUniforms, SeigaihaSample, SeigaihaUniforms, EDGE, SEIGAIHA_BAND_RADII};

use crate::asset::ImageHandle;
use crate::paint::Color;
use crate::render::ProgramKind;

/// Maximum number of clipping planes a material may carry.
pub const MAX_CLIP_PLANES: usize = 6;

/// Identity of a material instance; GPU bind groups are cached under it.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct MaterialId(u64);

static NEXT_MATERIAL_ID: AtomicU64 = AtomicU64::new(1);

impl MaterialId {
    fn next() -> Self {
        Self(NEXT_MATERIAL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Interpolated inputs of one fragment, as the fragment stage sees them.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Fragment {
    pub uv: Vec2,
    /// UV change to the next pixel on the right.
    pub duv_dx: Vec2,
    /// UV change to the next pixel below.
    pub duv_dy: Vec2,
}

impl Fragment {
    pub fn new(uv: Vec2, duv_dx: Vec2, duv_dy: Vec2) -> Self {
        Self { uv, duv_dx, duv_dy }
    }

    /// A fragment with no screen-space derivatives.
    pub fn at(uv: Vec2) -> Self {
        Self { uv, duv_dx: Vec2::ZERO, duv_dy: Vec2::ZERO }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MaterialKind {
    DotGrid(DotGridUniforms),
    Seigaiha(SeigaihaUniforms),
    DistanceField(DistanceFieldUniforms),
    ContactCard(ContactCardUniforms),
}

#[derive(Debug)]
pub struct Material {
    id: MaterialId,
    kind: MaterialKind,
    side: RenderSide,
    clipping_planes: Vec<ClipPlane>,
}

// A clone is a separate instance and gets its own GPU uniforms.
impl Clone for Material {
    fn clone(&self) -> Self {
        Self {
            id: MaterialId::next(),
            kind: self.kind.clone(),
            side: self.side,
            clipping_planes: self.clipping_planes.clone(),
        }
    }
}

impl Material {
    pub(crate) fn new(kind: MaterialKind, side: RenderSide, clipping_planes: Vec<ClipPlane>) -> Self {
        debug_assert!(clipping_planes.len() <= MAX_CLIP_PLANES);
        Self { id: MaterialId::next(), kind, side, clipping_planes }
    }

    pub fn id(&self) -> MaterialId {
        self.id
    }

    pub fn kind(&self) -> &MaterialKind {
        &self.kind
    }

    pub fn side(&self) -> RenderSide {
        self.side
    }

    pub fn clipping_planes(&self) -> &[ClipPlane] {
        &self.clipping_planes
    }

    /// Replaces the clipping planes, e.g. to follow an animated hinge.
    /// Validated like factory input; on error the old planes stay.
    pub fn set_clipping_planes(&mut self, planes: Vec<ClipPlane>) -> Result<(), MaterialError> {
        factory::check_clipping_planes(&planes)?;
        self.clipping_planes = planes;
        Ok(())
    }

    pub fn program(&self) -> ProgramKind {
        match self.kind {
            MaterialKind::DotGrid(_) => ProgramKind::DotGrid,
            MaterialKind::Seigaiha(_) => ProgramKind::Seigaiha,
            MaterialKind::DistanceField(_) => ProgramKind::DistanceField,
            MaterialKind::ContactCard(_) => ProgramKind::ContactCard,
        }
    }

    /// Distance-field materials carry alpha and are drawn without depth writes.
    pub fn is_transparent(&self) -> bool {
        matches!(self.kind, MaterialKind::DistanceField(_) | MaterialKind::ContactCard(_))
    }

    /// Images bound as textures, in binding order.
    pub fn images(&self) -> Vec<&ImageHandle> {
        match &self.kind {
            MaterialKind::DotGrid(_) | MaterialKind::Seigaiha(_) => Vec::new(),
            MaterialKind::DistanceField(u) => vec![&u.layer.image],
            MaterialKind::ContactCard(u) => u.layers.iter().collect(),
        }
    }

    /// `true` when any plane discards `world`.
    pub fn is_clipped(&self, world: Vec3) -> bool {
        self.clipping_planes.iter().any(|p| !p.keeps(world))
    }

    /// CPU reference of the fragment program, premultiplied.
    pub fn shade(&self, frag: &Fragment) -> Color {
        match &self.kind {
            MaterialKind::DotGrid(u) => u.shade(frag.uv),
            MaterialKind::Seigaiha(u) => u.shade(frag.uv),
            MaterialKind::DistanceField(u) => u.shade(frag),
            MaterialKind::ContactCard(u) => u.shade(frag),
        }
    }

    /// Like [`Material::shade`], but `None` for fragments a clipping plane discards.
    pub fn shade_at(&self, world: Vec3, frag: &Fragment) -> Option<Color> {
        (!self.is_clipped(world)).then(|| self.shade(frag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = dot_grid(&MaterialOptions::default()).unwrap();
        let b = dot_grid(&MaterialOptions::default()).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn clone_is_a_separate_instance() {
        let a = dot_grid(&MaterialOptions::default()).unwrap();
        let mut b = a.clone();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.kind(), b.kind());
        assert_eq!(a.side(), b.side());

        b.set_clipping_planes(vec![ClipPlane::new(Vec3::NEG_Y, 0.0)]).unwrap();
        assert!(a.clipping_planes().is_empty());
        assert_eq!(b.clipping_planes().len(), 1);
    }

    #[test]
    fn every_plane_must_pass() {
        let planes = vec![
            ClipPlane::new(Vec3::Y, 1.0),     // y >= -1
            ClipPlane::new(Vec3::NEG_Y, 1.0), // y <= 1
        ];
        let m = dot_grid(&MaterialOptions::new().with_clipping_planes(planes)).unwrap();
        assert!(!m.is_clipped(Vec3::ZERO));
        assert!(m.is_clipped(Vec3::new(0.0, 1.5, 0.0)));
        assert!(m.is_clipped(Vec3::new(0.0, -1.5, 0.0)));
        assert_eq!(m.shade_at(Vec3::new(0.0, 2.0, 0.0), &Fragment::at(Vec2::ZERO)), None);
    }

    #[test]
    fn clipping_planes_can_be_replaced() {
        let mut m = dot_grid(&MaterialOptions::default()).unwrap();
        m.set_clipping_planes(vec![ClipPlane::new(Vec3::NEG_Y, 0.0)]).unwrap();
        assert!(m.is_clipped(Vec3::new(0.0, 0.5, 0.0)));

        let too_many = vec![ClipPlane::new(Vec3::X, 0.0); MAX_CLIP_PLANES + 1];
        assert!(m.set_clipping_planes(too_many).is_err());
        assert_eq!(m.clipping_planes().len(), 1);
    }

    #[test]
    fn program_and_transparency_follow_kind() {
        let dots = dot_grid(&MaterialOptions::default()).unwrap();
        assert_eq!(dots.program(), ProgramKind::DotGrid);
        assert!(!dots.is_transparent());
        assert!(dots.images().is_empty());

        let img = ImageHandle::from_rgba8("px", 1, 1, vec![0; 4]).unwrap();
        let df = distance_field(&MaterialOptions::new().with_layers(vec![img.clone()])).unwrap();
        assert_eq!(df.program(), ProgramKind::DistanceField);
        assert!(df.is_transparent());
        assert_eq!(df.images(), vec![&img]);
    }
}
