//! Shader program templates.
//!
//! Every material shares one pass-through vertex stage; a program is that
//! template plus a fragment stage chosen by [`ProgramKind`]. Sources are plain
//! WGSL concatenated at pipeline creation.

use glam::{Mat4, Vec2, Vec3, Vec4};

const COMMON: &str = include_str!("shaders/common.wgsl");
const PASS_THROUGH: &str = include_str!("shaders/pass_through.wgsl");
const MSDF: &str = include_str!("shaders/msdf.wgsl");

const DOT_GRID: &str = include_str!("shaders/dot_grid.wgsl");
const SEIGAIHA: &str = include_str!("shaders/seigaiha.wgsl");
const DISTANCE_FIELD: &str = include_str!("shaders/distance_field.wgsl");
const CONTACT_CARD: &str = include_str!("shaders/contact_card.wgsl");

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ProgramKind {
    DotGrid,
    Seigaiha,
    DistanceField,
    ContactCard,
}

impl ProgramKind {
    pub const ALL: [ProgramKind; 4] = [
        ProgramKind::DotGrid,
        ProgramKind::Seigaiha,
        ProgramKind::DistanceField,
        ProgramKind::ContactCard,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ProgramKind::DotGrid => "dot_grid",
            ProgramKind::Seigaiha => "seigaiha",
            ProgramKind::DistanceField => "distance_field",
            ProgramKind::ContactCard => "contact_card",
        }
    }

    /// Number of MSDF textures bound at `@group(2) @binding(1..)`.
    pub fn texture_layers(self) -> usize {
        match self {
            ProgramKind::DotGrid | ProgramKind::Seigaiha => 0,
            ProgramKind::DistanceField => 1,
            ProgramKind::ContactCard => 3,
        }
    }

    fn fragment(self) -> &'static str {
        match self {
            ProgramKind::DotGrid => DOT_GRID,
            ProgramKind::Seigaiha => SEIGAIHA,
            ProgramKind::DistanceField => DISTANCE_FIELD,
            ProgramKind::ContactCard => CONTACT_CARD,
        }
    }

    /// Full WGSL module: shared declarations, vertex template, fragment stage.
    pub fn source(self) -> String {
        let mut src = String::with_capacity(4096);
        src.push_str(COMMON);
        src.push('\n');
        src.push_str(PASS_THROUGH);
        src.push('\n');
        if self.texture_layers() > 0 {
            src.push_str(MSDF);
            src.push('\n');
        }
        src.push_str(self.fragment());
        src
    }
}

/// Output of the vertex template for one vertex.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct VertexOutput {
    pub clip_position: Vec4,
    pub uv: Vec2,
    pub world_position: Vec3,
}

/// CPU mirror of `vs_main` in `shaders/pass_through.wgsl`.
pub fn pass_through(model: Mat4, view_proj: Mat4, position: Vec3, uv: Vec2) -> VertexOutput {
    let world = model * position.extend(1.0);
    VertexOutput {
        clip_position: view_proj * world,
        uv,
        world_position: world.truncate(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sources_have_both_entry_points() {
        for kind in ProgramKind::ALL {
            let src = kind.source();
            assert!(src.contains("fn vs_main"), "{}", kind.name());
            assert!(src.contains("fn fs_main"), "{}", kind.name());
        }
    }

    #[test]
    fn only_textured_programs_include_msdf() {
        assert!(!ProgramKind::DotGrid.source().contains("fn median3"));
        assert!(!ProgramKind::Seigaiha.source().contains("layer_sampler"));
        assert!(ProgramKind::DistanceField.source().contains("fn median3"));
        assert!(ProgramKind::ContactCard.source().contains("var layer2"));
    }

    #[test]
    fn pass_through_forwards_uv_and_world_position() {
        let model = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let out = pass_through(model, Mat4::IDENTITY, Vec3::ZERO, Vec2::new(0.25, 0.75));
        assert_eq!(out.uv, Vec2::new(0.25, 0.75));
        assert_eq!(out.world_position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(out.clip_position, Vec4::new(1.0, 2.0, 3.0, 1.0));
    }

    #[test]
    fn pass_through_applies_view_projection_after_model() {
        let model = Mat4::from_scale(Vec3::splat(2.0));
        let view_proj = Mat4::from_translation(Vec3::X);
        let out = pass_through(model, view_proj, Vec3::ONE, Vec2::ZERO);
        assert_eq!(out.world_position, Vec3::splat(2.0));
        assert_eq!(out.clip_position, Vec4::new(3.0, 2.0, 2.0, 1.0));
    }
}
