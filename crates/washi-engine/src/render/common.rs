//! GPU-side layouts shared by the mesh renderer and `shaders/common.wgsl`.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::material::{Material, MaterialKind, MAX_CLIP_PLANES};
use crate::paint::Color;

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

// ── blend ─────────────────────────────────────────────────────────────────

pub(super) fn premul_alpha_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

// ── uniforms ──────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct MatrixUniform {
    pub matrix: [[f32; 4]; 4],
}

impl MatrixUniform {
    pub fn new(m: Mat4) -> Self {
        Self { matrix: m.to_cols_array_2d() }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct MaterialUniform {
    pub color_a: [f32; 4],
    pub color_b: [f32; 4],
    pub params: [f32; 4],
    pub extra: [f32; 4],
    pub clip_count: [u32; 4],
    pub clip_planes: [[f32; 4]; MAX_CLIP_PLANES],
}

impl MaterialUniform {
    pub fn from_material(material: &Material) -> Self {
        let mut u = Self::zeroed();

        match material.kind() {
            MaterialKind::DotGrid(p) => {
                u.color_a = p.color_a.to_array();
                u.color_b = p.color_b.to_array();
                u.params = [p.radius, p.density, 0.0, 0.0];
            }
            MaterialKind::Seigaiha(p) => {
                u.color_a = p.color_a.to_array();
                u.color_b = p.color_b.to_array();
                u.params = [
                    p.outer_radius,
                    p.vertical_spacing,
                    p.horizontal_spacing,
                    p.vertical_stagger,
                ];
            }
            MaterialKind::DistanceField(p) => {
                u.color_a = p.tint.to_array();
                u.extra = [p.layer.footprint.x, p.layer.footprint.y, 0.0, 0.0];
            }
            MaterialKind::ContactCard(p) => {
                u.color_a = p.tint.to_array();
                u.extra = [p.footprint.x, p.footprint.y, 0.0, 0.0];
            }
        }

        let planes = material.clipping_planes();
        u.clip_count[0] = planes.len().min(MAX_CLIP_PLANES) as u32;
        for (dst, plane) in u.clip_planes.iter_mut().zip(planes) {
            *dst = plane.to_array();
        }
        u
    }
}

pub(super) fn uniform_min_binding_size<T>() -> Option<std::num::NonZeroU64> {
    std::num::NonZeroU64::new(std::mem::size_of::<T>() as u64)
}

pub(crate) fn to_wgpu_color(c: Color) -> wgpu::Color {
    wgpu::Color { r: c.r as f64, g: c.g as f64, b: c.b as f64, a: c.a as f64 }
}
