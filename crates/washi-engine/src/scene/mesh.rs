use std::sync::atomic::{AtomicU64, Ordering};

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

/// Interleaved vertex consumed by `vs_main`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x2  // uv
    ];

    pub fn new(position: Vec3, uv: Vec2) -> Self {
        Self { position: position.to_array(), uv: uv.to_array() }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Identity of a mesh; GPU buffers are cached under it.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct MeshId(u64);

static NEXT_MESH_ID: AtomicU64 = AtomicU64::new(1);

/// Face of an axis-aligned box.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CubeFace {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl CubeFace {
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PosX,
        CubeFace::NegX,
        CubeFace::PosY,
        CubeFace::NegY,
        CubeFace::PosZ,
        CubeFace::NegZ,
    ];

    /// Outward normal, then the face's local right and up axes.
    fn basis(self) -> (Vec3, Vec3, Vec3) {
        match self {
            CubeFace::PosX => (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            CubeFace::NegX => (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            CubeFace::PosY => (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            CubeFace::NegY => (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            CubeFace::PosZ => (Vec3::Z, Vec3::X, Vec3::Y),
            CubeFace::NegZ => (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        }
    }
}

/// Indexed triangle list, counter-clockwise front faces.
#[derive(Debug)]
pub struct Mesh {
    id: MeshId,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        debug_assert!(indices.len() % 3 == 0);
        debug_assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
        Self { id: MeshId(NEXT_MESH_ID.fetch_add(1, Ordering::Relaxed)), vertices, indices }
    }

    pub fn id(&self) -> MeshId {
        self.id
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Rectangle in the XY plane facing +Z, centered on the origin.
    ///
    /// UVs run from `(0, 0)` at the bottom-left to `size` at the top-right, so
    /// one pattern tile spans one world unit.
    pub fn plane(size: Vec2) -> Self {
        let h = size * 0.5;
        let vertices = vec![
            Vertex::new(Vec3::new(-h.x, -h.y, 0.0), Vec2::new(0.0, 0.0)),
            Vertex::new(Vec3::new(h.x, -h.y, 0.0), Vec2::new(size.x, 0.0)),
            Vertex::new(Vec3::new(h.x, h.y, 0.0), Vec2::new(size.x, size.y)),
            Vertex::new(Vec3::new(-h.x, h.y, 0.0), Vec2::new(0.0, size.y)),
        ];
        Self::new(vertices, vec![0, 1, 2, 0, 2, 3])
    }

    /// Box centered on the origin; each face carries UVs over `[0, 1]²`.
    pub fn cuboid(size: Vec3) -> Self {
        Self::cuboid_faces(size, &CubeFace::ALL)
    }

    /// Subset of a box's faces, e.g. to skin opposite faces with different materials.
    pub fn cuboid_faces(size: Vec3, faces: &[CubeFace]) -> Self {
        let h = size * 0.5;
        let mut vertices = Vec::with_capacity(faces.len() * 4);
        let mut indices = Vec::with_capacity(faces.len() * 6);

        for face in faces {
            let (n, right, up) = face.basis();
            let center = n * h;
            let r = right * h;
            let u = up * h;
            let base = vertices.len() as u32;

            vertices.push(Vertex::new(center - r - u, Vec2::new(0.0, 0.0)));
            vertices.push(Vertex::new(center + r - u, Vec2::new(1.0, 0.0)));
            vertices.push(Vertex::new(center + r + u, Vec2::new(1.0, 1.0)));
            vertices.push(Vertex::new(center - r + u, Vec2::new(0.0, 1.0)));
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self::new(vertices, indices)
    }

    /// Flat card with rounded corners in the XY plane facing +Z.
    ///
    /// UVs equal the XY position, centered on the origin, which is the native
    /// space distance-field footprints are remapped from.
    pub fn rounded_card(size: Vec2, radius: f32, corner_segments: u32) -> Self {
        let h = size * 0.5;
        let radius = radius.clamp(0.0, h.x.min(h.y));
        let segments = corner_segments.max(1);

        let mut vertices = vec![Vertex::new(Vec3::ZERO, Vec2::ZERO)];

        // Corner arcs counter-clockwise, starting bottom-right.
        let corners = [
            (Vec2::new(h.x - radius, -h.y + radius), -std::f32::consts::FRAC_PI_2),
            (Vec2::new(h.x - radius, h.y - radius), 0.0),
            (Vec2::new(-h.x + radius, h.y - radius), std::f32::consts::FRAC_PI_2),
            (Vec2::new(-h.x + radius, -h.y + radius), std::f32::consts::PI),
        ];
        for (center, start) in corners {
            for i in 0..=segments {
                let a = start + std::f32::consts::FRAC_PI_2 * i as f32 / segments as f32;
                let p = center + Vec2::new(a.cos(), a.sin()) * radius;
                vertices.push(Vertex::new(p.extend(0.0), p));
            }
        }

        let rim = vertices.len() as u32 - 1;
        let mut indices = Vec::with_capacity(rim as usize * 3);
        for i in 0..rim {
            let a = 1 + i;
            let b = 1 + (i + 1) % rim;
            indices.extend_from_slice(&[0, a, b]);
        }

        Self::new(vertices, indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_normal(mesh: &Mesh, tri: usize) -> Vec3 {
        let [a, b, c] = [0, 1, 2].map(|k| Vec3::from(mesh.vertices()[mesh.indices()[tri * 3 + k] as usize].position));
        (b - a).cross(c - a)
    }

    #[test]
    fn vertex_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 20);
    }

    #[test]
    fn plane_faces_positive_z() {
        let m = Mesh::plane(Vec2::new(2.0, 3.0));
        assert_eq!(m.indices().len(), 6);
        assert!(triangle_normal(&m, 0).z > 0.0);
        assert_eq!(m.vertices()[2].uv, [2.0, 3.0]);
    }

    #[test]
    fn cuboid_faces_point_outward() {
        let m = Mesh::cuboid(Vec3::ONE);
        assert_eq!(m.vertices().len(), 24);
        assert_eq!(m.indices().len(), 36);
        for tri in 0..12 {
            let n = triangle_normal(&m, tri);
            let first = Vec3::from(m.vertices()[m.indices()[tri * 3] as usize].position);
            // Outward: normal agrees with the face center direction.
            assert!(n.dot(first) > 0.0, "triangle {tri}");
        }
    }

    #[test]
    fn cuboid_subset() {
        let m = Mesh::cuboid_faces(Vec3::ONE, &[CubeFace::PosY, CubeFace::NegY]);
        assert_eq!(m.vertices().len(), 8);
        assert_eq!(m.indices().len(), 12);
    }

    #[test]
    fn rounded_card_uv_is_centered_position() {
        let m = Mesh::rounded_card(Vec2::new(2.0, 3.0), 0.25, 4);
        for v in m.vertices() {
            assert_eq!(v.uv, [v.position[0], v.position[1]]);
            assert!(v.position[0].abs() <= 1.0 + 1e-5);
            assert!(v.position[1].abs() <= 1.5 + 1e-5);
        }
        for tri in 0..m.indices().len() / 3 {
            assert!(triangle_normal(&m, tri).z >= 0.0, "triangle {tri}");
        }
    }

    #[test]
    fn mesh_ids_are_unique() {
        assert_ne!(Mesh::plane(Vec2::ONE).id(), Mesh::plane(Vec2::ONE).id());
    }
}
