//! Procedural tile patterns.
//!
//! CPU evaluations mirror `render/shaders/dot_grid.wgsl` and
//! `render/shaders/seigaiha.wgsl` line for line; keep them in sync.

use glam::Vec2;

use crate::paint::Color;

/// Half-width of the soft edge band, in cell units.
pub const EDGE: f32 = 0.01;

/// Band boundaries as fractions of the outer radius, outermost first.
pub const SEIGAIHA_BAND_RADII: [f32; 5] = [1.0, 0.7, 0.45, 0.225, 0.0];

#[inline]
pub(crate) fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[inline]
pub(crate) fn step(edge: f32, x: f32) -> f32 {
    if x < edge { 0.0 } else { 1.0 }
}

/// Fractional part that stays in `[0, 1)` for negative inputs.
#[inline]
fn fract(v: Vec2) -> Vec2 {
    v - v.floor()
}

/// Soft annulus between `r_in` and `r_out`; a zero inner radius yields a disk.
#[inline]
fn ring(d: f32, r_in: f32, r_out: f32) -> f32 {
    let inner = if r_in <= 0.0 { 1.0 } else { smoothstep(r_in - EDGE, r_in + EDGE, d) };
    inner - smoothstep(r_out - EDGE, r_out + EDGE, d)
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DotGridUniforms {
    pub radius: f32,
    pub density: f32,
    /// Dot color.
    pub color_a: Color,
    /// Background color.
    pub color_b: Color,
}

impl DotGridUniforms {
    /// Dot coverage in `[0, 1]`.
    pub fn coverage(&self, uv: Vec2) -> f32 {
        let cell = fract(uv * self.density);
        let d = (cell - Vec2::splat(0.5)).length();
        1.0 - smoothstep(self.radius - EDGE, self.radius + EDGE, d)
    }

    pub fn shade(&self, uv: Vec2) -> Color {
        let c = self.color_b.lerp(self.color_a, self.coverage(uv));
        Color { a: 1.0, ..c }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SeigaihaUniforms {
    pub outer_radius: f32,
    pub vertical_spacing: f32,
    pub horizontal_spacing: f32,
    pub vertical_stagger: f32,
    /// Outer band color.
    pub color_a: Color,
    /// Inner band color.
    pub color_b: Color,
}

/// One circle's contribution before occlusion.
#[derive(Debug, Copy, Clone)]
struct Circle {
    /// Summed band coverage; the bands partition the disk so this is its coverage too.
    coverage: f32,
    color: Color,
}

impl Circle {
    fn plus(self, other: Circle) -> Circle {
        Circle { coverage: self.coverage + other.coverage, color: self.color + other.color }
    }
}

/// Result of evaluating a seigaiha tile at one point.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SeigaihaSample {
    pub color: Color,
    /// Summed band coverage across every contributing circle.
    pub coverage: f32,
}

impl SeigaihaUniforms {
    fn spacing(&self) -> Vec2 {
        Vec2::new(self.horizontal_spacing, self.vertical_spacing)
    }

    fn band_color(&self, band: usize) -> Color {
        self.color_a.lerp(self.color_b, band as f32 / 3.0)
    }

    fn circle(&self, p: Vec2, center: Vec2, mask: f32) -> Circle {
        let d = (p - center).length();
        let r = SEIGAIHA_BAND_RADII.map(|f| f * self.outer_radius);

        let mut coverage = 0.0;
        let mut color = Color::TRANSPARENT;
        for band in 0..4 {
            let m = ring(d, r[band + 1], r[band]) * mask;
            coverage += m;
            color = color + self.band_color(band) * m;
        }
        Circle { coverage, color }
    }

    /// Left and right diagonal neighbors at height `y`, each masked to its half of the cell.
    fn neighbors(&self, p: Vec2, y: f32, left: f32, right: f32) -> Circle {
        let l = self.circle(p, Vec2::new(0.0, y), left);
        let r = self.circle(p, Vec2::new(self.horizontal_spacing, y), right);
        l.plus(r)
    }

    pub fn sample(&self, uv: Vec2) -> SeigaihaSample {
        let spacing = self.spacing();
        let p = uv - (uv / spacing).floor() * spacing;
        let c = spacing * 0.5;

        let right = step(c.x, p.x);
        let left = 1.0 - right;

        let front = self.neighbors(p, c.y - self.vertical_stagger, left, right);
        let own = self.circle(p, c, 1.0);
        let back = self.neighbors(p, c.y + self.vertical_stagger, left, right);

        // Lower circles occlude the ones above them.
        let own_w = 1.0 - front.coverage;
        let back_w = own_w * (1.0 - own.coverage);

        SeigaihaSample {
            color: front.color + own.color * own_w + back.color * back_w,
            coverage: front.coverage + own.coverage * own_w + back.coverage * back_w,
        }
    }

    pub fn shade(&self, uv: Vec2) -> Color {
        Color { a: 1.0, ..self.sample(uv).color }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dots() -> DotGridUniforms {
        DotGridUniforms { radius: 0.5, density: 1.0, color_a: Color::RED, color_b: Color::BLACK }
    }

    fn waves() -> SeigaihaUniforms {
        SeigaihaUniforms {
            outer_radius: 0.5,
            vertical_spacing: 0.5,
            horizontal_spacing: 1.0,
            vertical_stagger: 0.25,
            color_a: Color::from_hex(0x1d3557),
            color_b: Color::WHITE,
        }
    }

    // ── helpers ───────────────────────────────────────────────────────────

    #[test]
    fn smoothstep_endpoints() {
        assert_eq!(smoothstep(0.0, 1.0, -1.0), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 2.0), 1.0);
        assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn rings_partition_the_disk() {
        let r = SEIGAIHA_BAND_RADII.map(|f| f * 0.5);
        for i in 0..=60 {
            let d = i as f32 / 100.0;
            let sum: f32 = (0..4).map(|b| ring(d, r[b + 1], r[b])).sum();
            let disk = 1.0 - smoothstep(0.5 - EDGE, 0.5 + EDGE, d);
            assert!((sum - disk).abs() < 1e-5, "d={d}");
        }
    }

    // ── dot grid ──────────────────────────────────────────────────────────

    #[test]
    fn dot_center_is_full_coverage_for_any_density() {
        for density in [0.5, 1.0, 3.0, 17.0] {
            let g = DotGridUniforms { density, ..dots() };
            let center = Vec2::splat(0.5 / density);
            assert_eq!(g.coverage(center), 1.0, "density={density}");
        }
    }

    #[test]
    fn dot_corner_is_background() {
        assert_eq!(dots().coverage(Vec2::ZERO), 0.0);
        assert_eq!(dots().coverage(Vec2::new(1.0, 1.0)), 0.0);
    }

    #[test]
    fn dot_grid_end_to_end_colors() {
        let g = dots();
        assert_eq!(g.shade(Vec2::new(0.5, 0.5)), Color::RED);
        assert_eq!(g.shade(Vec2::new(0.0, 0.0)), Color::BLACK);
    }

    #[test]
    fn dot_grid_handles_negative_uv() {
        let g = dots();
        assert_eq!(g.shade(Vec2::new(-0.5, -1.5)), Color::RED);
    }

    // ── seigaiha ──────────────────────────────────────────────────────────

    #[test]
    fn seigaiha_coverage_is_bounded_on_dense_grid() {
        let w = waves();
        let n = 200;
        for j in 0..n {
            for i in 0..n {
                let uv = Vec2::new(i as f32 / n as f32 * 2.0, j as f32 / n as f32 * 2.0);
                let s = w.sample(uv);
                assert!(s.coverage <= 1.0 + 1e-4, "uv={uv:?} coverage={}", s.coverage);
                assert!(s.coverage >= -1e-6);
            }
        }
    }

    #[test]
    fn seigaiha_rows_overlap_without_occlusion() {
        let w = waves();
        let uv = Vec2::new(0.07, 0.0175);
        let c = w.spacing() * 0.5;
        // Left half of the cell: only left neighbors contribute.
        let front = w.neighbors(uv, c.y - w.vertical_stagger, 1.0, 0.0);
        let own = w.circle(uv, c, 1.0);
        let back = w.neighbors(uv, c.y + w.vertical_stagger, 1.0, 0.0);

        let raw = front.coverage + own.coverage + back.coverage;
        assert!(raw > 2.9, "raw={raw}");
        assert!(w.sample(uv).coverage <= 1.0 + 1e-4);
    }

    #[test]
    fn seigaiha_cell_center_is_inner_color() {
        let w = waves();
        let c = w.shade(Vec2::new(0.5, 0.25));
        assert!(c.approx_eq(w.color_b, 1e-5), "{c:?}");
    }

    #[test]
    fn seigaiha_is_periodic() {
        let w = waves();
        for uv in [Vec2::new(0.13, 0.07), Vec2::new(0.71, 0.42), Vec2::new(0.5, 0.01)] {
            let a = w.shade(uv);
            let b = w.shade(uv + Vec2::new(1.0, 0.5) * 3.0);
            assert!(a.approx_eq(b, 1e-3), "uv={uv:?} {a:?} vs {b:?}");
        }
    }

    #[test]
    fn seigaiha_output_is_opaque() {
        let w = waves();
        assert_eq!(w.shade(Vec2::new(0.9, 0.9)).a, 1.0);
    }
}
