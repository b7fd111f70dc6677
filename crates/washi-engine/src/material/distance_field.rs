//! Multi-channel signed distance field (MSDF) coverage.
//!
//! A layer image stores, per channel, a distance whose 0.5 level traces the
//! shape edge. The median of the three channels reconstructs the distance with
//! sharp corners intact; dividing by its screen-space derivative gives an
//! anti-aliasing band one pixel wide at any zoom.

use glam::Vec2;

use super::Fragment;
use crate::asset::ImageHandle;
use crate::paint::Color;

/// Lower bound for the derivative, so a flat field does not divide by zero.
pub const MIN_FWIDTH: f32 = 1.0e-4;

/// One MSDF texture placed on a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceFieldLayer {
    pub image: ImageHandle,
    /// Size of the rectangle, in surface UV units, the whole image maps onto.
    /// The rectangle is centered on the surface's UV origin.
    pub footprint: Vec2,
}

#[inline]
pub fn median3(r: f32, g: f32, b: f32) -> f32 {
    r.min(g).max(r.max(g).min(b))
}

/// Maps centered surface UV into the layer's `[0, 1]` image space.
#[inline]
pub fn remap_uv(uv: Vec2, footprint: Vec2) -> Vec2 {
    (uv + footprint * 0.5) / footprint
}

/// Median distance minus one half; positive inside the shape.
pub fn signed_distance(image: &ImageHandle, uv: Vec2, footprint: Vec2) -> f32 {
    let [r, g, b, _] = image.sample(remap_uv(uv, footprint));
    median3(r, g, b) - 0.5
}

/// Converts a signed distance and its screen-space width into `[0, 1]` alpha.
#[inline]
pub fn coverage_alpha(sd: f32, fwidth: f32) -> f32 {
    (sd / fwidth.max(MIN_FWIDTH) + 0.5).clamp(0.0, 1.0)
}

/// CPU `fwidth` by forward differences along the fragment's UV derivatives.
fn fwidth(f: impl Fn(Vec2) -> f32, frag: &Fragment) -> (f32, f32) {
    let v = f(frag.uv);
    let dx = f(frag.uv + frag.duv_dx) - v;
    let dy = f(frag.uv + frag.duv_dy) - v;
    (v, dx.abs() + dy.abs())
}

fn layer_alpha(image: &ImageHandle, footprint: Vec2, frag: &Fragment) -> f32 {
    let (sd, w) = fwidth(|uv| signed_distance(image, uv, footprint), frag);
    coverage_alpha(sd, w)
}

#[inline]
fn tinted(tint: Color, alpha: f32) -> Color {
    Color::from_premul(tint.r * alpha, tint.g * alpha, tint.b * alpha, alpha)
}

#[derive(Debug, Clone, PartialEq)]
pub struct DistanceFieldUniforms {
    pub layer: DistanceFieldLayer,
    /// Opaque tint; only its rgb is used.
    pub tint: Color,
}

impl DistanceFieldUniforms {
    pub fn alpha(&self, frag: &Fragment) -> f32 {
        layer_alpha(&self.layer.image, self.layer.footprint, frag)
    }

    pub fn shade(&self, frag: &Fragment) -> Color {
        tinted(self.tint, self.alpha(frag))
    }
}

/// Three MSDF layers sharing one footprint (two art layers and an icon).
///
/// Layers are stencils: the strongest one wins at each pixel. Overlapping
/// layers lose the weaker one's shape silently.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactCardUniforms {
    pub layers: [ImageHandle; 3],
    pub footprint: Vec2,
    pub tint: Color,
}

impl ContactCardUniforms {
    pub fn layer_alphas(&self, frag: &Fragment) -> [f32; 3] {
        self.layers.each_ref().map(|img| layer_alpha(img, self.footprint, frag))
    }

    pub fn alpha(&self, frag: &Fragment) -> f32 {
        let [a0, a1, a2] = self.layer_alphas(frag);
        a0.max(a1).max(a2)
    }

    pub fn shade(&self, frag: &Fragment) -> Color {
        tinted(self.tint, self.alpha(frag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::ImageData;

    /// Horizontal ramp: distance 0 at the left edge, 1 at the right.
    fn ramp() -> ImageHandle {
        let w = 64;
        let data = ImageData::from_fn(w, 4, |x, _| {
            let v = ((x as f32 + 0.5) / w as f32 * 255.0).round() as u8;
            [v, v, v, 255]
        });
        ImageHandle::ready("ramp", data)
    }

    fn solid(v: u8) -> ImageHandle {
        ImageHandle::ready("solid", ImageData::from_fn(2, 2, |_, _| [v, v, v, 255]))
    }

    fn empty() -> ImageHandle {
        solid(0)
    }

    fn frag(uv: Vec2) -> Fragment {
        Fragment::new(uv, Vec2::new(1.0 / 256.0, 0.0), Vec2::new(0.0, 1.0 / 256.0))
    }

    // ── scalar helpers ────────────────────────────────────────────────────

    #[test]
    fn median_of_three() {
        assert_eq!(median3(0.1, 0.9, 0.5), 0.5);
        assert_eq!(median3(0.9, 0.1, 0.5), 0.5);
        assert_eq!(median3(0.5, 0.5, 0.0), 0.5);
        // A single stray channel does not move the result.
        assert_eq!(median3(1.0, 0.2, 0.2), 0.2);
    }

    #[test]
    fn remap_centers_footprint() {
        let fp = Vec2::new(2.0, 4.0);
        assert_eq!(remap_uv(Vec2::ZERO, fp), Vec2::splat(0.5));
        assert_eq!(remap_uv(Vec2::new(-1.0, -2.0), fp), Vec2::ZERO);
        assert_eq!(remap_uv(Vec2::new(1.0, 2.0), fp), Vec2::ONE);
    }

    #[test]
    fn alpha_is_monotonic_in_signed_distance() {
        let mut prev = -1.0;
        for i in -50..=50 {
            let a = coverage_alpha(i as f32 / 100.0, 0.05);
            assert!(a >= prev);
            assert!((0.0..=1.0).contains(&a));
            prev = a;
        }
        assert_eq!(coverage_alpha(-0.5, 0.05), 0.0);
        assert_eq!(coverage_alpha(0.5, 0.05), 1.0);
        assert_eq!(coverage_alpha(0.0, 0.05), 0.5);
    }

    #[test]
    fn flat_field_does_not_divide_by_zero() {
        assert_eq!(coverage_alpha(0.2, 0.0), 1.0);
        assert_eq!(coverage_alpha(-0.2, 0.0), 0.0);
    }

    // ── single layer ──────────────────────────────────────────────────────

    #[test]
    fn ramp_edge_is_antialiased() {
        let u = DistanceFieldUniforms {
            layer: DistanceFieldLayer { image: ramp(), footprint: Vec2::ONE },
            tint: Color::WHITE,
        };
        let left = u.alpha(&frag(Vec2::new(-0.4, 0.0)));
        let mid = u.alpha(&frag(Vec2::ZERO));
        let right = u.alpha(&frag(Vec2::new(0.4, 0.0)));
        assert_eq!(left, 0.0);
        assert_eq!(right, 1.0);
        assert!(mid > 0.0 && mid < 1.0, "mid={mid}");
    }

    #[test]
    fn output_is_premultiplied_tint() {
        let u = DistanceFieldUniforms {
            layer: DistanceFieldLayer { image: solid(255), footprint: Vec2::ONE },
            tint: Color::from_premul(0.2, 0.4, 0.6, 1.0),
        };
        let c = u.shade(&frag(Vec2::ZERO));
        assert!(c.approx_eq(Color::from_premul(0.2, 0.4, 0.6, 1.0), 1e-6));
    }

    // ── contact card ──────────────────────────────────────────────────────

    #[test]
    fn card_alpha_is_max_of_layers() {
        let f = frag(Vec2::ZERO);
        for on in 0..3 {
            let mut layers = [empty(), empty(), empty()];
            layers[on] = solid(255);
            let card = ContactCardUniforms { layers, footprint: Vec2::ONE, tint: Color::WHITE };
            let alphas = card.layer_alphas(&f);
            assert_eq!(alphas[on], 1.0);
            assert_eq!(card.alpha(&f), 1.0, "layer {on}");
        }
    }

    #[test]
    fn card_single_layer_matches_single_compositor() {
        let image = ramp();
        let single = DistanceFieldUniforms {
            layer: DistanceFieldLayer { image: image.clone(), footprint: Vec2::ONE },
            tint: Color::WHITE,
        };
        let card = ContactCardUniforms {
            layers: [empty(), image, empty()],
            footprint: Vec2::ONE,
            tint: Color::WHITE,
        };
        for x in [-0.3, -0.01, 0.0, 0.02, 0.3] {
            let f = frag(Vec2::new(x, 0.1));
            assert_eq!(card.alpha(&f), single.alpha(&f), "x={x}");
        }
    }

    #[test]
    fn all_layers_off_is_transparent() {
        let card = ContactCardUniforms {
            layers: [empty(), empty(), empty()],
            footprint: Vec2::ONE,
            tint: Color::WHITE,
        };
        assert_eq!(card.shade(&frag(Vec2::ZERO)), Color::TRANSPARENT);
    }
}
