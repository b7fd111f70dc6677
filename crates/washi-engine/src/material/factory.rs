use glam::Vec2;

use super::error::{non_negative, positive, MaterialError};
use super::{
    ClipPlane, ContactCardUniforms, DistanceFieldLayer, DistanceFieldUniforms, DotGridUniforms,
    Material, MaterialKind, MaterialOptions, RenderSide, SeigaihaUniforms, MAX_CLIP_PLANES,
};
use crate::paint::Color;

pub const DOT_GRID_DEFAULT_RADIUS: f32 = 0.25;
pub const DOT_GRID_DEFAULT_DENSITY: f32 = 10.0;
/// Vermilion dots.
pub const DOT_GRID_DEFAULT_COLOR_A: Color = Color::from_premul(0.89, 0.26, 0.20, 1.0);
/// Paper background.
pub const DOT_GRID_DEFAULT_COLOR_B: Color = Color::from_premul(0.96, 0.94, 0.88, 1.0);

pub const SEIGAIHA_DEFAULT_OUTER_RADIUS: f32 = 0.5;
pub const SEIGAIHA_DEFAULT_VERTICAL_SPACING: f32 = 0.5;
pub const SEIGAIHA_DEFAULT_HORIZONTAL_SPACING: f32 = 1.0;
pub const SEIGAIHA_DEFAULT_VERTICAL_STAGGER: f32 = 0.25;
/// Indigo outer band.
pub const SEIGAIHA_DEFAULT_COLOR_A: Color = Color::from_premul(0.11, 0.21, 0.34, 1.0);
/// Pale inner band.
pub const SEIGAIHA_DEFAULT_COLOR_B: Color = Color::from_premul(0.66, 0.85, 0.86, 1.0);

pub const DISTANCE_FIELD_DEFAULT_FOOTPRINT: Vec2 = Vec2::ONE;
/// Sumi ink.
pub const DISTANCE_FIELD_DEFAULT_TINT: Color = Color::from_premul(0.08, 0.08, 0.10, 1.0);

/// Layer count of the contact-card compositor.
pub const CONTACT_CARD_LAYERS: usize = 3;

/// Turns options into a ready-to-render material.
///
/// Implemented for every `Fn(&MaterialOptions) -> Result<Material, MaterialError>`,
/// so the named factories below and ad-hoc closures are interchangeable.
pub trait MaterialFactory {
    fn create(&self, options: &MaterialOptions) -> Result<Material, MaterialError>;

    /// Creates with all defaults.
    fn create_default(&self) -> Result<Material, MaterialError> {
        self.create(&MaterialOptions::default())
    }
}

impl<F> MaterialFactory for F
where
    F: Fn(&MaterialOptions) -> Result<Material, MaterialError>,
{
    fn create(&self, options: &MaterialOptions) -> Result<Material, MaterialError> {
        self(options)
    }
}

/// A factory with some options fixed. See [`bind`].
#[derive(Debug, Clone)]
pub struct BoundFactory<F> {
    factory: F,
    bound: MaterialOptions,
}

impl<F> BoundFactory<F> {
    pub fn bound_options(&self) -> &MaterialOptions {
        &self.bound
    }
}

impl<F: MaterialFactory> MaterialFactory for BoundFactory<F> {
    fn create(&self, overrides: &MaterialOptions) -> Result<Material, MaterialError> {
        self.factory.create(&self.bound.merged(overrides))
    }
}

/// Partially applies `factory`: the returned factory merges each call's
/// options over `bound`, the call's fields winning.
pub fn bind<F: MaterialFactory>(factory: F, bound: MaterialOptions) -> BoundFactory<F> {
    BoundFactory { factory, bound }
}

/// Render state shared by every factory.
fn render_state(options: &MaterialOptions) -> Result<(RenderSide, Vec<ClipPlane>), MaterialError> {
    let planes = options.clipping_planes.clone().unwrap_or_default();
    check_clipping_planes(&planes)?;
    Ok((options.side.unwrap_or_default(), planes))
}

pub(crate) fn check_clipping_planes(planes: &[ClipPlane]) -> Result<(), MaterialError> {
    if planes.len() > MAX_CLIP_PLANES {
        return Err(MaterialError::TooManyClipPlanes { count: planes.len(), max: MAX_CLIP_PLANES });
    }
    if planes.iter().any(|p| !p.normal.is_finite() || !p.constant.is_finite()) {
        return Err(MaterialError::NonFinite { field: "clipping_planes" });
    }
    Ok(())
}

fn footprint(options: &MaterialOptions) -> Result<Vec2, MaterialError> {
    let fp = options.footprint.unwrap_or(DISTANCE_FIELD_DEFAULT_FOOTPRINT);
    Ok(Vec2::new(positive("footprint.width", fp.x)?, positive("footprint.height", fp.y)?))
}

/// Soft dots on a square grid.
pub fn dot_grid(options: &MaterialOptions) -> Result<Material, MaterialError> {
    let (side, planes) = render_state(options)?;
    let uniforms = DotGridUniforms {
        radius: positive("radius", options.radius.unwrap_or(DOT_GRID_DEFAULT_RADIUS))?,
        density: positive("density", options.density.unwrap_or(DOT_GRID_DEFAULT_DENSITY))?,
        color_a: options.color_a.unwrap_or(DOT_GRID_DEFAULT_COLOR_A),
        color_b: options.color_b.unwrap_or(DOT_GRID_DEFAULT_COLOR_B),
    };
    Ok(Material::new(MaterialKind::DotGrid(uniforms), side, planes))
}

/// Overlapping concentric wave circles in a staggered tile.
pub fn seigaiha(options: &MaterialOptions) -> Result<Material, MaterialError> {
    let (side, planes) = render_state(options)?;
    let uniforms = SeigaihaUniforms {
        outer_radius: positive(
            "outer_radius",
            options.outer_radius.unwrap_or(SEIGAIHA_DEFAULT_OUTER_RADIUS),
        )?,
        vertical_spacing: positive(
            "vertical_spacing",
            options.vertical_spacing.unwrap_or(SEIGAIHA_DEFAULT_VERTICAL_SPACING),
        )?,
        horizontal_spacing: positive(
            "horizontal_spacing",
            options.horizontal_spacing.unwrap_or(SEIGAIHA_DEFAULT_HORIZONTAL_SPACING),
        )?,
        vertical_stagger: non_negative(
            "vertical_stagger",
            options.vertical_stagger.unwrap_or(SEIGAIHA_DEFAULT_VERTICAL_STAGGER),
        )?,
        color_a: options.color_a.unwrap_or(SEIGAIHA_DEFAULT_COLOR_A),
        color_b: options.color_b.unwrap_or(SEIGAIHA_DEFAULT_COLOR_B),
    };
    Ok(Material::new(MaterialKind::Seigaiha(uniforms), side, planes))
}

/// One MSDF layer, tinted. Requires exactly one entry in `layers`.
///
/// The image may still be loading; the material renders transparent until it
/// resolves.
pub fn distance_field(options: &MaterialOptions) -> Result<Material, MaterialError> {
    let (side, planes) = render_state(options)?;
    let layers = options.layers.as_deref().unwrap_or_default();
    let [image] = layers else {
        return Err(MaterialError::LayerCount { expected: 1, found: layers.len() });
    };
    let uniforms = DistanceFieldUniforms {
        layer: DistanceFieldLayer { image: image.clone(), footprint: footprint(options)? },
        tint: options.tint.unwrap_or(DISTANCE_FIELD_DEFAULT_TINT),
    };
    Ok(Material::new(MaterialKind::DistanceField(uniforms), side, planes))
}

/// Three MSDF layers (two art layers then an icon) sharing one footprint.
pub fn contact_card(options: &MaterialOptions) -> Result<Material, MaterialError> {
    let (side, planes) = render_state(options)?;
    let layers = options.layers.as_deref().unwrap_or_default();
    let [art0, art1, icon] = layers else {
        return Err(MaterialError::LayerCount {
            expected: CONTACT_CARD_LAYERS,
            found: layers.len(),
        });
    };
    let uniforms = ContactCardUniforms {
        layers: [art0.clone(), art1.clone(), icon.clone()],
        footprint: footprint(options)?,
        tint: options.tint.unwrap_or(DISTANCE_FIELD_DEFAULT_TINT),
    };
    Ok(Material::new(MaterialKind::ContactCard(uniforms), side, planes))
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::asset::ImageHandle;
    use crate::material::Fragment;

    fn pixel() -> ImageHandle {
        ImageHandle::from_rgba8("px", 1, 1, vec![255, 255, 255, 255]).unwrap()
    }

    fn dot_uniforms(m: &Material) -> DotGridUniforms {
        match m.kind() {
            MaterialKind::DotGrid(u) => *u,
            other => panic!("expected dot grid, got {other:?}"),
        }
    }

    fn seigaiha_uniforms(m: &Material) -> SeigaihaUniforms {
        match m.kind() {
            MaterialKind::Seigaiha(u) => *u,
            other => panic!("expected seigaiha, got {other:?}"),
        }
    }

    // ── defaults ──────────────────────────────────────────────────────────

    #[test]
    fn dot_grid_defaults() {
        let m = dot_grid(&MaterialOptions::default()).unwrap();
        let u = dot_uniforms(&m);
        assert_eq!(u.color_a, DOT_GRID_DEFAULT_COLOR_A);
        assert_eq!(u.color_b, DOT_GRID_DEFAULT_COLOR_B);
        assert_eq!(u.radius, DOT_GRID_DEFAULT_RADIUS);
        assert_eq!(u.density, DOT_GRID_DEFAULT_DENSITY);
        assert_eq!(m.side(), RenderSide::Front);
        assert!(m.clipping_planes().is_empty());
    }

    #[test]
    fn seigaiha_defaults() {
        let u = seigaiha_uniforms(&seigaiha.create_default().unwrap());
        assert_eq!(u.color_a, SEIGAIHA_DEFAULT_COLOR_A);
        assert_eq!(u.outer_radius, SEIGAIHA_DEFAULT_OUTER_RADIUS);
        assert_eq!(u.vertical_spacing, SEIGAIHA_DEFAULT_VERTICAL_SPACING);
        assert_eq!(u.horizontal_spacing, SEIGAIHA_DEFAULT_HORIZONTAL_SPACING);
        assert_eq!(u.vertical_stagger, SEIGAIHA_DEFAULT_VERTICAL_STAGGER);
    }

    #[test]
    fn provided_fields_are_kept() {
        let opts = MaterialOptions::new()
            .with_radius(0.4)
            .with_density(2.0)
            .with_color_a(Color::WHITE)
            .with_side(RenderSide::Both);
        let m = dot_grid(&opts).unwrap();
        let u = dot_uniforms(&m);
        assert_eq!(u.radius, 0.4);
        assert_eq!(u.density, 2.0);
        assert_eq!(u.color_a, Color::WHITE);
        assert_eq!(u.color_b, DOT_GRID_DEFAULT_COLOR_B);
        assert_eq!(m.side(), RenderSide::Both);
    }

    #[test]
    fn dot_grid_end_to_end() {
        let m = dot_grid(
            &MaterialOptions::new()
                .with_radius(0.5)
                .with_density(1.0)
                .with_colors(Color::RED, Color::BLACK),
        )
        .unwrap();
        assert_eq!(m.shade(&Fragment::at(Vec2::new(0.5, 0.5))), Color::RED);
        assert_eq!(m.shade(&Fragment::at(Vec2::new(0.0, 0.0))), Color::BLACK);
    }

    // ── validation ────────────────────────────────────────────────────────

    #[test]
    fn rejects_non_positive_spacing() {
        let err = seigaiha(&MaterialOptions::new().with_spacing(0.0, 0.5)).unwrap_err();
        assert_eq!(err, MaterialError::NonPositive { field: "horizontal_spacing", value: 0.0 });

        let err = seigaiha(&MaterialOptions::new().with_spacing(1.0, -1.0)).unwrap_err();
        assert_eq!(err, MaterialError::NonPositive { field: "vertical_spacing", value: -1.0 });
    }

    #[test]
    fn rejects_non_positive_outer_radius() {
        let err = seigaiha(&MaterialOptions::new().with_outer_radius(0.0)).unwrap_err();
        assert!(matches!(err, MaterialError::NonPositive { field: "outer_radius", .. }));
    }

    #[test]
    fn rejects_negative_stagger_but_allows_zero() {
        assert!(seigaiha(&MaterialOptions::new().with_vertical_stagger(0.0)).is_ok());
        let err = seigaiha(&MaterialOptions::new().with_vertical_stagger(-0.1)).unwrap_err();
        assert!(matches!(err, MaterialError::Negative { .. }));
    }

    #[test]
    fn rejects_nan() {
        let err = dot_grid(&MaterialOptions::new().with_density(f32::NAN)).unwrap_err();
        assert_eq!(err, MaterialError::NonFinite { field: "density" });
    }

    #[test]
    fn rejects_too_many_clip_planes() {
        let planes = vec![ClipPlane::new(Vec3::Y, 0.0); MAX_CLIP_PLANES + 1];
        let err = dot_grid(&MaterialOptions::new().with_clipping_planes(planes)).unwrap_err();
        assert_eq!(err, MaterialError::TooManyClipPlanes { count: 7, max: 6 });
    }

    #[test]
    fn distance_field_layer_counts() {
        let err = distance_field(&MaterialOptions::default()).unwrap_err();
        assert_eq!(err, MaterialError::LayerCount { expected: 1, found: 0 });

        let err = contact_card(&MaterialOptions::new().with_layers(vec![pixel(), pixel()]))
            .unwrap_err();
        assert_eq!(err, MaterialError::LayerCount { expected: 3, found: 2 });

        let ok = contact_card(&MaterialOptions::new().with_layers(vec![pixel(), pixel(), pixel()]));
        assert!(ok.is_ok());
    }

    #[test]
    fn rejects_degenerate_footprint() {
        let opts = MaterialOptions::new().with_layers(vec![pixel()]).with_footprint(1.0, 0.0);
        let err = distance_field(&opts).unwrap_err();
        assert!(matches!(err, MaterialError::NonPositive { field: "footprint.height", .. }));
    }

    // ── composition ───────────────────────────────────────────────────────

    #[test]
    fn bind_leaves_unbound_fields_open() {
        let card = bind(
            contact_card,
            MaterialOptions::new()
                .with_layers(vec![pixel(), pixel(), pixel()])
                .with_footprint(2.0, 3.0),
        );
        let front = card.create(&MaterialOptions::new().with_side(RenderSide::Front)).unwrap();
        let back = card.create(&MaterialOptions::new().with_side(RenderSide::Back)).unwrap();
        assert_eq!(front.side(), RenderSide::Front);
        assert_eq!(back.side(), RenderSide::Back);
        match back.kind() {
            MaterialKind::ContactCard(u) => assert_eq!(u.footprint, Vec2::new(2.0, 3.0)),
            other => panic!("expected contact card, got {other:?}"),
        }
    }

    #[test]
    fn call_options_override_bound_ones() {
        let red = bind(dot_grid, MaterialOptions::new().with_color_a(Color::RED).with_radius(0.1));
        let m = red.create(&MaterialOptions::new().with_radius(0.3)).unwrap();
        let u = dot_uniforms(&m);
        assert_eq!(u.color_a, Color::RED);
        assert_eq!(u.radius, 0.3);
    }

    #[test]
    fn bind_composes() {
        let base = bind(dot_grid, MaterialOptions::new().with_density(3.0));
        let twice = bind(base, MaterialOptions::new().with_radius(0.2));
        let u = dot_uniforms(&twice.create_default().unwrap());
        assert_eq!((u.density, u.radius), (3.0, 0.2));
    }

    #[test]
    fn closures_are_factories() {
        let always_back = |o: &MaterialOptions| seigaiha(&o.clone().with_side(RenderSide::Back));
        let m = always_back.create_default().unwrap();
        assert_eq!(m.side(), RenderSide::Back);
    }

    #[test]
    fn pending_image_material_is_usable_and_transparent() {
        let loader = crate::asset::ImageLoader::new(std::env::temp_dir());
        let handle = loader.load("washi-missing-layer.png");
        let m = distance_field(&MaterialOptions::new().with_layers(vec![handle])).unwrap();
        assert_eq!(m.shade(&Fragment::at(Vec2::ZERO)), Color::TRANSPARENT);
    }
}
