/// Viewport size in logical pixels plus the display's pixel density.
///
/// The lifecycle manager sizes each new render surface from this, and resize
/// events carry a fresh value.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    /// Physical pixels per logical pixel.
    pub pixel_ratio: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32, pixel_ratio: f32) -> Self {
        Self { width, height, pixel_ratio }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0
            && self.height > 0.0
            && self.pixel_ratio > 0.0
            && self.width.is_finite()
            && self.height.is_finite()
    }

    /// Width over height; `1.0` for a degenerate (minimized) viewport.
    #[inline]
    pub fn aspect(self) -> f32 {
        if self.width > 0.0 && self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    /// Drawable size in physical pixels, rounded, never below 1×1.
    #[inline]
    pub fn physical_size(self) -> (u32, u32) {
        let w = (self.width * self.pixel_ratio).round().max(1.0) as u32;
        let h = (self.height * self.pixel_ratio).round().max(1.0) as u32;
        (w, h)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn physical_size_applies_pixel_ratio() {
        assert_eq!(Viewport::new(800.0, 600.0, 2.0).physical_size(), (1600, 1200));
    }

    #[test]
    fn physical_size_never_zero() {
        assert_eq!(Viewport::new(0.0, 0.0, 1.0).physical_size(), (1, 1));
    }

    #[test]
    fn aspect_of_minimized_viewport_is_one() {
        assert_eq!(Viewport::new(0.0, 300.0, 1.0).aspect(), 1.0);
        assert!(!Viewport::new(0.0, 300.0, 1.0).is_valid());
    }
}
