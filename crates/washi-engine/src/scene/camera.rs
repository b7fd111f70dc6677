use glam::{Mat4, Vec3};

/// Perspective camera.
///
/// The projection matrix is cached; [`Camera::set_aspect`] is the resize path
/// and rebuilds it.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,

    fov_y: f32,
    aspect: f32,
    near: f32,
    far: f32,
    projection: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        Self::perspective(45.0, 16.0 / 9.0, 0.1, 100.0).looking_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO)
    }
}

impl Camera {
    pub fn perspective(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        let fov_y = fov_y_degrees.to_radians();
        let aspect = sanitize_aspect(aspect).unwrap_or(1.0);
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y,
            aspect,
            near,
            far,
            projection: Mat4::perspective_rh(fov_y, aspect, near, far),
        }
    }

    pub fn looking_at(mut self, position: Vec3, target: Vec3) -> Self {
        self.position = position;
        self.target = target;
        self
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn fov_y(&self) -> f32 {
        self.fov_y
    }

    /// Updates the aspect ratio and the cached projection.
    ///
    /// Degenerate ratios (zero, negative, NaN) from a minimized window are ignored.
    pub fn set_aspect(&mut self, aspect: f32) {
        let Some(aspect) = sanitize_aspect(aspect) else {
            log::trace!("camera: ignoring degenerate aspect {aspect}");
            return;
        };
        self.aspect = aspect;
        self.projection = Mat4::perspective_rh(self.fov_y, aspect, self.near, self.far);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }

    /// Rotates the eye around `target` by `yaw` (about `up`) and `pitch` radians.
    ///
    /// Pitch is limited so the eye never crosses the poles.
    pub fn orbit(&mut self, yaw: f32, pitch: f32) {
        let offset = self.position - self.target;
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return;
        }

        let current_pitch = (offset.y / radius).clamp(-1.0, 1.0).asin();
        let current_yaw = offset.x.atan2(offset.z);

        let limit = std::f32::consts::FRAC_PI_2 - 0.05;
        let new_pitch = (current_pitch + pitch).clamp(-limit, limit);
        let new_yaw = current_yaw + yaw;

        let dir = Vec3::new(
            new_pitch.cos() * new_yaw.sin(),
            new_pitch.sin(),
            new_pitch.cos() * new_yaw.cos(),
        );
        self.position = self.target + dir * radius;
    }
}

fn sanitize_aspect(aspect: f32) -> Option<f32> {
    (aspect.is_finite() && aspect > 0.0).then_some(aspect)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_aspect_rebuilds_projection() {
        let mut cam = Camera::perspective(60.0, 1.0, 0.1, 10.0);
        let before = cam.projection_matrix();
        cam.set_aspect(2.0);
        assert_eq!(cam.aspect(), 2.0);
        assert_ne!(cam.projection_matrix(), before);
        assert_eq!(
            cam.projection_matrix(),
            Mat4::perspective_rh(60f32.to_radians(), 2.0, 0.1, 10.0)
        );
    }

    #[test]
    fn degenerate_aspect_is_ignored() {
        let mut cam = Camera::perspective(60.0, 1.5, 0.1, 10.0);
        cam.set_aspect(0.0);
        cam.set_aspect(f32::NAN);
        assert_eq!(cam.aspect(), 1.5);
    }

    #[test]
    fn orbit_keeps_distance_to_target() {
        let mut cam = Camera::default().looking_at(Vec3::new(0.0, 0.0, 4.0), Vec3::ZERO);
        cam.orbit(0.7, 0.3);
        assert!((cam.position.length() - 4.0).abs() < 1e-4);
        assert!(cam.position.y > 0.0);
    }

    #[test]
    fn orbit_pitch_is_clamped() {
        let mut cam = Camera::default();
        cam.orbit(0.0, 10.0);
        let dir = (cam.position - cam.target).normalize();
        assert!(dir.y < 1.0);
    }
}
