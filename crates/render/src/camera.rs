use glam::{Mat4, Vec3, Vec4};

const MAX_PITCH: f32 = 89.0_f32 * std::f32::consts::PI / 180.0;

/// Look-at camera orbiting a target point.
///
/// Matrices are cached. Moving the camera has no effect on [`Self::view_matrix`]
/// until [`Self::update`] runs, and aspect or lens changes need
/// [`Self::update_projection_matrix`].
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub sensitivity: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    view_matrix: Mat4,
    projection_matrix: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO)
    }
}

impl Camera {
    pub fn new(position: Vec3, target: Vec3) -> Self {
        let mut camera = Self {
            position,
            target,
            up: Vec3::Y,
            fov_y: 45.0_f32.to_radians(),
            aspect: 1.0,
            near: 0.1,
            far: 1000.0,
            sensitivity: 0.005,
            min_distance: 1.5,
            max_distance: 100.0,
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
        };
        camera.update();
        camera.update_projection_matrix();
        camera
    }

    /// Recompute the view matrix from position, target and up.
    pub fn update(&mut self) {
        self.view_matrix = Mat4::look_at_rh(self.position, self.target, self.up);
    }

    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Recompute the projection matrix from aspect ratio, field of view and clip planes.
    pub fn update_projection_matrix(&mut self) {
        self.projection_matrix = Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far);
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.view_matrix
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix
    }

    /// Third row of the view matrix: the camera's view-space Z axis in world
    /// coordinates, with w = 0. Right-handed, so it points from the target
    /// back toward the eye.
    pub fn forward(&self) -> Vec4 {
        let v = self.view_matrix;
        Vec4::new(v.x_axis.z, v.y_axis.z, v.z_axis.z, 0.0)
    }

    /// Rotate the eye around the target by a pointer delta in pixels.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        let offset = self.position - self.target;
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return;
        }
        let yaw = offset.x.atan2(offset.z) - dx * self.sensitivity;
        let pitch = ((offset.y / radius).clamp(-1.0, 1.0).asin() + dy * self.sensitivity)
            .clamp(-MAX_PITCH, MAX_PITCH);
        self.position = self.target
            + radius * Vec3::new(pitch.cos() * yaw.sin(), pitch.sin(), pitch.cos() * yaw.cos());
    }

    /// Move the eye toward (positive) or away from (negative) the target.
    pub fn zoom(&mut self, amount: f32) {
        let offset = self.position - self.target;
        let direction = offset.try_normalize().unwrap_or(Vec3::Z);
        let distance =
            (offset.length() * (1.0 - amount * 0.1)).clamp(self.min_distance, self.max_distance);
        self.position = self.target + direction * distance;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn default_camera() {
        let cam = Camera::default();
        assert_eq!(cam.position, Vec3::new(0.0, 0.0, 5.0));
        let vp = cam.view_projection();
        assert!(vp.is_finite());
    }

    #[test]
    fn forward_is_view_z_axis() {
        let cam = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        assert!(cam.forward().abs_diff_eq(Vec4::new(0.0, 0.0, 1.0, 0.0), EPS));

        let cam = Camera::new(Vec3::new(3.0, 0.0, 0.0), Vec3::ZERO);
        assert!(cam.forward().abs_diff_eq(Vec4::new(1.0, 0.0, 0.0, 0.0), EPS));
    }

    #[test]
    fn view_changes_only_on_update() {
        let mut cam = Camera::default();
        let before = cam.view_matrix();
        cam.position = Vec3::new(5.0, 0.0, 0.0);
        assert_eq!(cam.view_matrix(), before);
        cam.update();
        assert_ne!(cam.view_matrix(), before);
    }

    #[test]
    fn projection_tracks_aspect() {
        let mut cam = Camera::default();
        cam.set_aspect_ratio(2.0);
        cam.update_projection_matrix();
        let p = cam.projection_matrix();
        // x scale is y scale divided by aspect
        assert!((p.x_axis.x * 2.0 - p.y_axis.y).abs() < EPS);
    }

    #[test]
    fn orbit_keeps_distance() {
        let mut cam = Camera::default();
        cam.orbit(120.0, -40.0);
        assert!((cam.position.distance(cam.target) - 5.0).abs() < 1e-4);
        assert_ne!(cam.position, Vec3::new(0.0, 0.0, 5.0));
    }

    #[test]
    fn orbit_pitch_is_clamped() {
        let mut cam = Camera::default();
        cam.orbit(0.0, 1.0e6);
        cam.update();
        assert!(cam.view_matrix().is_finite());
        assert!(cam.position.y < 5.0);
    }

    #[test]
    fn zoom_respects_limits() {
        let mut cam = Camera::default();
        cam.zoom(100.0);
        assert!((cam.position.distance(cam.target) - cam.min_distance).abs() < EPS);
        cam.zoom(-1.0e4);
        assert!((cam.position.distance(cam.target) - cam.max_distance).abs() < 1e-3);
    }
}
