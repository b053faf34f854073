//! Orbit camera for the slice viewport.

use glam::{Mat4, Vec3};

/// A perspective turntable camera orbiting a target point.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera position.
    pub position: Vec3,
    /// Orbit target.
    pub target: Vec3,
    /// Up vector.
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    /// Aspect ratio (width / height).
    pub aspect_ratio: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// Position and target restored by [`Camera::reset`].
    home: (Vec3, Vec3),
}

impl Camera {
    /// Creates a new camera with default settings.
    #[must_use]
    pub fn new(aspect_ratio: f32) -> Self {
        let position = Vec3::new(12.0, 9.0, 12.0);
        Self {
            position,
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: std::f32::consts::FRAC_PI_4, // 45 degrees
            aspect_ratio,
            near: 0.01,
            far: 1000.0,
            home: (position, Vec3::ZERO),
        }
    }

    /// Sets the aspect ratio.
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }

    /// Returns the view matrix.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Returns the projection matrix.
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect_ratio, self.near, self.far)
    }

    /// Returns the combined view-projection matrix.
    #[must_use]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Returns the camera's forward direction.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize()
    }

    /// Returns the camera's right direction.
    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.forward().cross(self.up).normalize()
    }

    /// Orbits the camera around the target.
    pub fn orbit(&mut self, delta_x: f32, delta_y: f32) {
        let radius = (self.position - self.target).length();
        let mut theta = (self.position.x - self.target.x).atan2(self.position.z - self.target.z);
        let mut phi = ((self.position.y - self.target.y) / radius).acos();

        theta -= delta_x;
        phi = (phi - delta_y).clamp(0.01, std::f32::consts::PI - 0.01);

        self.position = self.target
            + Vec3::new(
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
                radius * phi.sin() * theta.cos(),
            );
    }

    /// Pans the camera and its target together.
    pub fn pan(&mut self, delta_x: f32, delta_y: f32) {
        let offset = self.right() * delta_x + self.up * delta_y;
        self.position += offset;
        self.target += offset;
    }

    /// Moves the camera `delta` units toward the target, stopping short of it.
    pub fn zoom(&mut self, delta: f32) {
        let direction = self.forward();
        let distance = (self.position - self.target).length();
        let new_distance = (distance - delta).max(0.1);
        self.position = self.target - direction * new_distance;
    }

    /// Frames the given bounding box from a three-quarter view and makes it the home view.
    pub fn look_at_box(&mut self, min: Vec3, max: Vec3) {
        let center = (min + max) * 0.5;
        let size = (max - min).length().max(1e-3);

        self.target = center;
        self.position = center + Vec3::new(1.0, 0.75, 1.0).normalize() * size * 1.2;
        self.near = size * 0.001;
        self.far = size * 100.0;
        self.home = (self.position, self.target);
    }

    /// Returns to the home view.
    pub fn reset(&mut self) {
        (self.position, self.target) = self.home;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(16.0 / 9.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_defaults() {
        let camera = Camera::default();
        assert_eq!(camera.target, Vec3::ZERO);
        assert_eq!(camera.up, Vec3::Y);
    }

    #[test]
    fn test_projection_is_perspective() {
        let camera = Camera::new(1.0);
        let proj = camera.projection_matrix();
        // Perspective divide: w comes from -z, not a constant
        assert!(proj.w_axis.w.abs() < 1e-6);
        assert!((proj.z_axis.w + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_orbit_preserves_radius() {
        let mut camera = Camera::new(1.0);
        let r0 = camera.position.distance(camera.target);
        camera.orbit(0.7, -0.3);
        let r1 = camera.position.distance(camera.target);
        assert!((r0 - r1).abs() < 1e-3);
    }

    #[test]
    fn test_pan_moves_target() {
        let mut camera = Camera::new(1.0);
        let offset = camera.position - camera.target;
        camera.pan(1.0, 2.0);
        assert!(camera.target != Vec3::ZERO);
        assert!((camera.position - camera.target).abs_diff_eq(offset, 1e-4));
    }

    #[test]
    fn test_zoom_perspective() {
        let mut camera = Camera::new(1.0);
        camera.position = Vec3::new(0.0, 0.0, 5.0);
        camera.target = Vec3::ZERO;
        camera.zoom(1.0);
        assert!(camera.position.distance(camera.target) < 5.0);
        camera.zoom(100.0);
        assert!(camera.position.distance(camera.target) >= 0.1 - 1e-6);
    }

    #[test]
    fn test_look_at_box_and_reset() {
        let mut camera = Camera::new(1.0);
        camera.look_at_box(Vec3::splat(-5.0), Vec3::splat(5.0));
        assert_eq!(camera.target, Vec3::ZERO);
        let home = camera.position;
        camera.orbit(1.0, 0.5);
        camera.pan(3.0, 0.0);
        camera.reset();
        assert_eq!(camera.position, home);
        assert_eq!(camera.target, Vec3::ZERO);
    }
}
