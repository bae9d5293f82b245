//! Orbit camera looking at the sphere center.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// Uniform buffer contents for the sphere shader.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

/// A camera on a horizontal circle around the origin, always facing it.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    /// Distance from the origin.
    pub radius: f32,
    /// Position on the orbit in radians; 0 lies on +X, π/2 on +Z.
    pub angle: f32,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Width / height.
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            radius: 1.0,
            angle: 0.0,
            fov_y: 45f32.to_radians(),
            aspect_ratio: 16.0 / 9.0,
            near: 0.01,
            far: 100.0,
        }
    }
}

impl OrbitCamera {
    pub fn new(radius: f32, fov_y_degrees: f32) -> Self {
        Self {
            radius,
            fov_y: fov_y_degrees.to_radians(),
            ..Self::default()
        }
    }

    /// Eye position for the current angle.
    pub fn eye(&self) -> Vec3 {
        orbit_position(self.angle, self.radius)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), Vec3::ZERO, Vec3::Y)
    }

    /// Perspective projection with reverse-Z (near and far swapped).
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, self.far, self.near)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn set_aspect_ratio(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect_ratio = width / height;
        }
    }

    pub fn to_uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_projection_matrix().to_cols_array_2d(),
        }
    }
}

/// Point on the horizontal orbit of `radius` at `angle` radians.
pub fn orbit_position(angle: f32, radius: f32) -> Vec3 {
    Vec3::new(radius * angle.cos(), 0.0, radius * angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;
    use std::f32::consts::FRAC_PI_2;

    fn ndc(m: Mat4, p: Vec3) -> Vec3 {
        let clip = m * Vec4::new(p.x, p.y, p.z, 1.0);
        clip.truncate() / clip.w
    }

    #[test]
    fn test_camera_uniform_size() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 64);
    }

    #[test]
    fn test_orbit_position_quadrants() {
        assert!((orbit_position(0.0, 2.0) - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-6);
        assert!((orbit_position(FRAC_PI_2, 2.0) - Vec3::new(0.0, 0.0, 2.0)).length() < 1e-6);
    }

    #[test]
    fn test_eye_stays_on_orbit() {
        let mut camera = OrbitCamera::new(1.0, 45.0);
        for i in 0..16 {
            camera.angle = i as f32 * 0.4;
            assert!((camera.eye().length() - 1.0).abs() < 1e-5);
            assert_eq!(camera.eye().y, 0.0);
        }
    }

    #[test]
    fn test_origin_projects_to_screen_center() {
        let camera = OrbitCamera {
            angle: 1.3,
            ..OrbitCamera::default()
        };
        let p = ndc(camera.view_projection_matrix(), Vec3::ZERO);
        assert!(p.x.abs() < 1e-5 && p.y.abs() < 1e-5);
    }

    #[test]
    fn test_reverse_z_depth_range() {
        let camera = OrbitCamera::default();
        let proj = camera.projection_matrix();
        let near = ndc(proj, Vec3::new(0.0, 0.0, -camera.near));
        let far = ndc(proj, Vec3::new(0.0, 0.0, -camera.far));
        assert!((near.z - 1.0).abs() < 1e-4, "near z = {}", near.z);
        assert!(far.z.abs() < 1e-4, "far z = {}", far.z);
    }

    #[test]
    fn test_sphere_wall_inside_frustum() {
        // Looking through the origin from r = 1, the far wall of a radius-10
        // sphere is 11 units away.
        let camera = OrbitCamera::default();
        let wall = -camera.eye().normalize() * 10.0;
        let p = ndc(camera.view_projection_matrix(), wall);
        assert!(p.z > 0.0 && p.z < 1.0, "wall depth {}", p.z);
    }

    #[test]
    fn test_aspect_ratio_ignores_zero_height() {
        let mut camera = OrbitCamera::default();
        camera.set_aspect_ratio(1920.0, 1080.0);
        assert!((camera.aspect_ratio - 16.0 / 9.0).abs() < 1e-6);
        camera.set_aspect_ratio(800.0, 0.0);
        assert!((camera.aspect_ratio - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_default_fov_is_45_degrees() {
        let camera = OrbitCamera::default();
        assert!((camera.fov_y - std::f32::consts::FRAC_PI_4).abs() < 1e-6);
    }
}
