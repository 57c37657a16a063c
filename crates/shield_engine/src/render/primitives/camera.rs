//! # 3D Camera System
//!
//! Perspective camera looking at the origin from a fixed standoff position.
//!
//! ## Design Principles
//! - **Backend-agnostic**: pure matrix math, no rasterizer dependencies
//! - **Explicit aspect updates**: only the surface manager changes the aspect ratio

use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3, Vec4};
use crate::settings::CameraConfig;

/// 3D Camera for perspective projection
///
/// # Coordinate System
/// Right-handed Y-up world and view space. `view_projection_matrix` also
/// applies the clip-space flip, so the resulting NDC has X right, Y down and
/// depth in `[0, 1]`, which maps directly onto framebuffer rows.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,

    /// Point the camera is looking at in world space
    pub target: Vec3,

    /// Up vector for camera orientation
    pub up: Vec3,

    /// Field of view angle in radians
    pub fov: f32,

    /// Aspect ratio (width / height)
    pub aspect: f32,

    /// Distance to near clipping plane
    pub near: f32,

    /// Distance to far clipping plane
    pub far: f32,
}

impl Camera {
    /// Create a new perspective camera looking at the origin
    ///
    /// # Arguments
    /// * `position` - Camera position in world space
    /// * `fov_degrees` - Vertical field of view in degrees
    /// * `aspect` - Aspect ratio (width / height) of the viewport
    /// * `near` - Distance to near clipping plane (must be > 0)
    /// * `far` - Distance to far clipping plane (must be > near)
    pub fn perspective(position: Vec3, fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position,
            target: Vec3::zeros(),
            up: Vec3::new(0.0, 1.0, 0.0),
            fov: utils::deg_to_rad(fov_degrees),
            aspect,
            near,
            far,
        }
    }

    /// Build from settings
    ///
    /// With no aspect available (degenerate container) the aspect is left at
    /// 1.0 until the first valid resize sets it.
    pub fn from_config(config: &CameraConfig, aspect: Option<f32>) -> Self {
        let [x, y, z] = config.position;
        Self::perspective(
            Vec3::new(x, y, z),
            config.fov_degrees,
            aspect.unwrap_or(1.0),
            config.near,
            config.far,
        )
    }

    /// Update camera aspect ratio for viewport changes
    ///
    /// Only logs changes larger than 0.01 to reduce noise during drag-resizes.
    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        if (self.aspect - aspect).abs() > 0.01 {
            log::info!("Camera aspect ratio changed: {:.3} -> {:.3}", self.aspect, aspect);
        }
        self.aspect = aspect;
    }

    /// World-to-view transformation
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.target, self.up)
    }

    /// Perspective projection
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective(self.fov, self.aspect, self.near, self.far)
    }

    /// Combined `P × X × V` matrix
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * Mat4::clip_space_transform() * self.view_matrix()
    }

    /// Project a world point to clip space
    pub fn project(view_projection: &Mat4, point: Vec3) -> Vec4 {
        view_projection * Vec4::new(point.x, point.y, point.z, 1.0)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_origin_projects_to_center_between_planes() {
        let camera = Camera::perspective(Vec3::new(0.0, 0.0, 50.0), 75.0, 4.0 / 3.0, 0.1, 1000.0);
        let clip = Camera::project(&camera.view_projection_matrix(), Vec3::zeros());

        assert_relative_eq!(clip.w, 50.0, epsilon = 1e-4);
        assert_relative_eq!(clip.x / clip.w, 0.0, epsilon = 1e-6);
        assert_relative_eq!(clip.y / clip.w, 0.0, epsilon = 1e-6);
        let depth = clip.z / clip.w;
        assert!(depth > 0.0 && depth < 1.0);
    }

    #[test]
    fn test_world_up_maps_to_negative_ndc_y() {
        let camera = Camera::perspective(Vec3::new(0.0, 0.0, 50.0), 75.0, 1.0, 0.1, 1000.0);
        let vp = camera.view_projection_matrix();

        let up = Camera::project(&vp, Vec3::new(0.0, 10.0, 0.0));
        let right = Camera::project(&vp, Vec3::new(10.0, 0.0, 0.0));
        assert!(up.y / up.w < 0.0);
        assert!(right.x / right.w > 0.0);
    }

    #[test]
    fn test_from_config_without_aspect() {
        let camera = Camera::from_config(&CameraConfig::default(), None);
        assert_relative_eq!(camera.aspect, 1.0);
        assert_relative_eq!(camera.fov, 75.0_f32.to_radians(), epsilon = 1e-6);
        assert_relative_eq!(camera.position.z, 50.0);
    }

    #[test]
    fn test_set_aspect_ratio() {
        let mut camera = Camera::default();
        camera.set_aspect_ratio(2.0);
        assert_relative_eq!(camera.aspect, 2.0);
    }
}
