use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::RenderSettings;

/// Viewer position and orientation supplied by the input layer each frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub position: Vec3,
    /// Viewing direction, not a target point.
    pub front: Vec3,
    pub up: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            front: Vec3::NEG_Z,
            up: Vec3::Y,
        }
    }
}

impl Camera {
    pub fn new(position: Vec3, front: Vec3, up: Vec3) -> Self {
        Self { position, front, up }
    }

    /// Right-handed look-at from `position` along `front`.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// Perspective projection with GL clip depth for the configured viewport.
    pub fn projection_matrix(&self, settings: &RenderSettings) -> Mat4 {
        Mat4::perspective_rh_gl(
            settings.fov_y_degrees.to_radians(),
            settings.aspect_ratio(),
            settings.near_plane,
            settings.far_plane,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_matrix_moves_camera_to_origin() {
        let camera = Camera::new(Vec3::new(1.0, 2.0, 3.0), Vec3::NEG_Z, Vec3::Y);
        let eye = camera.view_matrix().transform_point3(camera.position);
        assert!(eye.length() < 1e-6);
        let ahead = camera.view_matrix().transform_point3(camera.position + Vec3::NEG_Z);
        assert!((ahead - Vec3::NEG_Z).length() < 1e-6);
    }
}
