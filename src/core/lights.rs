//! Light sources and their cached light-space transforms.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::shadows::{directional, point};

/// Omnidirectional light with attenuation and a cube shadow map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointLight {
    pub name: String,
    pub position: Vec3,
    pub colour: Vec3,
    pub strength: f32,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
    pub near_plane: f32,
    pub far_plane: f32,
    pub casts_shadow: bool,
    /// Recompute the cube-face matrices every time they are requested.
    pub moving: bool,
    #[serde(skip)]
    view_matrices: Option<[Mat4; 6]>,
    #[serde(skip)]
    recompute_count: u64,
}

impl PointLight {
    pub fn new(name: impl Into<String>, position: Vec3) -> Self {
        Self {
            name: name.into(),
            position,
            colour: Vec3::ONE,
            strength: 1.0,
            constant: 1.0,
            linear: 0.09,
            quadratic: 0.032,
            near_plane: 1.0,
            far_plane: 25.0,
            casts_shadow: true,
            moving: false,
            view_matrices: None,
            recompute_count: 0,
        }
    }

    pub fn with_planes(mut self, near: f32, far: f32) -> Self {
        self.near_plane = near;
        self.far_plane = far;
        self.view_matrices = None;
        self
    }

    pub fn with_moving(mut self, moving: bool) -> Self {
        self.moving = moving;
        self
    }

    /// Moves the light and drops the cached cube-face matrices.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.view_matrices = None;
    }

    /// Projection-view matrix per cube face, recomputed only when moving or on first use.
    pub fn shadow_transforms(&mut self) -> [Mat4; 6] {
        match self.view_matrices {
            Some(matrices) if !self.moving => matrices,
            _ => {
                let matrices =
                    point::cube_face_transforms(self.position, self.near_plane, self.far_plane);
                self.view_matrices = Some(matrices);
                self.recompute_count += 1;
                matrices
            }
        }
    }

    /// Number of times the cube-face matrices were rebuilt.
    pub fn recompute_count(&self) -> u64 {
        self.recompute_count
    }

    /// Linear shadow depth of a world-space fragment, in `[0, 1]`.
    pub fn encode_depth(&self, fragment: Vec3) -> f32 {
        if self.far_plane <= 0.0 {
            return 1.0;
        }
        (self.position.distance(fragment) / self.far_plane).clamp(0.0, 1.0)
    }
}

/// Infinitely distant light with a single orthographic shadow map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectionalLight {
    pub name: String,
    pub position: Vec3,
    pub direction: Vec3,
    pub colour: Vec3,
    pub strength: f32,
    /// Written by every directional shadow pass.
    #[serde(skip)]
    pub light_space_matrix: Mat4,
}

impl DirectionalLight {
    pub fn new(name: impl Into<String>, position: Vec3, direction: Vec3) -> Self {
        Self {
            name: name.into(),
            position,
            direction,
            colour: Vec3::ONE,
            strength: 1.0,
            light_space_matrix: Mat4::IDENTITY,
        }
    }

    /// Recomputes and stores the light-space matrix.
    pub fn update_light_space(&mut self) -> Mat4 {
        self.light_space_matrix = directional::light_space_matrix(self.position, self.direction);
        self.light_space_matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_light_reuses_matrices() {
        let mut light = PointLight::new("bulb", Vec3::new(0.0, 3.0, 0.0));
        let first = light.shadow_transforms();
        let second = light.shadow_transforms();
        assert_eq!(first, second);
        assert_eq!(light.recompute_count(), 1);
    }

    #[test]
    fn moving_light_recomputes_every_request() {
        let mut light = PointLight::new("torch", Vec3::ZERO).with_moving(true);
        light.shadow_transforms();
        light.position = Vec3::new(1.0, 0.0, 0.0);
        let moved = light.shadow_transforms();
        assert_eq!(light.recompute_count(), 2);
        assert_eq!(
            moved,
            point::cube_face_transforms(light.position, light.near_plane, light.far_plane)
        );
    }

    #[test]
    fn set_position_invalidates_cache() {
        let mut light = PointLight::new("bulb", Vec3::ZERO);
        light.shadow_transforms();
        light.set_position(Vec3::ONE);
        light.shadow_transforms();
        assert_eq!(light.recompute_count(), 2);
    }

    #[test]
    fn depth_is_distance_over_far_plane() {
        let light = PointLight::new("bulb", Vec3::ZERO).with_planes(1.0, 20.0);
        assert!((light.encode_depth(Vec3::new(0.0, 5.0, 0.0)) - 0.25).abs() < 1e-6);
        assert_eq!(light.encode_depth(Vec3::new(0.0, 50.0, 0.0)), 1.0);
    }
}
