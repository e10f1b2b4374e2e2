use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::device::{ShadingModel, TextureHandle};
use crate::utils::math;

/// Position, rotation and non-uniform scale of a renderable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Mat4,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Mat4::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_rotation(mut self, rotation: Mat4) -> Self {
        self.rotation = rotation;
        self
    }
}

/// Surface parameters consumed by the lighting shaders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    pub diffuse: Vec3,
    pub ambient: Vec3,
    pub specular: Vec3,
    pub shininess: f32,
    /// Opacity in `[0, 1]`; anything below 1 is drawn blended.
    pub alpha: f32,
    pub shading: ShadingModel,
    pub diffuse_texture: Option<TextureHandle>,
    pub normal_texture: Option<TextureHandle>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            diffuse: Vec3::splat(0.8),
            ambient: Vec3::splat(0.1),
            specular: Vec3::splat(0.5),
            shininess: 32.0,
            alpha: 1.0,
            shading: ShadingModel::Basic,
            diffuse_texture: None,
            normal_texture: None,
        }
    }
}

impl Material {
    pub fn with_shading(mut self, shading: ShadingModel) -> Self {
        self.shading = shading;
        self
    }

    /// Sets the opacity, clamped to `[0, 1]`.
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha.clamp(0.0, 1.0);
        self
    }

    pub fn with_diffuse(mut self, diffuse: Vec3) -> Self {
        self.diffuse = diffuse;
        self
    }

    pub fn with_diffuse_texture(mut self, texture: TextureHandle) -> Self {
        self.diffuse_texture = Some(texture);
        self
    }

    pub fn with_normal_texture(mut self, texture: TextureHandle) -> Self {
        self.normal_texture = Some(texture);
        self
    }

    pub fn is_translucent(&self) -> bool {
        self.alpha < 1.0
    }
}

/// Axis-aligned bounds. `min <= max` holds componentwise after every update.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
    /// Include this box in contact counting.
    pub collide: bool,
}

impl BoundingBox {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
            collide: false,
        }
    }

    /// Bounds of packed `xyz` vertex data; empty data yields a zero box.
    pub fn from_vertices(vertices: &[f32]) -> Self {
        math::vertex_extents(vertices)
            .map(|(min, max)| Self::new(min, max))
            .unwrap_or_default()
    }

    pub fn scaled(&self, scale: Vec3) -> Self {
        Self {
            collide: self.collide,
            ..Self::new(self.min * scale, self.max * scale)
        }
    }

    pub fn translated(&self, offset: Vec3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
            collide: self.collide,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_diagonal(&self) -> f32 {
        (self.max - self.min).length() * 0.5
    }

    /// Overlap test, touching faces count as intersecting.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min.cmple(other.max).all() && self.max.cmpge(other.min).all()
    }
}

/// Raw geometry handed over by the geometry provider.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VertexData {
    /// Packed `xyz` positions.
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub uvs: Vec<f32>,
    /// Triangle indices, empty for non-indexed meshes.
    pub indices: Vec<u32>,
}

impl VertexData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_scale_keeps_box_ordered() {
        let bbox = BoundingBox::new(Vec3::ZERO, Vec3::ONE).scaled(Vec3::new(-2.0, 1.0, 1.0));
        assert!(bbox.min.cmple(bbox.max).all());
        assert_eq!(bbox.min.x, -2.0);
    }

    #[test]
    fn boxes_touching_intersect() {
        let a = BoundingBox::new(Vec3::ZERO, Vec3::ONE);
        let b = BoundingBox::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        let c = b.translated(Vec3::new(0.5, 0.0, 0.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn alpha_is_clamped() {
        assert_eq!(Material::default().with_alpha(1.5).alpha, 1.0);
        assert!(Material::default().with_alpha(0.4).is_translucent());
    }
}
