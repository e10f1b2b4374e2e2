//! View-frustum planes extracted from a combined view-projection matrix.

use glam::{Mat4, Vec3};

use crate::utils::math::Plane;

pub const NEAR: usize = 0;
pub const FAR: usize = 1;
pub const LEFT: usize = 2;
pub const RIGHT: usize = 3;
pub const TOP: usize = 4;
pub const BOTTOM: usize = 5;

/// Six inward-facing planes. Rebuilt every frame, never cached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Gribb-Hartmann extraction from `projection * view`.
    pub fn from_matrices(view: Mat4, projection: Mat4) -> Self {
        Self::from_view_projection(projection * view)
    }

    pub fn from_view_projection(vp: Mat4) -> Self {
        let row0 = vp.row(0);
        let row1 = vp.row(1);
        let row2 = vp.row(2);
        let row3 = vp.row(3);

        let mut planes = [Plane::default(); 6];
        planes[NEAR] = Plane::from_coefficients(row3 + row2);
        planes[FAR] = Plane::from_coefficients(row3 - row2);
        planes[LEFT] = Plane::from_coefficients(row3 + row0);
        planes[RIGHT] = Plane::from_coefficients(row3 - row0);
        planes[TOP] = Plane::from_coefficients(row3 - row1);
        planes[BOTTOM] = Plane::from_coefficients(row3 + row1);
        Self { planes }
    }

    /// A sphere is visible unless it lies entirely behind one plane.
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.signed_distance(center) + radius > 0.0)
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        self.intersects_sphere(point, 0.0)
    }
}
