//! Geometric helpers layered on top of `glam`.

use glam::{Mat4, Vec3, Vec4};

/// Plane in Hessian normal form: `dot(normal, p) + distance = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Plane {
    pub normal: Vec3,
    pub distance: f32,
}

impl Plane {
    /// Builds a normalized plane from `(a, b, c, d)` coefficients.
    ///
    /// Normal and distance are both divided by the normal length so that
    /// [`Plane::signed_distance`] is metric.
    pub fn from_coefficients(coefficients: Vec4) -> Self {
        let normal = coefficients.truncate();
        let length = normal.length();
        if length <= f32::EPSILON {
            return Self {
                normal,
                distance: coefficients.w,
            };
        }
        Self {
            normal: normal / length,
            distance: coefficients.w / length,
        }
    }

    /// Positive on the side the normal points to.
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.distance
    }
}

/// Scales the first three basis columns of `matrix` by the components of `scale`.
///
/// The translation column is left untouched.
pub fn scale_basis(matrix: Mat4, scale: Vec3) -> Mat4 {
    Mat4::from_cols(
        matrix.x_axis * scale.x,
        matrix.y_axis * scale.y,
        matrix.z_axis * scale.z,
        matrix.w_axis,
    )
}

/// Local model matrix: rotate about the centroid, then apply position and scale.
///
/// `T(centroid) * R * T(position) * T(-centroid)`, followed by [`scale_basis`].
pub fn compose_model_matrix(position: Vec3, rotation: Mat4, scale: Vec3, centroid: Vec3) -> Mat4 {
    let matrix = Mat4::from_translation(centroid)
        * rotation
        * Mat4::from_translation(position)
        * Mat4::from_translation(-centroid);
    scale_basis(matrix, scale)
}

/// Mean of packed `xyz` vertices with each component multiplied by `scale`.
pub fn centroid(vertices: &[f32], scale: Vec3) -> Vec3 {
    let count = vertices.len() / 3;
    if count == 0 {
        return Vec3::ZERO;
    }
    let sum = vertices
        .chunks_exact(3)
        .fold(Vec3::ZERO, |acc, v| acc + Vec3::new(v[0], v[1], v[2]) * scale);
    sum / count as f32
}

/// Componentwise min and max of packed `xyz` vertices.
pub fn vertex_extents(vertices: &[f32]) -> Option<(Vec3, Vec3)> {
    let mut points = vertices.chunks_exact(3).map(|v| Vec3::new(v[0], v[1], v[2]));
    let first = points.next()?;
    Some(points.fold((first, first), |(min, max), p| (min.min(p), max.max(p))))
}

/// Column-major matrix from 16 floats, identity for any other length.
pub fn mat4_from_array(values: &[f32]) -> Mat4 {
    match <&[f32; 16]>::try_from(values) {
        Ok(array) => Mat4::from_cols_array(array),
        Err(_) => Mat4::IDENTITY,
    }
}

/// Whether two directions are within `tolerance` of being parallel.
pub fn nearly_parallel(a: Vec3, b: Vec3, tolerance: f32) -> bool {
    let a = a.normalize_or_zero();
    let b = b.normalize_or_zero();
    1.0 - a.dot(b).abs() < tolerance
}
