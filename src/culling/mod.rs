//! Per-frame view culling of render records.

pub mod frustum;

pub use frustum::Frustum;

use glam::{Mat4, Vec3};
use log::trace;

use crate::config::CullingRadius;
use crate::pipeline::RenderRecord;

/// Culling statistics for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CullingStats {
    pub tested: usize,
    pub visible: usize,
}

impl CullingStats {
    pub fn culled(&self) -> usize {
        self.tested - self.visible
    }

    pub fn cull_rate(&self) -> f64 {
        if self.tested == 0 {
            0.0
        } else {
            self.culled() as f64 / self.tested as f64
        }
    }

    pub fn format(&self) -> String {
        format!(
            "Culling: {}/{} visible ({:.1}% culled)",
            self.visible,
            self.tested,
            self.cull_rate() * 100.0
        )
    }
}

/// Bounding sphere tested against the frustum for `record`.
pub fn bounding_sphere(record: &RenderRecord, policy: CullingRadius) -> (Vec3, f32) {
    match policy {
        CullingRadius::SquaredMaxExtent => (record.position, record.bounds.max.length_squared()),
        CullingRadius::BoundingSphere => (record.bounds.center(), record.bounds.half_diagonal()),
    }
}

/// Frustum plus counters for the current frame.
#[derive(Debug, Clone)]
pub struct ViewCuller {
    frustum: Frustum,
    policy: CullingRadius,
    stats: CullingStats,
}

impl ViewCuller {
    pub fn new(view: Mat4, projection: Mat4, policy: CullingRadius) -> Self {
        Self {
            frustum: Frustum::from_matrices(view, projection),
            policy,
            stats: CullingStats::default(),
        }
    }

    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    pub fn is_visible(&mut self, record: &RenderRecord) -> bool {
        let (center, radius) = bounding_sphere(record, self.policy);
        let visible = self.frustum.intersects_sphere(center, radius);
        self.stats.tested += 1;
        if visible {
            self.stats.visible += 1;
        } else {
            trace!("culled '{}'", record.name);
        }
        visible
    }

    pub fn stats(&self) -> CullingStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::BoundingBox;

    fn record_at(min: Vec3, max: Vec3) -> RenderRecord {
        RenderRecord {
            position: min,
            bounds: BoundingBox::new(min, max),
            ..RenderRecord::default()
        }
    }

    #[test]
    fn corrected_sphere_wraps_the_box() {
        let record = record_at(Vec3::ZERO, Vec3::new(2.0, 2.0, 1.0));
        let (center, radius) = bounding_sphere(&record, CullingRadius::BoundingSphere);
        assert_eq!(center, Vec3::new(1.0, 1.0, 0.5));
        assert!((radius - 1.5).abs() < 1e-6);
    }

    #[test]
    fn legacy_sphere_uses_squared_extent_at_position() {
        let record = record_at(Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 2.0, 1.0));
        let (center, radius) = bounding_sphere(&record, CullingRadius::SquaredMaxExtent);
        assert_eq!(center, Vec3::new(1.0, 0.0, 0.0));
        assert!((radius - 9.0).abs() < 1e-6);
    }

    #[test]
    fn culler_counts_results() {
        let view = Mat4::look_at_rh(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y);
        let projection = Mat4::perspective_rh_gl(1.0, 1.0, 0.1, 100.0);
        let mut culler = ViewCuller::new(view, projection, CullingRadius::BoundingSphere);
        let ahead = record_at(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.5, 0.5, -4.5));
        let behind = record_at(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.5, 0.5, 5.5));
        assert!(culler.is_visible(&ahead));
        assert!(!culler.is_visible(&behind));
        assert_eq!(culler.stats().culled(), 1);
        assert!(culler.stats().format().contains("1/2"));
    }
}
