//! Model-matrix composition and name-based parent resolution.

use glam::{Mat4, Vec3};
use log::{debug, warn};

use crate::core::renderable::Renderable;
use crate::core::types::Transform;
use crate::pipeline::RenderRecord;
use crate::utils::math;

/// Object-local model matrix, before any parent is applied.
pub fn local_model_matrix(transform: &Transform, centroid: Vec3) -> Mat4 {
    math::compose_model_matrix(
        transform.position,
        transform.rotation,
        transform.scale,
        centroid,
    )
}

/// `local * parent`, or `local` when there is no parent matrix.
pub fn apply_parent(local: Mat4, parent: Option<Mat4>) -> Mat4 {
    match parent {
        Some(parent) => local * parent,
        None => local,
    }
}

/// First object with the given name, by linear scan.
pub fn find_by_name(objects: &[Box<dyn Renderable>], name: &str) -> Option<usize> {
    objects.iter().position(|object| object.name() == name)
}

/// Applies parent matrices in scene order and caches every world matrix.
///
/// A parent earlier in the scene contributes the matrix it was given this
/// frame; a parent later in the scene contributes the one cached by the
/// previous frame, or nothing on the first frame. Unknown parents are
/// reported and ignored.
pub fn resolve_world_matrices(objects: &mut [Box<dyn Renderable>], records: &mut [RenderRecord]) {
    for record in records.iter_mut() {
        let index = record.source;
        let parent_name = objects[index].parent().map(str::to_string);

        if let Some(parent_name) = parent_name {
            match find_by_name(objects, &parent_name) {
                Some(parent) if parent == index => {
                    warn!("'{}' names itself as parent, ignoring", record.name);
                }
                Some(parent) => {
                    let matrix = objects[parent].cached_model_matrix();
                    if matrix.is_none() {
                        debug!(
                            "parent '{parent_name}' of '{}' has no resolved matrix yet",
                            record.name
                        );
                    }
                    record.model_matrix = apply_parent(record.model_matrix, matrix);
                }
                None => {
                    warn!(
                        "parent '{parent_name}' of '{}' not found, drawing without it",
                        record.name
                    );
                }
            }
        }

        objects[index]
            .state_mut()
            .set_cached_model_matrix(record.model_matrix);
    }
}
