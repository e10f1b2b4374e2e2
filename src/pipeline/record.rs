//! Per-object work item of the transform pipeline.

use glam::{Mat4, Vec3};

use crate::config::RenderSettings;
use crate::core::camera::Camera;
use crate::core::renderable::{Renderable, RenderableKind};
use crate::core::types::{BoundingBox, Material};
use crate::device::{DrawMode, GpuBuffers, ProgramHandle};
use crate::error::{RenderError, Result};
use crate::scene::graph;

/// Read-only camera data shared by every task of a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSnapshot {
    pub camera_position: Vec3,
    pub view_matrix: Mat4,
    pub projection_matrix: Mat4,
}

impl FrameSnapshot {
    pub fn new(camera: &Camera, settings: &RenderSettings) -> Self {
        Self {
            camera_position: camera.position,
            view_matrix: camera.view_matrix(),
            projection_matrix: camera.projection_matrix(settings),
        }
    }
}

/// Everything the draw stage needs for one object in one frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderRecord {
    /// Index of the source renderable in the scene.
    pub source: usize,
    pub name: String,
    pub kind: RenderableKind,
    pub draw_mode: DrawMode,
    pub model_matrix: Mat4,
    pub view_matrix: Mat4,
    pub projection_matrix: Mat4,
    pub camera_position: Vec3,
    pub camera_distance: f32,
    pub material: Material,
    pub buffers: GpuBuffers,
    pub program: ProgramHandle,
    /// Object position when the record was built.
    pub position: Vec3,
    /// World bounds when the record was built.
    pub bounds: BoundingBox,
}

impl RenderRecord {
    pub fn is_translucent(&self) -> bool {
        self.material.is_translucent()
    }
}

/// Object that could not produce a record this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskFailure {
    pub source: usize,
    pub name: String,
    pub error: RenderError,
}

/// Builds the record for one renderable.
///
/// The model matrix is the object's local matrix; parents are applied later by
/// the reducer. Force-driven motion is left to [`Scene::apply_forces`] once the
/// frame has been drawn.
///
/// [`Scene::apply_forces`]: crate::scene::Scene::apply_forces
pub fn build_record(
    index: usize,
    object: &dyn Renderable,
    snapshot: &FrameSnapshot,
) -> Result<RenderRecord> {
    let state = object.state();
    let not_ready = |reason: &str| RenderError::PipelineTask {
        object: state.name().to_string(),
        reason: reason.to_string(),
    };
    let program = state.program().ok_or_else(|| not_ready("no program info"))?;
    let buffers = state.buffers().ok_or_else(|| not_ready("no vertex buffers"))?;

    let transform = state.transform();
    let centroid = state.centroid();
    Ok(RenderRecord {
        source: index,
        name: state.name().to_string(),
        kind: object.kind(),
        draw_mode: object.draw_mode(),
        model_matrix: graph::local_model_matrix(transform, centroid),
        view_matrix: snapshot.view_matrix,
        projection_matrix: snapshot.projection_matrix,
        camera_position: snapshot.camera_position,
        camera_distance: snapshot
            .camera_position
            .distance(transform.position + centroid),
        material: *state.material(),
        buffers,
        program: program.program,
        position: transform.position,
        bounds: state.bounding_box(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cube::Cube;
    use crate::core::types::Transform;
    use crate::device::{BuiltinShaderProvider, RecordingDevice};

    fn snapshot() -> FrameSnapshot {
        FrameSnapshot::new(&Camera::default(), &RenderSettings::default())
    }

    #[test]
    fn unset_object_reports_task_error() {
        let mut cube = Cube::new("raw");
        let err = build_record(0, &cube, &snapshot()).unwrap_err();
        assert!(matches!(err, RenderError::PipelineTask { .. }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn record_leaves_forced_object_in_place() {
        let mut cube = Cube::new("mover");
        let mut device = RecordingDevice::new();
        let mut shaders = BuiltinShaderProvider::new();
        cube.setup(
            &mut device,
            &mut shaders,
            Material::default(),
            Transform::from_position(Vec3::new(0.0, 0.0, -5.0)),
        )
        .unwrap();
        cube.set_force(Vec3::new(0.1, 0.0, 0.0));

        let record = build_record(3, &cube, &snapshot()).unwrap();
        assert_eq!(record.source, 3);
        assert_eq!(record.position, Vec3::new(0.0, 0.0, -5.0));
        assert_eq!(cube.transform().position, Vec3::new(0.0, 0.0, -5.0));

        let expected = Camera::default().position.distance(Vec3::new(0.25, 0.25, -4.75));
        assert!((record.camera_distance - expected).abs() < 1e-5);
    }
}
