//! Arbitrary triangle soup supplied by the geometry provider.

use crate::core::renderable::{ObjectState, Renderable, RenderableKind};
use crate::core::types::VertexData;

/// Mesh drawn as plain triangle arrays.
#[derive(Debug, Clone)]
pub struct MeshObject {
    state: ObjectState,
}

impl MeshObject {
    /// Creates an empty mesh; call [`MeshObject::set_vertex_values`] before setup.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            state: ObjectState::new(name),
        }
    }

    pub fn with_geometry(name: impl Into<String>, data: VertexData) -> Self {
        Self {
            state: ObjectState::with_vertices(name, data),
        }
    }

    /// Replaces the vertex data; meshes never carry indices.
    pub fn set_vertex_values(&mut self, positions: Vec<f32>, normals: Vec<f32>, uvs: Vec<f32>) {
        self.state.set_vertices(VertexData {
            positions,
            normals,
            uvs,
            indices: Vec::new(),
        });
    }
}

impl Renderable for MeshObject {
    fn kind(&self) -> RenderableKind {
        RenderableKind::Mesh
    }

    fn state(&self) -> &ObjectState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ObjectState {
        &mut self.state
    }
}
