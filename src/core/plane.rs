//! Horizontal quad primitive at `y = 0.5`, facing down.

use crate::core::renderable::{ObjectState, Renderable, RenderableKind};
use crate::core::types::VertexData;

#[rustfmt::skip]
const POSITIONS: [f32; 12] = [
    0.0, 0.5, 0.5,
    0.0, 0.5, 0.0,
    0.5, 0.5, 0.0,
    0.5, 0.5, 0.5,
];

const INDICES: [u32; 6] = [0, 2, 1, 2, 0, 3];

/// Texture coordinates tile five times across the quad.
#[rustfmt::skip]
const UVS: [f32; 8] = [
    0.0, 0.0,
    5.0, 0.0,
    5.0, 5.0,
    0.0, 5.0,
];

pub fn plane_geometry() -> VertexData {
    VertexData {
        positions: POSITIONS.to_vec(),
        normals: [0.0, -1.0, 0.0].repeat(4),
        uvs: UVS.to_vec(),
        indices: INDICES.to_vec(),
    }
}

#[derive(Debug, Clone)]
pub struct Plane {
    state: ObjectState,
}

impl Plane {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            state: ObjectState::with_vertices(name, plane_geometry()),
        }
    }
}

impl Renderable for Plane {
    fn kind(&self) -> RenderableKind {
        RenderableKind::Plane
    }

    fn state(&self) -> &ObjectState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ObjectState {
        &mut self.state
    }
}
