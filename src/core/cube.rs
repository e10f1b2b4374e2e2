//! Axis-aligned cube primitive spanning `0..0.5` on every axis.

use crate::core::renderable::{ObjectState, Renderable, RenderableKind};
use crate::core::types::VertexData;

#[rustfmt::skip]
const POSITIONS: [f32; 72] = [
    0.0, 0.0, 0.0,  0.0, 0.5, 0.0,  0.5, 0.5, 0.0,  0.5, 0.0, 0.0,
    0.0, 0.0, 0.5,  0.0, 0.5, 0.5,  0.5, 0.5, 0.5,  0.5, 0.0, 0.5,
    0.0, 0.5, 0.5,  0.0, 0.5, 0.0,  0.5, 0.5, 0.0,  0.5, 0.5, 0.5,
    0.0, 0.0, 0.5,  0.5, 0.0, 0.5,  0.5, 0.0, 0.0,  0.0, 0.0, 0.0,
    0.5, 0.0, 0.5,  0.5, 0.0, 0.0,  0.5, 0.5, 0.5,  0.5, 0.5, 0.0,
    0.0, 0.0, 0.5,  0.0, 0.0, 0.0,  0.0, 0.5, 0.5,  0.0, 0.5, 0.0,
];

#[rustfmt::skip]
const INDICES: [u32; 36] = [
    0, 1, 2, 0, 2, 3,
    4, 5, 6, 4, 6, 7,
    8, 9, 10, 8, 10, 11,
    12, 13, 14, 12, 14, 15,
    16, 17, 18, 17, 18, 19,
    20, 21, 22, 21, 22, 23,
];

/// One normal per face, repeated for its four vertices.
const FACE_NORMALS: [[f32; 3]; 6] = [
    [0.0, 0.0, -1.0],
    [0.0, 0.0, 1.0],
    [0.0, 1.0, 0.0],
    [0.0, -1.0, 0.0],
    [1.0, 0.0, 0.0],
    [-1.0, 0.0, 0.0],
];

const FACE_UVS: [f32; 8] = [0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0];

pub fn cube_geometry() -> VertexData {
    let normals = FACE_NORMALS
        .iter()
        .flat_map(|normal| std::iter::repeat(normal).take(4).flatten().copied())
        .collect();
    let uvs = FACE_UVS.iter().copied().cycle().take(FACE_UVS.len() * 6).collect();
    VertexData {
        positions: POSITIONS.to_vec(),
        normals,
        uvs,
        indices: INDICES.to_vec(),
    }
}

#[derive(Debug, Clone)]
pub struct Cube {
    state: ObjectState,
}

impl Cube {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            state: ObjectState::with_vertices(name, cube_geometry()),
        }
    }
}

impl Renderable for Cube {
    fn kind(&self) -> RenderableKind {
        RenderableKind::Cube
    }

    fn state(&self) -> &ObjectState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ObjectState {
        &mut self.state
    }
}
