//! Core scene data: transforms, materials, renderables, lights and the camera.

pub mod camera;
pub mod cube;
pub mod lights;
pub mod mesh;
pub mod plane;
pub mod renderable;
pub mod types;

pub use camera::Camera;
pub use cube::Cube;
pub use lights::{DirectionalLight, PointLight};
pub use mesh::MeshObject;
pub use plane::Plane;
pub use renderable::{ObjectState, Renderable, RenderableKind};
pub use types::{BoundingBox, Material, Transform, VertexData};
