//! Shared renderable state and the capability trait implemented by every variant.

use std::fmt;

use glam::{Mat4, Vec3};
use log::debug;

use crate::core::types::{BoundingBox, Material, Transform, VertexData};
use crate::device::{
    DrawMode, GpuBuffers, GraphicsDevice, ProgramInfo, ShaderProvider, ShaderRequest,
    ShaderSources,
};
use crate::error::{RenderError, Result};
use crate::utils::math;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderableKind {
    #[default]
    Cube,
    Plane,
    Mesh,
}

impl RenderableKind {
    /// Primitives submit indexed triangles, meshes plain arrays.
    pub fn draw_mode(self) -> DrawMode {
        match self {
            Self::Cube | Self::Plane => DrawMode::Indexed,
            Self::Mesh => DrawMode::Arrays,
        }
    }
}

/// Data owned by a single renderable.
///
/// Centroid and world bounds are derived from the vertices and the transform
/// and are refreshed whenever either changes.
#[derive(Debug, Clone, Default)]
pub struct ObjectState {
    name: String,
    transform: Transform,
    material: Material,
    vertices: VertexData,
    local_bounds: BoundingBox,
    bounds: BoundingBox,
    centroid: Vec3,
    parent: Option<String>,
    force: Vec3,
    shader: Option<ShaderSources>,
    program: Option<ProgramInfo>,
    buffers: Option<GpuBuffers>,
    model_matrix: Option<Mat4>,
}

impl ObjectState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_vertices(name: impl Into<String>, vertices: VertexData) -> Self {
        let mut state = Self::new(name);
        state.set_vertices(vertices);
        state
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn vertices(&self) -> &VertexData {
        &self.vertices
    }

    pub fn centroid(&self) -> Vec3 {
        self.centroid
    }

    /// World-space bounds for the current transform.
    pub fn bounding_box(&self) -> BoundingBox {
        self.bounds
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn force(&self) -> Vec3 {
        self.force
    }

    pub fn program(&self) -> Option<&ProgramInfo> {
        self.program.as_ref()
    }

    pub fn buffers(&self) -> Option<GpuBuffers> {
        self.buffers
    }

    /// World matrix stored by the last frame that resolved this object.
    pub fn cached_model_matrix(&self) -> Option<Mat4> {
        self.model_matrix
    }

    pub fn is_set_up(&self) -> bool {
        self.program.is_some() && self.buffers.is_some()
    }

    pub(crate) fn set_cached_model_matrix(&mut self, matrix: Mat4) {
        self.model_matrix = Some(matrix);
    }

    pub(crate) fn set_vertices(&mut self, vertices: VertexData) {
        self.local_bounds = BoundingBox {
            collide: self.local_bounds.collide,
            ..BoundingBox::from_vertices(&vertices.positions)
        };
        self.vertices = vertices;
        self.refresh_centroid();
        self.refresh_bounds();
    }

    fn refresh_centroid(&mut self) {
        self.centroid = math::centroid(&self.vertices.positions, self.transform.scale);
    }

    fn refresh_bounds(&mut self) {
        self.bounds = self
            .local_bounds
            .scaled(self.transform.scale)
            .translated(self.transform.position);
    }
}

/// Capability set shared by cubes, planes and meshes.
///
/// Variants only expose their [`ObjectState`] and kind; everything else is
/// provided here.
pub trait Renderable: Send + Sync + fmt::Debug {
    fn kind(&self) -> RenderableKind;

    fn state(&self) -> &ObjectState;

    fn state_mut(&mut self) -> &mut ObjectState;

    fn name(&self) -> &str {
        self.state().name()
    }

    fn draw_mode(&self) -> DrawMode {
        self.kind().draw_mode()
    }

    /// Stores custom shader sources used when the material selects custom shading.
    fn set_shader(&mut self, vertex: &str, fragment: &str) -> Result<()> {
        let sources = ShaderSources::new(self.name(), vertex, fragment)?;
        self.state_mut().shader = Some(sources);
        Ok(())
    }

    /// Resolves the program, uploads the geometry and applies the initial transform.
    fn setup(
        &mut self,
        device: &mut dyn GraphicsDevice,
        shaders: &mut dyn ShaderProvider,
        material: Material,
        transform: Transform,
    ) -> Result<()> {
        let state = self.state_mut();
        if state.vertices.is_empty() {
            return Err(RenderError::MissingVertexData(state.name.clone()));
        }

        let request = ShaderRequest {
            object: state.name.clone(),
            model: material.shading,
            sources: state.shader.clone(),
        };
        let shader = shaders.program(&request)?;
        let program = ProgramInfo::resolve(device, &state.name, &shader)?;
        let buffers = device.create_vertex_buffers(&program, &state.vertices);

        state.material = material;
        state.transform = transform;
        state.program = Some(program);
        state.buffers = Some(buffers);
        state.model_matrix = None;
        state.refresh_centroid();
        state.refresh_bounds();
        debug!(
            "'{}' set up: {} vertices, centroid {:?}",
            state.name,
            state.vertices.vertex_count(),
            state.centroid
        );
        Ok(())
    }

    fn transform(&self) -> &Transform {
        self.state().transform()
    }

    fn centroid(&self) -> Vec3 {
        self.state().centroid()
    }

    fn bounding_box(&self) -> BoundingBox {
        self.state().bounding_box()
    }

    fn buffers(&self) -> Option<GpuBuffers> {
        self.state().buffers()
    }

    fn vertices(&self) -> &VertexData {
        self.state().vertices()
    }

    fn material(&self) -> &Material {
        self.state().material()
    }

    fn set_material(&mut self, material: Material) {
        self.state_mut().material = material;
    }

    /// Moves the object. The centroid stays in local space.
    fn translate(&mut self, offset: Vec3) {
        let state = self.state_mut();
        state.transform.position += offset;
        state.refresh_bounds();
    }

    /// Replaces the scale and recomputes centroid and bounds.
    fn scale(&mut self, scale: Vec3) {
        let state = self.state_mut();
        state.transform.scale = scale;
        state.refresh_centroid();
        state.refresh_bounds();
    }

    fn set_rotation(&mut self, rotation: Mat4) {
        self.state_mut().transform.rotation = rotation;
    }

    /// Names the object whose world matrix is applied after this one's.
    fn set_parent(&mut self, parent: Option<&str>) {
        self.state_mut().parent = parent.map(str::to_string);
    }

    fn parent(&self) -> Option<&str> {
        self.state().parent()
    }

    fn force(&self) -> Vec3 {
        self.state().force()
    }

    /// Per-frame translation applied after the object's matrix is computed.
    fn set_force(&mut self, force: Vec3) {
        self.state_mut().force = force;
    }

    fn add_force(&mut self, force: Vec3) {
        self.state_mut().force += force;
    }

    fn set_collide(&mut self, collide: bool) {
        let state = self.state_mut();
        state.local_bounds.collide = collide;
        state.bounds.collide = collide;
    }

    fn cached_model_matrix(&self) -> Option<Mat4> {
        self.state().cached_model_matrix()
    }
}
