//! Prism Renderer – per-frame render orchestration.
//!
//! This crate resolves scene-graph transforms on a worker pool, culls against
//! the camera frustum, renders directional and point-light shadow maps, and
//! submits the main pass back-to-front with per-material depth and blend state.
//! All device work goes through the [`GraphicsDevice`] trait.

pub mod config;
pub mod core;
pub mod culling;
pub mod device;
pub mod draw;
pub mod error;
pub mod frame;
pub mod pipeline;
pub mod scene;
pub mod shadows;
pub mod utils;

pub use glam::{Mat4, Vec3};

pub use config::{CullingRadius, RenderSettings, TranslucentClearDepth};
pub use core::{
    camera::Camera,
    cube::Cube,
    lights::{DirectionalLight, PointLight},
    mesh::MeshObject,
    plane::Plane,
    renderable::{Renderable, RenderableKind},
    types::{BoundingBox, Material, Transform, VertexData},
};
pub use culling::{CullingStats, Frustum, ViewCuller};
pub use device::{
    BuiltinShaderProvider, GraphicsDevice, RecordingDevice, ShaderProvider, ShadingModel,
    TextureHandle,
};
pub use draw::RenderState;
pub use error::{RenderError, Result};
pub use frame::{FrameRenderer, FrameStats};
pub use pipeline::{RenderRecord, TransformPipeline};
pub use scene::{Contact, Scene};

/// High-level convenience wrapper that owns a device, a shader provider and a [`Scene`].
pub struct RenderEngine<D: GraphicsDevice> {
    device: D,
    shaders: Box<dyn ShaderProvider>,
    scene: Scene,
    renderer: FrameRenderer,
}

impl<D: GraphicsDevice> RenderEngine<D> {
    /// Creates an engine using the built-in shader programs.
    pub fn new(device: D, settings: RenderSettings) -> Result<Self> {
        Self::with_shaders(device, Box::new(BuiltinShaderProvider::new()), settings)
    }

    /// Creates an engine with a custom shader provider and prepares the shadow passes.
    pub fn with_shaders(
        mut device: D,
        mut shaders: Box<dyn ShaderProvider>,
        settings: RenderSettings,
    ) -> Result<Self> {
        let mut renderer = FrameRenderer::new(settings);
        renderer.prepare(&mut device, shaders.as_mut())?;
        Ok(Self {
            device,
            shaders,
            scene: Scene::default(),
            renderer,
        })
    }

    /// Sets up an object and appends it to the scene, returning its index.
    pub fn add_object(
        &mut self,
        mut object: Box<dyn Renderable>,
        material: Material,
        transform: Transform,
    ) -> Result<usize> {
        object.setup(&mut self.device, self.shaders.as_mut(), material, transform)?;
        Ok(self.scene.add_object(object))
    }

    pub fn add_point_light(&mut self, light: PointLight) -> usize {
        self.scene.add_point_light(light)
    }

    pub fn set_directional_light(&mut self, light: Option<DirectionalLight>) {
        self.scene.set_directional_light(light);
    }

    /// Mutable access to an object by name.
    pub fn object_mut(&mut self, name: &str) -> Result<&mut Box<dyn Renderable>> {
        self.scene
            .object_mut(name)
            .ok_or_else(|| RenderError::UnknownObject(name.to_string()))
    }

    /// Renders one frame.
    pub fn render_frame(&mut self) -> Result<FrameStats> {
        self.renderer.render(&mut self.scene, &mut self.device)
    }

    /// Enables or disables worker dispatch for the transform pipeline.
    pub fn set_parallel_enabled(&mut self, enabled: bool) {
        self.renderer.pipeline_mut().set_parallel_enabled(enabled);
    }

    /// Returns whether transforms are currently computed on the worker pool.
    pub fn parallel_enabled(&self) -> bool {
        self.renderer.pipeline().parallel_enabled()
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.scene.camera
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn renderer(&self) -> &FrameRenderer {
        &self.renderer
    }
}
