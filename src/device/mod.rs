//! Graphics device seam.
//!
//! Everything that touches GPU state goes through [`GraphicsDevice`]. The
//! device is owned by the coordinating thread; pipeline workers never see it.

pub mod recording;
pub mod shader;

pub use recording::{DeviceCommand, DeviceState, DrawCall, RecordingDevice};
pub use shader::{
    BuiltinShaderProvider, ProgramInfo, ShaderProgram, ShaderProvider, ShaderRequest,
    ShaderSources, ShadingModel,
};

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::core::types::VertexData;

/// Opaque handle to a linked shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ProgramHandle(pub u32);

/// Opaque handle to an uploaded vertex array object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct VertexArrayHandle(pub u32);

/// Opaque handle to a texture owned by the texture provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct TextureHandle(pub u32);

/// Opaque handle to a framebuffer object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FramebufferHandle(pub u32);

/// Vertex buffers uploaded for one renderable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GpuBuffers {
    pub vertex_array: VertexArrayHandle,
    /// Number of vertices (positions / 3).
    pub vertex_count: u32,
    /// Number of indices, 0 for non-indexed geometry.
    pub index_count: u32,
}

/// How a renderable submits its geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawMode {
    /// Indexed triangles (primitives).
    #[default]
    Indexed,
    /// Plain triangle arrays (meshes).
    Arrays,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepthTargetKind {
    /// Single 2D depth texture.
    Texture2D,
    /// Six-face depth cube map.
    CubeMap,
}

/// Depth-only render target used by the shadow passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthTarget {
    pub framebuffer: FramebufferHandle,
    pub texture: TextureHandle,
    pub kind: DepthTargetKind,
    pub width: u32,
    pub height: u32,
}

/// Result of a framebuffer completeness query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramebufferStatus {
    Complete,
    IncompleteAttachment,
    MissingAttachment,
    Unsupported,
}

impl FramebufferStatus {
    pub fn is_complete(self) -> bool {
        self == Self::Complete
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DepthFunc {
    Less,
    #[default]
    LessEqual,
    Always,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlendFactor {
    Zero,
    One,
    SrcAlpha,
    OneMinusSrcAlpha,
}

/// Source/destination blend factors applied while blending is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlendMode {
    pub src: BlendFactor,
    pub dst: BlendFactor,
}

impl Default for BlendMode {
    fn default() -> Self {
        Self {
            src: BlendFactor::SrcAlpha,
            dst: BlendFactor::OneMinusSrcAlpha,
        }
    }
}

/// Buffers cleared by [`GraphicsDevice::clear`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClearFlags {
    pub color: bool,
    pub depth: bool,
}

impl ClearFlags {
    pub const DEPTH: Self = Self {
        color: false,
        depth: true,
    };
    pub const COLOR_DEPTH: Self = Self {
        color: true,
        depth: true,
    };
}

/// Value written to a uniform location.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec3(Vec3),
    Mat4(Mat4),
    Mat4Array(Vec<Mat4>),
}

/// Graphics context used by the frame renderer.
///
/// Calls are issued from a single thread in submission order. Implementations
/// wrap a real API context or, like [`RecordingDevice`], capture the stream.
pub trait GraphicsDevice {
    fn name(&self) -> &str;

    /// Location of a vertex attribute, `None` when the program lacks it.
    fn attribute_location(&mut self, program: ProgramHandle, name: &str) -> Option<u32>;

    /// Location of a uniform, `None` when the program lacks it.
    fn uniform_location(&mut self, program: ProgramHandle, name: &str) -> Option<i32>;

    /// Uploads vertex data and describes it with the program's attribute layout.
    fn create_vertex_buffers(&mut self, program: &ProgramInfo, data: &VertexData) -> GpuBuffers;

    fn create_depth_target(&mut self, kind: DepthTargetKind, width: u32, height: u32)
        -> DepthTarget;

    fn framebuffer_status(&mut self, target: &DepthTarget) -> FramebufferStatus;

    /// Binds a framebuffer, `None` selects the default (window) target.
    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferHandle>);

    fn viewport(&mut self, width: u32, height: u32);

    fn clear(&mut self, flags: ClearFlags);

    fn set_clear_depth(&mut self, depth: f32);

    fn set_depth_test(&mut self, enabled: bool);

    fn set_depth_write(&mut self, enabled: bool);

    fn set_depth_func(&mut self, func: DepthFunc);

    /// Enables blending with the given mode, `None` disables it.
    fn set_blend(&mut self, mode: Option<BlendMode>);

    fn set_face_culling(&mut self, enabled: bool);

    fn use_program(&mut self, program: ProgramHandle);

    fn set_uniform(&mut self, location: i32, value: UniformValue);

    fn bind_texture(&mut self, texture: TextureHandle, unit: u32);

    fn bind_cube_texture(&mut self, texture: TextureHandle, unit: u32);

    fn unbind_texture(&mut self, texture: TextureHandle);

    fn bind_vertex_array(&mut self, vertex_array: VertexArrayHandle);

    fn draw_indexed(&mut self, index_count: u32);

    fn draw_arrays(&mut self, vertex_count: u32);

    fn unbind_vertex_array(&mut self);
}
