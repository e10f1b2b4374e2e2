//! Depth-only shadow passes for directional and point lights.
//!
//! Both passes run before the main pass and draw every valid record from the
//! light's point of view. Camera culling does not apply here.

pub mod directional;
pub mod point;
pub mod target;

pub use directional::DirectionalShadowPass;
pub use point::PointShadowPass;
pub use target::ShadowTarget;

use crate::device::shader::U_MODEL;
use crate::device::{DrawMode, GraphicsDevice, ProgramInfo, UniformValue};
use crate::pipeline::RenderRecord;

/// Progress of a shadow pass within the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadowPassState {
    #[default]
    Idle,
    /// Directional light-space matrix computed.
    LightSpaceComputed,
    /// Point light cube-face matrices available (cached or rebuilt).
    CubeFacesComputed,
    DepthBound,
    Rendered,
}

/// Submits every record with only its model matrix bound. Returns the draw count.
pub(crate) fn draw_depth<D: GraphicsDevice + ?Sized>(
    device: &mut D,
    program: &ProgramInfo,
    records: &[RenderRecord],
) -> usize {
    let model_location = program.uniform(U_MODEL);
    for record in records {
        if let Some(location) = model_location {
            device.set_uniform(location, UniformValue::Mat4(record.model_matrix));
        }
        device.bind_vertex_array(record.buffers.vertex_array);
        match record.draw_mode {
            DrawMode::Indexed => device.draw_indexed(record.buffers.index_count),
            DrawMode::Arrays => device.draw_arrays(record.buffers.vertex_count),
        }
        device.unbind_vertex_array();
    }
    records.len()
}
