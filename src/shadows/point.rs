//! Omnidirectional cube-map shadows for point lights.

use glam::{Mat4, Vec3};
use log::{debug, error};

use crate::core::lights::PointLight;
use crate::device::shader::{U_FAR_PLANE, U_LIGHT_POSITION, U_SHADOW_MATRICES};
use crate::device::{
    DepthFunc, DepthTargetKind, GraphicsDevice, ProgramInfo, ShaderProvider, ShaderRequest,
    ShadingModel, TextureHandle, UniformValue,
};
use crate::error::{RenderError, Result};
use crate::pipeline::RenderRecord;
use crate::shadows::{draw_depth, ShadowPassState, ShadowTarget};

const PASS: &str = "point";

/// Look direction and up vector of each cube face, in +X, -X, +Y, -Y, +Z, -Z order.
pub const CUBE_FACES: [(Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::NEG_Y),
    (Vec3::NEG_X, Vec3::NEG_Y),
    (Vec3::Y, Vec3::Z),
    (Vec3::NEG_Y, Vec3::NEG_Z),
    (Vec3::Z, Vec3::NEG_Y),
    (Vec3::NEG_Z, Vec3::NEG_Y),
];

/// Projection-view matrix for every cube face: 90° field of view, square aspect.
pub fn cube_face_transforms(position: Vec3, near: f32, far: f32) -> [Mat4; 6] {
    let projection = Mat4::perspective_rh_gl(std::f32::consts::FRAC_PI_2, 1.0, near, far);
    CUBE_FACES.map(|(direction, up)| projection * Mat4::look_at_rh(position, position + direction, up))
}

/// Renders one cube depth map per shadow-casting point light.
///
/// Each record is submitted once; the depth program expands it to all six
/// layers and writes `distance / far_plane`.
#[derive(Debug)]
pub struct PointShadowPass {
    size: u32,
    targets: Vec<ShadowTarget>,
    program: Option<ProgramInfo>,
    state: ShadowPassState,
}

impl PointShadowPass {
    pub fn new(size: u32) -> Self {
        Self {
            size,
            targets: Vec::new(),
            program: None,
            state: ShadowPassState::Idle,
        }
    }

    pub fn prepare<D: GraphicsDevice + ?Sized>(
        &mut self,
        device: &mut D,
        shaders: &mut dyn ShaderProvider,
    ) -> Result<()> {
        let request = ShaderRequest::builtin("point-shadow", ShadingModel::OmniDepth);
        let shader = shaders.program(&request)?;
        self.program = Some(ProgramInfo::resolve(device, &request.object, &shader)?);
        Ok(())
    }

    pub fn state(&self) -> ShadowPassState {
        self.state
    }

    /// Cube depth texture of the light at `index`, once rendered.
    pub fn texture(&self, index: usize) -> Option<TextureHandle> {
        self.targets.get(index).and_then(ShadowTarget::texture)
    }

    /// Renders every shadow-casting light. Returns the total draw count.
    pub fn render<D: GraphicsDevice + ?Sized>(
        &mut self,
        device: &mut D,
        lights: &mut [PointLight],
        records: &[RenderRecord],
    ) -> Result<usize> {
        self.state = ShadowPassState::Idle;
        if !lights.iter().any(|light| light.casts_shadow) {
            return Ok(0);
        }
        let program = self.program.as_ref().ok_or_else(|| {
            error!("point shadow pass used before prepare");
            RenderError::Setup {
                object: "point-shadow".to_string(),
                reason: "depth program not prepared".to_string(),
            }
        })?;

        while self.targets.len() < lights.len() {
            self.targets
                .push(ShadowTarget::new(DepthTargetKind::CubeMap, self.size));
        }

        let mut drawn = 0;
        for (light, target) in lights.iter_mut().zip(self.targets.iter_mut()) {
            if !light.casts_shadow {
                continue;
            }
            self.state = ShadowPassState::Idle;
            let transforms = light.shadow_transforms();
            self.state = ShadowPassState::CubeFacesComputed;

            target.bind(device, PASS)?;
            device.set_depth_test(true);
            device.set_depth_write(true);
            device.set_depth_func(DepthFunc::Less);
            device.set_blend(None);
            self.state = ShadowPassState::DepthBound;

            device.use_program(program.program);
            if let Some(location) = program.uniform(U_SHADOW_MATRICES) {
                device.set_uniform(location, UniformValue::Mat4Array(transforms.to_vec()));
            }
            if let Some(location) = program.uniform(U_LIGHT_POSITION) {
                device.set_uniform(location, UniformValue::Vec3(light.position));
            }
            if let Some(location) = program.uniform(U_FAR_PLANE) {
                device.set_uniform(location, UniformValue::Float(light.far_plane));
            }
            let count = draw_depth(device, program, records);
            device.bind_framebuffer(None);
            self.state = ShadowPassState::Rendered;
            debug!("point shadow pass for '{}': {count} casters", light.name);
            drawn += count;
        }
        Ok(drawn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_face_looks_down_its_axis() {
        let position = Vec3::new(1.0, 2.0, 3.0);
        let faces = cube_face_transforms(position, 0.1, 10.0);
        for ((direction, _), matrix) in CUBE_FACES.iter().zip(faces.iter()) {
            let ndc = matrix.project_point3(position + *direction * 5.0);
            assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4, "{direction:?} -> {ndc:?}");
            assert!(ndc.z > -1.0 && ndc.z < 1.0);
        }
    }

    #[test]
    fn faces_cover_a_quarter_turn() {
        let faces = cube_face_transforms(Vec3::ZERO, 0.1, 10.0);
        // A point on the 45 degree edge of the +X face lands on the clip boundary.
        let edge = faces[0].project_point3(Vec3::new(2.0, 0.0, 2.0));
        assert!((edge.x.abs() - 1.0).abs() < 1e-4);
    }
}
