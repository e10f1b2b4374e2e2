//! Orthographic shadow map for the directional light.

use glam::{Mat4, Vec3};
use log::{debug, error};

use crate::config::{DIRECTIONAL_SHADOW_EXTENT, DIRECTIONAL_SHADOW_FAR, DIRECTIONAL_SHADOW_NEAR};
use crate::core::lights::DirectionalLight;
use crate::device::shader::U_LIGHT_SPACE;
use crate::device::{
    BlendMode, DepthFunc, DepthTargetKind, GraphicsDevice, ProgramInfo, ShaderProvider,
    ShaderRequest, ShadingModel, TextureHandle, UniformValue,
};
use crate::error::{RenderError, Result};
use crate::pipeline::RenderRecord;
use crate::shadows::{draw_depth, ShadowPassState, ShadowTarget};
use crate::utils::math::nearly_parallel;

const PASS: &str = "directional";

/// Fixed-extent orthographic projection times the light's look-at view.
///
/// The view looks from `position` along `direction`; the up vector switches
/// to +Z when the direction is (anti)parallel to +Y.
pub fn light_space_matrix(position: Vec3, direction: Vec3) -> Mat4 {
    let up = if nearly_parallel(direction, Vec3::Y, 1e-4) {
        Vec3::Z
    } else {
        Vec3::Y
    };
    let view = Mat4::look_at_rh(position, position + direction, up);
    let projection = Mat4::orthographic_rh_gl(
        -DIRECTIONAL_SHADOW_EXTENT,
        DIRECTIONAL_SHADOW_EXTENT,
        -DIRECTIONAL_SHADOW_EXTENT,
        DIRECTIONAL_SHADOW_EXTENT,
        DIRECTIONAL_SHADOW_NEAR,
        DIRECTIONAL_SHADOW_FAR,
    );
    projection * view
}

#[derive(Debug)]
pub struct DirectionalShadowPass {
    target: ShadowTarget,
    program: Option<ProgramInfo>,
    state: ShadowPassState,
}

impl DirectionalShadowPass {
    pub fn new(size: u32) -> Self {
        Self {
            target: ShadowTarget::new(DepthTargetKind::Texture2D, size),
            program: None,
            state: ShadowPassState::Idle,
        }
    }

    /// Resolves the depth program.
    pub fn prepare<D: GraphicsDevice + ?Sized>(
        &mut self,
        device: &mut D,
        shaders: &mut dyn ShaderProvider,
    ) -> Result<()> {
        let request = ShaderRequest::builtin("directional-shadow", ShadingModel::DirectionalDepth);
        let shader = shaders.program(&request)?;
        self.program = Some(ProgramInfo::resolve(device, &request.object, &shader)?);
        Ok(())
    }

    pub fn state(&self) -> ShadowPassState {
        self.state
    }

    /// Depth texture sampled by the main pass.
    pub fn texture(&self) -> Option<TextureHandle> {
        self.target.texture()
    }

    /// Renders `records` into the light's depth map. Returns the draw count.
    pub fn render<D: GraphicsDevice + ?Sized>(
        &mut self,
        device: &mut D,
        light: &mut DirectionalLight,
        records: &[RenderRecord],
    ) -> Result<usize> {
        self.state = ShadowPassState::Idle;
        let program = self.program.as_ref().ok_or_else(|| {
            error!("directional shadow pass used before prepare");
            RenderError::Setup {
                object: "directional-shadow".to_string(),
                reason: "depth program not prepared".to_string(),
            }
        })?;

        let light_space = light.update_light_space();
        self.state = ShadowPassState::LightSpaceComputed;

        self.target.bind(device, PASS)?;
        device.set_depth_test(true);
        device.set_depth_write(true);
        device.set_depth_func(DepthFunc::Less);
        device.set_blend(None::<BlendMode>);
        self.state = ShadowPassState::DepthBound;

        device.use_program(program.program);
        if let Some(location) = program.uniform(U_LIGHT_SPACE) {
            device.set_uniform(location, UniformValue::Mat4(light_space));
        }
        let drawn = draw_depth(device, program, records);
        device.bind_framebuffer(None);
        self.state = ShadowPassState::Rendered;
        debug!("directional shadow pass for '{}': {drawn} casters", light.name);
        Ok(drawn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn light_space_centers_the_look_direction() {
        let position = Vec3::new(0.0, 10.0, 0.0);
        let m = light_space_matrix(position, Vec3::new(0.0, -1.0, 0.0));
        let clip = m * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!(clip.x.abs() < 1e-5 && clip.y.abs() < 1e-5);
        // Ten units along the direction lands inside the depth range.
        assert!(clip.z.abs() <= clip.w);
    }

    #[test]
    fn vertical_direction_does_not_degenerate() {
        let m = light_space_matrix(Vec3::ZERO, Vec3::NEG_Y);
        assert!(m.is_finite());
        let m = light_space_matrix(Vec3::ZERO, Vec3::new(1.0, -1.0, 0.0));
        assert!(m.is_finite());
    }

    #[test]
    fn render_before_prepare_is_an_error() {
        let mut device = crate::device::RecordingDevice::new();
        let mut pass = DirectionalShadowPass::new(64);
        let mut light = DirectionalLight::new("sun", Vec3::Y * 5.0, Vec3::NEG_Y);
        assert!(pass.render(&mut device, &mut light, &[]).is_err());
        assert_eq!(pass.state(), ShadowPassState::Idle);
    }
}
