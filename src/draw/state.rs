//! Opaque/translucent device state applied before each main-pass draw.

use crate::config::{RenderSettings, TranslucentClearDepth};
use crate::core::types::Material;
use crate::device::{BlendMode, DepthFunc, GraphicsDevice};

/// Fixed-function state for one record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderState {
    pub depth_test: bool,
    pub depth_write: bool,
    pub depth_func: DepthFunc,
    pub blend: Option<BlendMode>,
    pub clear_depth: f32,
}

impl RenderState {
    /// Depth tested and written, no blending.
    pub fn opaque() -> Self {
        Self {
            depth_test: true,
            depth_write: true,
            depth_func: DepthFunc::LessEqual,
            blend: None,
            clear_depth: 1.0,
        }
    }

    /// Blended with depth testing off.
    pub fn translucent(alpha: f32, settings: &RenderSettings) -> Self {
        let clear_depth = match settings.translucent_clear_depth {
            TranslucentClearDepth::Fixed => 1.0,
            TranslucentClearDepth::MaterialAlpha => alpha,
        };
        Self {
            depth_test: false,
            blend: Some(settings.blend),
            clear_depth,
            ..Self::opaque()
        }
    }

    pub fn for_material(material: &Material, settings: &RenderSettings) -> Self {
        if material.is_translucent() {
            Self::translucent(material.alpha, settings)
        } else {
            Self::opaque()
        }
    }

    pub fn is_blended(&self) -> bool {
        self.blend.is_some()
    }

    pub fn apply<D: GraphicsDevice + ?Sized>(&self, device: &mut D) {
        device.set_depth_test(self.depth_test);
        device.set_depth_write(self.depth_write);
        device.set_depth_func(self.depth_func);
        device.set_blend(self.blend);
        device.set_clear_depth(self.clear_depth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::RecordingDevice;

    #[test]
    fn opaque_material_tests_and_writes_depth() {
        let state = RenderState::for_material(&Material::default(), &RenderSettings::default());
        assert_eq!(state, RenderState::opaque());
        assert_eq!(state.depth_func, DepthFunc::LessEqual);
        assert!(!state.is_blended());
    }

    #[test]
    fn translucent_material_blends_without_depth_test() {
        let material = Material::default().with_alpha(0.4);
        let state = RenderState::for_material(&material, &RenderSettings::default());
        assert!(!state.depth_test);
        assert_eq!(state.blend, Some(BlendMode::default()));
        assert_eq!(state.clear_depth, 1.0);

        let legacy = RenderState::for_material(&material, &RenderSettings::legacy());
        assert!((legacy.clear_depth - 0.4).abs() < 1e-6);
    }

    #[test]
    fn apply_programs_every_field() {
        let mut device = RecordingDevice::new();
        let state = RenderState::translucent(0.25, &RenderSettings::legacy());
        state.apply(&mut device);
        let active = device.state();
        assert!(!active.depth_test);
        assert!(active.blend.is_some());
        assert_eq!(active.clear_depth, 0.25);
    }
}
