use log::error;

use crate::device::{ClearFlags, DepthTarget, DepthTargetKind, GraphicsDevice, TextureHandle};
use crate::error::{RenderError, Result};

/// Lazily created depth target for one shadow map.
#[derive(Debug, Clone)]
pub struct ShadowTarget {
    kind: DepthTargetKind,
    size: u32,
    target: Option<DepthTarget>,
}

impl ShadowTarget {
    pub fn new(kind: DepthTargetKind, size: u32) -> Self {
        Self {
            kind,
            size,
            target: None,
        }
    }

    pub fn texture(&self) -> Option<TextureHandle> {
        self.target.map(|target| target.texture)
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Creates the target on first use, checks completeness and binds it for depth writes.
    pub fn bind<D: GraphicsDevice + ?Sized>(
        &mut self,
        device: &mut D,
        pass: &'static str,
    ) -> Result<DepthTarget> {
        let target = match self.target {
            Some(target) => target,
            None => {
                let target = device.create_depth_target(self.kind, self.size, self.size);
                self.target = Some(target);
                target
            }
        };

        let status = device.framebuffer_status(&target);
        if !status.is_complete() {
            error!("{pass} shadow framebuffer incomplete: {status:?}");
            return Err(RenderError::FramebufferIncomplete { pass, status });
        }

        device.bind_framebuffer(Some(target.framebuffer));
        device.viewport(self.size, self.size);
        // The main pass may leave a translucent clear depth behind.
        device.set_clear_depth(1.0);
        device.clear(ClearFlags::DEPTH);
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{FramebufferStatus, RecordingDevice};

    #[test]
    fn target_is_created_once() {
        let mut device = RecordingDevice::new();
        let mut target = ShadowTarget::new(DepthTargetKind::Texture2D, 512);
        let first = target.bind(&mut device, "directional").unwrap();
        let second = target.bind(&mut device, "directional").unwrap();
        assert_eq!(first, second);
        assert_eq!(device.state().viewport, (512, 512));
        assert_eq!(device.state().framebuffer, Some(first.framebuffer));
    }

    #[test]
    fn bind_clears_to_far_depth() {
        let mut device = RecordingDevice::new();
        device.set_clear_depth(0.25);
        let mut target = ShadowTarget::new(DepthTargetKind::Texture2D, 256);
        target.bind(&mut device, "directional").unwrap();
        assert_eq!(device.state().clear_depth, 1.0);
    }

    #[test]
    fn incomplete_target_fails_before_binding() {
        let mut device = RecordingDevice::new();
        device.set_target_status(DepthTargetKind::CubeMap, FramebufferStatus::MissingAttachment);
        let mut target = ShadowTarget::new(DepthTargetKind::CubeMap, 64);
        let err = target.bind(&mut device, "point").unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(device.state().framebuffer, None);
    }
}
