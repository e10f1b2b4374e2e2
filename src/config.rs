//! Global configuration constants and per-renderer settings.

use serde::{Deserialize, Serialize};

use crate::device::BlendMode;

/// Default viewport width in pixels.
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1280;

/// Default viewport height in pixels.
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 960;

/// Vertical field of view of the camera projection, in degrees.
pub const DEFAULT_FOV_Y_DEGREES: f32 = 60.0;

/// Camera near clip distance.
pub const DEFAULT_NEAR_PLANE: f32 = 0.1;

/// Camera far clip distance.
pub const DEFAULT_FAR_PLANE: f32 = 100.0;

/// Edge length of the square shadow depth maps.
pub const DEFAULT_SHADOW_MAP_SIZE: u32 = 1024;

/// Half-extent of the directional light's orthographic volume.
pub const DIRECTIONAL_SHADOW_EXTENT: f32 = 10.0;

/// Near plane of the directional light's orthographic volume.
pub const DIRECTIONAL_SHADOW_NEAR: f32 = 0.5;

/// Far plane of the directional light's orthographic volume.
pub const DIRECTIONAL_SHADOW_FAR: f32 = 25.0;

/// Capacity of the bounded result queue between workers and the reducer.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

/// Frame time above which a warning is logged.
pub const DEFAULT_FRAME_BUDGET_MS: f32 = 16.6;

/// How the culling sphere radius is derived from an object's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CullingRadius {
    /// Squared length of the box's max corner, tested around the object position.
    /// Kept for scenes tuned against the historic behaviour.
    SquaredMaxExtent,
    /// Half diagonal of the world-space box, tested around the box centre.
    #[default]
    BoundingSphere,
}

/// Depth-clear value programmed while a translucent record is submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TranslucentClearDepth {
    /// Clear depth stays at 1.0 for every record.
    #[default]
    Fixed,
    /// Clear depth follows the material alpha of the translucent record.
    MaterialAlpha,
}

/// Tunables for a [`crate::frame::FrameRenderer`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub fov_y_degrees: f32,
    pub near_plane: f32,
    pub far_plane: f32,
    pub shadow_map_size: u32,
    /// Dispatch transform tasks on the worker pool.
    pub parallel: bool,
    /// Worker count; 0 lets rayon decide.
    pub worker_threads: usize,
    pub queue_capacity: usize,
    pub culling_radius: CullingRadius,
    pub translucent_clear_depth: TranslucentClearDepth,
    pub blend: BlendMode,
    pub frame_budget_ms: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            fov_y_degrees: DEFAULT_FOV_Y_DEGREES,
            near_plane: DEFAULT_NEAR_PLANE,
            far_plane: DEFAULT_FAR_PLANE,
            shadow_map_size: DEFAULT_SHADOW_MAP_SIZE,
            parallel: true,
            worker_threads: 0,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            culling_radius: CullingRadius::default(),
            translucent_clear_depth: TranslucentClearDepth::default(),
            blend: BlendMode::default(),
            frame_budget_ms: DEFAULT_FRAME_BUDGET_MS,
        }
    }
}

impl RenderSettings {
    /// Width over height of the main viewport.
    pub fn aspect_ratio(&self) -> f32 {
        self.viewport_width.max(1) as f32 / self.viewport_height.max(1) as f32
    }

    /// Settings reproducing the historic culling and clear-depth behaviour.
    pub fn legacy() -> Self {
        Self {
            culling_radius: CullingRadius::SquaredMaxExtent,
            translucent_clear_depth: TranslucentClearDepth::MaterialAlpha,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_ratio_uses_float_division() {
        let settings = RenderSettings::default();
        assert!((settings.aspect_ratio() - 1280.0 / 960.0).abs() < 1e-6);
    }

    #[test]
    fn legacy_preset_switches_both_policies() {
        let settings = RenderSettings::legacy();
        assert_eq!(settings.culling_radius, CullingRadius::SquaredMaxExtent);
        assert_eq!(
            settings.translucent_clear_depth,
            TranslucentClearDepth::MaterialAlpha
        );
        assert_eq!(settings.queue_capacity, DEFAULT_QUEUE_CAPACITY);
    }
}
