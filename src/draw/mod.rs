//! Draw ordering and per-record device state for the main pass.

pub mod order;
pub mod state;

pub use order::{draw_order, sort_back_to_front};
pub use state::RenderState;

/// Texture unit of the material's diffuse map.
pub const DIFFUSE_TEXTURE_UNIT: u32 = 0;

/// Texture unit of the material's normal map.
pub const NORMAL_TEXTURE_UNIT: u32 = 1;

/// Texture unit of the directional shadow map.
pub const SHADOW_MAP_UNIT: u32 = 2;

/// Texture unit of the first point light's cube shadow map.
pub const POINT_SHADOW_MAP_UNIT: u32 = 3;
