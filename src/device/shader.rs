//! Shader provider seam and program location tables.

use std::collections::{BTreeMap, HashMap};

use log::{debug, error, warn};
use serde::{Deserialize, Serialize};

use crate::device::{GraphicsDevice, ProgramHandle};
use crate::error::{RenderError, Result};

pub const ATTR_POSITION: &str = "aPosition";
pub const ATTR_NORMAL: &str = "aNormal";
pub const ATTR_UV: &str = "aUV";

pub const U_PROJECTION: &str = "uProjectionMatrix";
pub const U_VIEW: &str = "uViewMatrix";
pub const U_MODEL: &str = "uModelMatrix";
pub const U_CAMERA_POSITION: &str = "cameraPosition";
pub const U_NUM_LIGHTS: &str = "numLights";
pub const U_DIFFUSE: &str = "diffuseVal";
pub const U_AMBIENT: &str = "ambientVal";
pub const U_SPECULAR: &str = "specularVal";
pub const U_SHININESS: &str = "nVal";
pub const U_ALPHA: &str = "alpha";
pub const U_DIFFUSE_TEXTURE: &str = "uDiffuseTexture";
pub const U_NORMAL_TEXTURE: &str = "uNormalTexture";
pub const U_LIGHT_SPACE: &str = "uLightSpaceMatrix";
pub const U_SHADOW_MAP: &str = "uShadowMap";
pub const U_POINT_SHADOW_MAP: &str = "uPointShadowMap";
pub const U_SHADOW_MATRICES: &str = "shadowMatrices";
pub const U_LIGHT_POSITION: &str = "lightPos";
pub const U_FAR_PLANE: &str = "farPlane";

/// Attributes whose absence makes a program unusable.
const MANDATORY_ATTRIBUTES: [&str; 2] = [ATTR_POSITION, ATTR_NORMAL];

/// Lighting model selected by a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum ShadingModel {
    /// Flat colour, positions only.
    #[default]
    Basic,
    /// Blinn-Phong without textures.
    Blinn,
    /// Blinn-Phong with a diffuse texture.
    BlinnDiffuseTexture,
    /// Blinn-Phong with diffuse and normal textures.
    BlinnDiffuseNormal,
    /// Caller-supplied sources set through `set_shader`.
    Custom,
    /// Depth-only program for directional shadow maps.
    DirectionalDepth,
    /// Depth-only program writing linear distance into a cube map.
    OmniDepth,
}

/// Vertex and fragment source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSources {
    /// Rejects blank sources.
    pub fn new(object: &str, vertex: &str, fragment: &str) -> Result<Self> {
        if vertex.trim().is_empty() || fragment.trim().is_empty() {
            return Err(RenderError::BlankShader(object.to_string()));
        }
        Ok(Self {
            vertex: vertex.to_string(),
            fragment: fragment.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShaderRequest {
    pub object: String,
    pub model: ShadingModel,
    pub sources: Option<ShaderSources>,
}

impl ShaderRequest {
    pub fn builtin(object: impl Into<String>, model: ShadingModel) -> Self {
        Self {
            object: object.into(),
            model,
            sources: None,
        }
    }
}

/// Compiled program plus the names it declares.
///
/// The bool in each table marks the name as required.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShaderProgram {
    pub handle: ProgramHandle,
    pub attributes: BTreeMap<String, bool>,
    pub uniforms: BTreeMap<String, bool>,
}

/// Supplies compiled programs. Compilation itself happens outside this crate.
pub trait ShaderProvider {
    fn program(&mut self, request: &ShaderRequest) -> Result<ShaderProgram>;
}

/// Program handle with resolved attribute and uniform locations.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgramInfo {
    pub program: ProgramHandle,
    pub attributes: BTreeMap<String, u32>,
    pub uniforms: BTreeMap<String, i32>,
}

impl ProgramInfo {
    /// Resolves every declared name against the device.
    ///
    /// A missing required position or normal attribute fails setup; any other
    /// missing required name is reported and skipped.
    pub fn resolve<D: GraphicsDevice + ?Sized>(
        device: &mut D,
        object: &str,
        shader: &ShaderProgram,
    ) -> Result<Self> {
        let mut info = Self {
            program: shader.handle,
            ..Self::default()
        };
        let mut missing = Vec::new();

        for (name, required) in &shader.attributes {
            match device.attribute_location(shader.handle, name) {
                Some(location) => {
                    info.attributes.insert(name.clone(), location);
                }
                None if *required && MANDATORY_ATTRIBUTES.contains(&name.as_str()) => {
                    error!("'{object}': mandatory attribute '{name}' not found in program");
                    return Err(RenderError::MissingAttribute {
                        object: object.to_string(),
                        attribute: name.clone(),
                    });
                }
                None if *required => missing.push(name.clone()),
                None => {}
            }
        }

        for (name, required) in &shader.uniforms {
            match device.uniform_location(shader.handle, name) {
                Some(location) => {
                    info.uniforms.insert(name.clone(), location);
                }
                None if *required => missing.push(name.clone()),
                None => {}
            }
        }

        if !missing.is_empty() {
            warn!(
                "'{object}': one or more uniforms or attributes cannot be found in the shader: {}",
                missing.join(", ")
            );
        }
        Ok(info)
    }

    pub fn attribute(&self, name: &str) -> Option<u32> {
        self.attributes.get(name).copied()
    }

    pub fn uniform(&self, name: &str) -> Option<i32> {
        self.uniforms.get(name).copied()
    }
}

/// Table-driven provider for the built-in shading models.
///
/// Built-in programs are shared per model; custom sources get a fresh handle
/// per request.
#[derive(Debug, Default)]
pub struct BuiltinShaderProvider {
    next_handle: u32,
    cache: HashMap<ShadingModel, ProgramHandle>,
}

impl BuiltinShaderProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> ProgramHandle {
        self.next_handle += 1;
        ProgramHandle(self.next_handle)
    }

    /// Names declared by a shading model.
    pub fn declarations(model: ShadingModel) -> (Vec<&'static str>, Vec<&'static str>) {
        const LIT: [&str; 11] = [
            U_PROJECTION,
            U_VIEW,
            U_MODEL,
            U_CAMERA_POSITION,
            U_NUM_LIGHTS,
            U_DIFFUSE,
            U_AMBIENT,
            U_SPECULAR,
            U_SHININESS,
            U_ALPHA,
            U_LIGHT_SPACE,
        ];
        match model {
            ShadingModel::Basic => (
                vec![ATTR_POSITION],
                vec![U_PROJECTION, U_VIEW, U_MODEL, U_DIFFUSE, U_ALPHA],
            ),
            ShadingModel::Blinn => (vec![ATTR_POSITION, ATTR_NORMAL], LIT.to_vec()),
            ShadingModel::BlinnDiffuseTexture | ShadingModel::Custom => {
                let mut uniforms = LIT.to_vec();
                uniforms.push(U_DIFFUSE_TEXTURE);
                (vec![ATTR_POSITION, ATTR_NORMAL, ATTR_UV], uniforms)
            }
            ShadingModel::BlinnDiffuseNormal => {
                let mut uniforms = LIT.to_vec();
                uniforms.extend([U_DIFFUSE_TEXTURE, U_NORMAL_TEXTURE]);
                (vec![ATTR_POSITION, ATTR_NORMAL, ATTR_UV], uniforms)
            }
            ShadingModel::DirectionalDepth => (vec![ATTR_POSITION], vec![U_LIGHT_SPACE, U_MODEL]),
            ShadingModel::OmniDepth => (
                vec![ATTR_POSITION],
                vec![U_MODEL, U_SHADOW_MATRICES, U_LIGHT_POSITION, U_FAR_PLANE],
            ),
        }
    }
}

impl ShaderProvider for BuiltinShaderProvider {
    fn program(&mut self, request: &ShaderRequest) -> Result<ShaderProgram> {
        let handle = if request.model == ShadingModel::Custom {
            if request.sources.is_none() {
                return Err(RenderError::Setup {
                    object: request.object.clone(),
                    reason: "custom shading requires shader sources".to_string(),
                });
            }
            self.allocate()
        } else if let Some(handle) = self.cache.get(&request.model) {
            *handle
        } else {
            let handle = self.allocate();
            self.cache.insert(request.model, handle);
            handle
        };

        let (attributes, uniforms) = Self::declarations(request.model);
        debug!(
            "program {:?} for '{}' ({:?})",
            handle, request.object, request.model
        );
        Ok(ShaderProgram {
            handle,
            attributes: attributes.into_iter().map(|n| (n.to_string(), true)).collect(),
            uniforms: uniforms.into_iter().map(|n| (n.to_string(), true)).collect(),
        })
    }
}
