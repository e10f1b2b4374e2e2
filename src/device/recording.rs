//! Headless device that records the command stream.
//!
//! Used by tests, the benches and the headless demo. Every draw is stamped
//! with the device state, bound textures and uniform values active at the
//! moment of submission.

use std::collections::{BTreeMap, HashMap, HashSet};

use log::trace;

use crate::core::types::VertexData;
use crate::device::{
    BlendMode, ClearFlags, DepthFunc, DepthTarget, DepthTargetKind, DrawMode, FramebufferHandle,
    FramebufferStatus, GpuBuffers, GraphicsDevice, ProgramHandle, ProgramInfo, TextureHandle,
    UniformValue, VertexArrayHandle,
};

/// Fixed-function state tracked by the recording device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceState {
    pub depth_test: bool,
    pub depth_write: bool,
    pub depth_func: DepthFunc,
    pub blend: Option<BlendMode>,
    pub clear_depth: f32,
    pub face_culling: bool,
    pub framebuffer: Option<FramebufferHandle>,
    pub viewport: (u32, u32),
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            depth_test: false,
            depth_write: true,
            depth_func: DepthFunc::Less,
            blend: None,
            clear_depth: 1.0,
            face_culling: false,
            framebuffer: None,
            viewport: (0, 0),
        }
    }
}

/// One captured draw submission.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub mode: DrawMode,
    pub count: u32,
    pub program: Option<ProgramHandle>,
    pub vertex_array: Option<VertexArrayHandle>,
    pub state: DeviceState,
    pub textures: BTreeMap<u32, TextureHandle>,
    pub uniforms: BTreeMap<String, UniformValue>,
}

impl DrawCall {
    pub fn uniform(&self, name: &str) -> Option<&UniformValue> {
        self.uniforms.get(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    UploadBuffers(VertexArrayHandle),
    CreateDepthTarget(DepthTarget),
    BindFramebuffer(Option<FramebufferHandle>),
    Viewport(u32, u32),
    Clear(ClearFlags),
    SetClearDepth(f32),
    SetDepthTest(bool),
    SetDepthWrite(bool),
    SetDepthFunc(DepthFunc),
    SetBlend(Option<BlendMode>),
    SetFaceCulling(bool),
    UseProgram(ProgramHandle),
    SetUniform { location: i32, value: UniformValue },
    BindTexture { texture: TextureHandle, unit: u32 },
    BindCubeTexture { texture: TextureHandle, unit: u32 },
    UnbindTexture(TextureHandle),
    BindVertexArray(VertexArrayHandle),
    UnbindVertexArray,
    Draw(DrawCall),
}

#[derive(Debug, Default)]
pub struct RecordingDevice {
    state: DeviceState,
    commands: Vec<DeviceCommand>,
    next_handle: u32,
    locations: HashMap<String, i32>,
    location_names: HashMap<i32, String>,
    hidden: HashSet<String>,
    target_status: HashMap<DepthTargetKind, FramebufferStatus>,
    program: Option<ProgramHandle>,
    vertex_array: Option<VertexArrayHandle>,
    textures: BTreeMap<u32, TextureHandle>,
    uniform_values: HashMap<ProgramHandle, BTreeMap<String, UniformValue>>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes attribute and uniform lookups for `name` fail.
    pub fn hide_name(&mut self, name: &str) {
        self.hidden.insert(name.to_string());
    }

    /// Forces the completeness status reported for targets of `kind`.
    pub fn set_target_status(&mut self, kind: DepthTargetKind, status: FramebufferStatus) {
        self.target_status.insert(kind, status);
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    pub fn commands(&self) -> &[DeviceCommand] {
        &self.commands
    }

    pub fn draws(&self) -> impl Iterator<Item = &DrawCall> + '_ {
        self.commands.iter().filter_map(|command| match command {
            DeviceCommand::Draw(call) => Some(call),
            _ => None,
        })
    }

    /// Draws issued while `framebuffer` was bound.
    pub fn draws_into(
        &self,
        framebuffer: Option<FramebufferHandle>,
    ) -> impl Iterator<Item = &DrawCall> + '_ {
        self.draws()
            .filter(move |call| call.state.framebuffer == framebuffer)
    }

    /// Drops the recorded stream, keeping state and handles.
    pub fn clear_log(&mut self) {
        self.commands.clear();
    }

    pub fn uniform_name(&self, location: i32) -> Option<&str> {
        self.location_names.get(&location).map(String::as_str)
    }

    fn allocate(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }

    fn location(&mut self, name: &str) -> Option<i32> {
        if self.hidden.contains(name) {
            return None;
        }
        if let Some(location) = self.locations.get(name) {
            return Some(*location);
        }
        let location = self.locations.len() as i32;
        self.locations.insert(name.to_string(), location);
        self.location_names.insert(location, name.to_string());
        Some(location)
    }

    fn record(&mut self, command: DeviceCommand) {
        trace!("device: {command:?}");
        self.commands.push(command);
    }

    fn record_draw(&mut self, mode: DrawMode, count: u32) {
        let uniforms = self
            .program
            .and_then(|program| self.uniform_values.get(&program).cloned())
            .unwrap_or_default();
        let call = DrawCall {
            mode,
            count,
            program: self.program,
            vertex_array: self.vertex_array,
            state: self.state,
            textures: self.textures.clone(),
            uniforms,
        };
        self.record(DeviceCommand::Draw(call));
    }
}

impl GraphicsDevice for RecordingDevice {
    fn name(&self) -> &str {
        "recording"
    }

    fn attribute_location(&mut self, _program: ProgramHandle, name: &str) -> Option<u32> {
        self.location(name).map(|location| location as u32)
    }

    fn uniform_location(&mut self, _program: ProgramHandle, name: &str) -> Option<i32> {
        self.location(name)
    }

    fn create_vertex_buffers(&mut self, _program: &ProgramInfo, data: &VertexData) -> GpuBuffers {
        let vertex_array = VertexArrayHandle(self.allocate());
        self.record(DeviceCommand::UploadBuffers(vertex_array));
        GpuBuffers {
            vertex_array,
            vertex_count: data.vertex_count() as u32,
            index_count: data.indices.len() as u32,
        }
    }

    fn create_depth_target(
        &mut self,
        kind: DepthTargetKind,
        width: u32,
        height: u32,
    ) -> DepthTarget {
        let target = DepthTarget {
            framebuffer: FramebufferHandle(self.allocate()),
            texture: TextureHandle(self.allocate()),
            kind,
            width,
            height,
        };
        self.record(DeviceCommand::CreateDepthTarget(target));
        target
    }

    fn framebuffer_status(&mut self, target: &DepthTarget) -> FramebufferStatus {
        self.target_status
            .get(&target.kind)
            .copied()
            .unwrap_or(FramebufferStatus::Complete)
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferHandle>) {
        self.state.framebuffer = framebuffer;
        self.record(DeviceCommand::BindFramebuffer(framebuffer));
    }

    fn viewport(&mut self, width: u32, height: u32) {
        self.state.viewport = (width, height);
        self.record(DeviceCommand::Viewport(width, height));
    }

    fn clear(&mut self, flags: ClearFlags) {
        self.record(DeviceCommand::Clear(flags));
    }

    fn set_clear_depth(&mut self, depth: f32) {
        self.state.clear_depth = depth;
        self.record(DeviceCommand::SetClearDepth(depth));
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.state.depth_test = enabled;
        self.record(DeviceCommand::SetDepthTest(enabled));
    }

    fn set_depth_write(&mut self, enabled: bool) {
        self.state.depth_write = enabled;
        self.record(DeviceCommand::SetDepthWrite(enabled));
    }

    fn set_depth_func(&mut self, func: DepthFunc) {
        self.state.depth_func = func;
        self.record(DeviceCommand::SetDepthFunc(func));
    }

    fn set_blend(&mut self, mode: Option<BlendMode>) {
        self.state.blend = mode;
        self.record(DeviceCommand::SetBlend(mode));
    }

    fn set_face_culling(&mut self, enabled: bool) {
        self.state.face_culling = enabled;
        self.record(DeviceCommand::SetFaceCulling(enabled));
    }

    fn use_program(&mut self, program: ProgramHandle) {
        self.program = Some(program);
        self.record(DeviceCommand::UseProgram(program));
    }

    fn set_uniform(&mut self, location: i32, value: UniformValue) {
        if let (Some(program), Some(name)) = (self.program, self.location_names.get(&location)) {
            self.uniform_values
                .entry(program)
                .or_default()
                .insert(name.clone(), value.clone());
        }
        self.record(DeviceCommand::SetUniform { location, value });
    }

    fn bind_texture(&mut self, texture: TextureHandle, unit: u32) {
        self.textures.insert(unit, texture);
        self.record(DeviceCommand::BindTexture { texture, unit });
    }

    fn bind_cube_texture(&mut self, texture: TextureHandle, unit: u32) {
        self.textures.insert(unit, texture);
        self.record(DeviceCommand::BindCubeTexture { texture, unit });
    }

    fn unbind_texture(&mut self, texture: TextureHandle) {
        self.textures.retain(|_, bound| *bound != texture);
        self.record(DeviceCommand::UnbindTexture(texture));
    }

    fn bind_vertex_array(&mut self, vertex_array: VertexArrayHandle) {
        self.vertex_array = Some(vertex_array);
        self.record(DeviceCommand::BindVertexArray(vertex_array));
    }

    fn draw_indexed(&mut self, index_count: u32) {
        self.record_draw(DrawMode::Indexed, index_count);
    }

    fn draw_arrays(&mut self, vertex_count: u32) {
        self.record_draw(DrawMode::Arrays, vertex_count);
    }

    fn unbind_vertex_array(&mut self) {
        self.vertex_array = None;
        self.record(DeviceCommand::UnbindVertexArray);
    }
}
