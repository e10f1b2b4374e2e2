//! Per-frame orchestration.
//!
//! A frame runs on the thread that owns the device: transform pipeline,
//! contact count, shadow passes, then the sorted and culled main pass.

use std::time::Instant;

use glam::Mat4;
use log::{debug, error, trace};

use crate::config::RenderSettings;
use crate::core::lights::PointLight;
use crate::culling::{CullingStats, ViewCuller};
use crate::device::shader::{
    U_ALPHA, U_AMBIENT, U_CAMERA_POSITION, U_DIFFUSE, U_DIFFUSE_TEXTURE, U_FAR_PLANE,
    U_LIGHT_SPACE, U_MODEL, U_NORMAL_TEXTURE, U_NUM_LIGHTS, U_POINT_SHADOW_MAP, U_PROJECTION,
    U_SHADOW_MAP, U_SHININESS, U_SPECULAR, U_VIEW,
};
use crate::device::{
    ClearFlags, DrawMode, GraphicsDevice, ProgramHandle, ShaderProvider, TextureHandle,
    UniformValue,
};
use crate::draw::{
    self, RenderState, DIFFUSE_TEXTURE_UNIT, NORMAL_TEXTURE_UNIT, POINT_SHADOW_MAP_UNIT,
    SHADOW_MAP_UNIT,
};
use crate::error::Result;
use crate::pipeline::{FrameSnapshot, RenderRecord, TaskFailure, TransformPipeline};
use crate::scene::{Contact, Scene};
use crate::shadows::{DirectionalShadowPass, PointShadowPass};
use crate::utils::logging::warn_if_frame_budget_exceeded;
use crate::utils::profiling::{FrameProfiler, StageTimer};

/// What happened during one frame.
#[derive(Debug, Clone, Default)]
pub struct FrameStats {
    pub frame_index: u64,
    pub dispatched: usize,
    pub collected: usize,
    pub failures: Vec<TaskFailure>,
    pub culling: CullingStats,
    pub rendered: usize,
    /// Depth submissions across all shadow passes.
    pub shadow_casters: usize,
    /// Intersecting pairs among colliding objects.
    pub contacts: Vec<Contact>,
    pub profile: FrameProfiler,
}

impl FrameStats {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn culled(&self) -> usize {
        self.culling.culled()
    }
}

/// Shadow maps sampled by the main pass.
#[derive(Debug, Clone, Copy, Default)]
struct ShadowInputs {
    directional: Option<TextureHandle>,
    light_space: Option<Mat4>,
    point: Option<(TextureHandle, f32)>,
}

/// Owns the per-frame machinery; the scene and device are lent to each frame.
#[derive(Debug)]
pub struct FrameRenderer {
    settings: RenderSettings,
    pipeline: TransformPipeline,
    directional: DirectionalShadowPass,
    point: PointShadowPass,
    profiler: FrameProfiler,
    frame_index: u64,
}

impl FrameRenderer {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            pipeline: TransformPipeline::new(&settings),
            directional: DirectionalShadowPass::new(settings.shadow_map_size),
            point: PointShadowPass::new(settings.shadow_map_size),
            profiler: FrameProfiler::default(),
            frame_index: 0,
            settings,
        }
    }

    /// Resolves the depth programs of both shadow passes.
    pub fn prepare<D: GraphicsDevice + ?Sized>(
        &mut self,
        device: &mut D,
        shaders: &mut dyn ShaderProvider,
    ) -> Result<()> {
        self.directional.prepare(device, shaders)?;
        self.point.prepare(device, shaders)?;
        debug!("frame renderer prepared on '{}'", device.name());
        Ok(())
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn pipeline(&self) -> &TransformPipeline {
        &self.pipeline
    }

    pub fn pipeline_mut(&mut self) -> &mut TransformPipeline {
        &mut self.pipeline
    }

    pub fn directional_pass(&self) -> &DirectionalShadowPass {
        &self.directional
    }

    pub fn point_pass(&self) -> &PointShadowPass {
        &self.point
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Renders one frame of `scene`.
    ///
    /// Objects whose transform task fails are left out and reported in
    /// [`FrameStats::failures`]. An incomplete shadow target aborts the frame
    /// before anything is drawn to the window. An aborted frame leaves object
    /// positions, the frame index and the published view untouched, so it can
    /// be retried; only the cached world matrices reflect the attempt.
    pub fn render<D: GraphicsDevice + ?Sized>(
        &mut self,
        scene: &mut Scene,
        device: &mut D,
    ) -> Result<FrameStats> {
        let frame_start = Instant::now();
        self.profiler.reset();

        let snapshot = FrameSnapshot::new(&scene.camera, &self.settings);
        let frame = {
            let _timer = StageTimer::new("transform pipeline", &mut self.profiler.transform_time);
            self.pipeline.run(scene.objects_mut(), &snapshot)
        };
        self.profiler.worker_busy_time = self.pipeline.busy_time();
        self.profiler.object_count = frame.dispatched;

        let contacts = scene.contacts();
        for contact in &contacts {
            trace!("contact: '{}' and '{}'", contact.first, contact.second);
        }

        let mut shadow_casters = 0;
        let shadows = {
            let _timer = StageTimer::new("shadow passes", &mut self.profiler.shadow_time);
            let mut inputs = ShadowInputs::default();

            if let Some(light) = scene.directional_light.as_mut() {
                shadow_casters += self
                    .directional
                    .render(device, light, &frame.records)
                    .inspect_err(|err| error!("frame {} aborted: {err}", self.frame_index))?;
                inputs.directional = self.directional.texture();
                inputs.light_space = Some(light.light_space_matrix);
            }

            shadow_casters += self
                .point
                .render(device, &mut scene.point_lights, &frame.records)
                .inspect_err(|err| error!("frame {} aborted: {err}", self.frame_index))?;
            inputs.point = scene
                .point_lights
                .iter()
                .enumerate()
                .filter(|(_, light)| light.casts_shadow)
                .find_map(|(index, light)| {
                    self.point.texture(index).map(|texture| (texture, light.far_plane))
                });
            inputs
        };

        let collected = frame.collected();
        let mut records = frame.records;
        let (culling, rendered) = {
            let _timer = StageTimer::new("main pass", &mut self.profiler.main_pass_time);
            draw::sort_back_to_front(&mut records);
            Self::main_pass(
                &self.settings,
                device,
                &snapshot,
                &records,
                &scene.point_lights,
                shadows,
            )
        };
        self.profiler.rendered_count = rendered;

        scene.publish_frame(snapshot.view_matrix);
        scene.apply_forces();
        self.profiler.total_frame_time = frame_start.elapsed();
        if warn_if_frame_budget_exceeded(
            self.profiler.total_frame_time,
            self.settings.frame_budget_ms,
        ) {
            self.profiler.report();
        }

        let stats = FrameStats {
            frame_index: self.frame_index,
            dispatched: frame.dispatched,
            collected,
            failures: frame.failures,
            culling,
            rendered,
            shadow_casters,
            contacts,
            profile: self.profiler,
        };
        self.frame_index += 1;
        debug!(
            "frame {}: {} rendered, {} culled, {} failed",
            stats.frame_index,
            stats.rendered,
            stats.culled(),
            stats.failed()
        );
        Ok(stats)
    }

    fn main_pass<D: GraphicsDevice + ?Sized>(
        settings: &RenderSettings,
        device: &mut D,
        snapshot: &FrameSnapshot,
        records: &[RenderRecord],
        lights: &[PointLight],
        shadows: ShadowInputs,
    ) -> (CullingStats, usize) {
        device.bind_framebuffer(None);
        device.viewport(settings.viewport_width, settings.viewport_height);
        // Planes are single quads seen from both sides.
        device.set_face_culling(false);
        device.set_clear_depth(1.0);
        device.clear(ClearFlags::COLOR_DEPTH);

        if let Some(texture) = shadows.directional {
            device.bind_texture(texture, SHADOW_MAP_UNIT);
        }
        if let Some((texture, _)) = shadows.point {
            device.bind_cube_texture(texture, POINT_SHADOW_MAP_UNIT);
        }

        let mut culler = ViewCuller::new(
            snapshot.view_matrix,
            snapshot.projection_matrix,
            settings.culling_radius,
        );
        let mut rendered = 0;
        for record in records {
            if !culler.is_visible(record) {
                continue;
            }

            let material = &record.material;
            if let Some(texture) = material.diffuse_texture {
                device.bind_texture(texture, DIFFUSE_TEXTURE_UNIT);
            }
            if let Some(texture) = material.normal_texture {
                device.bind_texture(texture, NORMAL_TEXTURE_UNIT);
            }

            RenderState::for_material(material, settings).apply(device);

            let program = record.program;
            device.use_program(program);
            set_uniform(device, program, U_PROJECTION, UniformValue::Mat4(record.projection_matrix));
            set_uniform(device, program, U_VIEW, UniformValue::Mat4(record.view_matrix));
            set_uniform(device, program, U_MODEL, UniformValue::Mat4(record.model_matrix));
            set_uniform(device, program, U_CAMERA_POSITION, UniformValue::Vec3(record.camera_position));
            set_uniform(device, program, U_DIFFUSE, UniformValue::Vec3(material.diffuse));
            set_uniform(device, program, U_AMBIENT, UniformValue::Vec3(material.ambient));
            set_uniform(device, program, U_SPECULAR, UniformValue::Vec3(material.specular));
            set_uniform(device, program, U_SHININESS, UniformValue::Float(material.shininess));
            set_uniform(device, program, U_ALPHA, UniformValue::Float(material.alpha));
            if material.diffuse_texture.is_some() {
                set_uniform(device, program, U_DIFFUSE_TEXTURE, UniformValue::Int(DIFFUSE_TEXTURE_UNIT as i32));
            }
            if material.normal_texture.is_some() {
                set_uniform(device, program, U_NORMAL_TEXTURE, UniformValue::Int(NORMAL_TEXTURE_UNIT as i32));
            }
            if let Some(light_space) = shadows.light_space {
                set_uniform(device, program, U_LIGHT_SPACE, UniformValue::Mat4(light_space));
                set_uniform(device, program, U_SHADOW_MAP, UniformValue::Int(SHADOW_MAP_UNIT as i32));
            }
            if let Some((_, far_plane)) = shadows.point {
                set_uniform(device, program, U_POINT_SHADOW_MAP, UniformValue::Int(POINT_SHADOW_MAP_UNIT as i32));
                set_uniform(device, program, U_FAR_PLANE, UniformValue::Float(far_plane));
            }
            upload_lights(device, program, lights);

            device.bind_vertex_array(record.buffers.vertex_array);
            match record.draw_mode {
                DrawMode::Indexed => device.draw_indexed(record.buffers.index_count),
                DrawMode::Arrays => device.draw_arrays(record.buffers.vertex_count),
            }
            device.unbind_vertex_array();

            if let Some(texture) = material.diffuse_texture {
                device.unbind_texture(texture);
            }
            if let Some(texture) = material.normal_texture {
                device.unbind_texture(texture);
            }
            rendered += 1;
        }

        if let Some(texture) = shadows.directional {
            device.unbind_texture(texture);
        }
        if let Some((texture, _)) = shadows.point {
            device.unbind_texture(texture);
        }

        let stats = culler.stats();
        trace!("{}", stats.format());
        (stats, rendered)
    }
}

/// Writes a uniform when the program exposes it.
fn set_uniform<D: GraphicsDevice + ?Sized>(
    device: &mut D,
    program: ProgramHandle,
    name: &str,
    value: UniformValue,
) {
    if let Some(location) = device.uniform_location(program, name) {
        device.set_uniform(location, value);
    }
}

/// `numLights` plus the attenuation block of every point light.
fn upload_lights<D: GraphicsDevice + ?Sized>(
    device: &mut D,
    program: ProgramHandle,
    lights: &[PointLight],
) {
    set_uniform(device, program, U_NUM_LIGHTS, UniformValue::Int(lights.len() as i32));
    for (index, light) in lights.iter().enumerate() {
        let field = |name: &str| format!("pointLights[{index}].{name}");
        set_uniform(device, program, &field("position"), UniformValue::Vec3(light.position));
        set_uniform(device, program, &field("color"), UniformValue::Vec3(light.colour));
        set_uniform(device, program, &field("strength"), UniformValue::Float(light.strength));
        set_uniform(device, program, &field("constant"), UniformValue::Float(light.constant));
        set_uniform(device, program, &field("linear"), UniformValue::Float(light.linear));
        set_uniform(device, program, &field("quadratic"), UniformValue::Float(light.quadratic));
    }
}
