use prism_renderer::device::shader::{U_DIFFUSE_TEXTURE, U_MODEL};
use prism_renderer::device::{
    BlendMode, DepthFunc, DeviceCommand, DrawCall, DrawMode, RecordingDevice, UniformValue,
};
use prism_renderer::*;

fn engine(settings: RenderSettings) -> RenderEngine<RecordingDevice> {
    let mut engine = RenderEngine::new(RecordingDevice::new(), settings).unwrap();
    // Cube and plane centroids sit at x = z = 0.25, so distances read straight off z.
    engine.scene_mut().camera = Camera::new(Vec3::splat(0.25), Vec3::NEG_Z, Vec3::Y);
    engine
}

fn add_cube(engine: &mut RenderEngine<RecordingDevice>, name: &str, distance: f32) {
    engine
        .add_object(
            Box::new(Cube::new(name)),
            Material::default(),
            Transform::from_position(Vec3::new(0.0, 0.0, -distance)),
        )
        .unwrap();
}

/// Main-pass draws paired with the name of the object that issued them.
fn main_pass(engine: &RenderEngine<RecordingDevice>) -> Vec<(String, DrawCall)> {
    engine
        .device()
        .draws_into(None)
        .map(|draw| {
            let name = engine
                .scene()
                .objects()
                .iter()
                .find(|object| object.buffers().map(|b| b.vertex_array) == draw.vertex_array)
                .map(|object| object.name().to_string())
                .unwrap_or_default();
            (name, draw.clone())
        })
        .collect()
}

fn names(draws: &[(String, DrawCall)]) -> Vec<&str> {
    draws.iter().map(|(name, _)| name.as_str()).collect()
}

fn scenario(settings: RenderSettings) -> RenderEngine<RecordingDevice> {
    let mut engine = engine(settings);
    add_cube(&mut engine, "five", 5.0);
    add_cube(&mut engine, "two", 2.0);
    add_cube(&mut engine, "eight", 8.0);
    engine
        .add_object(
            Box::new(Plane::new("glass")),
            Material::default().with_alpha(0.5),
            Transform::from_position(Vec3::new(0.0, -0.25, -4.0)),
        )
        .unwrap();
    engine
}

#[test]
fn translucent_plane_is_drawn_between_opaque_cubes() {
    let mut engine = scenario(RenderSettings::default());
    let stats = engine.render_frame().unwrap();
    assert_eq!(stats.rendered, 4);

    let draws = main_pass(&engine);
    assert_eq!(names(&draws), ["eight", "five", "glass", "two"]);

    for (name, draw) in &draws {
        if name == "glass" {
            assert_eq!(draw.state.blend, Some(BlendMode::default()));
            assert!(!draw.state.depth_test);
            assert_eq!(draw.mode, DrawMode::Indexed);
            assert_eq!(draw.count, 6);
        } else {
            assert!(draw.state.depth_test, "{name}");
            assert!(draw.state.depth_write, "{name}");
            assert_eq!(draw.state.depth_func, DepthFunc::LessEqual);
            assert_eq!(draw.state.blend, None);
            assert_eq!(draw.state.clear_depth, 1.0);
            assert_eq!(draw.count, 36);
        }
    }
}

#[test]
fn camera_distances_are_measured_to_the_centroid() {
    let mut engine = scenario(RenderSettings::default());
    engine.render_frame().unwrap();
    let draws = main_pass(&engine);
    let model_z: Vec<f32> = draws
        .iter()
        .map(|(_, draw)| match draw.uniform(U_MODEL) {
            Some(UniformValue::Mat4(m)) => m.w_axis.z,
            other => panic!("unexpected model uniform {other:?}"),
        })
        .collect();
    assert_eq!(model_z, [-8.0, -5.0, -4.0, -2.0]);
}

#[test]
fn historic_clear_depth_follows_alpha() {
    let mut engine = scenario(RenderSettings::legacy());
    engine.render_frame().unwrap();
    let draws = main_pass(&engine);
    let (_, glass) = draws.iter().find(|(name, _)| name == "glass").unwrap();
    assert_eq!(glass.state.clear_depth, 0.5);
    let (_, two) = draws.iter().find(|(name, _)| name == "two").unwrap();
    assert_eq!(two.state.clear_depth, 1.0);
}

#[test]
fn equal_distances_order_by_descending_name_every_frame() {
    let mut engine = engine(RenderSettings::default());
    for name in ["apple", "pear", "fig"] {
        add_cube(&mut engine, name, 3.0);
    }
    for _ in 0..3 {
        engine.device_mut().clear_log();
        engine.render_frame().unwrap();
        assert_eq!(names(&main_pass(&engine)), ["pear", "fig", "apple"]);
    }
}

#[test]
fn meshes_submit_arrays() {
    let mut engine = engine(RenderSettings::default());
    let mut mesh = MeshObject::new("triangle");
    mesh.set_vertex_values(
        vec![0.0, 0.0, -3.0, 1.0, 0.0, -3.0, 0.0, 1.0, -3.0],
        vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
        vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
    );
    engine
        .add_object(Box::new(mesh), Material::default(), Transform::default())
        .unwrap();
    engine.render_frame().unwrap();

    let draws = main_pass(&engine);
    assert_eq!(draws.len(), 1);
    assert_eq!(draws[0].1.mode, DrawMode::Arrays);
    assert_eq!(draws[0].1.count, 3);
}

#[test]
fn material_textures_are_bound_around_the_draw() {
    let mut engine = engine(RenderSettings::default());
    let texture = TextureHandle(900);
    engine
        .add_object(
            Box::new(Cube::new("crate")),
            Material::default()
                .with_shading(ShadingModel::BlinnDiffuseTexture)
                .with_diffuse_texture(texture),
            Transform::from_position(Vec3::new(0.0, 0.0, -3.0)),
        )
        .unwrap();
    engine.render_frame().unwrap();

    let draws = main_pass(&engine);
    let draw = &draws[0].1;
    assert_eq!(draw.textures.get(&0), Some(&texture));
    assert_eq!(draw.uniform(U_DIFFUSE_TEXTURE), Some(&UniformValue::Int(0)));

    let commands = engine.device().commands();
    let drawn_at = commands
        .iter()
        .position(|c| matches!(c, DeviceCommand::Draw(_)))
        .unwrap();
    assert!(commands[drawn_at..]
        .iter()
        .any(|c| *c == DeviceCommand::UnbindTexture(texture)));
    assert!(engine.device().state().blend.is_none());
}
