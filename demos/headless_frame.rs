//! Renders a few frames of a small scene against the recording device and
//! prints what was submitted. Run with `RUST_LOG=debug` for per-stage logs.

use prism_renderer::device::{DeviceCommand, RecordingDevice};
use prism_renderer::*;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut engine = RenderEngine::new(RecordingDevice::new(), RenderSettings::default())?;
    engine.scene_mut().camera = Camera::new(Vec3::new(0.25, 1.0, 4.0), Vec3::NEG_Z, Vec3::Y);

    engine.add_object(
        Box::new(Plane::new("floor")),
        Material::default().with_diffuse(Vec3::new(0.4, 0.4, 0.4)),
        Transform::from_position(Vec3::new(-2.0, -0.5, -2.0)).with_scale(Vec3::new(8.0, 1.0, 8.0)),
    )?;
    for (i, z) in [-1.0, -3.0, -5.0].into_iter().enumerate() {
        engine.add_object(
            Box::new(Cube::new(format!("crate-{i}"))),
            Material::default().with_shading(ShadingModel::Blinn),
            Transform::from_position(Vec3::new(i as f32 - 1.0, 0.0, z)),
        )?;
    }
    engine.add_object(
        Box::new(Cube::new("glass")),
        Material::default().with_alpha(0.35),
        Transform::from_position(Vec3::new(0.0, 0.5, -2.0)),
    )?;
    engine.object_mut("glass")?.set_parent(Some("crate-1"));
    engine.object_mut("crate-0")?.set_force(Vec3::new(0.0, 0.0, -0.05));

    engine.set_directional_light(Some(DirectionalLight::new(
        "sun",
        Vec3::new(-4.0, 8.0, 2.0),
        Vec3::new(0.5, -1.0, -0.25),
    )));
    engine.add_point_light(PointLight::new("lamp", Vec3::new(1.0, 2.5, -2.0)));

    for _ in 0..3 {
        engine.device_mut().clear_log();
        let stats = engine.render_frame()?;
        println!(
            "frame {}: {} dispatched, {} rendered, {} culled, {} shadow draws, {} contacts",
            stats.frame_index,
            stats.dispatched,
            stats.rendered,
            stats.culled(),
            stats.shadow_casters,
            stats.contacts.len()
        );
        stats.profile.report();
    }

    let main_pass: Vec<String> = engine
        .device()
        .draws_into(None)
        .map(|draw| {
            let blended = if draw.state.blend.is_some() { " (blended)" } else { "" };
            format!("{:?} x{}{blended}", draw.mode, draw.count)
        })
        .collect();
    println!("last main pass: {}", main_pass.join(", "));

    let commands = engine.device().commands().len();
    let uploads = engine
        .device()
        .commands()
        .iter()
        .filter(|command| matches!(command, DeviceCommand::SetUniform { .. }))
        .count();
    println!("{commands} device commands, {uploads} uniform uploads in the last frame");
    Ok(())
}
