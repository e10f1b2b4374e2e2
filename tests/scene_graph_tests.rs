use prism_renderer::device::RecordingDevice;
use prism_renderer::utils::math::mat4_from_array;
use prism_renderer::*;

fn engine() -> RenderEngine<RecordingDevice> {
    RenderEngine::new(RecordingDevice::new(), RenderSettings::default()).unwrap()
}

fn add(engine: &mut RenderEngine<RecordingDevice>, name: &str, position: Vec3) {
    engine
        .add_object(
            Box::new(Cube::new(name)),
            Material::default(),
            Transform::from_position(position),
        )
        .unwrap();
}

fn world_translation(engine: &RenderEngine<RecordingDevice>, name: &str) -> Vec3 {
    engine
        .scene()
        .object(name)
        .and_then(|object| object.cached_model_matrix())
        .map(|matrix| matrix.w_axis.truncate())
        .unwrap()
}

#[test]
fn parent_resolved_first_contributes_its_current_matrix() {
    let mut engine = engine();
    add(&mut engine, "B", Vec3::ZERO);
    add(&mut engine, "A", Vec3::ZERO);
    engine.object_mut("A").unwrap().set_parent(Some("B"));
    engine.object_mut("B").unwrap().translate(Vec3::X);

    engine.render_frame().unwrap();
    assert_eq!(world_translation(&engine, "B"), Vec3::X);
    assert_eq!(world_translation(&engine, "A"), Vec3::X);
}

#[test]
fn parent_resolved_later_contributes_last_frame_matrix() {
    let mut engine = engine();
    add(&mut engine, "A", Vec3::ZERO);
    add(&mut engine, "B", Vec3::X);
    engine.object_mut("A").unwrap().set_parent(Some("B"));

    // No parent matrix exists yet on the first frame.
    engine.render_frame().unwrap();
    assert_eq!(world_translation(&engine, "A"), Vec3::ZERO);

    engine.render_frame().unwrap();
    assert_eq!(world_translation(&engine, "A"), Vec3::X);

    engine.object_mut("B").unwrap().translate(Vec3::X);
    engine.render_frame().unwrap();
    assert_eq!(world_translation(&engine, "B"), Vec3::new(2.0, 0.0, 0.0));
    assert_eq!(world_translation(&engine, "A"), Vec3::X);

    engine.render_frame().unwrap();
    assert_eq!(world_translation(&engine, "A"), Vec3::new(2.0, 0.0, 0.0));
}

#[test]
fn parent_and_child_offsets_compose() {
    let mut engine = engine();
    add(&mut engine, "base", Vec3::new(0.0, 1.0, 0.0));
    add(&mut engine, "arm", Vec3::new(2.0, 0.0, 0.0));
    engine.object_mut("arm").unwrap().set_parent(Some("base"));
    engine.render_frame().unwrap();
    assert_eq!(world_translation(&engine, "arm"), Vec3::new(2.0, 1.0, 0.0));
}

#[test]
fn unknown_and_self_parents_are_ignored() {
    let mut engine = engine();
    add(&mut engine, "orphan", Vec3::new(0.0, 0.0, -2.0));
    add(&mut engine, "narcissus", Vec3::new(1.0, 0.0, -2.0));
    engine.object_mut("orphan").unwrap().set_parent(Some("missing"));
    engine.object_mut("narcissus").unwrap().set_parent(Some("narcissus"));

    for _ in 0..2 {
        let stats = engine.render_frame().unwrap();
        assert_eq!(stats.failed(), 0);
        assert_eq!(stats.rendered, 2);
    }
    assert_eq!(world_translation(&engine, "orphan"), Vec3::new(0.0, 0.0, -2.0));
    assert_eq!(world_translation(&engine, "narcissus"), Vec3::new(1.0, 0.0, -2.0));
}

#[test]
fn unknown_object_lookup_is_an_error() {
    let mut engine = engine();
    let err = engine.object_mut("ghost").unwrap_err();
    assert_eq!(err, RenderError::UnknownObject("ghost".to_string()));
    assert!(!err.is_fatal());
}

#[test]
fn rotation_spins_about_the_centroid() {
    let mut engine = engine();
    add(&mut engine, "spinner", Vec3::ZERO);
    #[rustfmt::skip]
    let quarter_turn_z = [
        0.0, 1.0, 0.0, 0.0,
        -1.0, 0.0, 0.0, 0.0,
        0.0, 0.0, 1.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    ];
    engine
        .object_mut("spinner")
        .unwrap()
        .set_rotation(mat4_from_array(&quarter_turn_z));
    engine.render_frame().unwrap();

    let model = engine
        .scene()
        .object("spinner")
        .and_then(|o| o.cached_model_matrix())
        .unwrap();
    let centroid = Vec3::splat(0.25);
    let moved = model.transform_point3(centroid);
    approx::assert_abs_diff_eq!(moved.x, centroid.x, epsilon = 1e-5);
    approx::assert_abs_diff_eq!(moved.y, centroid.y, epsilon = 1e-5);
    approx::assert_abs_diff_eq!(moved.z, centroid.z, epsilon = 1e-5);
}

#[test]
fn scale_keeps_centroid_and_bounds_consistent() {
    let mut engine = engine();
    add(&mut engine, "box", Vec3::new(1.0, 0.0, 0.0));
    let unscaled = engine.scene().object("box").unwrap().centroid();

    let scale = Vec3::new(2.0, 0.5, 3.0);
    engine.object_mut("box").unwrap().scale(scale);
    let object = engine.scene().object("box").unwrap();
    let scaled = object.centroid();
    approx::assert_relative_eq!(scaled.x, unscaled.x * scale.x);
    approx::assert_relative_eq!(scaled.y, unscaled.y * scale.y);
    approx::assert_relative_eq!(scaled.z, unscaled.z * scale.z);

    let bounds = object.bounding_box();
    assert!(bounds.min.cmple(bounds.max).all());
    assert_eq!(bounds.min, Vec3::new(1.0, 0.0, 0.0));
    assert_eq!(bounds.max, Vec3::new(2.0, 0.25, 1.5));
}

#[test]
fn contacts_are_counted_for_colliding_objects() {
    let mut engine = engine();
    add(&mut engine, "a", Vec3::new(0.0, 0.0, -3.0));
    add(&mut engine, "b", Vec3::new(0.4, 0.0, -3.0));
    add(&mut engine, "c", Vec3::new(0.8, 0.0, -3.0));
    for name in ["a", "b", "c"] {
        engine.object_mut(name).unwrap().set_collide(true);
    }
    let contacts = engine.render_frame().unwrap().contacts;
    assert_eq!(contacts.len(), 2);
    assert!(contacts.iter().all(|contact| contact.involves("b")));
    assert_eq!((contacts[0].first.as_str(), contacts[0].second.as_str()), ("a", "b"));
    assert_eq!((contacts[1].first.as_str(), contacts[1].second.as_str()), ("b", "c"));

    engine.object_mut("b").unwrap().set_collide(false);
    assert!(engine.render_frame().unwrap().contacts.is_empty());
}
