//! Scene container: renderables, lights, camera and per-frame published state.

pub mod graph;

use glam::{Mat4, Vec3};
use log::info;

use crate::core::camera::Camera;
use crate::core::lights::{DirectionalLight, PointLight};
use crate::core::renderable::Renderable;

/// Two colliding objects whose bounds overlap, named in scene order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub first: String,
    pub second: String,
}

impl Contact {
    pub fn involves(&self, name: &str) -> bool {
        self.first == name || self.second == name
    }
}

/// Everything drawn by the frame renderer.
///
/// Object order matters: it is the dispatch order of the transform pipeline
/// and the order in which parent matrices are resolved.
#[derive(Debug, Default)]
pub struct Scene {
    objects: Vec<Box<dyn Renderable>>,
    pub point_lights: Vec<PointLight>,
    pub directional_light: Option<DirectionalLight>,
    pub camera: Camera,
    view_matrix: Mat4,
    frames_rendered: u64,
}

impl Scene {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            ..Self::default()
        }
    }

    /// Appends an object and returns its scene index.
    pub fn add_object(&mut self, object: Box<dyn Renderable>) -> usize {
        if self.index_of(object.name()).is_some() {
            info!(
                "'{}' already exists; parent lookups resolve to the first one",
                object.name()
            );
        }
        self.objects.push(object);
        self.objects.len() - 1
    }

    pub fn add_point_light(&mut self, light: PointLight) -> usize {
        self.point_lights.push(light);
        self.point_lights.len() - 1
    }

    pub fn set_directional_light(&mut self, light: Option<DirectionalLight>) {
        self.directional_light = light;
    }

    pub fn objects(&self) -> &[Box<dyn Renderable>] {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut [Box<dyn Renderable>] {
        &mut self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        graph::find_by_name(&self.objects, name)
    }

    pub fn object(&self, name: &str) -> Option<&dyn Renderable> {
        self.index_of(name).map(|index| self.objects[index].as_ref())
    }

    pub fn object_mut(&mut self, name: &str) -> Option<&mut Box<dyn Renderable>> {
        let index = self.index_of(name)?;
        self.objects.get_mut(index)
    }

    /// View matrix of the last rendered frame.
    pub fn view_matrix(&self) -> Mat4 {
        self.view_matrix
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub(crate) fn publish_frame(&mut self, view_matrix: Mat4) {
        self.view_matrix = view_matrix;
        self.frames_rendered += 1;
    }

    /// Moves every object by its force. Runs once per committed frame.
    pub fn apply_forces(&mut self) {
        for object in &mut self.objects {
            let force = object.force();
            if force != Vec3::ZERO {
                object.translate(force);
            }
        }
    }

    /// Intersecting pairs among objects flagged for collision.
    pub fn contacts(&self) -> Vec<Contact> {
        let colliders: Vec<_> = self
            .objects
            .iter()
            .map(|object| (object.name(), object.bounding_box()))
            .filter(|(_, bounds)| bounds.collide)
            .collect();

        let mut contacts = Vec::new();
        for (i, (first, a)) in colliders.iter().enumerate() {
            for (second, b) in &colliders[i + 1..] {
                if a.intersects(b) {
                    contacts.push(Contact {
                        first: first.to_string(),
                        second: second.to_string(),
                    });
                }
            }
        }
        contacts
    }

    pub fn count_contacts(&self) -> usize {
        self.contacts().len()
    }
}
