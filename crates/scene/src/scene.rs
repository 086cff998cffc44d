use crate::entity::{Entity, Geometry};
use glam::{Mat4, Vec3};
use umbra_common::{EntityConfig, TransformOp};

/// An entity plus the per-frame placement that rebuilds its world matrix.
#[derive(Debug)]
pub struct SceneObject<G> {
    pub name: String,
    pub entity: Entity<G>,
    pub placement: Vec<TransformOp>,
    pub attach_to_light: bool,
    pub casts_shadow: bool,
    pub visible: bool,
}

impl<G: Geometry> SceneObject<G> {
    pub fn new(name: impl Into<String>, geometry: G) -> Self {
        Self {
            name: name.into(),
            entity: Entity::new(geometry),
            placement: Vec::new(),
            attach_to_light: false,
            casts_shadow: true,
            visible: true,
        }
    }

    /// Build an object from its configuration, taking ownership of the
    /// already loaded geometry.
    pub fn from_config(config: &EntityConfig, geometry: G) -> Self {
        Self {
            name: config.name.clone(),
            entity: Entity::new(geometry),
            placement: config.placement.clone(),
            attach_to_light: config.attach_to_light,
            casts_shadow: config.casts_shadow,
            visible: config.visible,
        }
    }

    pub fn with_placement(mut self, placement: Vec<TransformOp>) -> Self {
        self.placement = placement;
        self
    }

    /// Reset to identity, follow the light if attached, then replay the
    /// placement. Returns the new world matrix.
    pub fn update_transform(&mut self, light_position: Vec3) -> Mat4 {
        self.entity.reset();
        if self.attach_to_light {
            self.entity.translate(light_position);
        }
        self.entity.apply(&self.placement);
        self.entity.world_matrix()
    }
}

/// Ordered collection of scene objects. Indices are stable for the lifetime
/// of the scene since objects are never removed.
#[derive(Debug)]
pub struct Scene<G> {
    objects: Vec<SceneObject<G>>,
}

impl<G> Default for Scene<G> {
    fn default() -> Self {
        Self {
            objects: Vec::new(),
        }
    }
}

impl<G: Geometry> Scene<G> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object and return its index.
    pub fn push(&mut self, object: SceneObject<G>) -> usize {
        tracing::debug!(
            "scene: added '{}' ({} vertices, {} indices)",
            object.name,
            object.entity.vertex_count(),
            object.entity.index_count()
        );
        self.objects.push(object);
        self.objects.len() - 1
    }

    pub fn objects(&self) -> &[SceneObject<G>] {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut [SceneObject<G>] {
        &mut self.objects
    }

    pub fn get(&self, index: usize) -> Option<&SceneObject<G>> {
        self.objects.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut SceneObject<G>> {
        self.objects.get_mut(index)
    }

    pub fn find(&self, name: &str) -> Option<usize> {
        self.objects.iter().position(|o| o.name == name)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Indices of objects drawn into the shadow map.
    pub fn shadow_casters(&self) -> impl Iterator<Item = usize> + '_ {
        self.objects
            .iter()
            .enumerate()
            .filter(|(_, o)| o.casts_shadow)
            .map(|(i, _)| i)
    }

    /// Indices of objects drawn in the main pass.
    pub fn visible(&self) -> impl Iterator<Item = usize> + '_ {
        self.objects
            .iter()
            .enumerate()
            .filter(|(_, o)| o.visible)
            .map(|(i, _)| i)
    }

    pub fn total_indices(&self) -> u64 {
        self.objects
            .iter()
            .map(|o| u64::from(o.entity.index_count()))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::tests::FakeGeometry;

    fn geometry() -> FakeGeometry {
        FakeGeometry {
            vertices: 8,
            indices: 36,
        }
    }

    fn sample_scene() -> Scene<FakeGeometry> {
        let mut scene = Scene::new();
        let mut ground = SceneObject::new("ground", geometry());
        ground.casts_shadow = false;
        scene.push(ground);
        scene.push(
            SceneObject::new("box", geometry())
                .with_placement(vec![TransformOp::translate(0.0, 2.0, 0.0)]),
        );
        let mut hidden = SceneObject::new("hidden", geometry());
        hidden.visible = false;
        scene.push(hidden);
        scene
    }

    #[test]
    fn filters_casters_and_visible() {
        let scene = sample_scene();
        assert_eq!(scene.shadow_casters().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(scene.visible().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(scene.find("box"), Some(1));
        assert_eq!(scene.find("nope"), None);
        assert_eq!(scene.total_indices(), 108);
    }

    #[test]
    fn update_transform_rebuilds_from_identity() {
        let mut scene = sample_scene();
        let obj = scene.get_mut(1).unwrap();
        let first = obj.update_transform(Vec3::ZERO);
        let second = obj.update_transform(Vec3::ZERO);
        assert_eq!(first, second);
        assert_eq!(first, Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0)));
    }

    #[test]
    fn attached_objects_follow_the_light() {
        let mut obj = SceneObject::new("light", geometry())
            .with_placement(vec![TransformOp::scale(2.0, 2.0, 2.0)]);
        obj.attach_to_light = true;
        let light = Vec3::new(5.0, 40.0, -3.0);
        let world = obj.update_transform(light);
        assert!(world.transform_point3(Vec3::ZERO).abs_diff_eq(light, 1e-5));
        assert!(
            world
                .transform_point3(Vec3::X)
                .abs_diff_eq(light + Vec3::new(2.0, 0.0, 0.0), 1e-5)
        );
    }

    #[test]
    fn from_config_copies_flags() {
        let config = EntityConfig {
            name: "orb".into(),
            mesh: umbra_common::MeshSource::Cube { size: 1.0 },
            placement: vec![TransformOp::translate(1.0, 2.0, 3.0)],
            attach_to_light: false,
            casts_shadow: false,
            visible: true,
        };
        let obj = SceneObject::from_config(&config, geometry());
        assert_eq!(obj.name, "orb");
        assert_eq!(obj.placement, config.placement);
        assert!(!obj.casts_shadow);
    }
}
