use crate::camera::Camera;
use cubescape_common::EntityId;
use cubescape_ecs::{Entity, Frame};
use glam::Mat4;
use std::collections::BTreeMap;

/// The live entity set plus the camera looking at it.
///
/// Both loops iterate the same entities; the scene is dropped on teardown,
/// before the GPU context.
#[derive(Debug, Default)]
pub struct Scene {
    entities: BTreeMap<EntityId, Entity>,
    pub camera: Camera,
}

impl Scene {
    /// Empty scene viewed through `camera`.
    pub fn new(camera: Camera) -> Self {
        Self {
            entities: BTreeMap::new(),
            camera,
        }
    }

    /// Add an entity and return its id.
    pub fn insert(&mut self, entity: Entity) -> EntityId {
        let id = entity.id();
        tracing::debug!(
            entity = %id,
            capabilities = ?entity.capabilities(),
            "entity added to scene"
        );
        self.entities.insert(id, entity);
        id
    }

    /// Take an entity out of the scene.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    /// Look up an entity by id.
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Mutable lookup by id.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Entities in id order.
    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities.iter().map(|(id, e)| (*id, e))
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Advance every entity by `dt` seconds.
    pub fn update_all(&mut self, dt: f32) {
        for entity in self.entities.values_mut() {
            entity.update(dt);
        }
    }

    /// Render every entity, each starting from the identity transform.
    pub fn render_all(&self, frame: &mut Frame<'_>) {
        for entity in self.entities.values() {
            entity.render(frame, Mat4::IDENTITY);
        }
    }

    /// Drop every entity.
    pub fn clear(&mut self) {
        self.entities.clear();
    }
}
