use cubescape_common::EntityId;
use cubescape_ecs::{CapabilityKind, Entity};
use cubescape_kernel::Scene;
use glam::{Quat, Vec3, Vec4};
use std::fmt;

/// Read-only queries against a scene for logs, the CLI and overlays.
pub struct SceneInspector;

impl SceneInspector {
    /// Counts across the whole scene.
    pub fn summary(scene: &Scene) -> SceneSummary {
        let count = |kind| scene.entities().filter(|(_, e)| e.has(kind)).count();
        SceneSummary {
            entity_count: scene.len(),
            movable: count(CapabilityKind::Movable),
            textured: count(CapabilityKind::Texturable),
            in_motion: scene
                .entities()
                .filter_map(|(_, e)| e.motion())
                .filter(|m| m.velocity != Vec3::ZERO)
                .count(),
            camera_dragging: scene.camera.is_dragging(),
        }
    }

    /// Capabilities and motion state of one entity.
    pub fn inspect_entity(scene: &Scene, id: EntityId) -> Option<EntityInfo> {
        scene.get(id).map(EntityInfo::from_entity)
    }

    /// Every entity, in scene iteration order.
    pub fn list_entities(scene: &Scene) -> Vec<EntityInfo> {
        scene
            .entities()
            .map(|(_, e)| EntityInfo::from_entity(e))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneSummary {
    pub entity_count: usize,
    pub movable: usize,
    pub textured: usize,
    pub in_motion: usize,
    pub camera_dragging: bool,
}

impl fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Scene: entities={} movable={} textured={} in_motion={} dragging={}",
            self.entity_count, self.movable, self.textured, self.in_motion, self.camera_dragging
        )
    }
}

/// Snapshot of one entity's state.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityInfo {
    pub id: EntityId,
    pub capabilities: Vec<CapabilityKind>,
    pub position: Option<Vec3>,
    pub rotation: Option<Quat>,
    pub velocity: Option<Vec3>,
    pub acceleration: Option<Vec3>,
    pub color: Option<Vec4>,
    pub index_count: Option<u32>,
}

impl EntityInfo {
    fn from_entity(entity: &Entity) -> Self {
        let props = entity.properties();
        Self {
            id: entity.id(),
            capabilities: entity.capabilities().to_vec(),
            position: props.position,
            rotation: props.orientation.map(|o| o.quat()),
            velocity: props.motion.map(|m| m.velocity),
            acceleration: props.motion.map(|m| m.acceleration),
            color: props.color,
            index_count: props.mesh.as_ref().map(|m| m.index_count()),
        }
    }
}

fn vec3(v: Vec3) -> String {
    format!("({:.2}, {:.2}, {:.2})", v.x, v.y, v.z)
}

impl fmt::Display for EntityInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.capabilities.iter().map(|k| k.name()).collect();
        write!(f, "Entity [{}] {}", self.id, names.join("+"))?;
        if let Some(p) = self.position {
            write!(f, " pos={}", vec3(p))?;
        }
        if let Some(v) = self.velocity {
            write!(f, " vel={}", vec3(v))?;
        }
        if let Some(a) = self.acceleration {
            write!(f, " acc={}", vec3(a))?;
        }
        if let Some(c) = self.color {
            write!(f, " color=({:.2}, {:.2}, {:.2}, {:.2})", c.x, c.y, c.z, c.w)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubescape_ecs::{Capability, Colorable, Meshable, Movable, Positionable, compose};
    use cubescape_render::HeadlessContext;

    fn entity(gpu: &mut HeadlessContext, movable: bool) -> Entity {
        let mut caps: Vec<Box<dyn Capability>> = vec![
            Box::new(Positionable::new(Vec3::new(1.0, 2.0, 3.0))),
            Box::new(Meshable::new(vec![[0.0; 3]; 3], vec![0, 1, 2]).unwrap()),
            Box::new(Colorable::new(Vec4::new(1.0, 0.5, 0.25, 1.0))),
        ];
        if movable {
            caps.push(Box::new(Movable::new(8.0).unwrap()));
        }
        compose(caps, gpu).unwrap()
    }

    #[test]
    fn summary_empty_scene() {
        let summary = SceneInspector::summary(&Scene::default());
        assert_eq!(summary.entity_count, 0);
        assert!(format!("{summary}").contains("entities=0"));
    }

    #[test]
    fn summary_counts_capabilities() {
        let mut gpu = HeadlessContext::new(1, 1);
        let mut scene = Scene::default();
        scene.insert(entity(&mut gpu, false));
        let moving = scene.insert(entity(&mut gpu, true));
        scene.get_mut(moving).unwrap().motion_mut().unwrap().velocity = Vec3::X;

        let summary = SceneInspector::summary(&scene);
        assert_eq!(summary.entity_count, 2);
        assert_eq!(summary.movable, 1);
        assert_eq!(summary.textured, 0);
        assert_eq!(summary.in_motion, 1);
    }

    #[test]
    fn inspect_entity_found() {
        let mut gpu = HeadlessContext::new(1, 1);
        let mut scene = Scene::default();
        let id = scene.insert(entity(&mut gpu, true));

        let info = SceneInspector::inspect_entity(&scene, id).unwrap();
        assert_eq!(info.position, Some(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(info.velocity, Some(Vec3::ZERO));
        assert_eq!(info.index_count, Some(3));
        let text = info.to_string();
        assert!(text.contains("Positionable+Meshable+Colorable+Movable"));
        assert!(text.contains("pos=(1.00, 2.00, 3.00)"));
    }

    #[test]
    fn inspect_entity_not_found() {
        assert!(SceneInspector::inspect_entity(&Scene::default(), EntityId::new()).is_none());
    }

    #[test]
    fn list_entities_returns_all() {
        let mut gpu = HeadlessContext::new(1, 1);
        let mut scene = Scene::default();
        let a = scene.insert(entity(&mut gpu, false));
        let b = scene.insert(entity(&mut gpu, true));
        let ids: Vec<EntityId> = SceneInspector::list_entities(&scene)
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&a) && ids.contains(&b));
    }
}
