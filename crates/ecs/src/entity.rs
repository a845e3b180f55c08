use crate::capability::{
    Capability, CapabilityKind, ConfigError, FinishStep, Frame, RenderStep, UpdateStep,
};
use crate::properties::{EntityProperties, Motion, Orientation};
use cubescape_common::EntityId;
use cubescape_render::{GpuContext, TextureHandle};
use glam::{Mat4, Vec3, Vec4};

/// An object assembled from capabilities.
///
/// Holds the ordered render and update pipelines and the merged properties.
/// Built once by [`compose`]; the pipelines never change afterwards.
pub struct Entity {
    id: EntityId,
    capabilities: Vec<CapabilityKind>,
    render_pipeline: Vec<RenderStep>,
    update_pipeline: Vec<UpdateStep>,
    finish: FinishStep,
    props: EntityProperties,
}

/// Apply `capabilities` in order to a fresh entity.
///
/// Each capability has its dependencies checked, its name recorded, its steps
/// appended and its properties merged (with GPU setup) before the next one is
/// applied. Exactly one capability must supply the terminal draw function.
pub fn compose(
    capabilities: Vec<Box<dyn Capability>>,
    gpu: &mut dyn GpuContext,
) -> Result<Entity, ConfigError> {
    let mut kinds = Vec::with_capacity(capabilities.len());
    let mut render_pipeline = Vec::new();
    let mut update_pipeline = Vec::new();
    let mut finish: Option<(CapabilityKind, FinishStep)> = None;
    let mut props = EntityProperties::default();

    for capability in capabilities {
        let kind = capability.kind();
        if let Some(&missing) = capability.requires().iter().find(|r| !kinds.contains(*r)) {
            return Err(ConfigError::MissingDependency {
                capability: kind,
                requires: missing,
            });
        }
        kinds.push(kind);

        if let Some(step) = capability.update_step() {
            update_pipeline.push(step);
        }
        if let Some(step) = capability.render_step() {
            render_pipeline.push(step);
        }
        if let Some(step) = capability.finish_step() {
            if let Some((first, _)) = finish {
                return Err(ConfigError::DuplicateTerminalDraw {
                    first,
                    second: kind,
                });
            }
            finish = Some((kind, step));
        }

        capability.attach(&mut props, gpu)?;
        tracing::debug!(capability = %kind, "capability composed");
    }

    let (_, finish) = finish.ok_or(ConfigError::MissingTerminalDraw)?;
    let entity = Entity {
        id: EntityId::new(),
        capabilities: kinds,
        render_pipeline,
        update_pipeline,
        finish,
        props,
    };
    tracing::debug!(
        entity = %entity.id,
        render_steps = entity.render_pipeline.len(),
        update_steps = entity.update_pipeline.len(),
        "entity composed"
    );
    Ok(entity)
}

impl Entity {
    /// Fresh id assigned at composition.
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Thread `transform` through every render step, then draw.
    pub fn render(&self, frame: &mut Frame<'_>, transform: Mat4) {
        let transform = self
            .render_pipeline
            .iter()
            .fold(transform, |acc, step| step(&self.props, frame, acc));
        (self.finish)(&self.props, frame, transform);
    }

    /// Run every update step with `dt` seconds of elapsed time.
    pub fn update(&mut self, dt: f32) {
        for step in &self.update_pipeline {
            step(&mut self.props, dt);
        }
    }

    /// Whether a capability of `kind` was composed in.
    pub fn has(&self, kind: CapabilityKind) -> bool {
        self.capabilities.contains(&kind)
    }

    /// Capability names in composition order.
    pub fn capabilities(&self) -> &[CapabilityKind] {
        &self.capabilities
    }

    /// Number of transform steps before the terminal draw.
    pub fn render_steps(&self) -> usize {
        self.render_pipeline.len()
    }

    /// Number of per-tick update steps.
    pub fn update_steps(&self) -> usize {
        self.update_pipeline.len()
    }

    /// Everything the capabilities contributed.
    pub fn properties(&self) -> &EntityProperties {
        &self.props
    }

    /// Mutable access to the property bag.
    pub fn properties_mut(&mut self) -> &mut EntityProperties {
        &mut self.props
    }

    /// Current position. `None` without Positionable.
    pub fn position(&self) -> Option<Vec3> {
        self.props.position
    }

    /// Shift the position by `delta`. No-op without Positionable.
    pub fn translate(&mut self, delta: Vec3) {
        if let Some(position) = self.props.position.as_mut() {
            *position += delta;
        }
    }

    /// Current orientation. `None` without Rotatable.
    pub fn orientation(&self) -> Option<&Orientation> {
        self.props.orientation.as_ref()
    }

    /// Rotate by `delta` radians about x, y, z. No-op without Rotatable.
    pub fn rotate(&mut self, delta: Vec3) {
        if let Some(orientation) = self.props.orientation.as_mut() {
            orientation.rotate(delta);
        }
    }

    /// Velocity and acceleration, present only with Movable.
    pub fn motion(&self) -> Option<&Motion> {
        self.props.motion.as_ref()
    }

    /// Velocity and acceleration, present only with Movable.
    pub fn motion_mut(&mut self) -> Option<&mut Motion> {
        self.props.motion.as_mut()
    }

    /// Move a movable entity by `delta` without touching its velocity.
    /// No-op without Movable.
    pub fn move_by(&mut self, delta: Vec3) {
        if self.props.motion.is_some() {
            self.translate(delta);
        }
    }

    /// Replace the draw color. No-op without Colorable.
    pub fn set_color(&mut self, color: Vec4) {
        if self.props.color.is_some() {
            self.props.color = Some(color);
        }
    }

    /// Swap the bound texture. No-op without Texturable.
    pub fn set_texture(&mut self, texture: Option<TextureHandle>) {
        if let Some(uv_map) = self.props.uv_map.as_mut() {
            uv_map.texture = texture;
        }
    }
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("capabilities", &self.capabilities)
            .field("render_steps", &self.render_pipeline.len())
            .field("update_steps", &self.update_pipeline.len())
            .field("props", &self.props)
            .finish()
    }
}
