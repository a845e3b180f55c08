use crate::capability::{
    Capability, CapabilityKind, ConfigError, FinishStep, Frame, RenderStep, UpdateStep,
};
use crate::properties::{EntityProperties, Mesh, Motion, Orientation, UvMap};
use cubescape_render::{BufferUsage, GpuContext, TextureHandle, names};
use glam::{Mat4, Vec3, Vec4};

/// A position in world space. Translates the accumulated transform.
#[derive(Debug, Clone, Copy)]
pub struct Positionable {
    position: Vec3,
}

impl Positionable {
    /// Start at `position`.
    pub fn new(position: Vec3) -> Self {
        Self { position }
    }
}

fn translate(props: &EntityProperties, _frame: &mut Frame<'_>, transform: Mat4) -> Mat4 {
    match props.position {
        Some(position) => transform * Mat4::from_translation(position),
        None => transform,
    }
}

impl Capability for Positionable {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::Positionable
    }

    fn render_step(&self) -> Option<RenderStep> {
        Some(translate)
    }

    fn attach(
        self: Box<Self>,
        props: &mut EntityProperties,
        _gpu: &mut dyn GpuContext,
    ) -> Result<(), ConfigError> {
        props.position = Some(self.position);
        Ok(())
    }
}

/// An orientation with a cached rotation matrix.
#[derive(Debug, Clone, Copy)]
pub struct Rotatable {
    angles: Vec3,
}

impl Rotatable {
    /// `angles` are radians about x, y and z, applied in that order.
    pub fn new(angles: Vec3) -> Self {
        Self { angles }
    }
}

fn rotate(props: &EntityProperties, _frame: &mut Frame<'_>, transform: Mat4) -> Mat4 {
    match &props.orientation {
        Some(orientation) => transform * *orientation.matrix(),
        None => transform,
    }
}

impl Capability for Rotatable {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::Rotatable
    }

    fn render_step(&self) -> Option<RenderStep> {
        Some(rotate)
    }

    fn attach(
        self: Box<Self>,
        props: &mut EntityProperties,
        _gpu: &mut dyn GpuContext,
    ) -> Result<(), ConfigError> {
        props.orientation = Some(Orientation::from_angles(self.angles));
        Ok(())
    }
}

/// Triangle geometry. Supplies the terminal draw call.
#[derive(Debug, Clone)]
pub struct Meshable {
    vertices: Vec<[f32; 3]>,
    indices: Vec<u16>,
}

impl Meshable {
    /// Rejects empty data, a partial triangle or an index past the last vertex.
    pub fn new(vertices: Vec<[f32; 3]>, indices: Vec<u16>) -> Result<Self, ConfigError> {
        let kind = CapabilityKind::Meshable;
        if vertices.is_empty() {
            return Err(ConfigError::invalid(kind, "vertex list is empty"));
        }
        if indices.is_empty() {
            return Err(ConfigError::invalid(kind, "index list is empty"));
        }
        if indices.len() % 3 != 0 {
            return Err(ConfigError::invalid(
                kind,
                format!("{} indices do not form whole triangles", indices.len()),
            ));
        }
        if let Some(bad) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(ConfigError::invalid(
                kind,
                format!("index {bad} out of range for {} vertices", vertices.len()),
            ));
        }
        Ok(Self { vertices, indices })
    }
}

fn bind_vertices(props: &EntityProperties, frame: &mut Frame<'_>, transform: Mat4) -> Mat4 {
    if let Some(mesh) = &props.mesh {
        frame
            .program
            .bind_attribute(frame.gpu, names::VERTEX_POSITION, mesh.vertex_buffer, 3);
    }
    transform
}

fn draw_mesh(props: &EntityProperties, frame: &mut Frame<'_>, transform: Mat4) {
    if let Some(mesh) = &props.mesh {
        frame
            .program
            .set_mat4(frame.gpu, names::MODEL_VIEW_MATRIX, &transform);
        frame
            .gpu
            .draw_indexed_triangles(mesh.index_buffer, mesh.index_count());
    }
}

impl Capability for Meshable {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::Meshable
    }

    fn render_step(&self) -> Option<RenderStep> {
        Some(bind_vertices)
    }

    fn finish_step(&self) -> Option<FinishStep> {
        Some(draw_mesh)
    }

    fn attach(
        self: Box<Self>,
        props: &mut EntityProperties,
        gpu: &mut dyn GpuContext,
    ) -> Result<(), ConfigError> {
        let Self { vertices, indices } = *self;
        let mesh = Mesh {
            vertex_buffer: gpu.create_buffer(BufferUsage::Vertex),
            index_buffer: gpu.create_buffer(BufferUsage::Index),
            vertices,
            indices,
        };
        mesh.reupload(gpu);
        props.mesh = Some(mesh);
        Ok(())
    }
}

/// Texture coordinates plus an optional texture to sample.
#[derive(Debug, Clone)]
pub struct Texturable {
    uvs: Vec<[f32; 2]>,
    texture: Option<TextureHandle>,
}

impl Texturable {
    /// Rejects empty UV data. `texture` may be bound later.
    pub fn new(uvs: Vec<[f32; 2]>, texture: Option<TextureHandle>) -> Result<Self, ConfigError> {
        if uvs.is_empty() {
            return Err(ConfigError::invalid(
                CapabilityKind::Texturable,
                "texture coordinate list is empty",
            ));
        }
        Ok(Self { uvs, texture })
    }
}

fn bind_texture(props: &EntityProperties, frame: &mut Frame<'_>, transform: Mat4) -> Mat4 {
    let Some(uv_map) = &props.uv_map else {
        return transform;
    };
    match uv_map.texture {
        Some(texture) if frame.gpu.is_texture(texture) => {
            frame
                .program
                .bind_texture(frame.gpu, names::TEXTURE1, 0, texture);
            frame
                .program
                .bind_attribute(frame.gpu, names::TEXTURE_COORDINATE, uv_map.buffer, 2);
        }
        _ => {}
    }
    transform
}

impl Capability for Texturable {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::Texturable
    }

    fn render_step(&self) -> Option<RenderStep> {
        Some(bind_texture)
    }

    fn attach(
        self: Box<Self>,
        props: &mut EntityProperties,
        gpu: &mut dyn GpuContext,
    ) -> Result<(), ConfigError> {
        let Self { uvs, texture } = *self;
        let uv_map = UvMap {
            buffer: gpu.create_buffer(BufferUsage::Vertex),
            uvs,
            texture,
        };
        uv_map.reupload(gpu);
        props.uv_map = Some(uv_map);
        Ok(())
    }
}

/// A flat RGBA color pushed to the fragment stage.
#[derive(Debug, Clone, Copy)]
pub struct Colorable {
    color: Vec4,
}

impl Colorable {
    /// Draw with an RGBA `color`.
    pub fn new(color: Vec4) -> Self {
        Self { color }
    }
}

fn push_color(props: &EntityProperties, frame: &mut Frame<'_>, transform: Mat4) -> Mat4 {
    if let Some(color) = props.color {
        frame.program.set_vec4(frame.gpu, names::INPUT_COLOR, color);
    }
    transform
}

impl Capability for Colorable {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::Colorable
    }

    fn render_step(&self) -> Option<RenderStep> {
        Some(push_color)
    }

    fn attach(
        self: Box<Self>,
        props: &mut EntityProperties,
        _gpu: &mut dyn GpuContext,
    ) -> Result<(), ConfigError> {
        props.color = Some(self.color);
        Ok(())
    }
}

/// Velocity and acceleration integrated into the position each logic tick.
#[derive(Debug, Clone, Copy)]
pub struct Movable {
    max_speed: f32,
}

impl Movable {
    /// Rejects a negative or non-finite `max_speed`.
    pub fn new(max_speed: f32) -> Result<Self, ConfigError> {
        if !max_speed.is_finite() || max_speed < 0.0 {
            return Err(ConfigError::invalid(
                CapabilityKind::Movable,
                format!("max speed must be finite and non-negative, got {max_speed}"),
            ));
        }
        Ok(Self { max_speed })
    }
}

fn integrate(props: &mut EntityProperties, dt: f32) {
    if let (Some(position), Some(motion)) = (props.position.as_mut(), props.motion.as_mut()) {
        motion.integrate(position, dt);
    }
}

impl Capability for Movable {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::Movable
    }

    fn requires(&self) -> &'static [CapabilityKind] {
        &[CapabilityKind::Positionable]
    }

    fn update_step(&self) -> Option<UpdateStep> {
        Some(integrate)
    }

    fn attach(
        self: Box<Self>,
        props: &mut EntityProperties,
        _gpu: &mut dyn GpuContext,
    ) -> Result<(), ConfigError> {
        props.motion = Some(Motion::at_rest(self.max_speed));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meshable_rejects_bad_geometry() {
        let tri = vec![[0.0; 3]; 3];
        assert!(Meshable::new(vec![], vec![0, 1, 2]).is_err());
        assert!(Meshable::new(tri.clone(), vec![]).is_err());
        assert!(Meshable::new(tri.clone(), vec![0, 1]).is_err());
        let err = Meshable::new(tri.clone(), vec![0, 1, 3]).unwrap_err();
        assert!(err.to_string().contains("index 3 out of range"));
        assert!(Meshable::new(tri, vec![0, 1, 2]).is_ok());
    }

    #[test]
    fn texturable_requires_uvs() {
        assert!(matches!(
            Texturable::new(vec![], None),
            Err(ConfigError::InvalidArgument {
                capability: CapabilityKind::Texturable,
                ..
            })
        ));
    }

    #[test]
    fn movable_rejects_bad_speed() {
        assert!(Movable::new(-1.0).is_err());
        assert!(Movable::new(f32::NAN).is_err());
        assert!(Movable::new(0.0).is_ok());
    }

    #[test]
    fn only_movable_updates() {
        assert!(Movable::new(1.0).unwrap().update_step().is_some());
        assert!(Positionable::new(Vec3::ZERO).update_step().is_none());
        assert!(Colorable::new(Vec4::ONE).update_step().is_none());
    }

    #[test]
    fn only_meshable_finishes() {
        let mesh = Meshable::new(vec![[0.0; 3]; 3], vec![0, 1, 2]).unwrap();
        assert!(mesh.finish_step().is_some());
        assert!(Rotatable::new(Vec3::ZERO).finish_step().is_none());
        assert!(
            Texturable::new(vec![[0.0; 2]], None)
                .unwrap()
                .finish_step()
                .is_none()
        );
    }
}
