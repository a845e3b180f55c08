use cubescape_render::{BufferHandle, GpuContext, TextureHandle};
use glam::{Mat4, Quat, Vec3, Vec4};

/// A quaternion orientation plus the rotation matrix derived from it.
///
/// The matrix is only recomputed by [`Orientation::rotate`], never per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    quat: Quat,
    matrix: Mat4,
}

impl Orientation {
    /// No rotation.
    pub fn identity() -> Self {
        Self {
            quat: Quat::IDENTITY,
            matrix: Mat4::IDENTITY,
        }
    }

    /// Start from identity and apply `angles` (radians about x, y, z).
    pub fn from_angles(angles: Vec3) -> Self {
        let mut orientation = Self::identity();
        orientation.rotate(angles);
        orientation
    }

    /// Rotate about the local x, then y, then z axis. Zero components are
    /// skipped; an all-zero delta leaves the orientation untouched.
    pub fn rotate(&mut self, delta: Vec3) {
        if delta == Vec3::ZERO {
            return;
        }
        if delta.x != 0.0 {
            self.quat *= Quat::from_rotation_x(delta.x);
        }
        if delta.y != 0.0 {
            self.quat *= Quat::from_rotation_y(delta.y);
        }
        if delta.z != 0.0 {
            self.quat *= Quat::from_rotation_z(delta.z);
        }
        self.quat = self.quat.normalize();
        self.matrix = Mat4::from_quat(self.quat);
    }

    /// Accumulated rotation.
    pub fn quat(&self) -> Quat {
        self.quat
    }

    /// Rotation matrix kept in step with [`Orientation::quat`].
    pub fn matrix(&self) -> &Mat4 {
        &self.matrix
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Self::identity()
    }
}

/// Vertex and index data plus the GPU buffers holding them.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<[f32; 3]>,
    pub indices: Vec<u16>,
    pub vertex_buffer: BufferHandle,
    pub index_buffer: BufferHandle,
}

impl Mesh {
    /// Push the current vertex and index data to the GPU again.
    pub fn reupload(&self, gpu: &mut dyn GpuContext) {
        gpu.upload_buffer(self.vertex_buffer, bytemuck::cast_slice(&self.vertices));
        gpu.upload_buffer(self.index_buffer, bytemuck::cast_slice(&self.indices));
    }

    /// Number of indices drawn per frame.
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}

/// Texture coordinates, their buffer, and the texture they sample.
#[derive(Debug, Clone, PartialEq)]
pub struct UvMap {
    pub uvs: Vec<[f32; 2]>,
    pub buffer: BufferHandle,
    pub texture: Option<TextureHandle>,
}

impl UvMap {
    /// Upload the vertex and index data again, e.g. after a context reset.
    pub fn reupload(&self, gpu: &mut dyn GpuContext) {
        gpu.upload_buffer(self.buffer, bytemuck::cast_slice(&self.uvs));
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    pub velocity: Vec3,
    pub acceleration: Vec3,
    pub max_speed: f32,
}

impl Motion {
    /// Zero velocity and acceleration, capped at `max_speed` per axis.
    pub fn at_rest(max_speed: f32) -> Self {
        Self {
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            max_speed,
        }
    }

    /// Integrate one step of `dt` seconds: acceleration into velocity
    /// (clamped per axis to the max speed), then velocity into `position`.
    pub fn integrate(&mut self, position: &mut Vec3, dt: f32) {
        let max = Vec3::splat(self.max_speed);
        self.velocity = (self.velocity + self.acceleration * dt).clamp(-max, max);
        *position += self.velocity * dt;
    }

    /// Zero the x and y components of velocity and acceleration.
    pub fn halt_planar(&mut self) {
        self.velocity.x = 0.0;
        self.velocity.y = 0.0;
        self.acceleration.x = 0.0;
        self.acceleration.y = 0.0;
    }
}

/// Union of everything the composed capabilities contribute.
///
/// A field is `Some` exactly when a capability providing it was composed.
/// Later capabilities overwrite fields set by earlier ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityProperties {
    pub position: Option<Vec3>,
    pub orientation: Option<Orientation>,
    pub mesh: Option<Mesh>,
    pub uv_map: Option<UvMap>,
    pub color: Option<Vec4>,
    pub motion: Option<Motion>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rotation_keeps_matrix() {
        let mut o = Orientation::from_angles(Vec3::new(0.3, -0.2, 0.1));
        let before = *o.matrix();
        o.rotate(Vec3::ZERO);
        assert_eq!(*o.matrix(), before);
    }

    #[test]
    fn rotate_updates_cached_matrix() {
        let mut o = Orientation::identity();
        o.rotate(Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0));
        let x = o.matrix().transform_vector3(Vec3::X);
        assert!((x - Vec3::NEG_Z).length() < 1e-5);
        assert_eq!(*o.matrix(), Mat4::from_quat(o.quat()));
    }

    #[test]
    fn axes_apply_in_x_y_z_order() {
        let angles = Vec3::new(0.4, 0.7, -0.2);
        let o = Orientation::from_angles(angles);
        let expected = Quat::from_rotation_x(0.4)
            * Quat::from_rotation_y(0.7)
            * Quat::from_rotation_z(-0.2);
        assert!(o.quat().abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn integrate_clamps_each_axis() {
        let mut motion = Motion::at_rest(2.0);
        motion.acceleration = Vec3::new(100.0, -100.0, 1.0);
        let mut position = Vec3::ZERO;
        motion.integrate(&mut position, 1.0);
        assert_eq!(motion.velocity, Vec3::new(2.0, -2.0, 1.0));
        assert_eq!(position, Vec3::new(2.0, -2.0, 1.0));
    }

    #[test]
    fn halt_planar_keeps_z() {
        let mut motion = Motion::at_rest(5.0);
        motion.velocity = Vec3::new(1.0, 2.0, 3.0);
        motion.acceleration = Vec3::splat(4.0);
        motion.halt_planar();
        assert_eq!(motion.velocity, Vec3::new(0.0, 0.0, 3.0));
        assert_eq!(motion.acceleration, Vec3::new(0.0, 0.0, 4.0));
    }
}
