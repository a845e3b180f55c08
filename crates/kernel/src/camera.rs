use cubescape_common::SceneConfig;
use glam::{Mat4, Vec2, Vec3};

/// Fixed-position perspective camera that the user turns by dragging.
///
/// The drag state (dragging flag and last cursor position) lives here, not in
/// the input snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    /// Radians of rotation per pixel of drag.
    pub sensitivity: f32,
    rotation: Mat4,
    drag_from: Option<Vec2>,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            fov: 45.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 100.0,
            sensitivity: 1.0 / 300.0,
            rotation: Mat4::IDENTITY,
            drag_from: None,
        }
    }
}

impl Camera {
    /// Camera with the configured field of view and clip planes.
    pub fn from_config(config: &SceneConfig) -> Self {
        Self {
            fov: config.fov_degrees.to_radians(),
            near: config.near,
            far: config.far,
            sensitivity: config.drag_sensitivity,
            ..Self::default()
        }
    }

    /// Update the aspect ratio from a drawing buffer size. Zero sizes are ignored.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Perspective projection for the current aspect.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    /// Accumulated drag rotation.
    pub fn rotation_matrix(&self) -> &Mat4 {
        &self.rotation
    }

    /// Undo all drag rotation.
    pub fn reset_rotation(&mut self) {
        self.rotation = Mat4::IDENTITY;
    }

    /// Start dragging from cursor position `at`.
    pub fn begin_drag(&mut self, at: Vec2) {
        self.drag_from = Some(at);
    }

    /// Turn the camera by the cursor movement since the last drag position:
    /// about Y by the horizontal delta, then about X by the vertical delta.
    /// Does nothing unless a drag is in progress or while `frozen` (shift held).
    pub fn drag_to(&mut self, at: Vec2, frozen: bool) -> bool {
        let Some(from) = self.drag_from else {
            return false;
        };
        if frozen {
            return false;
        }
        let delta = (from - at) * self.sensitivity;
        self.rotation = self.rotation
            * Mat4::from_axis_angle(Vec3::Y, delta.x)
            * Mat4::from_axis_angle(Vec3::X, delta.y);
        self.drag_from = Some(at);
        true
    }

    /// Stop dragging. Later moves are ignored until the next `begin_drag`.
    pub fn end_drag(&mut self) {
        self.drag_from = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_from.is_some()
    }
}
