use cubescape_common::EntityId;
use cubescape_ecs::{
    Capability, Colorable, ConfigError, Entity, Meshable, Movable, Positionable, Rotatable,
    Texturable, compose,
};
use cubescape_input::{InputEventKind, InputId, InputSnapshot, InputTracker, ListenerId};
use cubescape_kernel::Scene;
use cubescape_render::{GpuContext, TextureHandle};
use glam::{Vec3, Vec4};

use crate::mesh::{CUBE_UVS, CUBE_VERTICES, cube_indices};

/// Where and how a cube is spawned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubeParams {
    pub position: Vec3,
    pub color: Vec4,
    pub texture: Option<TextureHandle>,
    pub max_speed: f32,
}

/// A textured, colored cube that turns about the view origin and can be
/// pushed around.
pub struct Cube;

impl Cube {
    /// Capabilities in render order: rotate, then translate, so the cube
    /// swings about the view origin. Mesh, texture and color follow.
    pub fn capabilities(params: &CubeParams) -> Result<Vec<Box<dyn Capability>>, ConfigError> {
        Ok(vec![
            Box::new(Rotatable::new(Vec3::ZERO)),
            Box::new(Positionable::new(params.position)),
            Box::new(Meshable::new(CUBE_VERTICES.to_vec(), cube_indices())?),
            Box::new(Texturable::new(CUBE_UVS.to_vec(), params.texture)?),
            Box::new(Colorable::new(params.color)),
            Box::new(Movable::new(params.max_speed)?),
        ])
    }

    /// Compose a cube, uploading its mesh through `gpu`.
    pub fn build(params: &CubeParams, gpu: &mut dyn GpuContext) -> Result<Entity, ConfigError> {
        compose(Self::capabilities(params)?, gpu)
    }
}

/// Keyboard controls shared by every cube.
///
/// A/D push along x, S/W along y, Space stops planar motion, and the arrow
/// keys spin the cube. Re-evaluated from the snapshot on every key event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubeControls {
    pub thrust: f32,
    pub spin_step: f32,
}

impl Default for CubeControls {
    fn default() -> Self {
        Self {
            thrust: 10.0,
            spin_step: 0.1,
        }
    }
}

impl CubeControls {
    /// Acceleration on x and y for the held movement keys.
    pub fn thrust(&self, input: &InputSnapshot) -> (f32, f32) {
        let axis = |neg: char, pos: char| {
            let held = |c| input.is_active(InputId::Char(c));
            let push = |c, amount| if held(c) { amount } else { 0.0 };
            push(neg, -self.thrust) + push(pos, self.thrust)
        };
        (axis('A', 'D'), axis('S', 'W'))
    }

    /// Rotation about x and y for the held arrow keys. Each arrow contributes
    /// one step whether held or not, so a lone arrow yields two steps and
    /// opposite arrows cancel out.
    pub fn spin(&self, input: &InputSnapshot) -> Vec3 {
        let s = self.spin_step;
        let pick = |id, held: f32, idle: f32| if input.is_active(id) { held } else { idle };
        let rx = pick(InputId::Up, -s, s) + pick(InputId::Down, s, -s);
        let ry = pick(InputId::Left, s, -s) + pick(InputId::Right, -s, s);
        Vec3::new(rx, ry, 0.0)
    }

    /// Set thrust and spin on `entity` from the held keys.
    pub fn apply(&self, entity: &mut Entity, input: &InputSnapshot) {
        let (ax, ay) = self.thrust(input);
        if let Some(motion) = entity.motion_mut() {
            motion.acceleration.x = ax;
            motion.acceleration.y = ay;
            if input.is_active(InputId::Space) {
                motion.halt_planar();
            }
        }
        entity.rotate(self.spin(input));
    }

    /// Re-apply the controls to entity `id` on every keydown and keyup.
    pub fn wire(self, tracker: &mut InputTracker<Scene>, id: EntityId) -> [ListenerId; 2] {
        [InputEventKind::KeyDown, InputEventKind::KeyUp].map(|kind| {
            tracker.on(kind, move |scene: &mut Scene, event| {
                if let Some(entity) = scene.get_mut(id) {
                    self.apply(entity, &event.snapshot);
                }
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubescape_ecs::{CapabilityKind, Frame, Orientation};
    use cubescape_render::{GpuCall, HeadlessContext, SIMPLE_PROGRAM, default_programs, names};
    use glam::Mat4;
    use std::time::Instant;

    fn params() -> CubeParams {
        CubeParams {
            position: Vec3::new(0.0, 0.0, -8.0),
            color: Vec4::ONE,
            texture: None,
            max_speed: 8.0,
        }
    }

    fn snapshot_with(keys: &[InputId]) -> InputSnapshot {
        let mut tracker: InputTracker<()> = InputTracker::new();
        let now = Instant::now();
        for key in keys {
            tracker.set_state(*key, Some(now));
        }
        tracker.snapshot()
    }

    #[test]
    fn cube_has_every_capability() {
        let mut gpu = HeadlessContext::new(1, 1);
        let cube = Cube::build(&params(), &mut gpu).unwrap();
        assert_eq!(cube.capabilities().len(), 6);
        assert_eq!(cube.render_steps(), 5);
        assert_eq!(cube.update_steps(), 1);
        assert_eq!(cube.properties().mesh.as_ref().unwrap().index_count(), 36);
    }

    #[test]
    fn cube_turns_about_the_view_origin() {
        let mut gpu = HeadlessContext::new(1, 1);
        let info = default_programs()
            .get_program(&mut gpu, SIMPLE_PROGRAM)
            .unwrap()
            .clone();
        let position = Vec3::new(5.0, 1.0, -8.0);
        let mut cube = Cube::build(&CubeParams { position, ..params() }, &mut gpu).unwrap();
        assert_eq!(
            &cube.capabilities()[..2],
            &[CapabilityKind::Rotatable, CapabilityKind::Positionable]
        );

        let angles = Vec3::new(0.0, 0.5, 0.0);
        cube.rotate(angles);
        cube.render(&mut Frame { gpu: &mut gpu, program: &info }, Mat4::IDENTITY);

        let model_view = info.uniform(names::MODEL_VIEW_MATRIX).unwrap();
        let drawn = gpu
            .calls()
            .iter()
            .rev()
            .find_map(|c| match c {
                GpuCall::SetMat4 { location, value } if *location == model_view => Some(*value),
                _ => None,
            })
            .unwrap();
        let rotation = Mat4::from_quat(Orientation::from_angles(angles).quat());
        assert!(drawn.abs_diff_eq(rotation * Mat4::from_translation(position), 1e-5));
    }

    #[test]
    fn thrust_follows_held_keys() {
        let controls = CubeControls::default();
        assert_eq!(controls.thrust(&snapshot_with(&[])), (0.0, 0.0));
        assert_eq!(controls.thrust(&snapshot_with(&[InputId::Char('A')])), (-10.0, 0.0));
        assert_eq!(
            controls.thrust(&snapshot_with(&[InputId::Char('D'), InputId::Char('W')])),
            (10.0, 10.0)
        );
        assert_eq!(
            controls.thrust(&snapshot_with(&[InputId::Char('A'), InputId::Char('D')])),
            (0.0, 0.0)
        );
    }

    #[test]
    fn spin_from_arrows() {
        let controls = CubeControls::default();
        assert_eq!(controls.spin(&snapshot_with(&[])), Vec3::ZERO);
        let up = controls.spin(&snapshot_with(&[InputId::Up]));
        assert!((up.x + 0.2).abs() < 1e-6 && up.y == 0.0);
        let left = controls.spin(&snapshot_with(&[InputId::Left]));
        assert!((left.y - 0.2).abs() < 1e-6 && left.x == 0.0);
        assert_eq!(controls.spin(&snapshot_with(&[InputId::Up, InputId::Down])), Vec3::ZERO);
    }

    #[test]
    fn space_stops_planar_motion() {
        let mut gpu = HeadlessContext::new(1, 1);
        let mut cube = Cube::build(&params(), &mut gpu).unwrap();
        cube.motion_mut().unwrap().velocity = Vec3::new(3.0, -2.0, 1.0);
        CubeControls::default().apply(
            &mut cube,
            &snapshot_with(&[InputId::Space, InputId::Char('D')]),
        );
        let motion = cube.motion().unwrap();
        assert_eq!(motion.velocity, Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(motion.acceleration, Vec3::ZERO);
    }

    #[test]
    fn wired_controls_drive_the_scene() {
        let mut gpu = HeadlessContext::new(1, 1);
        let mut scene = Scene::default();
        let id = scene.insert(Cube::build(&params(), &mut gpu).unwrap());
        let mut tracker = InputTracker::new();
        CubeControls::default().wire(&mut tracker, id);

        let now = Instant::now();
        tracker.key_down(InputId::Char('D'), now, &mut scene);
        assert_eq!(scene.get(id).unwrap().motion().unwrap().acceleration.x, 10.0);
        tracker.key_down(InputId::Up, now, &mut scene);
        let turned = *scene.get(id).unwrap().orientation().unwrap().matrix();
        assert_ne!(turned, glam::Mat4::IDENTITY);

        tracker.key_up(InputId::Char('D'), &mut scene);
        assert_eq!(scene.get(id).unwrap().motion().unwrap().acceleration.x, 0.0);
    }
}
