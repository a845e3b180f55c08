use cubescape_common::{EntityId, SceneConfig};
use cubescape_ecs::ConfigError;
use cubescape_input::{InputEventKind, InputId, InputTracker, ListenerId};
use cubescape_kernel::{Camera, Scene};
use cubescape_render::{GpuContext, TextureHandle};
use glam::{Vec3, Vec4};
use rand::Rng;

use crate::cube::{Cube, CubeControls, CubeParams};

/// Turn the camera while the mouse is dragged. Holding shift freezes it.
pub fn wire_camera_drag(tracker: &mut InputTracker<Scene>) -> [ListenerId; 3] {
    [
        tracker.on(InputEventKind::MouseDown, |scene, event| {
            if let Some(at) = event.pointer() {
                scene.camera.begin_drag(at);
            }
        }),
        tracker.on(InputEventKind::MouseMove, |scene, event| {
            if let Some(at) = event.pointer() {
                let frozen = event.snapshot.is_active(InputId::Shift);
                scene.camera.drag_to(at, frozen);
            }
        }),
        tracker.on(InputEventKind::MouseUp, |scene, _| scene.camera.end_drag()),
    ]
}

/// Position of cube `index` out of `config.cube_count`: a row centered on x = 0,
/// rising one unit per cube.
pub fn cube_position(config: &SceneConfig, index: usize) -> Vec3 {
    let offset = index as f32 - (config.cube_count as f32 - 1.0) / 2.0;
    Vec3::new(offset * config.cube_spacing, offset, config.cube_depth)
}

fn random_color(rng: &mut impl Rng) -> Vec4 {
    Vec4::new(
        rng.gen_range(0.0..1.0),
        rng.gen_range(0.0..1.0),
        rng.gen_range(0.0..1.0),
        1.0,
    )
}

/// The demo: a row of randomly colored cubes sharing one texture, keyboard
/// controls on every cube and a draggable camera.
pub struct DemoScene {
    pub scene: Scene,
    pub cubes: Vec<EntityId>,
    pub listeners: Vec<ListenerId>,
}

pub fn build_demo_scene(
    config: &SceneConfig,
    gpu: &mut dyn GpuContext,
    tracker: &mut InputTracker<Scene>,
    texture: Option<TextureHandle>,
    rng: &mut impl Rng,
) -> Result<DemoScene, ConfigError> {
    let mut scene = Scene::new(Camera::from_config(config));
    let (width, height) = gpu.drawing_buffer_size();
    scene.camera.set_viewport(width, height);

    let controls = CubeControls {
        thrust: config.thrust,
        spin_step: config.spin_step,
    };
    let mut cubes = Vec::with_capacity(config.cube_count);
    let mut listeners = Vec::new();
    for index in 0..config.cube_count {
        let params = CubeParams {
            position: cube_position(config, index),
            color: random_color(rng),
            texture,
            max_speed: config.max_speed,
        };
        let id = scene.insert(Cube::build(&params, gpu)?);
        listeners.extend(controls.wire(tracker, id));
        cubes.push(id);
    }
    listeners.extend(wire_camera_drag(tracker));

    tracing::info!(
        cubes = cubes.len(),
        textured = texture.is_some(),
        "demo scene built"
    );
    Ok(DemoScene {
        scene,
        cubes,
        listeners,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubescape_render::{GpuCall, HeadlessContext, TextureImage};
    use glam::{Mat4, Vec2};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::time::Instant;

    fn build(config: &SceneConfig) -> (DemoScene, InputTracker<Scene>, HeadlessContext) {
        let mut gpu = HeadlessContext::new(800, 600);
        let texture = gpu.create_texture(&TextureImage::white());
        let mut tracker = InputTracker::new();
        let mut rng = StdRng::seed_from_u64(7);
        let demo = build_demo_scene(config, &mut gpu, &mut tracker, Some(texture), &mut rng)
            .unwrap();
        (demo, tracker, gpu)
    }

    #[test]
    fn default_layout_matches_row() {
        let config = SceneConfig::default();
        assert_eq!(cube_position(&config, 0), Vec3::new(-5.0, -1.0, -8.0));
        assert_eq!(cube_position(&config, 1), Vec3::new(0.0, 0.0, -8.0));
        assert_eq!(cube_position(&config, 2), Vec3::new(5.0, 1.0, -8.0));
    }

    #[test]
    fn builds_three_opaque_cubes() {
        let (demo, tracker, gpu) = build(&SceneConfig::default());
        assert_eq!(demo.scene.len(), 3);
        assert_eq!(demo.cubes.len(), 3);
        assert_eq!(tracker.listener_count(), 3 * 2 + 3);
        assert_eq!(demo.listeners.len(), tracker.listener_count());
        for id in &demo.cubes {
            let color = demo.scene.get(*id).unwrap().properties().color.unwrap();
            assert_eq!(color.w, 1.0);
            assert!(color.x >= 0.0 && color.x < 1.0);
        }
        let uploads = gpu.count(|c| matches!(c, GpuCall::UploadBuffer { .. }));
        assert_eq!(uploads, 3 * 3);
        assert!((demo.scene.camera.aspect - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn same_seed_same_colors() {
        let config = SceneConfig::default();
        let colors = |demo: &DemoScene| -> Vec<Vec4> {
            demo.cubes
                .iter()
                .map(|id| demo.scene.get(*id).unwrap().properties().color.unwrap())
                .collect()
        };
        let (a, _, _) = build(&config);
        let (b, _, _) = build(&config);
        assert_eq!(colors(&a), colors(&b));
    }

    #[test]
    fn keys_move_every_cube() {
        let (mut demo, mut tracker, _) = build(&SceneConfig::default());
        tracker.key_down(InputId::Char('W'), Instant::now(), &mut demo.scene);
        demo.scene.update_all(0.5);
        for id in &demo.cubes {
            let motion = demo.scene.get(*id).unwrap().motion().unwrap();
            assert_eq!(motion.velocity.y, 5.0);
        }
    }

    #[test]
    fn drag_turns_camera_unless_shift_held() {
        let (mut demo, mut tracker, _) = build(&SceneConfig::default());
        let scene = &mut demo.scene;
        let now = Instant::now();

        tracker.mouse_move(Vec2::new(10.0, 10.0), now, scene);
        assert_eq!(*scene.camera.rotation_matrix(), Mat4::IDENTITY);

        tracker.mouse_down(Vec2::new(100.0, 100.0), now, scene);
        tracker.key_down(InputId::Shift, now, scene);
        tracker.mouse_move(Vec2::new(130.0, 100.0), now, scene);
        assert_eq!(*scene.camera.rotation_matrix(), Mat4::IDENTITY);

        tracker.key_up(InputId::Shift, scene);
        tracker.mouse_move(Vec2::new(160.0, 100.0), now, scene);
        assert_ne!(*scene.camera.rotation_matrix(), Mat4::IDENTITY);

        tracker.mouse_up(Vec2::new(160.0, 100.0), now, scene);
        assert!(!scene.camera.is_dragging());
    }

    #[test]
    fn zero_cubes_is_an_empty_scene() {
        let config = SceneConfig {
            cube_count: 0,
            ..SceneConfig::default()
        };
        let (demo, tracker, _) = build(&config);
        assert!(demo.scene.is_empty());
        assert_eq!(tracker.listener_count(), 3);
    }
}
