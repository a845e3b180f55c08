//! Scene objects built on the capability composer: the cube, its keyboard
//! controls, camera dragging and the assembled demo scene.

mod cube;
mod demo;
mod mesh;

pub use cube::{Cube, CubeControls, CubeParams};
pub use demo::{DemoScene, build_demo_scene, cube_position, wire_camera_drag};
pub use mesh::{CUBE_UVS, CUBE_VERTICES, cube_indices};
