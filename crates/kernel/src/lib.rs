//! Scene container and frame scheduler.
//!
//! Two loops share one [`Scene`]: a display-synced render loop and a fixed-rate
//! logic loop. Both are driven by the host's event loop on one thread.
//!
//! # Invariants
//! - Update steps receive measured elapsed time in seconds.
//! - A loop observes its [`StopHandle`] at the top of every tick.
//! - No GPU resource is created inside a tick.

mod camera;
mod scene;
mod scheduler;
mod timer;

pub use camera::Camera;
pub use scene::Scene;
pub use scheduler::{LogicLoop, LoopState, RenderLoop, RenderOutcome, SchedulerError, StopHandle};
pub use timer::{FrameTimer, RateDisplay};
