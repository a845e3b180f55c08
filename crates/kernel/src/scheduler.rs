use crate::scene::Scene;
use crate::timer::{FrameTimer, RateDisplay};
use cubescape_ecs::Frame;
use cubescape_render::{GpuContext, ProgramCache, ProgramError, names};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Lifecycle of a loop. There is no way back from `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    NotStarted,
    Running,
    Stopped,
}

/// Cancels a loop. Checked at the top of the loop's next tick.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    /// Ask the loop to stop. Takes effect on its next tick.
    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether `stop` was called on any clone.
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchedulerError {
    #[error("logic rate must be a positive number of ticks per second, got {0}")]
    InvalidRate(f64),
}

fn observe_stop(state: &mut LoopState, stop: &StopHandle, name: &str) -> bool {
    match *state {
        LoopState::Running if stop.is_stopped() => {
            *state = LoopState::Stopped;
            tracing::info!(loop_name = name, "loop stopped");
            false
        }
        LoopState::Running => true,
        _ => false,
    }
}

fn start_loop(state: &mut LoopState, stop: &StopHandle, name: &str) -> StopHandle {
    match *state {
        LoopState::NotStarted => {
            *state = LoopState::Running;
            tracing::info!(loop_name = name, "loop started");
        }
        other => tracing::warn!(loop_name = name, state = ?other, "start ignored"),
    }
    stop.clone()
}

/// What one render tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    /// The loop is not running; nothing was touched.
    Idle,
    /// Every entity was drawn.
    Rendered { entities: usize },
    /// The active program is a cached failure; the frame was cleared only.
    Skipped(ProgramError),
}

/// Display-synced loop: the host calls [`RenderLoop::tick`] once per redraw.
#[derive(Debug)]
pub struct RenderLoop {
    state: LoopState,
    stop: StopHandle,
    program: String,
    last_tick: Option<Instant>,
    timer: FrameTimer,
    display: RateDisplay,
    frames: u64,
    warned: bool,
}

impl RenderLoop {
    /// Render loop drawing with the program registered as `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            state: LoopState::NotStarted,
            stop: StopHandle::default(),
            program: program.into(),
            last_tick: None,
            timer: FrameTimer::new(120),
            display: RateDisplay::default(),
            frames: 0,
            warned: false,
        }
    }

    /// Begin ticking at `now`. A loop that was stopped stays stopped.
    pub fn start(&mut self, now: Instant) -> StopHandle {
        if self.state == LoopState::NotStarted {
            self.last_tick = Some(now);
            self.display.reset(now);
        }
        start_loop(&mut self.state, &self.stop, "render")
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Frames drawn so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// The frame rate readout, refreshed every five seconds.
    pub fn frame_rate(&self) -> u32 {
        self.display.shown()
    }

    /// Recent frame intervals.
    pub fn timer(&self) -> &FrameTimer {
        &self.timer
    }

    /// Draw one frame of `scene`.
    ///
    /// `logical_size` is the size the surface should have; the drawing buffer
    /// and the camera aspect follow it when it changes.
    pub fn tick(
        &mut self,
        now: Instant,
        logical_size: (u32, u32),
        scene: &mut Scene,
        gpu: &mut dyn GpuContext,
        programs: &mut ProgramCache,
    ) -> RenderOutcome {
        if !observe_stop(&mut self.state, &self.stop, "render") {
            return RenderOutcome::Idle;
        }
        let _span = tracing::info_span!("render_tick", frame = self.frames).entered();

        if let Some(last) = self.last_tick.replace(now) {
            self.timer.record(now.saturating_duration_since(last));
        }
        self.display.sample(now, self.timer.rate());

        let (width, height) = logical_size;
        if width > 0 && height > 0 && gpu.drawing_buffer_size() != logical_size {
            tracing::debug!(width, height, "drawing buffer resized");
            gpu.resize(width, height);
            scene.camera.set_viewport(width, height);
        }
        gpu.clear();
        self.frames += 1;

        let program = match programs.get_program(gpu, &self.program) {
            Ok(program) => program,
            Err(e) => {
                if !self.warned {
                    tracing::warn!(program = %self.program, "skipping frames: {e}");
                    self.warned = true;
                }
                return RenderOutcome::Skipped(e);
            }
        };

        gpu.use_program(program.handle());
        program.set_mat4(gpu, names::PERSPECTIVE_MATRIX, &scene.camera.projection_matrix());
        program.set_mat4(gpu, names::CAMERA_ROTATION_MATRIX, scene.camera.rotation_matrix());
        scene.render_all(&mut Frame { gpu, program });

        RenderOutcome::Rendered {
            entities: scene.len(),
        }
    }
}

/// Fixed-rate wall-clock loop: the host polls it and it ticks when due.
///
/// Each tick passes the measured elapsed seconds to every entity. A loop that
/// falls behind runs one tick and re-anchors on the current time instead of
/// bursting through the missed ticks.
#[derive(Debug)]
pub struct LogicLoop {
    state: LoopState,
    stop: StopHandle,
    interval: Duration,
    last_tick: Option<Instant>,
    next_due: Option<Instant>,
    ticks: u64,
}

impl LogicLoop {
    pub const DEFAULT_HZ: f64 = 60.0;

    /// Logic loop ticking `hz` times per second.
    pub fn new(hz: f64) -> Result<Self, SchedulerError> {
        if !(hz.is_finite() && hz > 0.0) {
            return Err(SchedulerError::InvalidRate(hz));
        }
        let interval = Duration::try_from_secs_f64(1.0 / hz)
            .map_err(|_| SchedulerError::InvalidRate(hz))?;
        Ok(Self {
            state: LoopState::NotStarted,
            stop: StopHandle::default(),
            interval,
            last_tick: None,
            next_due: None,
            ticks: 0,
        })
    }

    /// Begin ticking at `now`. The first tick is due one interval later.
    pub fn start(&mut self, now: Instant) -> StopHandle {
        if self.state == LoopState::NotStarted {
            self.last_tick = Some(now);
            self.next_due = Some(now + self.interval);
        }
        start_loop(&mut self.state, &self.stop, "logic")
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Target time between ticks.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// When the next tick is due, if the loop is running.
    pub fn next_deadline(&self) -> Option<Instant> {
        (self.state == LoopState::Running && !self.stop.is_stopped())
            .then_some(self.next_due)
            .flatten()
    }

    /// Run a tick if one is due at `now`. Returns the elapsed seconds that
    /// were passed to the entities.
    pub fn poll(&mut self, now: Instant, scene: &mut Scene) -> Option<f32> {
        if !observe_stop(&mut self.state, &self.stop, "logic") {
            return None;
        }
        let due = self.next_due?;
        if now < due {
            return None;
        }
        let _span = tracing::info_span!("logic_tick", tick = self.ticks).entered();

        let last = self.last_tick.replace(now).unwrap_or(now);
        let dt = now.saturating_duration_since(last).as_secs_f32();

        let mut next = due + self.interval;
        if next <= now {
            tracing::debug!(behind = ?(now - due), "logic loop fell behind; re-anchoring");
            next = now + self.interval;
        }
        self.next_due = Some(next);

        scene.update_all(dt);
        self.ticks += 1;
        Some(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubescape_ecs::{Meshable, Movable, Positionable, compose};
    use cubescape_render::{
        GpuCall, HeadlessContext, ProgramSource, SIMPLE_PROGRAM, default_programs,
    };
    use glam::Vec3;

    fn moving_scene(gpu: &mut HeadlessContext) -> (Scene, cubescape_common::EntityId) {
        let entity = compose(
            vec![
                Box::new(Positionable::new(Vec3::ZERO)),
                Box::new(Meshable::new(vec![[0.0; 3]; 3], vec![0, 1, 2]).unwrap()),
                Box::new(Movable::new(100.0).unwrap()),
            ],
            gpu,
        )
        .unwrap();
        let mut scene = Scene::default();
        let id = scene.insert(entity);
        scene.get_mut(id).unwrap().motion_mut().unwrap().velocity = Vec3::X;
        (scene, id)
    }

    #[test]
    fn render_loop_draws_after_start() {
        let mut gpu = HeadlessContext::new(100, 100);
        let (mut scene, _) = moving_scene(&mut gpu);
        let mut programs = default_programs();
        let mut render = RenderLoop::new(SIMPLE_PROGRAM);
        let t0 = Instant::now();

        assert_eq!(
            render.tick(t0, (100, 100), &mut scene, &mut gpu, &mut programs),
            RenderOutcome::Idle
        );
        render.start(t0);
        let outcome = render.tick(
            t0 + Duration::from_millis(16),
            (100, 100),
            &mut scene,
            &mut gpu,
            &mut programs,
        );
        assert_eq!(outcome, RenderOutcome::Rendered { entities: 1 });
        assert_eq!(gpu.draws().len(), 1);
        assert_eq!(gpu.count(|c| matches!(c, GpuCall::SetMat4 { .. })), 3);
    }

    #[test]
    fn render_loop_resizes_on_change() {
        let mut gpu = HeadlessContext::new(100, 100);
        let (mut scene, _) = moving_scene(&mut gpu);
        let mut programs = default_programs();
        let mut render = RenderLoop::new(SIMPLE_PROGRAM);
        let t0 = Instant::now();
        render.start(t0);

        render.tick(t0, (100, 100), &mut scene, &mut gpu, &mut programs);
        assert_eq!(gpu.count(|c| matches!(c, GpuCall::Resize { .. })), 0);
        render.tick(t0, (300, 100), &mut scene, &mut gpu, &mut programs);
        render.tick(t0, (300, 100), &mut scene, &mut gpu, &mut programs);
        assert_eq!(gpu.count(|c| matches!(c, GpuCall::Resize { .. })), 1);
        assert_eq!(scene.camera.aspect, 3.0);
    }

    #[test]
    fn broken_program_skips_frames() {
        let mut gpu = HeadlessContext::new(10, 10);
        let (mut scene, _) = moving_scene(&mut gpu);
        let broken = ProgramSource::standard("#error nope", "fs");
        let mut programs = ProgramCache::new().with_program("broken", broken);
        let mut render = RenderLoop::new("broken");
        let t0 = Instant::now();
        render.start(t0);

        for _ in 0..3 {
            let outcome = render.tick(t0, (10, 10), &mut scene, &mut gpu, &mut programs);
            assert!(matches!(outcome, RenderOutcome::Skipped(ProgramError::Compile { .. })));
        }
        assert_eq!(programs.compile_attempts(), 1);
        assert_eq!(gpu.count(|c| matches!(c, GpuCall::Clear)), 3);
        assert!(gpu.draws().is_empty());
    }

    #[test]
    fn stop_handle_ends_render_loop() {
        let mut gpu = HeadlessContext::new(10, 10);
        let (mut scene, _) = moving_scene(&mut gpu);
        let mut programs = default_programs();
        let mut render = RenderLoop::new(SIMPLE_PROGRAM);
        let t0 = Instant::now();
        let handle = render.start(t0);
        handle.stop();
        assert_eq!(
            render.tick(t0, (10, 10), &mut scene, &mut gpu, &mut programs),
            RenderOutcome::Idle
        );
        assert_eq!(render.state(), LoopState::Stopped);
        render.start(t0);
        assert_eq!(render.state(), LoopState::Stopped);
    }

    #[test]
    fn logic_loop_passes_measured_seconds() {
        let mut gpu = HeadlessContext::new(1, 1);
        let (mut scene, id) = moving_scene(&mut gpu);
        let mut logic = LogicLoop::new(10.0).unwrap();
        let t0 = Instant::now();
        logic.start(t0);

        assert_eq!(logic.poll(t0 + Duration::from_millis(50), &mut scene), None);
        let dt = logic.poll(t0 + Duration::from_millis(250), &mut scene).unwrap();
        assert!((dt - 0.25).abs() < 1e-6);
        let x = scene.get(id).unwrap().position().unwrap().x;
        assert!((x - 0.25).abs() < 1e-6);
        assert_eq!(logic.ticks(), 1);
    }

    #[test]
    fn late_logic_loop_reanchors() {
        let mut scene = Scene::default();
        let mut logic = LogicLoop::new(10.0).unwrap();
        let t0 = Instant::now();
        logic.start(t0);

        let late = t0 + Duration::from_millis(1000);
        assert!(logic.poll(late, &mut scene).is_some());
        assert_eq!(logic.next_deadline(), Some(late + Duration::from_millis(100)));
        assert!(logic.poll(late + Duration::from_millis(10), &mut scene).is_none());
    }

    #[test]
    fn logic_loop_on_time_keeps_cadence() {
        let mut scene = Scene::default();
        let mut logic = LogicLoop::new(10.0).unwrap();
        let t0 = Instant::now();
        logic.start(t0);
        logic.poll(t0 + Duration::from_millis(130), &mut scene);
        assert_eq!(logic.next_deadline(), Some(t0 + Duration::from_millis(200)));
    }

    #[test]
    fn logic_loop_stops() {
        let mut scene = Scene::default();
        let mut logic = LogicLoop::new(60.0).unwrap();
        assert_eq!(logic.state(), LoopState::NotStarted);
        let t0 = Instant::now();
        let handle = logic.start(t0);
        assert_eq!(logic.state(), LoopState::Running);
        handle.stop();
        assert_eq!(logic.next_deadline(), None);
        assert!(logic.poll(t0 + Duration::from_secs(1), &mut scene).is_none());
        assert_eq!(logic.state(), LoopState::Stopped);
    }

    #[test]
    fn invalid_rate_is_rejected() {
        assert_eq!(LogicLoop::new(0.0).unwrap_err(), SchedulerError::InvalidRate(0.0));
        assert!(LogicLoop::new(f64::NAN).is_err());
    }

    #[test]
    fn vanishing_rate_is_rejected() {
        assert_eq!(LogicLoop::new(1e-30).unwrap_err(), SchedulerError::InvalidRate(1e-30));
    }
}
