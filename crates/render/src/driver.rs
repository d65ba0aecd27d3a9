use crate::renderer::{RenderView, Renderer};
use std::time::Duration;
use villascape_kernel::{CameraRig, SceneContext};

/// Interactive camera controls updated once per frame.
///
/// Implementations mutate the same camera the scripted pan moves; the two
/// are not coordinated.
pub trait ViewControls {
    fn update(&mut self, camera: &mut CameraRig);
}

/// Controls that leave the camera alone, for headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticView;

impl ViewControls for StaticView {
    fn update(&mut self, _camera: &mut CameraRig) {}
}

/// Runs the per-frame steps in their fixed order and hands the result to a
/// renderer.
#[derive(Debug)]
pub struct FrameDriver {
    timer: FrameTimer,
}

impl Default for FrameDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDriver {
    pub fn new() -> Self {
        Self {
            timer: FrameTimer::new(120),
        }
    }

    /// One frame: camera script, cloud drift, sun, interactive controls,
    /// then render. Every mutation lands before the render call.
    pub fn tick<C, R>(
        &mut self,
        ctx: &mut SceneContext,
        dt: Duration,
        controls: &mut C,
        renderer: &R,
    ) -> R::Output
    where
        C: ViewControls + ?Sized,
        R: Renderer,
    {
        let _span = tracing::trace_span!("frame", tick = ctx.scene.tick()).entered();
        self.timer.record(dt);

        ctx.step_camera(dt);
        ctx.step_cloud();
        let sun = ctx.apply_sun();
        controls.update(&mut ctx.camera);
        ctx.scene.advance_tick();

        tracing::trace!(
            hour = ctx.controls.hour(),
            intensity = sun.intensity,
            cloud_x = ctx.cloud_position(),
            phase = ?ctx.script_phase(),
            "frame state"
        );

        let view = RenderView::from(&ctx.camera);
        renderer.render(&ctx.scene, &view)
    }

    pub fn frame_timer(&self) -> &FrameTimer {
        &self.timer
    }
}

/// Rolling window of recent frame times.
#[derive(Debug)]
pub struct FrameTimer {
    history: Vec<Duration>,
    capacity: usize,
    index: usize,
    filled: bool,
}

impl FrameTimer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            history: vec![Duration::ZERO; capacity],
            capacity,
            index: 0,
            filled: false,
        }
    }

    pub fn record(&mut self, dt: Duration) {
        self.history[self.index] = dt;
        self.index = (self.index + 1) % self.capacity;
        if self.index == 0 {
            self.filled = true;
        }
    }

    pub fn count(&self) -> usize {
        if self.filled {
            self.capacity
        } else {
            self.index
        }
    }

    pub fn average(&self) -> Duration {
        let count = self.count();
        if count == 0 {
            return Duration::ZERO;
        }
        let total: Duration = self.history[..count].iter().sum();
        total / count as u32
    }

    /// Frames per second implied by the average frame time.
    pub fn fps(&self) -> f32 {
        let avg = self.average().as_secs_f32();
        if avg > 0.0 { 1.0 / avg } else { 0.0 }
    }
}
