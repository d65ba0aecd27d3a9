use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Perspective camera shared by the camera script and interactive controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 20.0),
            target: Vec3::ZERO,
            fov_degrees: 75.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl CameraRig {
    /// Recompute the aspect ratio for a new viewport size.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

/// Parameters of the scripted opening pan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraScriptConfig {
    /// Seconds before the pan starts.
    pub delay_secs: f32,
    /// Added to the camera x every active tick.
    pub dx: f32,
    /// Added to the camera z every active tick.
    pub dz: f32,
    /// The pan stops once the camera z drops below this value.
    pub stop_z: f32,
    /// Camera position at startup.
    pub start: [f32; 3],
}

impl Default for CameraScriptConfig {
    fn default() -> Self {
        Self {
            delay_secs: 2.0,
            dx: 0.15,
            dz: -0.25,
            stop_z: -15.0,
            start: [0.0, 0.0, 20.0],
        }
    }
}

/// Phase of the scripted pan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptPhase {
    /// Waiting for the start delay to elapse.
    Delayed,
    /// Translating the camera every tick.
    Active,
    /// Finished. Terminal.
    Stopped,
}

/// Scripted dead-reckoning camera pan.
#[derive(Debug, Clone)]
pub struct CameraScript {
    phase: ScriptPhase,
    delay: Duration,
    waited: Duration,
    dx: f32,
    dz: f32,
    stop_z: f32,
}

impl CameraScript {
    pub fn new(config: &CameraScriptConfig) -> Self {
        Self {
            phase: ScriptPhase::Delayed,
            // Delays too long for a Duration never elapse.
            delay: Duration::try_from_secs_f32(config.delay_secs.max(0.0))
                .unwrap_or(Duration::MAX),
            waited: Duration::ZERO,
            dx: config.dx,
            dz: config.dz,
            stop_z: config.stop_z,
        }
    }

    pub fn phase(&self) -> ScriptPhase {
        self.phase
    }

    /// Advance the script by one tick of length `dt`.
    ///
    /// While delayed, only time accumulates; the tick on which the delay
    /// elapses switches to `Active` without moving the camera. Active ticks
    /// translate `position` and stop the script once z falls below the
    /// threshold.
    pub fn step(&mut self, dt: Duration, position: &mut Vec3) -> ScriptPhase {
        match self.phase {
            ScriptPhase::Delayed => {
                self.waited += dt;
                if self.waited >= self.delay {
                    tracing::debug!(waited = ?self.waited, "camera script active");
                    self.phase = ScriptPhase::Active;
                }
            }
            ScriptPhase::Active => {
                position.x += self.dx;
                position.z += self.dz;
                if position.z < self.stop_z {
                    tracing::debug!(z = position.z, "camera script stopped");
                    self.phase = ScriptPhase::Stopped;
                }
            }
            ScriptPhase::Stopped => {}
        }
        self.phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> Vec3 {
        Vec3::new(0.0, 0.0, 20.0)
    }

    #[test]
    fn stays_delayed_until_delay_elapses() {
        let mut script = CameraScript::new(&CameraScriptConfig::default());
        let mut pos = start();
        for _ in 0..10 {
            assert_eq!(
                script.step(Duration::from_millis(100), &mut pos),
                ScriptPhase::Delayed
            );
        }
        assert_eq!(pos, start());
        assert_eq!(
            script.step(Duration::from_secs(1), &mut pos),
            ScriptPhase::Active
        );
        assert_eq!(pos, start());
    }

    #[test]
    fn oversized_delay_never_elapses() {
        let config = CameraScriptConfig {
            delay_secs: 1e20,
            ..CameraScriptConfig::default()
        };
        let mut script = CameraScript::new(&config);
        let mut pos = start();
        assert_eq!(
            script.step(Duration::from_secs(3600), &mut pos),
            ScriptPhase::Delayed
        );
        assert_eq!(pos, start());
    }

    #[test]
    fn sixty_active_ticks_reach_z_five() {
        let mut script = CameraScript::new(&CameraScriptConfig::default());
        let mut pos = start();
        script.step(Duration::from_secs(2), &mut pos);
        for _ in 0..60 {
            script.step(Duration::from_millis(16), &mut pos);
        }
        assert_eq!(script.phase(), ScriptPhase::Active);
        assert!((pos.z - 5.0).abs() < 1e-4);
        assert!((pos.x - 9.0).abs() < 1e-3);
    }

    #[test]
    fn stops_once_below_threshold_and_stays_put() {
        let mut script = CameraScript::new(&CameraScriptConfig::default());
        let mut pos = start();
        script.step(Duration::from_secs(2), &mut pos);

        let mut ticks = 0;
        while script.phase() == ScriptPhase::Active {
            script.step(Duration::from_millis(16), &mut pos);
            ticks += 1;
            assert!(ticks < 1000);
        }
        // z hits exactly -15 after 140 ticks, which is not below the threshold.
        assert_eq!(ticks, 141);
        assert!(pos.z < -15.0);

        let frozen = pos;
        for _ in 0..50 {
            assert_eq!(
                script.step(Duration::from_millis(16), &mut pos),
                ScriptPhase::Stopped
            );
        }
        assert_eq!(pos, frozen);
    }

    #[test]
    fn zero_delay_activates_on_first_tick() {
        let config = CameraScriptConfig {
            delay_secs: 0.0,
            ..CameraScriptConfig::default()
        };
        let mut script = CameraScript::new(&config);
        let mut pos = start();
        assert_eq!(script.step(Duration::ZERO, &mut pos), ScriptPhase::Active);
    }

    #[test]
    fn viewport_sets_aspect() {
        let mut rig = CameraRig::default();
        rig.set_viewport(1920, 1080);
        assert!((rig.aspect - 16.0 / 9.0).abs() < 1e-6);
        rig.set_viewport(800, 0);
        assert_eq!(rig.aspect, 800.0);
    }

    #[test]
    fn default_rig_produces_finite_matrix() {
        let vp = CameraRig::default().view_projection();
        assert!(vp.is_finite());
    }
}
