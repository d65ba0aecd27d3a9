use crate::sun::{HOURS_PER_DAY, SunState, clamp_hour};
use glam::Vec3;
use villascape_common::SceneError;

/// Manual light values set from the control panel.
///
/// Each field, once set, replaces the corresponding value the sun model
/// would write to the light.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LightOverride {
    pub position: Option<Vec3>,
    pub intensity: Option<f32>,
}

impl LightOverride {
    pub fn is_active(&self) -> bool {
        self.position.is_some() || self.intensity.is_some()
    }

    /// Apply the override on top of a model-computed state.
    pub fn apply(&self, model: SunState) -> SunState {
        SunState {
            position: self.position.unwrap_or(model.position),
            intensity: self.intensity.map_or(model.intensity, |i| i.clamp(0.0, 1.0)),
        }
    }
}

/// Externally settable state polled by the frame driver every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlState {
    hour: f32,
    pub light: LightOverride,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            hour: 12.0,
            light: LightOverride::default(),
        }
    }
}

impl ControlState {
    pub fn with_hour(hour: f32) -> Result<Self, SceneError> {
        let mut state = Self::default();
        state.set_hour(hour)?;
        Ok(state)
    }

    /// Current hour of day in `[0, 24]`.
    pub fn hour(&self) -> f32 {
        self.hour
    }

    /// Set the hour of day. Non-finite input is rejected; finite input
    /// outside `[0, 24]` is clamped.
    pub fn set_hour(&mut self, hour: f32) -> Result<(), SceneError> {
        if !hour.is_finite() {
            return Err(SceneError::invalid("hour", format!("{hour} is not finite")));
        }
        let clamped = clamp_hour(hour);
        if clamped != hour {
            tracing::warn!(hour, clamped, "hour out of range, clamping");
        }
        self.hour = clamped;
        Ok(())
    }

    /// Step the hour by `delta`, saturating at either end of the day.
    pub fn nudge_hour(&mut self, delta: f32) {
        self.hour = (self.hour + delta).clamp(0.0, HOURS_PER_DAY);
    }

    pub fn clear_light_override(&mut self) {
        self.light = LightOverride::default();
    }
}
