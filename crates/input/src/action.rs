use glam::Vec2;
use villascape_common::SceneError;
use villascape_kernel::ControlState;

/// Hours moved by one press of the hour keys.
pub const HOUR_STEP: f32 = 1.0;

/// A high-level action produced from desktop input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Orbit the camera by a pointer drag, in pixels.
    Orbit(Vec2),
    /// Zoom by wheel notches; positive moves towards the target.
    Zoom(f32),
    /// Step the hour of day by the given number of hours.
    NudgeHour(f32),
    /// Jump to an hour of day.
    SetHour(f32),
    /// Drop the manual sun overrides and follow the model again.
    ResetLight,
    /// Show or hide the control panel.
    ToggleControls,
    Quit,
    /// No-op (used for input mapping that hasn't been bound yet).
    Noop,
}

/// What the app still has to do after an action touched the control state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Fully handled by the control state.
    Handled,
    /// Not a control-state action; the caller owns it.
    Forward,
}

impl Action {
    /// Bracket keys step the clock, matching the panel's one-hour slider.
    pub fn for_key(key: char) -> Action {
        match key {
            '[' => Action::NudgeHour(-HOUR_STEP),
            ']' => Action::NudgeHour(HOUR_STEP),
            'r' | 'R' => Action::ResetLight,
            _ => Action::Noop,
        }
    }

    /// Apply the time and light actions to `controls`.
    pub fn apply(&self, controls: &mut ControlState) -> Result<Applied, SceneError> {
        match *self {
            Action::NudgeHour(delta) => {
                controls.nudge_hour(delta);
                tracing::debug!(hour = controls.hour(), "hour stepped");
                Ok(Applied::Handled)
            }
            Action::SetHour(hour) => {
                controls.set_hour(hour)?;
                Ok(Applied::Handled)
            }
            Action::ResetLight => {
                controls.clear_light_override();
                Ok(Applied::Handled)
            }
            Action::Noop => Ok(Applied::Handled),
            Action::Orbit(_) | Action::Zoom(_) | Action::ToggleControls | Action::Quit => {
                Ok(Applied::Forward)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn bracket_keys_step_the_hour() {
        let mut c = ControlState::default();
        Action::for_key(']').apply(&mut c).unwrap();
        assert_eq!(c.hour(), 13.0);
        Action::for_key('[').apply(&mut c).unwrap();
        Action::for_key('[').apply(&mut c).unwrap();
        assert_eq!(c.hour(), 11.0);
    }

    #[test]
    fn nudge_stops_at_midnight() {
        let mut c = ControlState::with_hour(23.5).unwrap();
        Action::NudgeHour(HOUR_STEP).apply(&mut c).unwrap();
        assert_eq!(c.hour(), 24.0);
    }

    #[test]
    fn set_hour_rejects_non_finite() {
        let mut c = ControlState::default();
        assert!(Action::SetHour(f32::INFINITY).apply(&mut c).is_err());
        assert_eq!(Action::SetHour(7.0).apply(&mut c).unwrap(), Applied::Handled);
        assert_eq!(c.hour(), 7.0);
    }

    #[test]
    fn reset_light_clears_overrides() {
        let mut c = ControlState::default();
        c.light.position = Some(Vec3::ONE);
        c.light.intensity = Some(0.3);
        Action::ResetLight.apply(&mut c).unwrap();
        assert!(!c.light.is_active());
    }

    #[test]
    fn camera_and_app_actions_are_forwarded() {
        let mut c = ControlState::default();
        for action in [
            Action::Orbit(Vec2::new(3.0, 1.0)),
            Action::Zoom(1.0),
            Action::ToggleControls,
            Action::Quit,
        ] {
            assert_eq!(action.apply(&mut c).unwrap(), Applied::Forward);
        }
        assert_eq!(c, ControlState::default());
    }

    #[test]
    fn unbound_key_is_noop() {
        assert_eq!(Action::for_key('x'), Action::Noop);
    }
}
