use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Hours in one full sun revolution.
pub const HOURS_PER_DAY: f32 = 24.0;
/// Hour at which the sun crosses the horizon on the way up.
pub const SUNRISE: f32 = 6.0;
/// Hour at which the sun crosses the horizon on the way down.
pub const SUNSET: f32 = 18.0;

/// Light intensity and sun position for one hour of the day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunState {
    pub intensity: f32,
    pub position: Vec3,
}

/// Parameters of the day/night cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SunCycle {
    /// Radius of the circle the sun travels on.
    pub radius: f32,
    /// Fixed intensity between sunset and sunrise.
    pub night_intensity: f32,
}

impl Default for SunCycle {
    fn default() -> Self {
        Self {
            radius: 10.0,
            night_intensity: 0.1,
        }
    }
}

impl SunCycle {
    /// Evaluate the cycle at `hour`.
    ///
    /// The hour is clamped to `[0, 24]` and NaN reads as midnight. Between
    /// sunrise and sunset intensity rises linearly from 0 to 1 while the sun
    /// climbs a half-sine arc peaking at noon; at night intensity is fixed and
    /// the sun follows the mirrored arc below the horizon.
    pub fn state_at(&self, hour: f32) -> SunState {
        let hour = clamp_hour(hour);

        let (intensity, height) = if (SUNRISE..=SUNSET).contains(&hour) {
            let day = (hour - SUNRISE) / (SUNSET - SUNRISE);
            (day.min(1.0), (day * PI).sin())
        } else {
            // Night runs sunset -> sunrise across midnight.
            let night = (hour - SUNSET).rem_euclid(HOURS_PER_DAY) / (SUNSET - SUNRISE);
            (self.night_intensity, -(night * PI).sin())
        };

        let angle = hour / HOURS_PER_DAY * 2.0 * PI;
        SunState {
            intensity,
            position: Vec3::new(
                self.radius * angle.cos(),
                self.radius * height,
                self.radius * angle.sin(),
            ),
        }
    }
}

/// Sun state for `hour` with the default cycle (radius 10, night intensity 0.1).
pub fn compute_sun_state(hour: f32) -> SunState {
    SunCycle::default().state_at(hour)
}

/// Clamp an hour into `[0, 24]`, mapping NaN to 0.
pub fn clamp_hour(hour: f32) -> f32 {
    if hour.is_nan() {
        0.0
    } else {
        hour.clamp(0.0, HOURS_PER_DAY)
    }
}
