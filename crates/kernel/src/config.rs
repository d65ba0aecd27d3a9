use crate::camera::CameraScriptConfig;
use crate::cloud::CloudConfig;
use crate::placement::{GridPolicy, ScatterPolicy};
use crate::sun::SunCycle;
use serde::{Deserialize, Serialize};
use std::path::Path;
use villascape_common::SceneError;

/// Longest start delay accepted for the camera pan (one day).
pub const MAX_DELAY_SECS: f32 = 86_400.0;

/// Everything tunable about the scene. Defaults reproduce the reference villa.
///
/// Any section may be omitted from a config file; missing fields fall back
/// to their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Seed for prop placement. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Hour of day at startup.
    pub start_hour: StartHour,
    pub sun: SunCycle,
    pub clouds: CloudConfig,
    pub camera: CameraScriptConfig,
    pub houses: ScatterPolicy,
    pub trees: GridPolicy,
}

/// Hour of day at startup, noon unless configured.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StartHour(pub f32);

impl Default for StartHour {
    fn default() -> Self {
        Self(12.0)
    }
}

impl SceneConfig {
    pub fn from_json_str(json: &str) -> Result<Self, SceneError> {
        serde_json::from_str(json).map_err(|e| SceneError::Config(e.to_string()))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        tracing::info!(path = %path.display(), "loaded scene config");
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String, SceneError> {
        serde_json::to_string_pretty(self).map_err(|e| SceneError::Config(e.to_string()))
    }

    /// Check every section before any scene construction starts.
    pub fn validate(&self) -> Result<(), SceneError> {
        if !(self.sun.radius.is_finite() && self.sun.radius > 0.0) {
            return Err(SceneError::invalid("sun.radius", "must be positive"));
        }
        if !(0.0..=1.0).contains(&self.sun.night_intensity) {
            return Err(SceneError::invalid("sun.night_intensity", "must be within [0, 1]"));
        }
        if !(self.clouds.bound.is_finite() && self.clouds.bound > 0.0) {
            return Err(SceneError::invalid("clouds.bound", "must be positive"));
        }
        if !self.clouds.speed.is_finite() {
            return Err(SceneError::invalid("clouds.speed", "must be finite"));
        }
        if !(self.camera.delay_secs.is_finite() && self.camera.delay_secs >= 0.0) {
            return Err(SceneError::invalid("camera.delay_secs", "must be non-negative"));
        }
        if self.camera.delay_secs > MAX_DELAY_SECS {
            return Err(SceneError::invalid(
                "camera.delay_secs",
                format!("must be at most {MAX_DELAY_SECS} seconds"),
            ));
        }
        if !self.start_hour.0.is_finite() {
            return Err(SceneError::invalid("start_hour", "must be finite"));
        }
        self.houses.validate()?;
        self.trees.validate()
    }
}
