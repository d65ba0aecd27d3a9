use serde::{Deserialize, Serialize};

/// Drift parameters for the cloud layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    /// Distance travelled along +X per tick.
    pub speed: f32,
    /// Position past which the cloud wraps to `-bound`.
    pub bound: f32,
    /// Height of the cloud plane.
    pub altitude: f32,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            speed: 0.02,
            bound: 30.0,
            altitude: 15.0,
        }
    }
}

/// Per-tick cloud drift with wraparound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudDrift {
    position: f32,
    speed: f32,
    bound: f32,
}

impl CloudDrift {
    pub fn new(config: &CloudConfig) -> Self {
        Self {
            position: 0.0,
            speed: config.speed,
            bound: config.bound,
        }
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    /// Advance one tick and return the new position.
    pub fn step(&mut self) -> f32 {
        self.position += self.speed;
        if self.position > self.bound {
            self.position = -self.bound;
        }
        self.position
    }
}
