//! Scene kernel: the procedural parameters behind the villa scene.
//!
//! # Invariants
//! - The sun model is a pure function of the hour.
//! - Props are placed once at build time and never removed.
//! - Per-frame state changes are limited to the camera, the cloud and the sun.

pub mod camera;
pub mod cloud;
pub mod config;
pub mod context;
pub mod controls;
pub mod placement;
pub mod props;
pub mod scene;
pub mod sun;

pub use camera::{CameraRig, CameraScript, CameraScriptConfig, ScriptPhase};
pub use cloud::{CloudConfig, CloudDrift};
pub use config::{MAX_DELAY_SECS, SceneConfig, StartHour};
pub use context::SceneContext;
pub use controls::{ControlState, LightOverride};
pub use placement::{GridPolicy, ScatterPolicy};
pub use scene::{AmbientLight, Material, Part, Scene, Shape, SunLight};
pub use sun::{SunCycle, SunState, compute_sun_state};
