//! wgpu render backend for the villa scene.
//!
//! Every part is drawn from a shared unit mesh stretched per instance, lit
//! by the scene's sun light and ambient fill. Translucent parts go in a
//! second pass without depth writes.
//!
//! # Invariants
//! - The renderer never mutates the scene.
//! - Orbit controls move only the camera rig, after the camera script.

mod camera;
mod gpu;
mod mesh;
mod shaders;

pub use camera::OrbitControls;
pub use gpu::{WgpuFrame, WgpuRenderer};
pub use mesh::{MeshKey, Vertex};
