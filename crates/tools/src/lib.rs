//! Developer tooling: read-only scene inspection.
//!
//! # Invariants
//! - Tools never mutate the scene context.

pub mod inspector;

pub use inspector::{PartInfo, SceneInspector, SceneSummary};
