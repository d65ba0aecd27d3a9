//! Shared types for the villascape workspace.
//!
//! # Invariants
//! - Types here carry no behavior beyond construction and conversion.

mod error;
mod types;

pub use error::SceneError;
pub use types::{PartId, Rgba, Transform};
