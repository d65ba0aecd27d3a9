//! Rendering adapter: renderer-agnostic interface and the frame driver.
//!
//! # Invariants
//! - Renderers never mutate the scene.
//! - All per-frame mutations happen before the render call of that frame.

mod driver;
mod renderer;

pub use driver::{FrameDriver, FrameTimer, StaticView, ViewControls};
pub use renderer::{DebugTextRenderer, RenderView, Renderer};

pub fn crate_info() -> &'static str {
    "villascape-render v0.1.0"
}
