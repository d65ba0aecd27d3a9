use glam::{Mat4, Vec3};
use std::fmt::Write;
use villascape_kernel::{CameraRig, Scene};

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Field of view in degrees.
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self::from(&CameraRig::default())
    }
}

impl From<&CameraRig> for RenderView {
    fn from(rig: &CameraRig) -> Self {
        Self {
            eye: rig.position,
            target: rig.target,
            fov_degrees: rig.fov_degrees,
            aspect: rig.aspect,
            near: rig.near,
            far: rig.far,
        }
    }
}

impl RenderView {
    pub fn view_projection(&self) -> Mat4 {
        let proj = Mat4::perspective_rh(
            self.fov_degrees.to_radians(),
            self.aspect,
            self.near,
            self.far,
        );
        proj * Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the scene and a view, then produces output. It never
/// mutates the scene.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given scene and view.
    fn render(&self, scene: &Scene, view: &RenderView) -> Self::Output;
}

/// Text renderer for headless runs.
///
/// Produces a human-readable dump of the scene. Used by the CLI and in tests
/// of the frame driver.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    /// List every part, not just the per-shape totals.
    pub list_parts: bool,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn verbose() -> Self {
        Self { list_parts: true }
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene, view: &RenderView) -> String {
        let mut out = String::new();
        let light = scene.sun_light;
        // Writing into a String cannot fail.
        let _ = writeln!(out, "=== Scene (tick={}) ===", scene.tick());
        let _ = writeln!(out, "Parts: {}", scene.part_count());
        for (kind, count) in scene.shape_histogram() {
            let _ = writeln!(out, "  {kind}: {count}");
        }
        let _ = writeln!(
            out,
            "Camera: eye=({:.2}, {:.2}, {:.2}) target=({:.1}, {:.1}, {:.1}) fov={:.0}",
            view.eye.x, view.eye.y, view.eye.z, view.target.x, view.target.y, view.target.z,
            view.fov_degrees
        );
        let _ = writeln!(
            out,
            "Sun light: pos=({:.2}, {:.2}, {:.2}) intensity={:.2}",
            light.position.x, light.position.y, light.position.z, light.intensity
        );

        if self.list_parts {
            for (i, part) in scene.parts().iter().enumerate() {
                let p = part.transform.position;
                let _ = writeln!(
                    out,
                    "  [{i:03}] {} pos=({:.2}, {:.2}, {:.2})",
                    part.shape.kind(),
                    p.x,
                    p.y,
                    p.z
                );
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use villascape_common::Transform;
    use villascape_kernel::{Material, Shape};

    #[test]
    fn debug_renderer_empty_scene() {
        let scene = Scene::new();
        let renderer = DebugTextRenderer::new();
        let output = renderer.render(&scene, &RenderView::default());

        assert!(output.contains("tick=0"));
        assert!(output.contains("Parts: 0"));
    }

    #[test]
    fn debug_renderer_lists_parts_when_verbose() {
        let mut scene = Scene::new();
        scene.add(
            Shape::Sphere { radius: 1.0 },
            Transform::at(Vec3::new(1.0, 2.0, 3.0)),
            Material::solid(0xffff00),
        );

        let output = DebugTextRenderer::verbose().render(&scene, &RenderView::default());
        assert!(output.contains("sphere: 1"));
        assert!(output.contains("[000] sphere pos=(1.00, 2.00, 3.00)"));

        let terse = DebugTextRenderer::new().render(&scene, &RenderView::default());
        assert!(!terse.contains("[000]"));
    }

    #[test]
    fn render_view_follows_rig() {
        let view = RenderView::default();
        assert_eq!(view.fov_degrees, 75.0);
        assert_eq!(view.eye, Vec3::new(0.0, 0.0, 20.0));
        assert_eq!(view.target, Vec3::ZERO);
        assert_eq!(view.view_projection(), CameraRig::default().view_projection());
    }
}
