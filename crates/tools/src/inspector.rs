use std::fmt;
use villascape_common::PartId;
use villascape_kernel::{SceneContext, ScriptPhase};

/// Scene inspector for developer tooling.
///
/// Provides read-only queries against the scene context for the control
/// panel and the headless CLI.
pub struct SceneInspector;

impl SceneInspector {
    pub fn summary(ctx: &SceneContext) -> SceneSummary {
        let light = ctx.scene.sun_light;
        SceneSummary {
            tick: ctx.scene.tick(),
            parts: ctx.scene.part_count(),
            houses: ctx.house_count(),
            trees: ctx.tree_count(),
            hour: ctx.controls.hour(),
            light_intensity: light.intensity,
            light_overridden: ctx.controls.light.is_active(),
            phase: ctx.script_phase(),
            camera: ctx.camera.position.to_array(),
            cloud_x: ctx.cloud_position(),
        }
    }

    pub fn inspect_part(ctx: &SceneContext, id: PartId) -> Option<PartInfo> {
        ctx.scene.get(id).map(|part| PartInfo {
            id,
            kind: part.shape.kind(),
            position: part.transform.position.to_array(),
            color: part.material.color.to_array(),
        })
    }

    pub fn sun(ctx: &SceneContext) -> Option<PartInfo> {
        Self::inspect_part(ctx, ctx.sun_part())
    }
}

/// Snapshot of the per-frame scene state.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSummary {
    pub tick: u64,
    pub parts: usize,
    pub houses: usize,
    pub trees: usize,
    pub hour: f32,
    pub light_intensity: f32,
    pub light_overridden: bool,
    pub phase: ScriptPhase,
    pub camera: [f32; 3],
    pub cloud_x: f32,
}

impl fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Scene: tick={} parts={} houses={} trees={}",
            self.tick, self.parts, self.houses, self.trees
        )?;
        writeln!(
            f,
            "Sun: hour={:.1} intensity={:.2}{}",
            self.hour,
            self.light_intensity,
            if self.light_overridden { " (manual)" } else { "" }
        )?;
        write!(
            f,
            "Camera: {:?} at ({:.2}, {:.2}, {:.2}), cloud x={:.2}",
            self.phase, self.camera[0], self.camera[1], self.camera[2], self.cloud_x
        )
    }
}

/// Detailed info about a single part.
#[derive(Debug, Clone, PartialEq)]
pub struct PartInfo {
    pub id: PartId,
    pub kind: &'static str,
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl fmt::Display for PartInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Part [{}] {} pos=({:.2}, {:.2}, {:.2})",
            self.id.0, self.kind, self.position[0], self.position[1], self.position[2]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::time::Duration;
    use villascape_kernel::SceneConfig;

    fn context() -> SceneContext {
        let mut rng = StdRng::seed_from_u64(3);
        SceneContext::build_with_rng(&SceneConfig::default(), &mut rng).unwrap()
    }

    #[test]
    fn summary_of_fresh_scene() {
        let ctx = context();
        let summary = SceneInspector::summary(&ctx);
        assert_eq!(summary.tick, 0);
        assert_eq!(summary.houses, 20);
        assert_eq!(summary.parts, ctx.scene.part_count());
        assert_eq!(summary.hour, 12.0);
        assert!((summary.light_intensity - 0.5).abs() < 1e-6);
        assert!(!summary.light_overridden);
        assert_eq!(summary.phase, ScriptPhase::Delayed);
        assert_eq!(summary.camera, [0.0, 0.0, 20.0]);
    }

    #[test]
    fn summary_tracks_steps() {
        let mut ctx = context();
        ctx.step_cloud();
        ctx.step_camera(Duration::from_secs(3));
        let summary = SceneInspector::summary(&ctx);
        assert!((summary.cloud_x - 0.02).abs() < 1e-6);
        assert_eq!(summary.phase, ScriptPhase::Active);
    }

    #[test]
    fn sun_part_is_a_sphere() {
        let ctx = context();
        let sun = SceneInspector::sun(&ctx).unwrap();
        assert_eq!(sun.kind, "sphere");
        assert!(format!("{sun}").contains("sphere"));
    }

    #[test]
    fn missing_part_is_none() {
        let ctx = context();
        assert!(SceneInspector::inspect_part(&ctx, PartId(u32::MAX)).is_none());
    }

    #[test]
    fn summary_display() {
        let s = format!("{}", SceneInspector::summary(&context()));
        assert!(s.contains("tick=0"));
        assert!(s.contains("hour=12.0"));
        assert!(s.contains("Delayed"));
    }
}
