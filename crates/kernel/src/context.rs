use crate::camera::{CameraRig, CameraScript, ScriptPhase};
use crate::cloud::CloudDrift;
use crate::config::SceneConfig;
use crate::controls::ControlState;
use crate::props;
use crate::scene::Scene;
use crate::sun::{SunCycle, SunState};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use villascape_common::{PartId, SceneError};

/// All mutable scene state, owned by the frame driver's caller.
///
/// Each per-frame step touches one entity: the camera script moves the
/// camera, the drift moves the cloud, the sun step rewrites the sun disc and
/// light from the injected control state.
#[derive(Debug, Clone)]
pub struct SceneContext {
    pub scene: Scene,
    pub camera: CameraRig,
    pub controls: ControlState,
    script: CameraScript,
    cloud: CloudDrift,
    sun_cycle: SunCycle,
    sun_id: PartId,
    cloud_id: PartId,
    houses: usize,
    trees: usize,
}

impl SceneContext {
    /// Build the scene, seeding placement from the config or the OS.
    pub fn build(config: &SceneConfig) -> Result<Self, SceneError> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::build_with_rng(config, &mut rng)
    }

    pub fn build_with_rng<R: Rng>(config: &SceneConfig, rng: &mut R) -> Result<Self, SceneError> {
        let _span = tracing::info_span!("scene_build").entered();
        config.validate()?;

        let mut scene = Scene::new();
        props::add_set_pieces(&mut scene);

        let house_sites = config.houses.sample(rng)?;
        for site in &house_sites {
            props::add_house(&mut scene, *site);
        }
        let tree_sites = config.trees.sample(rng)?;
        for site in &tree_sites {
            props::add_tree(&mut scene, *site);
        }

        let sun_id = props::add_sun(&mut scene);
        let cloud_id = props::add_cloud(&mut scene, config.clouds.altitude);

        let controls = ControlState::with_hour(config.start_hour.0)?;
        let camera = CameraRig {
            position: Vec3::from_array(config.camera.start),
            ..CameraRig::default()
        };

        tracing::info!(
            houses = house_sites.len(),
            trees = tree_sites.len(),
            parts = scene.part_count(),
            "scene built"
        );

        let mut ctx = Self {
            scene,
            camera,
            controls,
            script: CameraScript::new(&config.camera),
            cloud: CloudDrift::new(&config.clouds),
            sun_cycle: config.sun,
            sun_id,
            cloud_id,
            houses: house_sites.len(),
            trees: tree_sites.len(),
        };
        ctx.apply_sun();
        Ok(ctx)
    }

    pub fn script_phase(&self) -> ScriptPhase {
        self.script.phase()
    }

    pub fn cloud_position(&self) -> f32 {
        self.cloud.position()
    }

    pub fn house_count(&self) -> usize {
        self.houses
    }

    pub fn tree_count(&self) -> usize {
        self.trees
    }

    pub fn sun_part(&self) -> PartId {
        self.sun_id
    }

    pub fn cloud_part(&self) -> PartId {
        self.cloud_id
    }

    /// Advance the camera script by `dt`.
    pub fn step_camera(&mut self, dt: Duration) -> ScriptPhase {
        self.script.step(dt, &mut self.camera.position)
    }

    /// Advance the cloud drift and move the cloud part.
    pub fn step_cloud(&mut self) {
        let x = self.cloud.step();
        if let Some(cloud) = self.scene.get_mut(self.cloud_id) {
            cloud.transform.position.x = x;
        }
    }

    /// Recompute the sun from the current hour and write it to the sun disc
    /// and light. Manual light overrides win over the model for the light.
    pub fn apply_sun(&mut self) -> SunState {
        let model = self.sun_cycle.state_at(self.controls.hour());
        self.scene.set_position(self.sun_id, model.position);

        let light = self.controls.light.apply(model);
        self.scene.sun_light.position = light.position;
        self.scene.sun_light.intensity = light.intensity;
        model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(seed: u64) -> SceneContext {
        let config = SceneConfig {
            seed: Some(seed),
            ..SceneConfig::default()
        };
        SceneContext::build(&config).unwrap()
    }

    #[test]
    fn build_places_all_houses() {
        let ctx = seeded(1);
        assert_eq!(ctx.house_count(), 20);
        assert!(ctx.tree_count() <= 16);
        // set pieces + 2 per house + 2 per tree + sun + cloud
        assert_eq!(
            ctx.scene.part_count(),
            12 + 2 * ctx.house_count() + 2 * ctx.tree_count() + 2
        );
    }

    #[test]
    fn same_seed_same_layout() {
        let a = seeded(42);
        let b = seeded(42);
        assert_eq!(a.scene.parts(), b.scene.parts());
    }

    #[test]
    fn build_surfaces_placement_exhaustion() {
        let mut config = SceneConfig {
            seed: Some(0),
            ..SceneConfig::default()
        };
        config.houses.range = 0.5;
        config.houses.exclusion = 10.0;
        config.houses.max_attempts = 100;
        assert!(matches!(
            SceneContext::build(&config),
            Err(SceneError::PlacementExhausted { .. })
        ));
    }

    #[test]
    fn build_places_sun_for_start_hour() {
        let ctx = seeded(0);
        let sun = ctx.scene.get(ctx.sun_part()).unwrap();
        assert!((sun.transform.position.y - 10.0).abs() < 1e-4);
        assert!((ctx.scene.sun_light.intensity - 0.5).abs() < 1e-6);
    }

    #[test]
    fn step_cloud_moves_cloud_part() {
        let mut ctx = seeded(0);
        ctx.step_cloud();
        let cloud = ctx.scene.get(ctx.cloud_part()).unwrap();
        assert_eq!(cloud.transform.position.x, ctx.cloud_position());
        assert!((cloud.transform.position.x - 0.02).abs() < 1e-6);
    }

    #[test]
    fn light_override_bypasses_model_for_light_only() {
        let mut ctx = seeded(0);
        ctx.controls.light.position = Some(Vec3::new(-10.0, 30.0, 10.0));
        ctx.controls.light.intensity = Some(0.3);
        let model = ctx.apply_sun();
        assert_eq!(ctx.scene.sun_light.position, Vec3::new(-10.0, 30.0, 10.0));
        assert_eq!(ctx.scene.sun_light.intensity, 0.3);
        let sun = ctx.scene.get(ctx.sun_part()).unwrap();
        assert_eq!(sun.transform.position, model.position);
    }

    #[test]
    fn camera_starts_at_configured_position() {
        let ctx = seeded(0);
        assert_eq!(ctx.camera.position, Vec3::new(0.0, 0.0, 20.0));
        assert_eq!(ctx.script_phase(), ScriptPhase::Delayed);
    }

    #[test]
    fn build_rejects_oversized_camera_delay() {
        let mut config = SceneConfig {
            seed: Some(0),
            ..SceneConfig::default()
        };
        config.camera.delay_secs = 1e20;
        assert!(matches!(
            SceneContext::build(&config),
            Err(SceneError::InvalidParameter { name: "camera.delay_secs", .. })
        ));
    }
}
