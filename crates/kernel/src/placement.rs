//! Placement policies used once at startup to scatter props on the ground plane.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use villascape_common::SceneError;

/// Uniform rejection sampling over a square with an exclusion box at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterPolicy {
    /// Number of points to accept.
    pub count: usize,
    /// Points are drawn from `[-2 * range, 2 * range]` on both axes.
    pub range: f32,
    /// Half-extent of the exclusion box: a point with `|x| <= e && |z| <= e`
    /// is rejected.
    pub exclusion: f32,
    /// Upper bound on draws before giving up.
    pub max_attempts: usize,
}

impl Default for ScatterPolicy {
    fn default() -> Self {
        Self {
            count: 20,
            range: 30.0,
            exclusion: 2.0,
            max_attempts: 10_000,
        }
    }
}

impl ScatterPolicy {
    pub fn validate(&self) -> Result<(), SceneError> {
        if !(self.range > 0.0 && (2.0 * self.range).is_finite()) {
            return Err(SceneError::invalid("houses.range", "must be positive and finite"));
        }
        if !(self.exclusion.is_finite() && self.exclusion >= 0.0) {
            return Err(SceneError::invalid("houses.exclusion", "must be non-negative"));
        }
        if self.count > self.max_attempts {
            return Err(SceneError::invalid(
                "houses.count",
                format!("cannot exceed max_attempts ({})", self.max_attempts),
            ));
        }
        Ok(())
    }

    /// Whether `p` falls inside the exclusion box.
    pub fn is_excluded(&self, p: Vec2) -> bool {
        p.x.abs() <= self.exclusion && p.y.abs() <= self.exclusion
    }

    /// Draw exactly `count` accepted points, or fail once `max_attempts`
    /// draws have been spent.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Result<Vec<Vec2>, SceneError> {
        self.validate()?;

        let half = 2.0 * self.range;
        let mut points = Vec::new();
        let mut attempts = 0;
        while points.len() < self.count {
            if attempts == self.max_attempts {
                return Err(SceneError::PlacementExhausted {
                    placed: points.len(),
                    requested: self.count,
                    attempts,
                });
            }
            attempts += 1;

            let p = Vec2::new(
                (rng.random::<f32>() - 0.5) * 2.0 * half,
                (rng.random::<f32>() - 0.5) * 2.0 * half,
            );
            if !self.is_excluded(p) {
                points.push(p);
            }
        }

        tracing::debug!(placed = points.len(), attempts, "scatter placement done");
        Ok(points)
    }
}

/// Most grid points accepted along one axis.
pub const MAX_GRID_AXIS: usize = 1024;

/// Fixed-step grid where each point is kept with a fixed probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridPolicy {
    pub min: f32,
    pub max: f32,
    pub step: f32,
    /// Probability that a grid point is kept.
    pub keep_probability: f64,
}

impl Default for GridPolicy {
    fn default() -> Self {
        Self {
            min: -15.0,
            max: 15.0,
            step: 10.0,
            keep_probability: 0.5,
        }
    }
}

impl GridPolicy {
    pub fn validate(&self) -> Result<(), SceneError> {
        if !(self.step.is_finite() && self.step > 0.0) {
            return Err(SceneError::invalid("trees.step", "must be positive"));
        }
        if !(self.min.is_finite() && self.max.is_finite() && self.min <= self.max) {
            return Err(SceneError::invalid("trees.min", "must not exceed trees.max"));
        }
        if !(0.0..=1.0).contains(&self.keep_probability) {
            return Err(SceneError::invalid(
                "trees.keep_probability",
                "must be within [0, 1]",
            ));
        }
        let cells = (self.max - self.min) / self.step;
        if !(cells.is_finite() && cells < MAX_GRID_AXIS as f32) {
            return Err(SceneError::invalid(
                "trees.step",
                format!("grid exceeds {MAX_GRID_AXIS} points per axis"),
            ));
        }
        Ok(())
    }

    /// Grid coordinates along one axis, `min` inclusive and `max` inclusive.
    pub fn axis(&self) -> Vec<f32> {
        let steps = ((self.max - self.min) / self.step).floor() as usize;
        (0..=steps).map(|i| self.min + i as f32 * self.step).collect()
    }

    /// Walk the grid row by row, keeping each point independently.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Result<Vec<Vec2>, SceneError> {
        self.validate()?;

        let axis = self.axis();
        let mut points = Vec::new();
        for &x in &axis {
            for &z in &axis {
                if rng.random_bool(self.keep_probability) {
                    points.push(Vec2::new(x, z));
                }
            }
        }

        tracing::debug!(
            kept = points.len(),
            candidates = axis.len() * axis.len(),
            "grid placement done"
        );
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn scatter_places_exactly_count_outside_exclusion() {
        let policy = ScatterPolicy::default();
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let points = policy.sample(&mut rng).unwrap();
            assert_eq!(points.len(), 20);
            for p in &points {
                assert!(p.x.abs() > 2.0 || p.y.abs() > 2.0, "{p:?}");
                assert!(p.x.abs() <= 60.0 && p.y.abs() <= 60.0);
            }
        }
    }

    #[test]
    fn scatter_is_reproducible_for_a_seed() {
        let policy = ScatterPolicy::default();
        let a = policy.sample(&mut StdRng::seed_from_u64(7)).unwrap();
        let b = policy.sample(&mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn scatter_fails_when_exclusion_covers_range() {
        let policy = ScatterPolicy {
            range: 1.0,
            exclusion: 5.0,
            max_attempts: 500,
            ..ScatterPolicy::default()
        };
        let err = policy.sample(&mut StdRng::seed_from_u64(1)).unwrap_err();
        match err {
            SceneError::PlacementExhausted {
                placed,
                requested,
                attempts,
            } => {
                assert_eq!(placed, 0);
                assert_eq!(requested, 20);
                assert_eq!(attempts, 500);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn scatter_rejects_bad_parameters() {
        let bad_range = ScatterPolicy {
            range: 0.0,
            ..ScatterPolicy::default()
        };
        assert!(matches!(
            bad_range.sample(&mut StdRng::seed_from_u64(0)),
            Err(SceneError::InvalidParameter { .. })
        ));

        let no_budget = ScatterPolicy {
            max_attempts: 0,
            ..ScatterPolicy::default()
        };
        assert!(no_budget.validate().is_err());
    }

    #[test]
    fn scatter_rejects_count_beyond_attempt_budget() {
        let policy = ScatterPolicy {
            count: usize::MAX,
            max_attempts: 10,
            ..ScatterPolicy::default()
        };
        assert!(matches!(
            policy.sample(&mut StdRng::seed_from_u64(0)),
            Err(SceneError::InvalidParameter { name: "houses.count", .. })
        ));
    }

    #[test]
    fn scatter_rejects_range_that_overflows_draw_extent() {
        let policy = ScatterPolicy {
            range: f32::MAX,
            ..ScatterPolicy::default()
        };
        assert!(matches!(
            policy.sample(&mut StdRng::seed_from_u64(0)),
            Err(SceneError::InvalidParameter { name: "houses.range", .. })
        ));
    }

    #[test]
    fn scatter_with_zero_count_is_empty() {
        let policy = ScatterPolicy {
            count: 0,
            max_attempts: 0,
            ..ScatterPolicy::default()
        };
        assert!(policy.sample(&mut StdRng::seed_from_u64(0)).unwrap().is_empty());
    }

    #[test]
    fn exclusion_box_edges_are_excluded() {
        let policy = ScatterPolicy::default();
        assert!(policy.is_excluded(Vec2::new(2.0, -2.0)));
        assert!(!policy.is_excluded(Vec2::new(2.01, 0.0)));
        assert!(!policy.is_excluded(Vec2::new(0.0, -40.0)));
    }

    #[test]
    fn default_grid_axis() {
        assert_eq!(GridPolicy::default().axis(), vec![-15.0, -5.0, 5.0, 15.0]);
    }

    #[test]
    fn grid_points_lie_on_grid() {
        let policy = GridPolicy::default();
        let axis = policy.axis();
        let points = policy.sample(&mut StdRng::seed_from_u64(3)).unwrap();
        assert!(points.len() <= 16);
        for p in &points {
            assert!(axis.contains(&p.x) && axis.contains(&p.y));
        }
    }

    #[test]
    fn grid_probability_extremes() {
        let all = GridPolicy {
            keep_probability: 1.0,
            ..GridPolicy::default()
        };
        assert_eq!(all.sample(&mut StdRng::seed_from_u64(0)).unwrap().len(), 16);

        let none = GridPolicy {
            keep_probability: 0.0,
            ..GridPolicy::default()
        };
        assert!(none.sample(&mut StdRng::seed_from_u64(0)).unwrap().is_empty());
    }

    #[test]
    fn grid_rejects_bad_step() {
        let policy = GridPolicy {
            step: 0.0,
            ..GridPolicy::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn grid_rejects_unbounded_extent() {
        let huge = GridPolicy {
            min: -f32::MAX,
            max: f32::MAX,
            step: 1.0,
            ..GridPolicy::default()
        };
        assert!(matches!(
            huge.sample(&mut StdRng::seed_from_u64(0)),
            Err(SceneError::InvalidParameter { name: "trees.step", .. })
        ));

        let dense = GridPolicy {
            min: 0.0,
            max: 10_000.0,
            step: 1.0,
            ..GridPolicy::default()
        };
        assert!(dense.validate().is_err());
    }
}
