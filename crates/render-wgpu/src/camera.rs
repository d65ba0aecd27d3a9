use glam::Vec3;
use std::f32::consts::PI;
use villascape_kernel::CameraRig;
use villascape_render::ViewControls;

/// Keep the polar angle away from the poles so `look_at` stays defined.
const POLE_MARGIN: f32 = 1e-3;

/// Damped orbit controls around the camera target.
///
/// Input accumulates rotation and zoom deltas; each `update` applies a
/// fraction of the pending rotation (damping) and re-derives the camera
/// position from its current offset to the target. Because the offset is
/// read fresh every update, scripted moves of the camera are preserved.
pub struct OrbitControls {
    /// Radians per pixel of pointer drag.
    pub rotate_speed: f32,
    /// Zoom factor per wheel notch.
    pub zoom_speed: f32,
    /// Fraction of the pending rotation applied per update, in (0, 1].
    pub damping: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    theta_delta: f32,
    phi_delta: f32,
    scale: f32,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            rotate_speed: 0.005,
            zoom_speed: 0.95,
            damping: 0.05,
            min_distance: 0.5,
            max_distance: 500.0,
            theta_delta: 0.0,
            phi_delta: 0.0,
            scale: 1.0,
        }
    }
}

impl OrbitControls {
    /// Queue a rotation from a pointer drag of `(dx, dy)` pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.theta_delta -= dx * self.rotate_speed;
        self.phi_delta -= dy * self.rotate_speed;
    }

    /// Queue a zoom; positive `notches` move towards the target.
    pub fn zoom(&mut self, notches: f32) {
        self.scale *= self.zoom_speed.powf(notches);
    }

    pub fn is_idle(&self) -> bool {
        self.theta_delta.abs() < 1e-6 && self.phi_delta.abs() < 1e-6 && self.scale == 1.0
    }
}

impl ViewControls for OrbitControls {
    fn update(&mut self, camera: &mut CameraRig) {
        if self.is_idle() {
            return;
        }

        let offset = camera.position - camera.target;
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return;
        }

        let theta = offset.x.atan2(offset.z) + self.theta_delta * self.damping;
        let phi = ((offset.y / radius).clamp(-1.0, 1.0).acos() + self.phi_delta * self.damping)
            .clamp(POLE_MARGIN, PI - POLE_MARGIN);
        let radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);

        camera.position = camera.target
            + Vec3::new(
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
                radius * phi.sin() * theta.cos(),
            );

        self.theta_delta *= 1.0 - self.damping;
        self.phi_delta *= 1.0 - self.damping;
        self.scale = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_update_leaves_camera_alone() {
        let mut controls = OrbitControls::default();
        let mut cam = CameraRig::default();
        let before = cam.position;
        controls.update(&mut cam);
        assert_eq!(cam.position, before);
    }

    #[test]
    fn rotation_keeps_distance_to_target() {
        let mut controls = OrbitControls::default();
        let mut cam = CameraRig::default();
        controls.rotate(200.0, -50.0);
        for _ in 0..30 {
            controls.update(&mut cam);
        }
        assert!((cam.position.distance(cam.target) - 20.0).abs() < 1e-3);
        assert!(cam.position.x.abs() > 0.1);
    }

    #[test]
    fn damping_decays_pending_rotation() {
        let mut controls = OrbitControls::default();
        let mut cam = CameraRig::default();
        controls.rotate(100.0, 0.0);
        for _ in 0..1000 {
            controls.update(&mut cam);
        }
        assert!(controls.is_idle());
    }

    #[test]
    fn zoom_moves_towards_target() {
        let mut controls = OrbitControls::default();
        let mut cam = CameraRig::default();
        controls.zoom(2.0);
        controls.update(&mut cam);
        let expected = 20.0 * 0.95 * 0.95;
        assert!((cam.position.distance(cam.target) - expected).abs() < 1e-3);
    }

    #[test]
    fn zoom_respects_min_distance() {
        let mut controls = OrbitControls::default();
        let mut cam = CameraRig::default();
        controls.zoom(500.0);
        controls.update(&mut cam);
        assert!((cam.position.distance(cam.target) - controls.min_distance).abs() < 1e-4);
    }

    #[test]
    fn scripted_offset_is_preserved() {
        let mut controls = OrbitControls::default();
        let mut cam = CameraRig::default();
        cam.position = Vec3::new(9.0, 0.0, 5.0);
        controls.zoom(0.0);
        controls.rotate(0.0, 0.0);
        controls.update(&mut cam);
        assert_eq!(cam.position, Vec3::new(9.0, 0.0, 5.0));
    }
}
