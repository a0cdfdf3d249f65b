use std::f32::consts::TAU;

use glam::{Mat3, Vec3};
use serde::Serialize;

/// Movement vectors shorter than this are treated as "no key held"
pub const MOVE_EPSILON: f32 = 1e-6;
const ROTATE_EPSILON: f32 = 1e-7;

/// Pitch stays strictly inside (-π/2, π/2) so `forward × Y` never degenerates
pub const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 1e-4;

/// User-tunable camera parameters (exposed in the camera panel)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraTuning {
    /// Vertical field of view in degrees
    pub fov: f32,
    /// World units per second
    pub movement_speed: f32,
    /// Degrees of rotation per pixel of pointer motion
    pub sensitivity: f32,
    pub sprint_multiplier: f32,
    pub sprint_enabled: bool,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            fov: 60.0,
            movement_speed: 5.0,
            sensitivity: 0.1,
            sprint_multiplier: 5.0,
            sprint_enabled: true,
        }
    }
}

/// First-person camera with a yaw/pitch derived orthonormal basis.
///
/// The camera never reads input itself; the host loop feeds it already
/// interpreted rotation and movement through [`Camera::rotate`] and
/// [`Camera::move_forward`], then calls [`Camera::update`] once per frame.
///
/// Conventions: yaw = 0, pitch = 0 looks along +X; increasing yaw turns
/// towards +Z, which is also the right-hand side. Positive pitch looks up.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    yaw: f32,
    pitch: f32,
    forward: Vec3,
    right: Vec3,
    up: Vec3,
    pub tuning: CameraTuning,
    moved: bool,
}

impl Camera {
    /// Create a camera from a pose given in degrees
    pub fn new(position: Vec3, fov: f32, yaw_degrees: f32, pitch_degrees: f32) -> Self {
        let mut camera = Self {
            position,
            yaw: yaw_degrees.to_radians().rem_euclid(TAU),
            pitch: pitch_degrees.to_radians().clamp(-MAX_PITCH, MAX_PITCH),
            forward: Vec3::Z,
            right: Vec3::X,
            up: Vec3::Y,
            tuning: CameraTuning {
                fov,
                ..CameraTuning::default()
            },
            moved: false,
        };
        camera.update();
        camera
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Whether position or orientation changed since the last `update`
    pub fn moved(&self) -> bool {
        self.moved
    }

    /// Local-to-world rotation with columns `[right, up, forward]`
    pub fn rotation(&self) -> Mat3 {
        Mat3::from_cols(self.right, self.up, self.forward)
    }

    /// Add yaw/pitch deltas in radians.
    ///
    /// Deltas arrive already scaled by sensitivity and sign-corrected by the
    /// caller (see `controls::MotionInput`). Pitch is clamped here, so pushing
    /// against the pole is not a rotation. Yaw stays in `[0, 2π)`.
    pub fn rotate(&mut self, delta_yaw: f32, delta_pitch: f32) {
        let pitch = (self.pitch + delta_pitch).clamp(-MAX_PITCH, MAX_PITCH);
        let delta_pitch = pitch - self.pitch;
        if delta_yaw.abs() < ROTATE_EPSILON && delta_pitch.abs() < ROTATE_EPSILON {
            return;
        }
        self.yaw = (self.yaw + delta_yaw).rem_euclid(TAU);
        self.pitch = pitch;
        self.moved = true;
    }

    /// Move along a direction expressed in the camera basis
    /// (x = right, y = up, z = forward).
    pub fn move_forward(&mut self, direction: Vec3, sprint: bool, delta_time: f32) {
        if direction.length() < MOVE_EPSILON {
            return;
        }
        let displacement = self.rotation() * direction * self.speed(sprint) * delta_time;
        self.position += displacement;
        self.moved = true;
    }

    /// Effective movement speed for this frame
    pub fn speed(&self, sprint: bool) -> f32 {
        if sprint && self.tuning.sprint_enabled {
            self.tuning.movement_speed * self.tuning.sprint_multiplier
        } else {
            self.tuning.movement_speed
        }
    }

    /// Recompute the basis from yaw/pitch. Returns and clears the moved flag.
    pub fn update(&mut self) -> bool {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();

        self.forward = Vec3::new(cos_pitch * cos_yaw, sin_pitch, cos_pitch * sin_yaw).normalize();
        self.right = self.forward.cross(Vec3::Y).normalize();
        self.up = self.right.cross(self.forward).normalize();

        std::mem::take(&mut self.moved)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(7.0, 7.0, 7.0), 60.0, 225.0, -30.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pose_looks_back_at_origin() {
        let camera = Camera::default();
        // yaw 225°, pitch -30° from (7,7,7) points down towards the origin
        let to_origin = (-camera.position).normalize();
        assert!(camera.forward().dot(to_origin) > 0.95);
        assert!(camera.forward().y < 0.0);
    }

    #[test]
    fn new_camera_is_not_dirty() {
        let camera = Camera::default();
        assert!(!camera.moved());
    }

    #[test]
    fn tiny_rotation_is_ignored() {
        let mut camera = Camera::default();
        camera.rotate(0.0, 0.0);
        assert!(!camera.moved());
        camera.rotate(1e-9, -1e-9);
        assert!(!camera.moved());
    }

    #[test]
    fn update_clears_moved() {
        let mut camera = Camera::default();
        camera.rotate(0.1, 0.0);
        assert!(camera.update());
        assert!(!camera.moved());
        assert!(!camera.update());
    }

    #[test]
    fn yaw_wraps_into_one_turn() {
        let mut camera = Camera::new(Vec3::ZERO, 60.0, -90.0, 0.0);
        assert!(camera.yaw() >= 0.0);

        for _ in 0..10_000 {
            camera.rotate(1.0, 0.0);
        }
        assert!((0.0..=TAU).contains(&camera.yaw()));
        assert!(camera.update());
        assert!(camera.forward().is_finite());
    }

    #[test]
    fn sprint_only_applies_when_enabled() {
        let mut camera = Camera::default();
        assert_eq!(camera.speed(true), 25.0);
        camera.tuning.sprint_enabled = false;
        assert_eq!(camera.speed(true), 5.0);
        assert_eq!(camera.speed(false), 5.0);
    }

    #[test]
    fn rotation_matrix_maps_local_axes() {
        let camera = Camera::new(Vec3::ZERO, 60.0, 30.0, 10.0);
        let m = camera.rotation();
        assert!((m * Vec3::Z - camera.forward()).length() < 1e-6);
        assert!((m * Vec3::X - camera.right()).length() < 1e-6);
        assert!((m * Vec3::Y - camera.up()).length() < 1e-6);
    }
}
