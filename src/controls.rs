use glam::Vec3;

use crate::camera::Camera;
use crate::core::{Button, Controller};

/// Held movement keys
#[derive(Default, Clone, Copy, Debug)]
pub struct MovementState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl MovementState {
    pub fn from_controller(controller: &dyn Controller) -> Self {
        Self {
            forward: controller.is_down(Button::KeyW),
            backward: controller.is_down(Button::KeyS),
            left: controller.is_down(Button::KeyA),
            right: controller.is_down(Button::KeyD),
            up: controller.is_down(Button::Space),
            down: controller.is_down(Button::Control),
        }
    }

    const fn to_direction(positive: bool, negative: bool) -> f32 {
        match (positive, negative) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        }
    }

    /// Direction in the camera basis (x = right, y = up, z = forward)
    pub fn direction(&self) -> Vec3 {
        Vec3::new(
            Self::to_direction(self.right, self.left),
            Self::to_direction(self.up, self.down),
            Self::to_direction(self.forward, self.backward),
        )
    }
}

/// Camera commands derived from one frame of input
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct MotionInput {
    /// Local-basis movement direction, zero when nothing is held
    pub direction: Vec3,
    pub sprint: bool,
    /// Radians
    pub delta_yaw: f32,
    /// Radians, positive looks up
    pub delta_pitch: f32,
}

impl MotionInput {
    /// Interpret an input snapshot. Pointer motion only rotates the view
    /// while the right mouse button is held, leaving the left button to the UI.
    ///
    /// `sensitivity` is in degrees per pixel. Screen y grows downwards, so
    /// the pitch delta is negated: moving the pointer up looks up.
    pub fn from_controller(controller: &dyn Controller, sensitivity: f32) -> Self {
        let (dx, dy) = if controller.is_down(Button::MouseRight) {
            controller.pointer_delta()
        } else {
            (0.0, 0.0)
        };

        Self {
            direction: MovementState::from_controller(controller).direction(),
            sprint: controller.is_down(Button::Shift),
            delta_yaw: (dx * sensitivity).to_radians(),
            delta_pitch: (-dy * sensitivity).to_radians(),
        }
    }

    /// Forward these commands to the camera
    pub fn apply(&self, camera: &mut Camera, delta_time: f32) {
        camera.rotate(self.delta_yaw, self.delta_pitch);
        camera.move_forward(self.direction, self.sprint, delta_time);
    }
}
