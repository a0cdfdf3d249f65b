/// Input button identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    KeyW,
    KeyA,
    KeyS,
    KeyD,
    Space,
    Control,
    Shift,
    ArrowUp,
    ArrowDown,
    Escape,
    MouseRight,
}

/// Per-frame input snapshot: held buttons and pointer motion
pub trait Controller {
    /// Check if button is currently down
    fn is_down(&self, button: Button) -> bool;

    /// Button went down since the last frame (held keys and repeats excluded)
    fn was_pressed(&self, button: Button) -> bool;

    /// Pointer motion in pixels since the last frame (x right, y down)
    fn pointer_delta(&self) -> (f32, f32);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct MockController {
        pressed: Vec<Button>,
        edges: Vec<Button>,
        delta: (f32, f32),
    }

    impl Controller for MockController {
        fn is_down(&self, button: Button) -> bool {
            self.pressed.contains(&button)
        }

        fn was_pressed(&self, button: Button) -> bool {
            self.edges.contains(&button)
        }

        fn pointer_delta(&self) -> (f32, f32) {
            self.delta
        }
    }

    #[test]
    fn test_button_hash_duplicates() {
        let mut set = HashSet::new();
        set.insert(Button::Shift);
        set.insert(Button::Shift);
        set.insert(Button::MouseRight);

        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_controller_is_down() {
        let controller = MockController {
            pressed: vec![Button::KeyW, Button::Shift],
            edges: vec![Button::Shift],
            delta: (0.0, 0.0),
        };

        assert!(controller.is_down(Button::KeyW));
        assert!(controller.is_down(Button::Shift));
        assert!(!controller.is_down(Button::KeyS));
        assert!(controller.was_pressed(Button::Shift));
        assert!(!controller.was_pressed(Button::KeyW));
    }

    #[test]
    fn test_controller_pointer_delta() {
        let controller = MockController {
            pressed: vec![Button::MouseRight],
            edges: Vec::new(),
            delta: (3.0, -2.0),
        };

        assert_eq!(controller.pointer_delta(), (3.0, -2.0));
    }
}
