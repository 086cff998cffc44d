use umbra_scene::Camera;

/// Keys the demo responds to. The windowing layer maps its own key codes
/// onto these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    Z,
    X,
    C,
    V,
    B,
    F1,
    F2,
    Escape,
}

/// What a key press or mouse drag asks the application to do.
///
/// The app consumes actions, never raw input events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    MoveForward,
    MoveBackward,
    MoveLeft,
    MoveRight,
    /// Select shading mode 0 through 4.
    SetShadingMode(u32),
    /// Pitch and yaw in radians.
    Look { pitch: f32, yaw: f32 },
    ToggleOverlay,
    CycleShadowView,
    Quit,
}

/// Fixed key bindings. Every key-down event produces its action, OS key
/// repeats included.
pub fn action_for_key(key: Key) -> Action {
    match key {
        Key::W => Action::MoveForward,
        Key::S => Action::MoveBackward,
        Key::A => Action::MoveLeft,
        Key::D => Action::MoveRight,
        Key::Z => Action::SetShadingMode(0),
        Key::X => Action::SetShadingMode(1),
        Key::C => Action::SetShadingMode(2),
        Key::V => Action::SetShadingMode(3),
        Key::B => Action::SetShadingMode(4),
        Key::F1 => Action::ToggleOverlay,
        Key::F2 => Action::CycleShadowView,
        Key::Escape => Action::Quit,
    }
}

impl Action {
    /// Apply camera movement and look actions. Returns `false` for actions
    /// the camera does not handle.
    pub fn apply_to_camera(self, camera: &mut Camera, move_speed: f32) -> bool {
        match self {
            Action::MoveForward => camera.move_forward(move_speed),
            Action::MoveBackward => camera.move_backward(move_speed),
            Action::MoveLeft => camera.move_left(move_speed),
            Action::MoveRight => camera.move_right(move_speed),
            Action::Look { pitch, yaw } => camera.rotate(pitch, yaw),
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use umbra_scene::glam::Vec3;

    #[test]
    fn shading_keys_map_in_order() {
        let modes: Vec<Action> = [Key::Z, Key::X, Key::C, Key::V, Key::B]
            .into_iter()
            .map(action_for_key)
            .collect();
        assert_eq!(
            modes,
            (0..5).map(Action::SetShadingMode).collect::<Vec<_>>()
        );
    }

    #[test]
    fn movement_keys_move_camera() {
        let mut cam = Camera::new();
        cam.set_position(Vec3::ZERO);
        assert!(action_for_key(Key::W).apply_to_camera(&mut cam, 1.5));
        assert!(cam.position().abs_diff_eq(Vec3::new(0.0, 0.0, 1.5), 1e-6));
        assert!(action_for_key(Key::D).apply_to_camera(&mut cam, 1.5));
        assert!(cam.position().abs_diff_eq(Vec3::new(1.5, 0.0, 1.5), 1e-6));
    }

    #[test]
    fn non_camera_actions_are_not_applied() {
        let mut cam = Camera::new();
        let before = cam;
        for key in [Key::F1, Key::F2, Key::Escape, Key::B] {
            assert!(!action_for_key(key).apply_to_camera(&mut cam, 1.0));
        }
        assert_eq!(cam, before);
    }
}
