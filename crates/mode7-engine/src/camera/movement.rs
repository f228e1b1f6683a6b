use crate::input::{InputFrame, InputState, Key};

/// One frame of camera control input, as signed axes.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct MoveInput {
    /// Positive strafes along the camera's local +x (A).
    pub strafe: f32,
    /// Positive moves forward (W).
    pub forward: f32,
    /// Positive turns right.
    pub turn: f32,
    /// Wheel notches; positive widens the view by lowering fov.
    pub scroll: f32,
    /// Positive zooms out (Down).
    pub zoom: f32,
    /// Positive lowers the horizon (PageDown).
    pub offset: f32,
}

impl MoveInput {
    /// Default bindings: A/D strafe, W/S forward, Left/Right turn, Up/Down zoom,
    /// PageUp/PageDown offset, wheel fov.
    pub fn from_input(state: &InputState, frame: &InputFrame) -> Self {
        Self {
            strafe: state.key_axis(Key::A) - state.key_axis(Key::D),
            forward: state.key_axis(Key::W) - state.key_axis(Key::S),
            turn: state.key_axis(Key::ArrowRight) - state.key_axis(Key::ArrowLeft),
            scroll: frame.wheel.y,
            zoom: state.key_axis(Key::ArrowDown) - state.key_axis(Key::ArrowUp),
            offset: state.key_axis(Key::PageDown) - state.key_axis(Key::PageUp),
        }
    }
}

impl super::CameraState {
    /// Applies one frame of `input`. `speed` is world units (and zoom units) per second.
    pub fn move_with(&mut self, input: MoveInput, dt: f32, speed: f32) {
        let speed = speed * dt;

        let mut dx = input.strafe;
        let mut dy = input.forward;
        if dx != 0.0 || dy != 0.0 {
            let mag = (dx * dx + dy * dy).sqrt();
            dx /= mag;
            dy /= mag;
        }

        self.translate(dx * speed, dy * speed);
        self.rotate(input.turn * dt);

        self.set_fov(self.fov() - input.scroll * 0.1);
        self.set_zoom(self.zoom() + input.zoom * speed);
        self.set_offset(self.offset() + input.offset * dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraState;
    use crate::coords::{Vec2, Viewport};
    use crate::input::{InputEvent, KeyState, Modifiers, MouseWheelDelta};

    fn state() -> CameraState {
        CameraState::new(Viewport::new(1280.0, 720.0), Vec2::zero(), 0.0, 80.0, 0.5, 0.5)
    }

    fn press(st: &mut InputState, fr: &mut InputFrame, key: Key) {
        st.apply_event(fr, InputEvent::Key {
            key,
            state: KeyState::Pressed,
            modifiers: Modifiers::default(),
            code: 0,
            repeat: false,
        });
    }

    #[test]
    fn bindings_map_to_axes() {
        let mut st = InputState::default();
        let mut fr = InputFrame::default();
        press(&mut st, &mut fr, Key::A);
        press(&mut st, &mut fr, Key::S);
        press(&mut st, &mut fr, Key::ArrowRight);
        press(&mut st, &mut fr, Key::ArrowUp);
        press(&mut st, &mut fr, Key::PageDown);
        st.apply_event(&mut fr, InputEvent::MouseWheel {
            delta: MouseWheelDelta::Line { x: 0.0, y: 2.0 },
            modifiers: Modifiers::default(),
        });

        let input = MoveInput::from_input(&st, &fr);
        assert_eq!(
            input,
            MoveInput { strafe: 1.0, forward: -1.0, turn: 1.0, scroll: 2.0, zoom: -1.0, offset: 1.0 }
        );
    }

    #[test]
    fn opposite_keys_cancel() {
        let mut st = InputState::default();
        let mut fr = InputFrame::default();
        press(&mut st, &mut fr, Key::W);
        press(&mut st, &mut fr, Key::S);
        assert_eq!(MoveInput::from_input(&st, &fr).forward, 0.0);
    }

    #[test]
    fn diagonal_movement_is_normalized() {
        let mut s = state();
        s.move_with(MoveInput { strafe: 1.0, forward: 1.0, ..Default::default() }, 0.5, 10.0);
        assert!((s.position().length() - 5.0).abs() < 1e-5);
    }

    #[test]
    fn lens_controls_scale_with_dt() {
        let mut s = state();
        s.move_with(MoveInput { scroll: 1.0, zoom: 1.0, offset: -1.0, turn: 1.0, ..Default::default() }, 0.25, 8.0);
        assert!((s.fov() - 0.4).abs() < 1e-6);
        assert_eq!(s.zoom(), 82.0);
        assert_eq!(s.offset(), 0.25);
        assert_eq!(s.rotation(), 0.25);
    }

    #[test]
    fn idle_input_changes_nothing() {
        let mut s = state();
        let before = s.clone();
        s.move_with(MoveInput::default(), 0.016, 100.0);
        assert_eq!(s, before);
    }
}
