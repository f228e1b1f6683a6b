use crate::coords::{Mat2, Vec2, Viewport};

/// Pose and lens parameters of a Mode 7 camera.
///
/// Pure data: no backend handles. The rotation matrix is private so it can only change
/// together with `rotation`.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraState {
    position: Vec2,
    rotation: f32,
    rot: Mat2,
    zoom: f32,
    fov: f32,
    offset: f32,
    aspect: f32,
    target: Viewport,
}

impl CameraState {
    /// Creates a state for a `target`-sized output, applying every parameter through its setter.
    pub fn new(target: Viewport, position: Vec2, rotation: f32, zoom: f32, fov: f32, offset: f32) -> Self {
        let mut state = Self {
            position: Vec2::zero(),
            rotation: 0.0,
            rot: Mat2::identity(),
            zoom: 1.0,
            fov: 1.0,
            offset: 0.0,
            aspect: target.aspect(),
            target,
        };
        state.set_position(position);
        state.set_rotation(rotation);
        state.set_zoom(zoom);
        state.set_fov(fov);
        state.set_offset(offset);
        state
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// `[[cos, -sin], [sin, cos]]` of the current rotation.
    #[inline]
    pub fn rotation_matrix(&self) -> Mat2 {
        self.rot
    }

    #[inline]
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    #[inline]
    pub fn fov(&self) -> f32 {
        self.fov
    }

    #[inline]
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// `max(w, h) / min(w, h)` of the target, fixed at creation.
    #[inline]
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    #[inline]
    pub fn target(&self) -> Viewport {
        self.target
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn set_rotation(&mut self, rotation: f32) {
        self.rotation = rotation;
        self.rot = super::projection::rotation_matrix(rotation);
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom;
    }

    pub fn set_fov(&mut self, fov: f32) {
        self.fov = fov;
    }

    pub fn set_offset(&mut self, offset: f32) {
        self.offset = offset;
    }

    /// Moves along the camera's local axes: `position += R·(dx, dy)`.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.position += self.rot.mul_vec(Vec2::new(dx, dy));
    }

    pub fn rotate(&mut self, delta: f32) {
        self.set_rotation(self.rotation + delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn state() -> CameraState {
        CameraState::new(Viewport::new(1280.0, 720.0), Vec2::zero(), 0.0, 80.0, 0.5, 0.5)
    }

    #[test]
    fn new_applies_parameters() {
        let s = CameraState::new(Viewport::new(640.0, 480.0), Vec2::new(3.0, 4.0), 0.25, 2.0, 0.75, 0.4);
        assert_eq!(s.position(), Vec2::new(3.0, 4.0));
        assert_eq!(s.rotation(), 0.25);
        assert_eq!(s.rotation_matrix(), Mat2::from_angle(0.25));
        assert_eq!((s.zoom(), s.fov(), s.offset()), (2.0, 0.75, 0.4));
    }

    #[test]
    fn aspect_is_long_over_short_side() {
        assert_eq!(state().aspect(), 1280.0 / 720.0);
        let portrait = CameraState::new(Viewport::new(720.0, 1280.0), Vec2::zero(), 0.0, 1.0, 1.0, 0.5);
        assert_eq!(portrait.aspect(), 1280.0 / 720.0);
    }

    #[test]
    fn rotation_keeps_matrix_in_sync() {
        let mut s = state();
        s.set_rotation(1.2);
        assert_eq!(s.rotation_matrix(), Mat2::from_angle(1.2));
        s.rotate(0.3);
        assert_eq!(s.rotation(), 1.2 + 0.3);
        assert_eq!(s.rotation_matrix(), Mat2::from_angle(1.2 + 0.3));
    }

    #[test]
    fn translate_uses_local_axes() {
        let mut s = state();
        s.set_rotation(FRAC_PI_2);
        s.translate(1.0, 0.0);
        assert!((s.position().x).abs() < 1e-6);
        assert!((s.position().y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn translate_without_rotation_is_plain_add() {
        let mut s = state();
        s.set_position(Vec2::new(5.0, 5.0));
        s.translate(2.0, -3.0);
        assert_eq!(s.position(), Vec2::new(7.0, 2.0));
    }
}
