//! World ↔ screen mapping of the perspective ground plane.
//!
//! All functions are pure and permissive: points at or behind the camera plane
//! (`distance <= 0`) produce sign-flipped or non-finite results instead of errors.

use crate::coords::{Mat2, Vec2};

use super::CameraState;

/// Projected point.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScreenPoint {
    /// Pixel position in the camera target.
    pub position: Vec2,
    /// Pixels per world unit at this depth. Doubles as the depth sort key.
    pub size: f32,
}

/// `[[cos, -sin], [sin, cos]]`.
#[inline]
pub fn rotation_matrix(angle: f32) -> Mat2 {
    Mat2::from_angle(angle)
}

/// Projects a world-space ground point into the camera target.
pub fn world_to_screen(state: &CameraState, point: Vec2) -> ScreenPoint {
    let cam = state.position();
    let r = state.rotation_matrix();
    let zoom = state.zoom();
    let offset = state.offset();
    let target = state.target();

    let obj_x = (point.x - cam.x) / zoom;
    let obj_y = (cam.y - point.y) / zoom;

    let space_x = -obj_x * r.m00 - obj_y * r.m01;
    let space_y = (obj_x * r.m10 + obj_y * r.m11) * state.fov();

    let distance = 1.0 - space_y;

    let x = (space_x / distance) * offset * target.width + target.width / 2.0;
    let y = ((space_y + offset - 1.0) / distance) * target.height + target.height;

    ScreenPoint {
        position: Vec2::new(x, y),
        size: (offset * target.width) / (zoom * distance),
    }
}

/// Maps a target pixel back to the ground point the plane program draws there.
///
/// Inverse of [`world_to_screen`] for points in front of the camera. `point.y == 0`
/// divides by zero.
pub fn screen_to_world(state: &CameraState, point: Vec2) -> Vec2 {
    let target = state.target();
    let zoom = state.zoom();

    let sx = (target.width / 2.0 - point.x) * zoom * (target.height / target.width);
    let sy = (state.offset() * target.height - point.y) * (zoom / state.fov());

    let r = state.rotation_matrix().mul_vec(Vec2::new(sx, sy));
    r / point.y + state.position()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Viewport;

    fn unit_camera() -> CameraState {
        CameraState::new(Viewport::new(100.0, 100.0), Vec2::zero(), 0.0, 1.0, 1.0, 0.5)
    }

    fn demo_camera(rotation: f32) -> CameraState {
        CameraState::new(Viewport::new(1280.0, 720.0), Vec2::new(12.0, -30.0), rotation, 80.0, 0.5, 0.5)
    }

    fn assert_close(a: Vec2, b: Vec2, eps: f32) {
        assert!(
            (a.x - b.x).abs() <= eps && (a.y - b.y).abs() <= eps,
            "{a:?} != {b:?} (eps {eps})"
        );
    }

    // ── rotation_matrix ───────────────────────────────────────────────────

    #[test]
    fn rotation_then_inverse_is_identity() {
        let v = Vec2::new(3.0, -7.5);
        for angle in [0.0, 0.3, 1.0, -2.2, 3.9] {
            let back = rotation_matrix(angle).mul_vec(rotation_matrix(-angle).mul_vec(v));
            assert_close(back, v, 1e-5);
        }
    }

    // ── world_to_screen ───────────────────────────────────────────────────

    #[test]
    fn point_behind_camera_projects_flipped() {
        let sp = world_to_screen(&unit_camera(), Vec2::new(0.0, -10.0));
        // spaceY = 10, distance = -9
        assert_eq!(sp.position.x, 50.0);
        assert_eq!(sp.position.y, (9.5f32 / -9.0) * 100.0 + 100.0);
        assert_eq!(sp.size, 50.0f32 / -9.0);
        assert!(sp.size < 0.0);
    }

    #[test]
    fn point_in_front_projects_above_bottom() {
        let sp = world_to_screen(&unit_camera(), Vec2::new(0.0, 10.0));
        // spaceY = -10, distance = 11
        assert_eq!(sp.position.x, 50.0);
        assert_eq!(sp.position.y, (-10.5f32 / 11.0) * 100.0 + 100.0);
        assert_eq!(sp.size, 50.0f32 / 11.0);
    }

    #[test]
    fn farther_points_are_smaller() {
        let cam = unit_camera();
        let near = world_to_screen(&cam, Vec2::new(0.0, 2.0));
        let far = world_to_screen(&cam, Vec2::new(0.0, 20.0));
        assert!(far.size < near.size);
        assert!(far.position.y < near.position.y);
    }

    #[test]
    fn degenerate_distance_is_not_trapped() {
        // spaceY == 1 exactly: distance 0.
        let sp = world_to_screen(&unit_camera(), Vec2::new(0.0, -1.0));
        assert!(!sp.size.is_finite());
    }

    // ── screen_to_world ───────────────────────────────────────────────────

    #[test]
    fn round_trip_in_front_of_camera() {
        for rotation in [0.0, 0.7, -2.5] {
            let cam = demo_camera(rotation);
            for offset in [Vec2::new(0.0, 40.0), Vec2::new(-25.0, 60.0), Vec2::new(33.0, 15.0)] {
                // Pick points ahead of the camera in its local frame.
                let world = cam.position() + cam.rotation_matrix().mul_vec(Vec2::new(offset.x, -offset.y));
                let sp = world_to_screen(&cam, world);
                if sp.size <= 0.0 {
                    continue;
                }
                let back = screen_to_world(&cam, sp.position);
                assert_close(back, world, 1e-2);
            }
        }
    }

    #[test]
    fn round_trip_on_portrait_target() {
        let cam = CameraState::new(Viewport::new(480.0, 800.0), Vec2::new(-4.0, 9.0), 0.4, 20.0, 0.8, 0.6);
        let world = Vec2::new(-10.0, 30.0);
        let sp = world_to_screen(&cam, world);
        assert!(sp.size > 0.0);
        assert_close(screen_to_world(&cam, sp.position), world, 1e-2);
    }

    #[test]
    fn top_row_is_degenerate() {
        let p = screen_to_world(&unit_camera(), Vec2::new(10.0, 0.0));
        assert!(!p.is_finite());
    }
}
