use crate::coords::Vec2;

/// Initial parameters for [`Camera::load`](super::Camera::load).
#[derive(Debug, Clone, PartialEq)]
pub struct CameraConfig {
    /// Output target size in pixels; normally the window size.
    pub screen_width: u32,
    pub screen_height: u32,

    pub position: Vec2,
    /// Radians.
    pub rotation: f32,
    pub zoom: f32,
    pub fov: f32,
    /// Horizon pivot, `0..=1` of the target height.
    pub offset: f32,

    /// Fixed element store capacity.
    pub max_elements: usize,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            screen_width: 1280,
            screen_height: 720,
            position: Vec2::zero(),
            rotation: 0.0,
            zoom: 80.0,
            fov: 0.5,
            offset: 0.5,
            max_elements: 48,
        }
    }
}
