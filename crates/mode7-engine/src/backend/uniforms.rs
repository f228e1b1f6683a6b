use crate::coords::{Mat2, Vec2};

/// Uniform bundle consumed by the plane program.
///
/// For every target pixel with normalized coordinate `tc` (y down):
///
/// ```text
/// uv = ((0.5, offset) - tc) * (zoom, zoom / fov) * cam_rot
/// uv = (uv / tc.y + cam_pos) / map_size
/// ```
///
/// The texture is sampled when `uv` lies in `[0, 1]²` or `wrap` is set; other pixels
/// stay transparent.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PlaneUniforms {
    /// Texture size times placement scale, in world units.
    pub map_size: Vec2,
    /// Camera position shifted by the placement position and origin.
    pub cam_pos: Vec2,
    pub cam_rot: Mat2,
    pub offset: f32,
    pub zoom: f32,
    pub fov: f32,
    pub wrap: bool,
}

impl PlaneUniforms {
    /// Evaluates the mapping for one normalized target coordinate.
    ///
    /// Returns `None` where the program outputs transparent black. CPU mirror of the
    /// shader, used by tests and picking tools.
    pub fn map(&self, tc: Vec2) -> Option<Vec2> {
        let v = (Vec2::new(0.5, self.offset) - tc)
            .mul_elem(Vec2::new(self.zoom, self.zoom / self.fov));
        let uv = self.cam_rot.mul_vec(v);
        let uv = uv / tc.y + self.cam_pos;
        let uv = Vec2::new(uv.x / self.map_size.x, uv.y / self.map_size.y);

        let inside = (0.0..=1.0).contains(&uv.x) && (0.0..=1.0).contains(&uv.y);
        (self.wrap || inside).then_some(uv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniforms(wrap: bool) -> PlaneUniforms {
        PlaneUniforms {
            map_size: Vec2::new(512.0, 512.0),
            cam_pos: Vec2::new(256.0, 256.0),
            cam_rot: Mat2::identity(),
            offset: 0.5,
            zoom: 80.0,
            fov: 0.5,
            wrap,
        }
    }

    #[test]
    fn horizon_center_maps_to_camera() {
        // At the horizon column centre, only the perspective divide remains.
        let uv = uniforms(false).map(Vec2::new(0.5, 1.0));
        let expected_y = ((0.5 - 1.0) * 160.0 / 1.0 + 256.0) / 512.0;
        assert_eq!(uv, Some(Vec2::new(0.5, expected_y)));
    }

    #[test]
    fn outside_map_is_transparent_unless_wrapped() {
        let tc = Vec2::new(0.0, 0.01);
        assert_eq!(uniforms(false).map(tc), None);
        assert!(uniforms(true).map(tc).is_some());
    }
}
