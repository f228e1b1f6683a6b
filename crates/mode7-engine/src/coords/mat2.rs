use super::Vec2;

/// Row-major 2×2 matrix.
///
/// ```text
/// | m00 m01 |
/// | m10 m11 |
/// ```
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mat2 {
    pub m00: f32,
    pub m01: f32,
    pub m10: f32,
    pub m11: f32,
}

impl Mat2 {
    #[inline]
    pub const fn new(m00: f32, m01: f32, m10: f32, m11: f32) -> Self {
        Self { m00, m01, m10, m11 }
    }

    #[inline]
    pub const fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0)
    }

    /// Counter-clockwise rotation: `[[cos, -sin], [sin, cos]]`.
    #[inline]
    pub fn from_angle(radians: f32) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self::new(cos, -sin, sin, cos)
    }

    /// Returns `self · v` (column vector on the right).
    #[inline]
    pub fn mul_vec(self, v: Vec2) -> Vec2 {
        Vec2::new(
            self.m00 * v.x + self.m01 * v.y,
            self.m10 * v.x + self.m11 * v.y,
        )
    }

    #[inline]
    pub fn transpose(self) -> Self {
        Self::new(self.m00, self.m10, self.m01, self.m11)
    }

    /// Elements in row order.
    ///
    /// Uploaded as-is into a WGSL `mat2x2<f32>`, the rows become columns, so a
    /// shader computing `v * m` gets `self · v`.
    #[inline]
    pub fn to_row_major(self) -> [f32; 4] {
        [self.m00, self.m01, self.m10, self.m11]
    }
}

impl Default for Mat2 {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < 1e-5 && (a.y - b.y).abs() < 1e-5
    }

    #[test]
    fn zero_angle_is_identity() {
        let m = Mat2::from_angle(0.0);
        assert_eq!(m.m00, 1.0);
        assert_eq!(m.m11, 1.0);
        assert_eq!(m.m01.abs(), 0.0);
        assert_eq!(m.m10.abs(), 0.0);
    }

    #[test]
    fn quarter_turn_maps_x_to_y() {
        let m = Mat2::from_angle(core::f32::consts::FRAC_PI_2);
        assert!(close(m.mul_vec(Vec2::new(1.0, 0.0)), Vec2::new(0.0, 1.0)));
    }

    #[test]
    fn inverse_angle_undoes_rotation() {
        for &angle in &[-3.0f32, -1.2, 0.0, 0.35, 1.0, 2.5, 6.1] {
            let v = Vec2::new(3.5, -7.25);
            let back = Mat2::from_angle(-angle).mul_vec(Mat2::from_angle(angle).mul_vec(v));
            assert!(close(back, v), "angle {angle}: {back:?} != {v:?}");
        }
    }

    #[test]
    fn transpose_of_rotation_is_its_inverse() {
        let m = Mat2::from_angle(0.8);
        let v = Vec2::new(-2.0, 9.0);
        assert!(close(m.transpose().mul_vec(m.mul_vec(v)), v));
    }

    #[test]
    fn row_major_layout() {
        let m = Mat2::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(m.to_row_major(), [1.0, 2.0, 3.0, 4.0]);
    }
}
