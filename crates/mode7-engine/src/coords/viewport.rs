/// Viewport size in pixels.
///
/// Renderers treat this as the coordinate basis for converting pixel positions to NDC.
/// The camera also keeps one for its offscreen target; every projection formula is
/// expressed against it.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// `max(w, h) / min(w, h)`, always `>= 1` for a valid viewport.
    #[inline]
    pub fn aspect(self) -> f32 {
        if self.width > self.height {
            self.width / self.height
        } else {
            self.height / self.width
        }
    }
}
