use crate::coords::Rect;
use crate::paint::Color;
use crate::scene::{DrawCmd, DrawList, TextureId};

/// Textured quad payload.
///
/// `src` is in texels and may have negative extents (flipped read); `dst` is in pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteCmd {
    pub texture: TextureId,
    pub src: Rect,
    pub dst: Rect,
    pub tint: Color,
}

impl DrawList {
    #[inline]
    pub fn push_sprite(&mut self, texture: TextureId, src: Rect, dst: Rect, tint: Color) {
        self.push(DrawCmd::Sprite(SpriteCmd { texture, src, dst, tint }));
    }
}
