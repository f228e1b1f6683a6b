use crate::backend::PlaneUniforms;
use crate::scene::{DrawCmd, DrawList, TextureId};

/// Perspective ground plane covering the whole pass target.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneCmd {
    pub texture: TextureId,
    pub uniforms: PlaneUniforms,
}

impl DrawList {
    #[inline]
    pub fn push_plane(&mut self, texture: TextureId, uniforms: PlaneUniforms) {
        self.push(DrawCmd::Plane(PlaneCmd { texture, uniforms }));
    }
}
