use crate::scene::shapes::circle::CircleCmd;
use crate::scene::shapes::plane::PlaneCmd;
use crate::scene::shapes::rect::RectCmd;
use crate::scene::shapes::sprite::SpriteCmd;

/// Handle to a texture in a backend's registry.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

/// Renderer-agnostic draw command stream.
///
/// Extending the scene:
/// - add a new shape module under `scene::shapes::*`
/// - add a new variant here
/// - implement push helpers inside that shape module
/// - add a matching renderer under `render::shapes::*`
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Plane(PlaneCmd),
    Sprite(SpriteCmd),
    Rect(RectCmd),
    Circle(CircleCmd),
}
