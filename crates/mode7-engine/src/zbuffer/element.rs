use crate::coords::{Rect, Vec2};
use crate::paint::Color;

/// Placement of an element, in world units (or pixels for the derived screen copy).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct SpaceData {
    /// Texture source region for textured elements; a 1×1 size reference otherwise.
    pub rect: Rect,
    /// Ground anchor. Sprites stand on it, bottom-centre.
    pub position: Vec2,
    pub scale: Vec2,
}

/// What an element draws.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind<T> {
    Texture(T),
    Rectangle,
    Circle,
}

/// Stable handle to an element slot. Valid until the owning store is released.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub(crate) u32);

impl ElementId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A sprite-like element composited over the ground plane.
#[derive(Debug, Clone, PartialEq)]
pub struct ZBufferElement<T> {
    /// Authoritative placement. Edit freely between frames.
    pub world: SpaceData,
    /// Derived by the last update; overwritten every frame.
    pub screen: SpaceData,
    pub kind: ElementKind<T>,
    /// Sort key from the last update (projected size, larger is nearer).
    pub distance: f32,
    pub tint: Color,
}

impl<T> ZBufferElement<T> {
    /// Textured quad showing the `src` region of `texture`.
    pub fn texture(texture: T, src: Rect, position: Vec2, scale: Vec2, tint: Color) -> Self {
        Self::from_world(
            SpaceData { rect: src, position, scale },
            ElementKind::Texture(texture),
            tint,
        )
    }

    /// Filled rectangle anchored at `rect.origin`, `rect.size` world units large.
    pub fn rectangle(rect: Rect, tint: Color) -> Self {
        Self::from_world(
            SpaceData {
                rect: Rect::unit_at(rect.origin),
                position: rect.origin,
                scale: rect.size,
            },
            ElementKind::Rectangle,
            tint,
        )
    }

    /// Filled circle standing on `center`.
    pub fn circle(center: Vec2, radius: f32, tint: Color) -> Self {
        Self::from_world(
            SpaceData {
                rect: Rect::unit_at(center - Vec2::splat(radius)),
                position: center,
                scale: Vec2::splat(radius),
            },
            ElementKind::Circle,
            tint,
        )
    }

    fn from_world(world: SpaceData, kind: ElementKind<T>, tint: Color) -> Self {
        Self {
            world,
            screen: SpaceData::default(),
            kind,
            distance: 0.0,
            tint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectangle_uses_unit_reference() {
        let e = ZBufferElement::<()>::rectangle(Rect::new(64.0, 64.0, 16.0, 8.0), Color::WHITE);
        assert_eq!(e.world.rect, Rect::new(64.0, 64.0, 1.0, 1.0));
        assert_eq!(e.world.position, Vec2::new(64.0, 64.0));
        assert_eq!(e.world.scale, Vec2::new(16.0, 8.0));
        assert_eq!(e.kind, ElementKind::Rectangle);
    }

    #[test]
    fn circle_reference_sits_at_corner() {
        let e = ZBufferElement::<()>::circle(Vec2::new(-64.0, 64.0), 8.0, Color::WHITE);
        assert_eq!(e.world.rect, Rect::new(-72.0, 56.0, 1.0, 1.0));
        assert_eq!(e.world.position, Vec2::new(-64.0, 64.0));
        assert_eq!(e.world.scale, Vec2::splat(8.0));
    }

    #[test]
    fn texture_keeps_source_region() {
        let src = Rect::new(0.0, 0.0, 32.0, 48.0);
        let e = ZBufferElement::texture(7u32, src, Vec2::new(1.0, 2.0), Vec2::splat(8.0), Color::WHITE);
        assert_eq!(e.world.rect, src);
        assert_eq!(e.kind, ElementKind::Texture(7));
    }
}
