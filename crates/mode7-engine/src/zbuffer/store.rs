use crate::backend::Canvas;
use crate::camera::projection::world_to_screen;
use crate::camera::CameraState;
use crate::coords::{Rect, Vec2};
use crate::error::{Mode7Error, Result};

use super::element::{ElementId, ElementKind, SpaceData, ZBufferElement};

/// Fixed-capacity element store with a depth-sorted draw order.
///
/// Elements live in insertion order and are never moved; `order` holds slot indices
/// and is the only thing `sort` touches.
#[derive(Debug)]
pub struct ZBuffer<T> {
    elements: Vec<ZBufferElement<T>>,
    order: Vec<u32>,
    max_count: usize,
    warned_full: bool,
}

impl<T> ZBuffer<T> {
    pub fn with_capacity(max_count: usize) -> Self {
        Self {
            elements: Vec::with_capacity(max_count),
            order: Vec::with_capacity(max_count),
            max_count,
            warned_full: false,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.max_count
    }

    /// Stores `element` in the next free slot.
    pub fn add(&mut self, element: ZBufferElement<T>) -> Result<ElementId> {
        if self.elements.len() >= self.max_count {
            if !self.warned_full {
                log::warn!("z-buffer full ({} elements), dropping further adds", self.max_count);
                self.warned_full = true;
            }
            return Err(Mode7Error::CapacityExceeded { capacity: self.max_count });
        }

        let id = self.elements.len() as u32;
        self.elements.push(element);
        self.order.push(id);
        Ok(ElementId(id))
    }

    pub fn get(&self, id: ElementId) -> Option<&ZBufferElement<T>> {
        self.elements.get(id.index())
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut ZBufferElement<T>> {
        self.elements.get_mut(id.index())
    }

    /// Elements in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ZBufferElement<T>> {
        self.elements.iter()
    }

    /// Elements in the order of the last sort (insertion order before any sort).
    pub fn iter_sorted(&self) -> impl Iterator<Item = &ZBufferElement<T>> {
        self.order.iter().map(|&i| &self.elements[i as usize])
    }

    /// Recomputes every element's screen placement and distance for `state`.
    pub fn update_all(&mut self, state: &CameraState) {
        for element in &mut self.elements {
            update_element(element, state);
        }
    }

    /// Orders the draw index far to near (ascending projected size).
    pub fn sort(&mut self) {
        let elements = &self.elements;
        self.order.sort_unstable_by(|&a, &b| {
            elements[a as usize]
                .distance
                .total_cmp(&elements[b as usize].distance)
        });
    }

    /// Frees the store. Handles issued so far become dangling and the capacity drops to
    /// zero, so every later `add` fails.
    pub fn release(&mut self) {
        self.elements = Vec::new();
        self.order = Vec::new();
        self.max_count = 0;
        self.warned_full = false;
    }
}

impl<T: Clone> ZBuffer<T> {
    /// Draws every element in sorted order.
    ///
    /// Textures whose projected scale flipped sign (behind the camera) are skipped.
    /// Rectangles and circles are drawn as computed.
    pub fn draw_all<C>(&self, canvas: &mut C)
    where
        C: Canvas<Texture = T>,
    {
        for element in self.iter_sorted() {
            draw_element(element, canvas);
        }
    }
}

fn update_element<T>(element: &mut ZBufferElement<T>, state: &CameraState) {
    let world = element.world;
    let sp = world_to_screen(state, world.position);

    let scale = Vec2::new(
        (sp.size * world.scale.x) / world.rect.size.x,
        (sp.size * world.scale.y) / world.rect.size.y,
    );

    // Height reuses the width reference; sprites stay anchored at their feet.
    let rect = Rect::new(
        sp.position.x - (world.rect.size.x * scale.x) * 0.5,
        sp.position.y - world.rect.size.y * scale.y,
        world.rect.size.x * scale.x,
        world.rect.size.x * scale.y,
    );

    element.screen = SpaceData { rect, position: sp.position, scale };
    element.distance = sp.size;
}

fn draw_element<C: Canvas>(element: &ZBufferElement<C::Texture>, canvas: &mut C) {
    let screen = element.screen;
    match &element.kind {
        ElementKind::Texture(texture) => {
            let world = element.world.scale;
            let facing = (screen.scale.x > 0.0) == (world.x > 0.0)
                && (screen.scale.y > 0.0) == (world.y > 0.0);
            if facing {
                canvas.draw_texture(texture, element.world.rect, screen.rect, element.tint);
            }
        }
        ElementKind::Rectangle => canvas.draw_rect(screen.rect, element.tint),
        ElementKind::Circle => {
            let center = Vec2::new(screen.position.x, screen.position.y - screen.rect.size.x);
            canvas.draw_circle(center, screen.rect.size.x, element.tint);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::recording::{Call, RecordingBackend, TestTexture};
    use crate::coords::Viewport;
    use crate::paint::Color;

    const TEX: TestTexture = (9, 16, 16);

    fn unit_camera() -> CameraState {
        CameraState::new(Viewport::new(100.0, 100.0), Vec2::zero(), 0.0, 1.0, 1.0, 0.5)
    }

    fn sprite(x: f32, y: f32) -> ZBufferElement<TestTexture> {
        ZBufferElement::texture(TEX, Rect::new(0.0, 0.0, 1.0, 1.0), Vec2::new(x, y), Vec2::splat(1.0), Color::WHITE)
    }

    // ── capacity ──────────────────────────────────────────────────────────

    #[test]
    fn add_fails_past_capacity() {
        let mut zb = ZBuffer::with_capacity(3);
        for i in 0..3 {
            assert_eq!(zb.add(sprite(0.0, i as f32)).ok(), Some(ElementId(i)));
        }
        let err = zb.add(sprite(0.0, 9.0)).unwrap_err();
        assert!(matches!(err, Mode7Error::CapacityExceeded { capacity: 3 }));
        assert_eq!(zb.len(), 3);
    }

    #[test]
    fn zero_capacity_rejects_everything() {
        let mut zb = ZBuffer::<TestTexture>::with_capacity(0);
        assert!(zb.add(sprite(0.0, 0.0)).is_err());
        assert!(zb.is_empty());
    }

    #[test]
    fn release_empties_store() {
        let mut zb = ZBuffer::with_capacity(2);
        zb.add(sprite(0.0, 1.0)).unwrap();
        zb.release();
        assert!(zb.is_empty());
        assert_eq!(zb.iter_sorted().count(), 0);
    }

    #[test]
    fn released_store_rejects_adds() {
        let mut zb = ZBuffer::with_capacity(4);
        zb.add(sprite(0.0, 1.0)).unwrap();
        zb.release();

        assert_eq!(zb.capacity(), 0);
        assert!(matches!(zb.add(sprite(0.0, 1.0)), Err(Mode7Error::CapacityExceeded { capacity: 0 })));
        assert!(zb.is_empty());
    }

    // ── update ────────────────────────────────────────────────────────────

    #[test]
    fn distance_matches_projected_size() {
        let cam = unit_camera();
        let mut zb = ZBuffer::with_capacity(4);
        for p in [(0.0, 10.0), (3.0, 2.0), (-5.0, 40.0), (0.0, -10.0)] {
            zb.add(sprite(p.0, p.1)).unwrap();
        }
        zb.update_all(&cam);

        for e in zb.iter() {
            assert_eq!(e.distance, world_to_screen(&cam, e.world.position).size);
        }
    }

    #[test]
    fn behind_camera_element_gets_exact_screen_data() {
        let mut zb = ZBuffer::with_capacity(1);
        let id = zb.add(sprite(0.0, -10.0)).unwrap();
        zb.update_all(&unit_camera());

        let e = zb.get(id).unwrap();
        let size = 50.0f32 / -9.0;
        let y = (9.5f32 / -9.0) * 100.0 + 100.0;
        assert_eq!(e.screen.position, Vec2::new(50.0, y));
        assert_eq!(e.screen.scale, Vec2::splat(size));
        assert_eq!(e.screen.rect, Rect::new(50.0 - size * 0.5, y - size, size, size));
    }

    #[test]
    fn screen_height_follows_width_reference() {
        let mut zb = ZBuffer::with_capacity(1);
        let src = Rect::new(0.0, 0.0, 2.0, 4.0);
        let id = zb
            .add(ZBufferElement::texture(TEX, src, Vec2::new(0.0, 10.0), Vec2::splat(1.0), Color::WHITE))
            .unwrap();
        zb.update_all(&unit_camera());

        let e = zb.get(id).unwrap();
        assert_eq!(e.screen.rect.size.y, 2.0 * e.screen.scale.y);
    }

    // ── sort ──────────────────────────────────────────────────────────────

    #[test]
    fn sort_orders_index_only() {
        let mut zb = ZBuffer::with_capacity(4);
        for y in [2.0, 40.0, 10.0, 5.0] {
            zb.add(sprite(0.0, y)).unwrap();
        }
        zb.update_all(&unit_camera());
        let before: Vec<Vec2> = zb.iter().map(|e| e.world.position).collect();

        zb.sort();

        let sorted: Vec<f32> = zb.iter_sorted().map(|e| e.distance).collect();
        assert!(sorted.windows(2).all(|w| w[0] <= w[1]));
        let after: Vec<Vec2> = zb.iter().map(|e| e.world.position).collect();
        assert_eq!(before, after);
        // Farthest first.
        assert_eq!(zb.iter_sorted().next().unwrap().world.position, Vec2::new(0.0, 40.0));
    }

    #[test]
    fn sort_tolerates_non_finite_distance() {
        let mut zb = ZBuffer::with_capacity(3);
        zb.add(sprite(0.0, 2.0)).unwrap();
        zb.add(sprite(0.0, -1.0)).unwrap(); // distance 0: infinite size
        zb.add(sprite(0.0, 8.0)).unwrap();
        zb.update_all(&unit_camera());
        zb.sort();
        assert_eq!(zb.iter_sorted().count(), 3);
    }

    // ── draw ──────────────────────────────────────────────────────────────

    #[test]
    fn texture_behind_camera_is_skipped_rectangle_is_not() {
        let mut zb = ZBuffer::with_capacity(2);
        zb.add(sprite(0.0, -10.0)).unwrap();
        zb.add(ZBufferElement::rectangle(Rect::new(0.0, -10.0, 1.0, 1.0), Color::BLACK)).unwrap();
        zb.update_all(&unit_camera());
        zb.sort();

        let mut backend = RecordingBackend::default();
        zb.draw_all(&mut backend);

        let draws = backend.draws();
        assert_eq!(draws.len(), 1);
        assert!(matches!(draws[0], Call::Rect { color, .. } if *color == Color::BLACK));
    }

    #[test]
    fn texture_in_front_draws_source_region() {
        let mut zb = ZBuffer::with_capacity(1);
        let id = zb.add(sprite(0.0, 10.0)).unwrap();
        zb.update_all(&unit_camera());
        zb.sort();

        let mut backend = RecordingBackend::default();
        zb.draw_all(&mut backend);

        let e = zb.get(id).unwrap();
        assert_eq!(
            backend.calls,
            vec![Call::Texture {
                texture: 9,
                src: Rect::new(0.0, 0.0, 1.0, 1.0),
                dst: e.screen.rect,
                tint: Color::WHITE,
            }]
        );
    }

    #[test]
    fn circle_is_lifted_by_its_radius() {
        let mut zb = ZBuffer::<TestTexture>::with_capacity(1);
        let id = zb.add(ZBufferElement::circle(Vec2::new(0.0, 10.0), 2.0, Color::WHITE)).unwrap();
        zb.update_all(&unit_camera());

        let mut backend = RecordingBackend::default();
        zb.draw_all(&mut backend);

        let e = zb.get(id).unwrap();
        let r = e.screen.rect.size.x;
        assert_eq!(
            backend.calls,
            vec![Call::Circle {
                center: Vec2::new(e.screen.position.x, e.screen.position.y - r),
                radius: r,
                color: Color::WHITE,
            }]
        );
    }

    #[test]
    fn elements_draw_far_to_near() {
        let mut zb = ZBuffer::<TestTexture>::with_capacity(2);
        zb.add(ZBufferElement::rectangle(Rect::new(0.0, 2.0, 1.0, 1.0), Color::WHITE)).unwrap();
        zb.add(ZBufferElement::rectangle(Rect::new(0.0, 30.0, 1.0, 1.0), Color::BLACK)).unwrap();
        zb.update_all(&unit_camera());
        zb.sort();

        let mut backend = RecordingBackend::default();
        zb.draw_all(&mut backend);

        let colors: Vec<Color> = backend
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Rect { color, .. } => Some(*color),
                _ => None,
            })
            .collect();
        assert_eq!(colors, vec![Color::BLACK, Color::WHITE]);
    }
}
