use crate::paint::Color;

use super::{DrawCmd, TextureId};

/// Where a pass renders.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PassTarget {
    /// The frame's surface.
    Screen,
    /// An offscreen texture that is also a render attachment.
    Texture(TextureId),
}

/// Commands drawn into one target, in call order.
#[derive(Debug, Clone, PartialEq)]
pub struct Pass {
    pub target: PassTarget,
    /// Cleared to this color before drawing; `None` keeps the existing contents.
    pub clear: Option<Color>,
    pub cmds: Vec<DrawCmd>,
}

/// Recorded draw stream for a frame.
///
/// Passes are replayed in recording order. Commands pushed while no pass is open go
/// into a screen pass that loads the existing contents.
///
/// - `push()` is O(1)
/// - `clear()` keeps the pass vector's capacity for reuse
#[derive(Debug, Default)]
pub struct DrawList {
    passes: Vec<Pass>,
    /// An offscreen pass is open.
    in_offscreen: bool,
}

impl DrawList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops all recorded passes.
    #[inline]
    pub fn clear(&mut self) {
        self.passes.clear();
        self.in_offscreen = false;
    }

    /// Drops passes that were recorded but never flushed. Returns how many were dropped.
    pub fn discard(&mut self) -> usize {
        let dropped = self.passes.len();
        if dropped > 0 {
            log::debug!("DrawList: discarding {dropped} unflushed passes");
        }
        self.clear();
        dropped
    }

    #[inline]
    pub fn passes(&self) -> &[Pass] {
        &self.passes
    }

    /// Opens a pass into `target`; subsequent pushes land there.
    pub fn begin_pass(&mut self, target: TextureId, clear: Option<Color>) {
        if self.in_offscreen {
            log::warn!("DrawList: nested offscreen pass; previous pass closed implicitly");
        }
        self.passes.push(Pass {
            target: PassTarget::Texture(target),
            clear,
            cmds: Vec::new(),
        });
        self.in_offscreen = true;
    }

    /// Closes the current offscreen pass; later pushes go to the screen.
    pub fn end_pass(&mut self) {
        if !self.in_offscreen {
            log::warn!("DrawList: end_pass without an open offscreen pass");
        }
        self.in_offscreen = false;
    }

    /// Appends `cmd` to the current pass.
    pub fn push(&mut self, cmd: DrawCmd) {
        let reuse = match self.passes.last() {
            Some(p) if self.in_offscreen => matches!(p.target, PassTarget::Texture(_)),
            Some(p) => p.target == PassTarget::Screen,
            None => false,
        };

        if !reuse {
            self.passes.push(Pass {
                target: PassTarget::Screen,
                clear: None,
                cmds: Vec::new(),
            });
        }

        if let Some(pass) = self.passes.last_mut() {
            pass.cmds.push(cmd);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{Rect, Vec2};

    fn rect_cmd(x: f32) -> Rect {
        Rect::new(x, 0.0, 1.0, 1.0)
    }

    #[test]
    fn pushes_without_pass_go_to_screen() {
        let mut dl = DrawList::new();
        dl.push_rect(rect_cmd(0.0), Color::WHITE);
        dl.push_circle(Vec2::zero(), 1.0, Color::WHITE);

        assert_eq!(dl.passes().len(), 1);
        assert_eq!(dl.passes()[0].target, PassTarget::Screen);
        assert_eq!(dl.passes()[0].clear, None);
        assert_eq!(dl.passes()[0].cmds.len(), 2);
    }

    #[test]
    fn offscreen_pass_then_screen() {
        let mut dl = DrawList::new();
        dl.begin_pass(TextureId(3), Some(Color::BLACK));
        dl.push_rect(rect_cmd(0.0), Color::WHITE);
        dl.end_pass();
        dl.push_rect(rect_cmd(1.0), Color::WHITE);

        let passes = dl.passes();
        assert_eq!(passes.len(), 2);
        assert_eq!(passes[0].target, PassTarget::Texture(TextureId(3)));
        assert_eq!(passes[0].clear, Some(Color::BLACK));
        assert_eq!(passes[0].cmds.len(), 1);
        assert_eq!(passes[1].target, PassTarget::Screen);
    }

    #[test]
    fn empty_cleared_pass_is_kept() {
        let mut dl = DrawList::new();
        dl.begin_pass(TextureId(1), Some(Color::WHITE));
        dl.end_pass();
        assert_eq!(dl.passes().len(), 1);
        assert!(dl.passes()[0].cmds.is_empty());
    }

    #[test]
    fn order_is_preserved_across_kinds() {
        let mut dl = DrawList::new();
        dl.push_circle(Vec2::zero(), 1.0, Color::WHITE);
        dl.push_rect(rect_cmd(0.0), Color::WHITE);
        let cmds = &dl.passes()[0].cmds;
        assert!(matches!(cmds[0], DrawCmd::Circle(_)));
        assert!(matches!(cmds[1], DrawCmd::Rect(_)));
    }

    #[test]
    fn clear_resets() {
        let mut dl = DrawList::new();
        dl.begin_pass(TextureId(1), None);
        dl.push_rect(rect_cmd(0.0), Color::WHITE);
        dl.clear();
        assert!(dl.passes().is_empty());
        dl.push_rect(rect_cmd(0.0), Color::WHITE);
        assert_eq!(dl.passes()[0].target, PassTarget::Screen);
    }

    #[test]
    fn discard_drops_frames_that_were_never_flushed() {
        let mut dl = DrawList::new();
        for _ in 0..100 {
            dl.begin_pass(TextureId(1), Some(Color::BLACK));
            dl.push_rect(rect_cmd(0.0), Color::WHITE);
            dl.end_pass();
            dl.push_rect(rect_cmd(1.0), Color::WHITE);
        }
        assert_eq!(dl.passes().len(), 200);

        assert_eq!(dl.discard(), 200);
        assert!(dl.passes().is_empty());
        assert_eq!(dl.discard(), 0);

        dl.begin_pass(TextureId(1), Some(Color::BLACK));
        dl.end_pass();
        dl.push_rect(rect_cmd(0.0), Color::WHITE);
        assert_eq!(dl.passes().len(), 2);
    }
}
