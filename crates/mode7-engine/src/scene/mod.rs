//! Scene (draw stream) types.
//!
//! Responsibilities:
//! - store renderer-agnostic draw commands, grouped into passes per render target
//! - preserve call order across command kinds inside a pass
//! - keep shape-specific helpers isolated per shape file under `scene::shapes`

mod cmd;
mod list;

pub mod shapes;

pub use cmd::{DrawCmd, TextureId};
pub use list::{DrawList, Pass, PassTarget};
