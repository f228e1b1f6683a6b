//! GPU rendering subsystem.
//!
//! [`WgpuBackend`] records camera and canvas calls into a `scene` draw list and replays
//! them through the shape renderers when flushed.
//!
//! Convention:
//! - CPU geometry is in pixels of the pass target (top-left origin, +Y down).
//! - Vertex shaders convert to NDC using a per-pass viewport uniform.

mod backend;
mod ctx;
mod shapes;

pub use backend::{PlaneProgramId, TargetId, WgpuBackend};
pub use ctx::{RenderCtx, RenderTarget};
pub use crate::scene::TextureId;
