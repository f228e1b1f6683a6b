//! Mode 7 engine crate.
//!
//! Perspective ground planes, depth-sorted sprites and the camera that ties them together,
//! plus the platform and GPU runtime a game needs to show them.
//!
//! - [`camera`]: pose, world ↔ screen projection and the per-frame draw sequence
//! - [`zbuffer`]: element store projected and sorted each frame
//! - [`backend`]: the drawing contract the camera renders through
//! - [`render`]: the wgpu implementation of that contract

pub mod backend;
pub mod camera;
pub mod coords;
pub mod core;
pub mod device;
pub mod error;
pub mod input;
pub mod logging;
pub mod paint;
pub mod render;
pub mod time;
pub mod window;
pub mod zbuffer;

mod scene;

pub use camera::{Camera, CameraConfig, CameraState, FrameState, MoveInput, ScreenPoint};
pub use error::{Mode7Error, Result};
pub use zbuffer::{ElementId, ZBuffer, ZBufferElement};
