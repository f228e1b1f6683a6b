//! Shape renderers: one pipeline per draw command kind, sharing the quad, layouts and
//! viewport uniform from `common`.

pub(crate) mod circle;
pub(crate) mod common;
pub(crate) mod plane;
pub(crate) mod rect;
pub(crate) mod sprite;
