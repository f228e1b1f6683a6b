pub(crate) mod circle;
pub(crate) mod plane;
pub(crate) mod rect;
pub(crate) mod sprite;
