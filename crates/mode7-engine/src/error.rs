//! Library error type.

use thiserror::Error;

use crate::camera::FrameState;

/// Errors surfaced by the camera and its element store.
///
/// Projection math never errors: degenerate values flow through as non-finite floats.
#[derive(Debug, Error)]
pub enum Mode7Error {
    /// The element store is full. The store is unchanged.
    #[error("element store is full ({capacity} elements)")]
    CapacityExceeded { capacity: usize },

    /// A frame lifecycle call was made out of order.
    #[error("`{operation}` is not allowed while the camera is {state:?}")]
    FrameState {
        operation: &'static str,
        state: FrameState,
    },

    /// The camera was unloaded; its target and program are gone.
    #[error("camera is unloaded")]
    Unloaded,

    /// Resource acquisition failed in the rendering backend.
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type Result<T, E = Mode7Error> = std::result::Result<T, E>;
