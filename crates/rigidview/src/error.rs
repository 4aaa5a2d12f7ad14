//! Error types for the render-translation layer.

use rigidview_world::body::BodyId;
use rigidview_world::constraint::ConstraintId;

/// Errors produced by renderer construction and frame driving.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The builder was not given a drawing target.
    #[error("no drawing target configured -- call `RenderStateBuilder::target` before `build`")]
    MissingTarget,

    /// The drawing target cannot hold a frame.
    #[error("invalid canvas size {width}x{height} (both sides must be positive and finite)")]
    InvalidCanvas { width: f64, height: f64 },

    /// Options JSON had the wrong shape.
    #[error("invalid render options: {0}")]
    Options(#[from] serde_json::Error),

    /// An overlay continuation from an earlier frame was resumed.
    #[error("frame continuation {got} does not match the pending frame {pending:?}")]
    StaleContinuation { got: u64, pending: Option<u64> },

    /// The drawing surface reported a failure.
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// Failures reported by a drawing surface implementation.
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    /// The surface refused to allocate another node.
    #[error("surface node capacity exhausted ({capacity} nodes)")]
    Capacity { capacity: usize },

    /// The surface is gone (context lost, window closed).
    #[error("drawing surface lost: {0}")]
    Lost(String),
}

/// A fault inside one overlay renderer. Isolated to that overlay.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OverlayError {
    /// A body produced NaN or infinite geometry.
    #[error("body {body} has non-finite geometry")]
    NonFinite { body: BodyId },

    /// A pair or contact produced NaN or infinite geometry.
    #[error("non-finite contact geometry between bodies {a} and {b}")]
    NonFiniteContact { a: BodyId, b: BodyId },

    /// A constraint anchor resolved to NaN or infinity.
    #[error("constraint {} has a non-finite anchor", .id.0)]
    NonFiniteConstraint { id: ConstraintId },
}
