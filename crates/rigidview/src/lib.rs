//! Rigidview -- render-translation layer for 2D rigid-body worlds.
//!
//! This crate turns a [`World`](rigidview_world::World) snapshot into
//! updates on a retained-mode drawing [`Surface`](surface::Surface). Each
//! part of each body gets one long-lived node; every frame only pushes the
//! changes (pose, opacity, visibility), then draws a layer of diagnostic
//! overlays on top.
//!
//! # Quick Start
//!
//! ```
//! use rigidview::prelude::*;
//!
//! let mut world = World::new();
//! world.insert_body(Body::rectangle(BodyId(1), 400.0, 580.0, 800.0, 40.0).with_static(true)).unwrap();
//! world.insert_body(Body::circle(BodyId(2), 400.0, 100.0, 20.0)).unwrap();
//!
//! let mut state = RenderState::builder()
//!     .target(Canvas::new(800.0, 600.0))
//!     .build()
//!     .unwrap();
//! let mut surface = RecordingSurface::new();
//!
//! let (report, overlays) = render_frame(&mut state, &world, &mut surface).unwrap();
//! assert_eq!(report.visuals_drawn, 2);
//! assert!(overlays.is_some());
//! assert_eq!(surface.node_count(), 2);
//! ```
//!
//! # Frame structure
//!
//! [`frame::main_pass`] updates retained nodes and returns a
//! [`FrameContinuation`](frame::FrameContinuation);
//! [`frame::overlay_pass`] consumes it once the surface applied the main
//! pass. [`render_frame`](frame::render_frame) runs both back to back, and
//! [`RunLoop`](runner::RunLoop) drives them from a host tick source.

#![deny(unsafe_code)]

pub mod background;
pub mod cache;
pub mod constraint;
pub mod error;
pub mod events;
pub mod frame;
pub mod options;
pub mod overlay;
pub mod path;
pub mod runner;
pub mod state;
pub mod surface;
pub mod synth;
pub mod viewport;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

/// Re-export the world model crate for convenience.
pub use rigidview_world;

pub use error::{OverlayError, RenderError, SurfaceError};

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common renderer usage.
pub mod prelude {
    pub use rigidview_world::prelude::*;

    pub use crate::background::BackgroundDesc;
    pub use crate::cache::{EntityVisual, NodeCache, VisualKey};
    pub use crate::error::{OverlayError, RenderError, SurfaceError};
    pub use crate::events::{EventKind, RenderEvent, SubscriptionId};
    pub use crate::frame::{
        abandon_overlay, main_pass, overlay_pass, render_frame, DrawStrategy, FrameContinuation,
        FrameReport, MainPass,
    };
    pub use crate::options::RenderOptions;
    pub use crate::overlay::inspector::Selection;
    pub use crate::overlay::OverlayReport;
    pub use crate::runner::{ManualTicks, RunLoop, TickHandle, TickSource};
    pub use crate::state::{Canvas, FramePhase, RenderState, RenderStateBuilder};
    pub use crate::surface::{
        DrawCommand, Geometry, Layer, NodeId, NodeSpec, Paint, Pose, RecordingSurface, Stroke,
        Surface, Transform,
    };
    pub use crate::viewport::{fit_to_objects, FitTarget, PointerMapping};
}
