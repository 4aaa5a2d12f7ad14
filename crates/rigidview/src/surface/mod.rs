//! The drawing-surface boundary.
//!
//! The renderer talks to a retained-mode scene graph through the [`Surface`]
//! trait. Two kinds of output cross this boundary:
//!
//! 1. **Retained nodes** -- one per visible part (plus one hull outline per
//!    compound body in wireframe mode). Nodes are created once from a
//!    [`NodeSpec`] and afterwards only receive pose, opacity and visibility
//!    updates.
//! 2. **Overlay commands** -- an immediate-mode list of [`DrawCommand`]s,
//!    replaced every frame, carrying the diagnostic layers.
//!
//! The renderer never inspects node internals; implementations are free to
//! map nodes onto whatever primitives their backend offers.
//! [`RecordingSurface`] is an in-memory implementation for headless drivers
//! and tests.

mod recording;

pub use recording::{RecordedNode, RecordingSurface, SurfaceStats};

use rigidview_world::color::Color;
use rigidview_world::math::Vec2;

use crate::background::BackgroundDesc;
use crate::error::SurfaceError;
use crate::path::Path;

// ---------------------------------------------------------------------------
// Node types
// ---------------------------------------------------------------------------

/// Handle to a retained node, allocated by the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// Stacking group for retained nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Compound hull outlines, drawn beneath parts.
    Hulls,
    /// Part primitives.
    Bodies,
}

/// Shape of a retained node, in node-local coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// A textured quad.
    Quad {
        /// Texture source.
        texture: String,
        /// Anchor as a fraction of the texture size.
        anchor: Vec2,
        /// Scale applied to the texture size.
        scale: Vec2,
    },
    /// A circle centered on the node origin.
    Circle {
        /// Radius; the primitive is `2 * radius` across.
        radius: f64,
    },
    /// An outline path relative to the node origin.
    Path(Path),
}

/// Outline description.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    /// Line color.
    pub color: Color,
    /// Line width in world units.
    pub width: f64,
    /// Optional `[dash, gap]` pattern.
    pub dash: Option<[f64; 2]>,
}

impl Stroke {
    /// A solid stroke.
    pub const fn solid(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            dash: None,
        }
    }
}

/// Fill, outline and opacity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    /// Interior color.
    pub fill: Option<Color>,
    /// Outline.
    pub stroke: Option<Stroke>,
    /// Overall opacity in `0.0..=1.0`.
    pub opacity: f64,
}

impl Paint {
    /// Outline-only paint.
    pub const fn stroked(stroke: Stroke) -> Self {
        Self {
            fill: None,
            stroke: Some(stroke),
            opacity: 1.0,
        }
    }

    /// Fill-only paint.
    pub const fn filled(color: Color) -> Self {
        Self {
            fill: Some(color),
            stroke: None,
            opacity: 1.0,
        }
    }
}

/// Everything needed to create a node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSpec {
    /// Shape.
    pub geometry: Geometry,
    /// Paint.
    pub paint: Paint,
    /// Stacking group.
    pub layer: Layer,
}

/// Position and rotation of a node.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    /// Node origin in world coordinates.
    pub position: Vec2,
    /// Rotation in degrees.
    pub rotation: f64,
}

/// Affine scale-then-translate transform: `p' = p * scale + translate`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Per-axis scale.
    pub scale: Vec2,
    /// Translation applied after scaling.
    pub translate: Vec2,
}

impl Transform {
    /// No-op transform.
    pub const IDENTITY: Transform = Transform {
        scale: Vec2 { x: 1.0, y: 1.0 },
        translate: Vec2 { x: 0.0, y: 0.0 },
    };

    /// Uniform scale, no translation.
    pub fn uniform(scale: f64) -> Self {
        Self {
            scale: Vec2::new(scale, scale),
            translate: Vec2::ZERO,
        }
    }

    /// Map a point.
    pub fn apply(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x * self.scale.x + self.translate.x,
            p.y * self.scale.y + self.translate.y,
        )
    }
}

// ---------------------------------------------------------------------------
// Overlay commands
// ---------------------------------------------------------------------------

/// One immediate-mode overlay instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Fill and/or stroke a path.
    Path {
        /// Geometry in world coordinates.
        path: Path,
        /// Paint.
        paint: Paint,
    },
    /// Draw a line of text with its baseline origin at `position`.
    Text {
        /// Content.
        text: String,
        /// Origin in world coordinates.
        position: Vec2,
        /// Font size.
        size: f64,
        /// Color.
        color: Color,
    },
}

// ---------------------------------------------------------------------------
// Surface
// ---------------------------------------------------------------------------

/// A retained-mode drawing sink.
///
/// Node operations on handles the surface does not know are ignored;
/// the renderer treats missing handles as recoverable.
pub trait Surface {
    /// Create a node. The node starts visible with the spec's opacity at the
    /// origin.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError`] when the node cannot be allocated.
    fn create_node(&mut self, spec: NodeSpec) -> Result<NodeId, SurfaceError>;

    /// Move and rotate a node.
    fn set_pose(&mut self, node: NodeId, pose: Pose);

    /// Change a node's opacity.
    fn set_opacity(&mut self, node: NodeId, opacity: f64);

    /// Show or hide a node.
    fn set_visible(&mut self, node: NodeId, visible: bool);

    /// Destroy a node.
    fn remove_node(&mut self, node: NodeId);

    /// Replace the backdrop.
    fn set_background(&mut self, background: &BackgroundDesc);

    /// Replace the view transform applied to subsequent output.
    fn set_transform(&mut self, transform: Transform);

    /// Replace this frame's overlay layer.
    fn draw_overlay(&mut self, commands: &[DrawCommand]);

    /// Apply all pending mutations. Returning marks the surface's update
    /// completion point for the frame.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::Lost`] if the backend went away.
    fn apply(&mut self) -> Result<(), SurfaceError>;
}
