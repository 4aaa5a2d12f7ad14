//! Diagnostic overlays.
//!
//! Overlays run after the retained nodes are up to date, in a fixed order,
//! and append immediate-mode [`DrawCommand`]s to an [`OverlayLayer`]. Each
//! overlay is a plain function over an [`OverlayContext`]; a failing overlay
//! has its partial output discarded and the remaining overlays still run.
//!
//! | order | overlay | enabled by |
//! |-------|---------|------------|
//! | 1 | part bounds | `showBounds` |
//! | 2 | axes / angle indicator | `showAxes` / `showAngleIndicator` |
//! | 3 | positions | `showPositions` |
//! | 4 | velocity | `showVelocity` |
//! | 5 | ids | `showIds` |
//! | 6 | separations | `showSeparations` |
//! | 7 | collisions | `showCollisions` |
//! | 8 | vertex numbers | `showVertexNumbers` |
//! | 9 | pointer position | `showMousePosition` |
//! | 10 | constraints | always |
//! | 11 | broadphase grid | `showBroadphase` |
//! | 12 | debug text | `showDebug` |
//! | 13 | inspector | a selection is set |

pub mod bodies;
pub mod debug;
pub mod inspector;
pub mod pairs;

use rigidview_world::body::Body;
use rigidview_world::color::Color;
use rigidview_world::constraint::Constraint;
use rigidview_world::math::Vec2;
use rigidview_world::World;

use crate::error::OverlayError;
use crate::options::RenderOptions;
use crate::path::Path;
use crate::surface::{DrawCommand, Paint, Stroke};
use crate::viewport::PointerMapping;

/// Signature shared by the stateless overlays.
pub type OverlayFn = fn(&OverlayContext<'_>, &mut OverlayLayer) -> Result<(), OverlayError>;

/// Read-only inputs for one overlay pass.
#[derive(Debug, Clone, Copy)]
pub struct OverlayContext<'a> {
    /// Options snapshot for the frame.
    pub options: &'a RenderOptions,
    /// The world being drawn.
    pub world: &'a World,
    /// Indices into `world.bodies()` that survived culling.
    pub bodies: &'a [usize],
    /// Indices into `world.constraints()` that survived culling.
    pub constraints: &'a [usize],
    /// Pointer mapping, when pointer tracking is enabled.
    pub pointer: Option<&'a PointerMapping>,
    /// Frame timestamp in milliseconds.
    pub timestamp: f64,
}

impl<'a> OverlayContext<'a> {
    /// Visible bodies in draw order.
    pub fn visible_bodies(&self) -> impl Iterator<Item = &'a Body> + 'a {
        let bodies = self.world.bodies();
        self.bodies.iter().filter_map(move |&i| bodies.get(i))
    }

    /// Visible constraints in draw order.
    pub fn visible_constraints(&self) -> impl Iterator<Item = &'a Constraint> + 'a {
        let constraints = self.world.constraints();
        self.constraints.iter().filter_map(move |&i| constraints.get(i))
    }

    /// Pick the wireframe or shaded variant of a color.
    pub fn pick(&self, wireframe: Color, shaded: Color) -> Color {
        if self.options.wireframes {
            wireframe
        } else {
            shaded
        }
    }
}

/// Immediate-mode command buffer for one frame's overlays.
#[derive(Debug, Default)]
pub struct OverlayLayer {
    commands: Vec<DrawCommand>,
}

impl OverlayLayer {
    /// An empty layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all commands, keeping the allocation.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Commands in submission order.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the layer is empty.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Outline a path.
    pub fn stroke(&mut self, path: Path, stroke: Stroke) {
        if !path.is_empty() {
            self.commands.push(DrawCommand::Path {
                path,
                paint: Paint::stroked(stroke),
            });
        }
    }

    /// Fill a path.
    pub fn fill(&mut self, path: Path, color: Color) {
        if !path.is_empty() {
            self.commands.push(DrawCommand::Path {
                path,
                paint: Paint::filled(color),
            });
        }
    }

    /// Fill and outline a path.
    pub fn paint(&mut self, path: Path, paint: Paint) {
        if !path.is_empty() {
            self.commands.push(DrawCommand::Path { path, paint });
        }
    }

    /// Draw a line of text.
    pub fn text(&mut self, text: impl Into<String>, position: Vec2, size: f64, color: Color) {
        self.commands.push(DrawCommand::Text {
            text: text.into(),
            position,
            size,
            color,
        });
    }

    /// Run one overlay, discarding its output if it fails.
    ///
    /// Returns whether the overlay completed.
    pub fn isolate<F>(&mut self, name: &'static str, draw: F) -> bool
    where
        F: FnOnce(&mut OverlayLayer) -> Result<(), OverlayError>,
    {
        let mark = self.commands.len();
        match draw(self) {
            Ok(()) => true,
            Err(e) => {
                self.commands.truncate(mark);
                tracing::warn!(overlay = name, error = %e, "overlay failed, skipping");
                false
            }
        }
    }
}

/// Outcome of an overlay pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlayReport {
    /// Overlays that ran to completion.
    pub completed: usize,
    /// Overlays whose output was discarded.
    pub failed: usize,
    /// Commands submitted to the surface.
    pub commands: usize,
}

impl OverlayReport {
    pub(crate) fn record(&mut self, ok: bool) {
        if ok {
            self.completed += 1;
        } else {
            self.failed += 1;
        }
    }
}

/// Fail with [`OverlayError::NonFinite`] if any point is NaN or infinite.
pub(crate) fn ensure_finite<I>(body: &Body, points: I) -> Result<(), OverlayError>
where
    I: IntoIterator<Item = Vec2>,
{
    if points.into_iter().all(Vec2::is_finite) {
        Ok(())
    } else {
        Err(OverlayError::NonFinite { body: body.id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigidview_world::body::BodyId;

    #[test]
    fn failed_overlay_output_is_discarded() {
        let mut layer = OverlayLayer::new();
        assert!(layer.isolate("ok", |l| {
            l.text("kept", Vec2::ZERO, 12.0, Color::rgb(255, 255, 255));
            Ok(())
        }));
        assert!(!layer.isolate("bad", |l| {
            l.text("dropped", Vec2::ZERO, 12.0, Color::rgb(255, 255, 255));
            Err(OverlayError::NonFinite { body: BodyId(1) })
        }));
        assert_eq!(layer.len(), 1);
        assert!(matches!(&layer.commands()[0], DrawCommand::Text { text, .. } if text == "kept"));
    }

    #[test]
    fn empty_paths_are_not_submitted() {
        let mut layer = OverlayLayer::new();
        layer.stroke(Path::new(), Stroke::solid(Color::rgb(0, 0, 0), 1.0));
        assert!(layer.is_empty());
    }
}
