//! Selection inspector highlighting.

use rigidview_world::body::BodyId;
use rigidview_world::color::Color;
use rigidview_world::constraint::ConstraintId;
use rigidview_world::math::{Bounds, Vec2};

use super::{OverlayContext, OverlayLayer};
use crate::constraint::resolve_anchor;
use crate::error::OverlayError;
use crate::path::Path;
use crate::surface::{Paint, Stroke};

const SELECTED: Color = Color::rgba(255, 165, 0, 0.9);
const BOX_STROKE: Color = Color::rgba(255, 165, 0, 0.6);
const BOX_FILL: Color = Color::rgba(255, 165, 0, 0.1);

/// What an editor has selected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    /// Selected bodies.
    pub bodies: Vec<BodyId>,
    /// Selected constraints.
    pub constraints: Vec<ConstraintId>,
    /// Rubber-band box being dragged, if any.
    pub area: Option<Bounds>,
}

impl Selection {
    /// Whether nothing is selected and no box is being dragged.
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty() && self.constraints.is_empty() && self.area.is_none()
    }
}

/// Dashed boxes around selected bodies, rings at selected constraint
/// anchors, and the selection area.
pub fn inspector(
    ctx: &OverlayContext<'_>,
    selection: &Selection,
    layer: &mut OverlayLayer,
) -> Result<(), OverlayError> {
    let world = ctx.world;
    let mut marks = Path::new();

    for body in selection.bodies.iter().filter_map(|id| world.body(*id)) {
        let b = body.bounds;
        if b.is_empty() {
            continue;
        }
        if !(b.min.is_finite() && b.max.is_finite()) {
            return Err(OverlayError::NonFinite { body: body.id });
        }
        marks.rect(
            Vec2::new((b.min.x - 3.0).floor(), (b.min.y - 3.0).floor()),
            (b.width() + 6.0).floor(),
            (b.height() + 6.0).floor(),
        );
    }

    for constraint in world
        .constraints()
        .iter()
        .filter(|c| selection.constraints.contains(&c.id))
    {
        let anchors = [
            resolve_anchor(world, constraint.body_a, constraint.point_a),
            resolve_anchor(world, constraint.body_b, constraint.point_b),
        ];
        for anchor in anchors.into_iter().flatten().filter(|p| p.is_finite()) {
            marks.circle(anchor, 10.0);
        }
    }

    layer.stroke(
        marks,
        Stroke {
            color: SELECTED,
            width: 1.0,
            dash: Some([1.0, 2.0]),
        },
    );

    if let Some(area) = selection.area.filter(|a| a.min.is_finite() && a.max.is_finite()) {
        let mut rect = Path::new();
        rect.rect(
            Vec2::new(area.min.x.floor(), area.min.y.floor()),
            area.width().floor(),
            area.height().floor(),
        );
        layer.paint(
            rect,
            Paint {
                fill: Some(BOX_FILL),
                stroke: Some(Stroke::solid(BOX_STROKE, 1.0)),
                opacity: 1.0,
            },
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::RenderOptions;
    use crate::surface::DrawCommand;
    use rigidview_world::body::Body;
    use rigidview_world::World;

    #[test]
    fn highlights_selected_body_and_area() {
        let mut world = World::new();
        world
            .insert_body(Body::rectangle(BodyId(1), 10.0, 10.0, 10.0, 10.0))
            .unwrap();
        let opts = RenderOptions::default();
        let ctx = OverlayContext {
            options: &opts,
            world: &world,
            bodies: &[],
            constraints: &[],
            pointer: None,
            timestamp: 0.0,
        };
        let selection = Selection {
            bodies: vec![BodyId(1), BodyId(99)],
            constraints: Vec::new(),
            area: Some(Bounds::new(Vec2::new(0.5, 0.5), Vec2::new(20.5, 10.5))),
        };
        let mut layer = OverlayLayer::new();
        inspector(&ctx, &selection, &mut layer).unwrap();
        assert_eq!(layer.len(), 2);
        let DrawCommand::Path { path, paint } = &layer.commands()[0] else {
            panic!("expected path");
        };
        assert_eq!(path.bounds().min, Vec2::new(2.0, 2.0));
        assert_eq!(paint.stroke.and_then(|s| s.dash), Some([1.0, 2.0]));
    }
}
