//! Constraint drawing: pins, lines and springs with optional anchor dots.

use rigidview_world::body::BodyId;
use rigidview_world::constraint::{Constraint, ConstraintKind};
use rigidview_world::math::{Bounds, Vec2};
use rigidview_world::World;

use crate::error::OverlayError;
use crate::overlay::{OverlayContext, OverlayLayer};
use crate::path::Path;
use crate::surface::Stroke;

const PIN_RADIUS: f64 = 3.0;
const ANCHOR_RADIUS: f64 = 3.0;
const COIL_AMPLITUDE: f64 = 4.0;

/// World position of an anchor: the offset plus its owner's position, or the
/// offset itself when the anchor is unowned.
///
/// `None` when there is no anchor point or its owner is not in the world.
pub fn resolve_anchor(world: &World, body: Option<BodyId>, point: Option<Vec2>) -> Option<Vec2> {
    let point = point?;
    match body {
        Some(id) => world.body(id).map(|b| b.position + point),
        None => Some(point),
    }
}

/// Both world anchors of a constraint.
pub fn anchors(world: &World, constraint: &Constraint) -> Option<(Vec2, Vec2)> {
    Some((
        resolve_anchor(world, constraint.body_a, constraint.point_a)?,
        resolve_anchor(world, constraint.body_b, constraint.point_b)?,
    ))
}

/// Whether either anchor of a constraint lies inside `bounds`.
pub fn constraint_in_view(world: &World, constraint: &Constraint, bounds: &Bounds) -> bool {
    [
        resolve_anchor(world, constraint.body_a, constraint.point_a),
        resolve_anchor(world, constraint.body_b, constraint.point_b),
    ]
    .into_iter()
    .flatten()
    .any(|p| bounds.contains(p))
}

/// Number of zig-zag segments for a spring of rest `length`.
pub fn spring_coils(length: f64) -> usize {
    if !length.is_finite() {
        return 12;
    }
    (length / 5.0).clamp(12.0, 20.0).ceil() as usize
}

/// Append the spring polyline from `start` to `end` to `path`.
///
/// Intermediate points sit at `j / coils` along the segment, pushed
/// alternately to either side by the coil amplitude.
pub fn spring_path(path: &mut Path, start: Vec2, end: Vec2, length: f64) {
    let delta = end - start;
    let normal = delta.normalise().perp();
    let coils = spring_coils(length);
    path.move_to(start);
    for j in 1..coils {
        let side = if j % 2 == 0 { 1.0 } else { -1.0 };
        let t = j as f64;
        let along = Vec2::new(delta.x * t / coils as f64, delta.y * t / coils as f64);
        path.line_to(start + along + normal * (side * COIL_AMPLITUDE));
    }
    path.line_to(end);
}

/// Draw every visible constraint that survived culling.
///
/// A constraint is skipped when neither anchor resolves. Pins draw at
/// whichever anchor exists; lines and springs need both.
pub fn constraints(ctx: &OverlayContext<'_>, layer: &mut OverlayLayer) -> Result<(), OverlayError> {
    let world = ctx.world;
    for constraint in ctx.visible_constraints() {
        let style = &constraint.style;
        if !style.visible {
            continue;
        }
        let start = resolve_anchor(world, constraint.body_a, constraint.point_a);
        let end = resolve_anchor(world, constraint.body_b, constraint.point_b);
        if start.is_none() && end.is_none() {
            continue;
        }
        if [start, end].into_iter().flatten().any(|p| !p.is_finite()) {
            return Err(OverlayError::NonFiniteConstraint { id: constraint.id });
        }

        let mut path = Path::new();
        let mut dots = Path::new();
        match (style.kind, start, end) {
            (ConstraintKind::Pin, Some(at), _) | (ConstraintKind::Pin, None, Some(at)) => {
                path.circle(at, PIN_RADIUS);
                dots.circle(at, ANCHOR_RADIUS);
            }
            (ConstraintKind::Line, Some(start), Some(end)) => {
                path.move_to(start).line_to(end);
                dots.circle(start, ANCHOR_RADIUS).circle(end, ANCHOR_RADIUS);
            }
            (ConstraintKind::Spring, Some(start), Some(end)) => {
                spring_path(&mut path, start, end, constraint.length);
                dots.circle(start, ANCHOR_RADIUS).circle(end, ANCHOR_RADIUS);
            }
            // A line needs both ends.
            _ => continue,
        }

        if style.line_width > 0.0 {
            layer.stroke(path, Stroke::solid(style.stroke, style.line_width));
        }
        if style.anchors {
            layer.fill(dots, style.stroke);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::RenderOptions;
    use crate::path::Segment;
    use crate::surface::DrawCommand;
    use rigidview_world::body::Body;
    use rigidview_world::constraint::ConstraintId;

    #[test]
    fn coil_count_is_clamped() {
        assert_eq!(spring_coils(0.0), 12);
        assert_eq!(spring_coils(40.0), 12);
        assert_eq!(spring_coils(200.0), 20);
        assert_eq!(spring_coils(80.0), 16);
        assert_eq!(spring_coils(81.0), 17);
        assert_eq!(spring_coils(1000.0), 20);
        assert_eq!(spring_coils(f64::NAN), 12);
    }

    #[test]
    fn spring_alternates_sides() {
        let mut path = Path::new();
        spring_path(&mut path, Vec2::new(0.0, 0.0), Vec2::new(120.0, 0.0), 60.0);
        let segs = path.segments();
        // move + (coils - 1) zig-zag points + end
        assert_eq!(segs.len(), 1 + 11 + 1);
        assert_eq!(segs[1], Segment::LineTo(Vec2::new(10.0, -4.0)));
        assert_eq!(segs[2], Segment::LineTo(Vec2::new(20.0, 4.0)));
        assert_eq!(segs[12], Segment::LineTo(Vec2::new(120.0, 0.0)));
    }

    #[test]
    fn anchors_follow_owner_or_stay_fixed() {
        let mut world = World::new();
        world.insert_body(Body::circle(BodyId(1), 10.0, 20.0, 5.0)).unwrap();
        let pinned = Constraint::pinned(ConstraintId(1), Vec2::new(1.0, 1.0), BodyId(1), 0.0);
        assert_eq!(
            anchors(&world, &pinned),
            Some((Vec2::new(1.0, 1.0), Vec2::new(10.0, 20.0)))
        );
        let dangling = Constraint::between(ConstraintId(2), BodyId(1), BodyId(7), 0.0);
        assert_eq!(anchors(&world, &dangling), None);
    }

    #[test]
    fn line_with_anchor_dots() {
        let mut world = World::new();
        world.insert_body(Body::circle(BodyId(1), 0.0, 0.0, 5.0)).unwrap();
        world.insert_body(Body::circle(BodyId(2), 50.0, 0.0, 5.0)).unwrap();
        world.add_constraint(Constraint::between(ConstraintId(1), BodyId(1), BodyId(2), 50.0));
        let opts = RenderOptions::default();
        let ctx = OverlayContext {
            options: &opts,
            world: &world,
            bodies: &[],
            constraints: &[0],
            pointer: None,
            timestamp: 0.0,
        };
        let mut layer = OverlayLayer::new();
        constraints(&ctx, &mut layer).unwrap();
        assert_eq!(layer.len(), 2);
        let DrawCommand::Path { paint, .. } = &layer.commands()[1] else {
            panic!("expected anchor dots");
        };
        assert!(paint.fill.is_some());
    }

    #[test]
    fn pin_draws_with_one_anchor() {
        let mut world = World::new();
        world.insert_body(Body::circle(BodyId(1), 30.0, 40.0, 5.0)).unwrap();
        let mut pin = Constraint::between(ConstraintId(1), BodyId(1), BodyId(9), 0.0)
            .with_kind(ConstraintKind::Pin);
        pin.point_b = None;
        world.add_constraint(pin);
        let mut line = Constraint::between(ConstraintId(2), BodyId(1), BodyId(9), 0.0);
        line.point_b = None;
        world.add_constraint(line);
        let opts = RenderOptions::default();
        let ctx = OverlayContext {
            options: &opts,
            world: &world,
            bodies: &[],
            constraints: &[0, 1],
            pointer: None,
            timestamp: 0.0,
        };
        let mut layer = OverlayLayer::new();
        constraints(&ctx, &mut layer).unwrap();
        assert_eq!(layer.len(), 2);
        let DrawCommand::Path { path, .. } = &layer.commands()[0] else {
            panic!("expected pin marker");
        };
        assert_eq!(
            path.segments()[0],
            Segment::Circle { center: Vec2::new(30.0, 40.0), radius: PIN_RADIUS }
        );
    }
}
