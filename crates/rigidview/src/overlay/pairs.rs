//! Contact-pair overlays: collision points with normals, and separations.

use rigidview_world::color::Color;
use rigidview_world::math::Vec2;
use rigidview_world::pair::{Pair, ReferenceBody};

use super::{OverlayContext, OverlayLayer};
use crate::error::OverlayError;
use crate::path::Path;
use crate::surface::Stroke;

const NORMAL_LENGTH: f64 = 8.0;

fn check(pair: &Pair, points: &[Vec2]) -> Result<(), OverlayError> {
    if points.iter().all(|p| p.is_finite()) {
        Ok(())
    } else {
        Err(OverlayError::NonFiniteContact {
            a: pair.body_a,
            b: pair.body_b,
        })
    }
}

/// Where the collision normal is drawn from: the first contact, or the
/// midpoint of the first two.
pub fn normal_anchor(contacts: &[Vec2]) -> Option<Vec2> {
    match contacts {
        [] => None,
        [only] => Some(*only),
        [first, second, ..] => Some(first.midpoint(*second)),
    }
}

/// Contact points as small squares plus a short normal at each pair.
pub fn collisions(ctx: &OverlayContext<'_>, layer: &mut OverlayLayer) -> Result<(), OverlayError> {
    let world = ctx.world;
    let mut points = Path::new();
    let mut normals = Path::new();

    for pair in world.pairs().iter().filter(|p| p.is_active) {
        check(pair, &pair.contacts)?;
        for c in &pair.contacts {
            points.rect(Vec2::new(c.x - 1.5, c.y - 1.5), 3.5, 3.5);
        }

        let Some(anchor) = normal_anchor(&pair.contacts) else {
            continue;
        };
        let a_static = world.body(pair.body_a).is_some_and(|b| b.is_static);
        let offset = pair.normal * NORMAL_LENGTH;
        let start = if pair.reference == ReferenceBody::B || a_static {
            anchor - offset
        } else {
            anchor + offset
        };
        check(pair, &[start])?;
        normals.move_to(start).line_to(anchor);
    }

    layer.fill(points, ctx.pick(Color::rgba(255, 255, 255, 0.7), Color::rgb(255, 165, 0)));
    layer.stroke(
        normals,
        Stroke::solid(ctx.pick(Color::rgba(255, 165, 0, 0.7), Color::rgb(255, 165, 0)), 1.0),
    );
    Ok(())
}

/// Share of the penetration drawn at a body: half when both bodies move,
/// none at a static body, all of it when only the other side is static.
fn share(this_static: bool, other_static: bool) -> f64 {
    if this_static {
        0.0
    } else if other_static {
        1.0
    } else {
        0.5
    }
}

/// Penetration vectors drawn out of each body of an active pair.
pub fn separations(ctx: &OverlayContext<'_>, layer: &mut OverlayLayer) -> Result<(), OverlayError> {
    let world = ctx.world;
    let mut path = Path::new();

    for pair in world.pairs().iter().filter(|p| p.is_active) {
        let (Some(a), Some(b)) = (world.body(pair.body_a), world.body(pair.body_b)) else {
            continue;
        };
        let pen = pair.penetration;

        let tip_b = b.position - pen * share(b.is_static, a.is_static);
        let tip_a = a.position + pen * share(a.is_static, b.is_static);
        check(pair, &[a.position, b.position, tip_a, tip_b])?;

        path.move_to(b.position).line_to(tip_b);
        path.move_to(a.position).line_to(tip_a);
    }

    layer.stroke(
        path,
        Stroke::solid(ctx.pick(Color::rgba(255, 165, 0, 0.5), Color::rgb(255, 165, 0)), 1.0),
    );
    Ok(())
}
