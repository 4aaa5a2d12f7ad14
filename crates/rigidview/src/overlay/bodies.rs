//! Per-body overlays: bounds, axes, positions, velocity, ids, vertex numbers.

use rigidview_world::body::Body;
use rigidview_world::color::Color;
use rigidview_world::math::Vec2;

use super::{ensure_finite, OverlayContext, OverlayLayer};
use crate::error::OverlayError;
use crate::path::Path;
use crate::surface::Stroke;

const AXIS_LENGTH: f64 = 20.0;

fn shown<'a>(ctx: &OverlayContext<'a>) -> impl Iterator<Item = &'a Body> + 'a {
    ctx.visible_bodies().filter(|b| b.visible)
}

/// Part bounding boxes.
pub fn bounds(ctx: &OverlayContext<'_>, layer: &mut OverlayLayer) -> Result<(), OverlayError> {
    let mut path = Path::new();
    for body in shown(ctx) {
        for part in body.drawable_parts() {
            let b = part.bounds;
            if b.is_empty() {
                continue;
            }
            ensure_finite(body, [b.min, b.max])?;
            path.rect(b.min, b.width(), b.height());
        }
    }
    let color = ctx.pick(Color::rgba(255, 255, 255, 0.08), Color::rgba(0, 0, 0, 0.1));
    layer.stroke(path, Stroke::solid(color, 1.0));
    Ok(())
}

/// Edge-normal axes (`showAxes`) or, failing that, an angle indicator from
/// each part's center to the midpoint of its closing edge.
pub fn axes(ctx: &OverlayContext<'_>, layer: &mut OverlayLayer) -> Result<(), OverlayError> {
    let mut path = Path::new();
    for body in shown(ctx) {
        for part in body.drawable_parts() {
            ensure_finite(body, [part.position])?;
            if ctx.options.show_axes {
                for axis in &part.axes {
                    path.move_to(part.position)
                        .line_to(part.position + *axis * AXIS_LENGTH);
                }
            } else if let (Some(first), Some(last)) = (part.vertices.first(), part.vertices.last()) {
                let tip = first.point().midpoint(last.point());
                ensure_finite(body, [tip])?;
                path.move_to(part.position).line_to(tip);
            }
        }
    }
    let stroke = if ctx.options.wireframes {
        Stroke::solid(Color::rgb(205, 92, 92), 1.0)
    } else {
        Stroke::solid(Color::rgba(255, 255, 255, 0.4), 2.0)
    };
    layer.stroke(path, stroke);
    Ok(())
}

/// Dots at every part position and at each body's previous position.
pub fn positions(ctx: &OverlayContext<'_>, layer: &mut OverlayLayer) -> Result<(), OverlayError> {
    let mut current = Path::new();
    let mut previous = Path::new();
    for body in shown(ctx) {
        for part in &body.parts {
            ensure_finite(body, [part.position])?;
            current.circle(part.position, 3.0);
        }
        let prev = body.previous_position();
        ensure_finite(body, [prev])?;
        previous.circle(prev, 2.0);
    }
    layer.fill(current, ctx.pick(Color::rgb(205, 92, 92), Color::rgba(0, 0, 0, 0.5)));
    layer.fill(previous, Color::rgba(255, 165, 0, 0.8));
    Ok(())
}

/// A line from each body along twice its last displacement.
pub fn velocity(ctx: &OverlayContext<'_>, layer: &mut OverlayLayer) -> Result<(), OverlayError> {
    let mut path = Path::new();
    for body in shown(ctx) {
        let displacement = body.position - body.previous_position();
        let tip = body.position + displacement * 2.0;
        ensure_finite(body, [body.position, tip])?;
        path.move_to(body.position).line_to(tip);
    }
    layer.stroke(path, Stroke::solid(Color::rgb(100, 149, 237), 3.0));
    Ok(())
}

/// Part ids next to each part.
pub fn ids(ctx: &OverlayContext<'_>, layer: &mut OverlayLayer) -> Result<(), OverlayError> {
    let color = Color::rgba(255, 255, 255, 0.5);
    for body in shown(ctx) {
        for part in body.drawable_parts() {
            ensure_finite(body, [part.position])?;
            layer.text(
                part.id.to_string(),
                part.position + Vec2::new(10.0, -10.0),
                12.0,
                color,
            );
        }
    }
    Ok(())
}

/// `body_vertex` labels pulled slightly toward each part's center.
pub fn vertex_numbers(ctx: &OverlayContext<'_>, layer: &mut OverlayLayer) -> Result<(), OverlayError> {
    let color = Color::rgba(255, 255, 255, 0.2);
    for (i, body) in ctx.visible_bodies().enumerate() {
        for part in body.drawable_parts() {
            for (j, v) in part.vertices.iter().enumerate() {
                let at = part.position + (v.point() - part.position) * 0.8;
                ensure_finite(body, [at])?;
                layer.text(format!("{i}_{j}"), at, 10.0, color);
            }
        }
    }
    Ok(())
}
