//! Primitive synthesis: turning parts into node specs.
//!
//! Geometry is emitted in node-local coordinates. A part's outline is
//! expressed relative to its position and un-rotated by its current angle,
//! so the node's pose (position plus absolute rotation) reproduces the
//! world-space outline. Hull outlines are relative to the hull's first
//! vertex.
//!
//! Kind precedence for a part:
//!
//! 1. sprite texture (shaded mode only) -> textured quad
//! 2. circle radius -> circle
//! 3. otherwise -> vertex path, skipping internal edges unless enabled

use rigidview_world::body::{Body, Part, Vertex};
use rigidview_world::color::Color;
use rigidview_world::math::Vec2;

use crate::options::RenderOptions;
use crate::path::Path;
use crate::surface::{Geometry, Layer, NodeSpec, Paint, Stroke};

/// Which paint a node was synthesized with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawMode {
    /// Filled primitives or sprites.
    Shaded,
    /// Outlines only.
    Wireframe,
}

/// Fill colors handed out to parts without an explicit fill.
pub const PALETTE: [Color; 5] = [
    Color::rgb(0xf1, 0x96, 0x48),
    Color::rgb(0xf5, 0xd2, 0x59),
    Color::rgb(0xf5, 0x5a, 0x3c),
    Color::rgb(0x06, 0x3e, 0x7b),
    Color::rgb(0xec, 0xec, 0xd1),
];

/// Fill for static parts without an explicit fill.
pub const STATIC_FILL: Color = Color::rgb(0x14, 0x15, 0x1f);
/// Outline for static parts without an explicit fill.
pub const STATIC_STROKE: Color = Color::rgb(0x55, 0x55, 0x55);
/// Outline used for every part in wireframe mode.
pub const WIREFRAME_STROKE: Color = Color::rgb(0xbb, 0xbb, 0xbb);
/// Outline of compound hulls.
pub const HULL_STROKE: Color = Color::rgba(255, 255, 255, 0.2);

/// Deterministic default fill for a part.
pub fn palette_color(part: &Part) -> Color {
    PALETTE[(part.id.0 % PALETTE.len() as u64) as usize]
}

/// Paint for a part in `mode`.
pub fn part_paint(part: &Part, body: &Body, mode: DrawMode) -> Paint {
    let style = &part.style;
    let mut paint = match mode {
        DrawMode::Wireframe => Paint::stroked(Stroke::solid(WIREFRAME_STROKE, 1.0)),
        DrawMode::Shaded => {
            let fill = style.fill.unwrap_or_else(|| {
                if body.is_static {
                    STATIC_FILL
                } else {
                    palette_color(part)
                }
            });
            let stroke = match style.stroke {
                Some(color) if style.line_width > 0.0 => Some(Stroke::solid(color, style.line_width)),
                _ if body.is_static && style.fill.is_none() => Some(Stroke::solid(STATIC_STROKE, 1.0)),
                _ => None,
            };
            Paint {
                fill: Some(fill),
                stroke,
                opacity: 1.0,
            }
        }
    };
    paint.opacity = style.opacity;
    paint
}

/// Node spec for one drawable part, or `None` if it has no geometry.
pub fn part_spec(part: &Part, body: &Body, mode: DrawMode, options: &RenderOptions) -> Option<NodeSpec> {
    if mode == DrawMode::Shaded {
        if let Some(sprite) = &part.style.sprite {
            if let Some(texture) = sprite.active_texture() {
                return Some(NodeSpec {
                    geometry: Geometry::Quad {
                        texture: texture.to_owned(),
                        anchor: Vec2::new(sprite.x_offset, sprite.y_offset),
                        scale: Vec2::new(sprite.x_scale, sprite.y_scale),
                    },
                    paint: Paint {
                        fill: None,
                        stroke: None,
                        opacity: part.style.opacity,
                    },
                    layer: Layer::Bodies,
                });
            }
        }
    }

    let geometry = match part.circle_radius {
        Some(radius) => Geometry::Circle { radius },
        None => {
            if part.vertices.len() < 2 {
                return None;
            }
            Geometry::Path(local_outline(
                &part.vertices,
                part.position,
                part.angle,
                options.show_internal_edges,
            ))
        }
    };

    Some(NodeSpec {
        geometry,
        paint: part_paint(part, body, mode),
        layer: Layer::Bodies,
    })
}

/// Node spec for a compound body's hull outline.
pub fn hull_spec(body: &Body) -> Option<NodeSpec> {
    let hull = body.hull()?;
    let origin = hull.first()?.point();
    Some(NodeSpec {
        geometry: Geometry::Path(local_outline(hull, origin, body.angle, true)),
        paint: Paint::stroked(Stroke::solid(HULL_STROKE, 1.0)),
        layer: Layer::Hulls,
    })
}

/// Pose anchor for a hull node: its first vertex.
pub fn hull_anchor(body: &Body) -> Option<Vec2> {
    body.hull()?.first().map(Vertex::point)
}

/// Outline of `vertices` relative to `origin`, un-rotated by `angle`.
///
/// An edge leaving a vertex flagged internal is skipped (the pen moves
/// instead) unless `internal_edges` is set.
pub fn local_outline(vertices: &[Vertex], origin: Vec2, angle: f64, internal_edges: bool) -> Path {
    let local = |v: &Vertex| (v.point() - origin).rotate(-angle);
    let mut path = Path::with_capacity(vertices.len() + 2);
    let Some(first) = vertices.first() else {
        return path;
    };
    let n = vertices.len();

    path.move_to(local(first));
    for j in 1..n {
        if !vertices[j - 1].is_internal || internal_edges {
            path.line_to(local(&vertices[j]));
        } else {
            path.move_to(local(&vertices[j]));
        }
        if vertices[j].is_internal && !internal_edges {
            path.move_to(local(&vertices[(j + 1) % n]));
        }
    }
    path.line_to(local(first)).close();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::Segment;
    use rigidview_world::body::{BodyId, PartId, PartStyle, Sprite};

    fn square() -> Body {
        Body::rectangle(BodyId(1), 10.0, 10.0, 4.0, 4.0)
    }

    #[test]
    fn wireframe_paint_is_plain_outline() {
        let body = square();
        let spec = part_spec(&body.parts[0], &body, DrawMode::Wireframe, &RenderOptions::default()).unwrap();
        assert_eq!(spec.paint.fill, None);
        assert_eq!(spec.paint.stroke, Some(Stroke::solid(WIREFRAME_STROKE, 1.0)));
        assert!(matches!(spec.geometry, Geometry::Path(_)));
    }

    #[test]
    fn outline_is_local_to_part() {
        let body = square();
        let spec = part_spec(&body.parts[0], &body, DrawMode::Wireframe, &RenderOptions::default()).unwrap();
        let Geometry::Path(path) = spec.geometry else {
            panic!("expected a path");
        };
        let b = path.bounds();
        assert_eq!(b.min, Vec2::new(-2.0, -2.0));
        assert_eq!(b.max, Vec2::new(2.0, 2.0));
    }

    #[test]
    fn sprite_only_in_shaded_mode() {
        let mut body = Body::circle(BodyId(2), 0.0, 0.0, 8.0);
        body.parts[0].style.sprite = Some(Sprite::new("ball.png"));
        let opts = RenderOptions::default();
        let shaded = part_spec(&body.parts[0], &body, DrawMode::Shaded, &opts).unwrap();
        assert!(matches!(shaded.geometry, Geometry::Quad { ref texture, .. } if texture == "ball.png"));
        let wire = part_spec(&body.parts[0], &body, DrawMode::Wireframe, &opts).unwrap();
        assert_eq!(wire.geometry, Geometry::Circle { radius: 8.0 });
    }

    #[test]
    fn static_default_paint() {
        let body = square().with_static(true);
        let paint = part_paint(&body.parts[0], &body, DrawMode::Shaded);
        assert_eq!(paint.fill, Some(STATIC_FILL));
        assert_eq!(paint.stroke, Some(Stroke::solid(STATIC_STROKE, 1.0)));
    }

    #[test]
    fn explicit_style_wins() {
        let style = PartStyle {
            fill: Some(Color::rgb(1, 2, 3)),
            opacity: 0.5,
            ..PartStyle::default()
        };
        let body = square().with_style(style);
        let paint = part_paint(&body.parts[0], &body, DrawMode::Shaded);
        assert_eq!(paint.fill, Some(Color::rgb(1, 2, 3)));
        assert_eq!(paint.opacity, 0.5);
    }

    #[test]
    fn internal_edges_are_skipped() {
        let mut verts: Vec<Vertex> = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]
            .iter()
            .map(|&(x, y)| Vertex::at(Vec2::new(x, y)))
            .collect();
        verts[1].is_internal = true;
        let lines = |p: &Path| p.segments().iter().filter(|s| matches!(s, Segment::LineTo(_))).count();

        let hidden = local_outline(&verts, Vec2::ZERO, 0.0, false);
        let shown = local_outline(&verts, Vec2::ZERO, 0.0, true);
        assert_eq!(lines(&shown), 4);
        assert!(lines(&hidden) < lines(&shown));
    }

    #[test]
    fn hull_only_for_compounds() {
        assert!(hull_spec(&square()).is_none());
        let parts = vec![
            Part::polygon(PartId(10), Vec2::new(0.0, 0.0), &[
                Vec2::new(-1.0, -1.0),
                Vec2::new(1.0, -1.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(-1.0, 1.0),
            ]),
            Part::circle(PartId(11), Vec2::new(3.0, 0.0), 1.0),
        ];
        let body = Body::compound(BodyId(3), parts);
        let spec = hull_spec(&body).unwrap();
        assert_eq!(spec.layer, Layer::Hulls);
        assert_eq!(hull_anchor(&body), body.hull().and_then(|h| h.first()).map(Vertex::point));
    }
}
