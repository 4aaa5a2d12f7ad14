//! Bodies, parts and their render descriptors.
//!
//! A [`Body`] owns one or more [`Part`]s. A simple body has exactly one part
//! that shares the body's id. A compound body stores its outer convex hull in
//! `parts[0]` (sharing the body's id) followed by its convex constituents,
//! so drawing code iterates [`Body::drawable_parts`] and uses
//! [`Body::hull`] for the outline variant.
//!
//! Derived geometry (per-part bounds and edge axes, body bounds) is kept in
//! sync by the mutators here; scene loaders call [`Body::refresh`] after
//! deserializing.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::math::{Bounds, Vec2};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Stable identity of a body within a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BodyId(pub u64);

/// Stable identity of a part. Simple bodies reuse their body's number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartId(pub u64);

impl From<BodyId> for PartId {
    fn from(id: BodyId) -> Self {
        PartId(id.0)
    }
}

impl std::fmt::Display for BodyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for PartId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Vertex
// ---------------------------------------------------------------------------

/// A vertex of a part's outline in world coordinates.
///
/// `is_internal` marks vertices whose outgoing edge is shared with a sibling
/// part of a compound body; outline drawing can skip those edges to avoid
/// seams.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vertex {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
    /// Whether the edge starting at this vertex is internal.
    #[serde(default)]
    pub is_internal: bool,
}

impl Vertex {
    /// A non-internal vertex at `p`.
    pub fn at(p: Vec2) -> Self {
        Self {
            x: p.x,
            y: p.y,
            is_internal: false,
        }
    }

    /// The vertex position.
    #[inline]
    pub fn point(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Style
// ---------------------------------------------------------------------------

fn default_true() -> bool {
    true
}

fn default_one() -> f64 {
    1.0
}

fn default_anchor() -> f64 {
    0.5
}

/// Bitmap descriptor for sprite-backed parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sprite {
    /// Single texture source.
    #[serde(default)]
    pub texture: Option<String>,
    /// Declared texture set (animation frames); the first is used when
    /// `texture` is absent.
    #[serde(default)]
    pub textures: Vec<String>,
    /// Horizontal scale.
    #[serde(default = "default_one")]
    pub x_scale: f64,
    /// Vertical scale.
    #[serde(default = "default_one")]
    pub y_scale: f64,
    /// Horizontal anchor as a fraction of the texture width.
    #[serde(default = "default_anchor")]
    pub x_offset: f64,
    /// Vertical anchor as a fraction of the texture height.
    #[serde(default = "default_anchor")]
    pub y_offset: f64,
}

impl Sprite {
    /// Sprite with a single texture, unit scale and centered anchor.
    pub fn new(texture: impl Into<String>) -> Self {
        Self {
            texture: Some(texture.into()),
            textures: Vec::new(),
            x_scale: 1.0,
            y_scale: 1.0,
            x_offset: 0.5,
            y_offset: 0.5,
        }
    }

    /// The texture to draw, if any is declared.
    pub fn active_texture(&self) -> Option<&str> {
        self.texture
            .as_deref()
            .or_else(|| self.textures.first().map(String::as_str))
    }
}

/// Per-part render descriptor supplied by the physics side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartStyle {
    /// Whether the part is drawn at all.
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Base opacity in `0.0..=1.0`.
    #[serde(default = "default_one")]
    pub opacity: f64,
    /// Fill color; the renderer picks a palette color when absent.
    #[serde(default)]
    pub fill: Option<Color>,
    /// Outline color.
    #[serde(default)]
    pub stroke: Option<Color>,
    /// Outline width; zero disables the outline in shaded mode.
    #[serde(default)]
    pub line_width: f64,
    /// Optional bitmap.
    #[serde(default)]
    pub sprite: Option<Sprite>,
}

impl Default for PartStyle {
    fn default() -> Self {
        Self {
            visible: true,
            opacity: 1.0,
            fill: None,
            stroke: None,
            line_width: 0.0,
            sprite: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Part
// ---------------------------------------------------------------------------

/// A single convex constituent of a body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    /// Stable identity.
    pub id: PartId,
    /// Center in world coordinates.
    pub position: Vec2,
    /// Rotation in radians.
    #[serde(default)]
    pub angle: f64,
    /// Outline in world coordinates.
    #[serde(default)]
    pub vertices: Vec<Vertex>,
    /// Present for circular parts.
    #[serde(default)]
    pub circle_radius: Option<f64>,
    /// World-space bounding box (derived).
    #[serde(default = "empty_bounds")]
    pub bounds: Bounds,
    /// Unit edge normals, deduplicated by direction (derived).
    #[serde(default)]
    pub axes: Vec<Vec2>,
    /// Render descriptor.
    #[serde(default)]
    pub style: PartStyle,
}

fn empty_bounds() -> Bounds {
    Bounds::EMPTY
}

/// Side count used to approximate circles: `ceil(clamp(radius, 10, 25))`.
fn circle_sides(radius: f64) -> usize {
    radius.clamp(10.0, 25.0).ceil() as usize
}

impl Part {
    /// A polygonal part whose outline is given relative to `position`.
    pub fn polygon(id: PartId, position: Vec2, local: &[Vec2]) -> Self {
        let mut part = Self {
            id,
            position,
            angle: 0.0,
            vertices: local.iter().map(|p| Vertex::at(position + *p)).collect(),
            circle_radius: None,
            bounds: Bounds::EMPTY,
            axes: Vec::new(),
            style: PartStyle::default(),
        };
        part.refresh();
        part
    }

    /// A circular part. The outline is a regular polygon approximation used
    /// for bounds and axes.
    pub fn circle(id: PartId, position: Vec2, radius: f64) -> Self {
        let sides = circle_sides(radius);
        let step = std::f64::consts::TAU / sides as f64;
        let local: Vec<Vec2> = (0..sides)
            .map(|i| Vec2::new(radius, 0.0).rotate(step * i as f64 + step * 0.5))
            .collect();
        let mut part = Self::polygon(id, position, &local);
        part.circle_radius = Some(radius);
        part.refresh();
        part
    }

    /// Recompute bounds and axes from the current outline.
    pub fn refresh(&mut self) {
        self.bounds = match self.circle_radius {
            Some(r) if self.vertices.is_empty() => Bounds::new(
                self.position - Vec2::new(r, r),
                self.position + Vec2::new(r, r),
            ),
            _ => Bounds::from_points(self.vertices.iter().map(Vertex::point)),
        };
        self.axes = axes_from_vertices(&self.vertices);
    }

    /// Move the part rigidly by `delta`.
    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
        for v in &mut self.vertices {
            v.x += delta.x;
            v.y += delta.y;
        }
        self.bounds = self.bounds.translated(delta);
    }

    /// Rotate the part rigidly by `delta` radians about `pivot`.
    pub fn rotate_about(&mut self, delta: f64, pivot: Vec2) {
        self.angle += delta;
        self.position = pivot + (self.position - pivot).rotate(delta);
        for v in &mut self.vertices {
            let p = pivot + (v.point() - pivot).rotate(delta);
            v.x = p.x;
            v.y = p.y;
        }
        self.refresh();
    }
}

/// Unit edge normals of a closed outline, one per distinct direction.
///
/// Normals whose gradients agree to three decimals are considered the same
/// axis; the first occurrence wins.
pub fn axes_from_vertices(vertices: &[Vertex]) -> Vec<Vec2> {
    let n = vertices.len();
    let mut axes: Vec<Vec2> = Vec::with_capacity(n);
    let mut seen: Vec<i64> = Vec::with_capacity(n);
    for i in 0..n {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        let normal = Vec2::new(b.y - a.y, a.x - b.x).normalise();
        if normal == Vec2::ZERO {
            continue;
        }
        let key = if normal.y == 0.0 {
            i64::MAX
        } else {
            ((normal.x / normal.y) * 1000.0).round() as i64
        };
        if !seen.contains(&key) {
            seen.push(key);
            axes.push(normal);
        }
    }
    axes
}

/// Convex hull of a point cloud (monotone chain), without repeated closing
/// point. Collinear points are dropped.
pub fn convex_hull(points: &[Vec2]) -> Vec<Vec2> {
    let mut pts: Vec<Vec2> = points.iter().copied().filter(|p| p.is_finite()).collect();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let cross = |o: Vec2, a: Vec2, b: Vec2| (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x);

    let mut lower: Vec<Vec2> = Vec::with_capacity(pts.len());
    for &p in &pts {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(p);
    }
    let mut upper: Vec<Vec2> = Vec::with_capacity(pts.len());
    for &p in pts.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(p);
    }
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

// ---------------------------------------------------------------------------
// Body
// ---------------------------------------------------------------------------

/// A rigid body as seen by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    /// Stable identity.
    pub id: BodyId,
    /// Free-form label.
    #[serde(default)]
    pub label: String,
    /// Center of mass in world coordinates.
    pub position: Vec2,
    /// Position at the previous step; equal to `position` when unknown.
    #[serde(default)]
    pub position_prev: Option<Vec2>,
    /// Rotation in radians.
    #[serde(default)]
    pub angle: f64,
    /// Whether the body never moves.
    #[serde(default)]
    pub is_static: bool,
    /// Whether the solver put the body to sleep.
    #[serde(default)]
    pub is_sleeping: bool,
    /// Body-level visibility flag.
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Hull part first for compounds, otherwise a single part.
    pub parts: Vec<Part>,
    /// Union of part bounds (derived).
    #[serde(default = "empty_bounds")]
    pub bounds: Bounds,
}

impl Body {
    fn from_parts(id: BodyId, position: Vec2, parts: Vec<Part>) -> Self {
        let mut body = Self {
            id,
            label: String::new(),
            position,
            position_prev: None,
            angle: 0.0,
            is_static: false,
            is_sleeping: false,
            visible: true,
            parts,
            bounds: Bounds::EMPTY,
        };
        body.refresh();
        body
    }

    /// A simple polygon body with outline relative to `position`.
    pub fn polygon(id: BodyId, position: Vec2, local: &[Vec2]) -> Self {
        Self::from_parts(id, position, vec![Part::polygon(id.into(), position, local)])
    }

    /// An axis-aligned rectangle centered on `(x, y)`.
    pub fn rectangle(id: BodyId, x: f64, y: f64, width: f64, height: f64) -> Self {
        let (hw, hh) = (width * 0.5, height * 0.5);
        Self::polygon(
            id,
            Vec2::new(x, y),
            &[
                Vec2::new(-hw, -hh),
                Vec2::new(hw, -hh),
                Vec2::new(hw, hh),
                Vec2::new(-hw, hh),
            ],
        )
    }

    /// A circle centered on `(x, y)`.
    pub fn circle(id: BodyId, x: f64, y: f64, radius: f64) -> Self {
        let position = Vec2::new(x, y);
        Self::from_parts(id, position, vec![Part::circle(id.into(), position, radius)])
    }

    /// A compound body built from convex parts. The hull part is derived and
    /// placed first; the body position is the mean of part positions.
    ///
    /// With zero or one part this degenerates to a simple body.
    pub fn compound(id: BodyId, mut parts: Vec<Part>) -> Self {
        match parts.len() {
            0 => Self::from_parts(id, Vec2::ZERO, Vec::new()),
            1 => {
                let position = parts[0].position;
                parts[0].id = id.into();
                Self::from_parts(id, position, parts)
            }
            n => {
                let sum = parts.iter().fold(Vec2::ZERO, |acc, p| acc + p.position);
                let position = sum * (1.0 / n as f64);
                let cloud: Vec<Vec2> = parts
                    .iter()
                    .flat_map(|p| p.vertices.iter().map(Vertex::point))
                    .collect();
                let hull = convex_hull(&cloud);
                let mut hull_part = Part {
                    id: id.into(),
                    position,
                    angle: 0.0,
                    vertices: hull.into_iter().map(Vertex::at).collect(),
                    circle_radius: None,
                    bounds: Bounds::EMPTY,
                    axes: Vec::new(),
                    style: PartStyle::default(),
                };
                hull_part.refresh();
                let mut all = Vec::with_capacity(n + 1);
                all.push(hull_part);
                all.extend(parts);
                Self::from_parts(id, position, all)
            }
        }
    }

    /// Recompute per-part and body-level derived geometry.
    pub fn refresh(&mut self) {
        for part in &mut self.parts {
            part.refresh();
        }
        self.bounds = self
            .parts
            .iter()
            .fold(Bounds::EMPTY, |acc, p| acc.union(p.bounds));
    }

    /// Whether the body has more than one constituent.
    #[inline]
    pub fn is_compound(&self) -> bool {
        self.parts.len() > 1
    }

    /// Parts that carry their own visual: constituents for compounds, the
    /// single part otherwise.
    pub fn drawable_parts(&self) -> &[Part] {
        if self.is_compound() {
            &self.parts[1..]
        } else {
            &self.parts[..]
        }
    }

    /// The outer hull outline of a compound body.
    pub fn hull(&self) -> Option<&[Vertex]> {
        if self.is_compound() {
            Some(&self.parts[0].vertices)
        } else {
            None
        }
    }

    /// Previous position, falling back to the current one.
    pub fn previous_position(&self) -> Vec2 {
        self.position_prev.unwrap_or(self.position)
    }

    /// Move the body to `position`, remembering the old one as previous.
    pub fn set_position(&mut self, position: Vec2) {
        let delta = position - self.position;
        self.position_prev = Some(self.position);
        self.position = position;
        for part in &mut self.parts {
            part.translate(delta);
        }
        self.bounds = self.bounds.translated(delta);
    }

    /// Rotate the body to `angle` radians about its position.
    pub fn set_angle(&mut self, angle: f64) {
        let delta = angle - self.angle;
        self.angle = angle;
        let pivot = self.position;
        for part in &mut self.parts {
            part.rotate_about(delta, pivot);
        }
        self.bounds = self
            .parts
            .iter()
            .fold(Bounds::EMPTY, |acc, p| acc.union(p.bounds));
    }

    /// Apply a style to every part.
    pub fn with_style(mut self, style: PartStyle) -> Self {
        for part in &mut self.parts {
            part.style = style.clone();
        }
        self
    }

    /// Mark the body static.
    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    /// Set the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectangle_bounds_and_axes() {
        let body = Body::rectangle(BodyId(1), 10.0, 20.0, 4.0, 2.0);
        assert_eq!(body.bounds.min, Vec2::new(8.0, 19.0));
        assert_eq!(body.bounds.max, Vec2::new(12.0, 21.0));
        // Opposite edges share an axis.
        assert_eq!(body.parts[0].axes.len(), 2);
        assert!(!body.is_compound());
        assert_eq!(body.drawable_parts().len(), 1);
        assert!(body.hull().is_none());
    }

    #[test]
    fn circle_carries_radius_and_polygon_outline() {
        let body = Body::circle(BodyId(2), 0.0, 0.0, 30.0);
        let part = &body.parts[0];
        assert_eq!(part.circle_radius, Some(30.0));
        assert_eq!(part.vertices.len(), 25);
        assert!(body.bounds.width() <= 60.0 + 1e-9);
    }

    #[test]
    fn compound_puts_hull_first() {
        let a = Part::polygon(
            PartId(11),
            Vec2::new(0.0, 0.0),
            &[Vec2::new(-1.0, -1.0), Vec2::new(1.0, -1.0), Vec2::new(1.0, 1.0), Vec2::new(-1.0, 1.0)],
        );
        let b = Part::polygon(
            PartId(12),
            Vec2::new(2.0, 0.0),
            &[Vec2::new(-1.0, -1.0), Vec2::new(1.0, -1.0), Vec2::new(1.0, 1.0), Vec2::new(-1.0, 1.0)],
        );
        let body = Body::compound(BodyId(10), vec![a, b]);
        assert!(body.is_compound());
        assert_eq!(body.parts[0].id, PartId(10));
        assert_eq!(body.drawable_parts().len(), 2);
        assert_eq!(body.hull().map(<[Vertex]>::len), Some(4));
        assert_eq!(body.position, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn set_position_tracks_previous() {
        let mut body = Body::rectangle(BodyId(1), 0.0, 0.0, 2.0, 2.0);
        body.set_position(Vec2::new(5.0, 0.0));
        assert_eq!(body.previous_position(), Vec2::new(0.0, 0.0));
        assert_eq!(body.parts[0].vertices[0].point(), Vec2::new(4.0, -1.0));
        assert_eq!(body.bounds.min, Vec2::new(4.0, -1.0));
    }

    #[test]
    fn set_angle_rotates_outline() {
        let mut body = Body::rectangle(BodyId(1), 0.0, 0.0, 2.0, 2.0);
        body.set_angle(std::f64::consts::FRAC_PI_2);
        let v = body.parts[0].vertices[0].point();
        assert!((v.x - 1.0).abs() < 1e-9 && (v.y + 1.0).abs() < 1e-9);
        assert!((body.parts[0].angle - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn sprite_prefers_single_texture() {
        let mut s = Sprite::new("crate.png");
        s.textures = vec!["a.png".into()];
        assert_eq!(s.active_texture(), Some("crate.png"));
        s.texture = None;
        assert_eq!(s.active_texture(), Some("a.png"));
    }
}
