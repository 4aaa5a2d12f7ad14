//! Constraints between bodies (or between a body and a fixed point).

use serde::{Deserialize, Serialize};

use crate::body::BodyId;
use crate::color::Color;
use crate::math::Vec2;

/// Stable identity of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConstraintId(pub u64);

/// How a constraint is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintKind {
    /// Straight segment between the anchors.
    #[default]
    Line,
    /// A single point marker at the first anchor.
    Pin,
    /// Zig-zag coil between the anchors.
    Spring,
}

fn default_true() -> bool {
    true
}

fn default_line_width() -> f64 {
    2.0
}

fn default_stroke() -> Color {
    Color::rgb(255, 255, 255)
}

/// Render descriptor for a constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintStyle {
    /// Whether the constraint is drawn.
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Line, pin or spring.
    #[serde(default, rename = "type")]
    pub kind: ConstraintKind,
    /// Whether to mark both anchors with small discs.
    #[serde(default = "default_true")]
    pub anchors: bool,
    /// Stroke width; zero suppresses the line.
    #[serde(default = "default_line_width")]
    pub line_width: f64,
    /// Stroke color, also used for anchor markers.
    #[serde(default = "default_stroke")]
    pub stroke: Color,
}

impl Default for ConstraintStyle {
    fn default() -> Self {
        Self {
            visible: true,
            kind: ConstraintKind::Line,
            anchors: true,
            line_width: default_line_width(),
            stroke: default_stroke(),
        }
    }
}

/// A constraint joining two anchors.
///
/// Each anchor is an offset from its owning body's position, or an absolute
/// world point when the constraint has no body on that side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraint {
    /// Stable identity.
    pub id: ConstraintId,
    /// Owner of the first anchor.
    #[serde(default)]
    pub body_a: Option<BodyId>,
    /// Owner of the second anchor.
    #[serde(default)]
    pub body_b: Option<BodyId>,
    /// First anchor (body-relative when `body_a` is set).
    #[serde(default)]
    pub point_a: Option<Vec2>,
    /// Second anchor (body-relative when `body_b` is set).
    #[serde(default)]
    pub point_b: Option<Vec2>,
    /// Rest length.
    #[serde(default)]
    pub length: f64,
    /// Render descriptor.
    #[serde(default)]
    pub style: ConstraintStyle,
}

impl Constraint {
    /// A line constraint between two bodies anchored at their centers.
    pub fn between(id: ConstraintId, a: BodyId, b: BodyId, length: f64) -> Self {
        Self {
            id,
            body_a: Some(a),
            body_b: Some(b),
            point_a: Some(Vec2::ZERO),
            point_b: Some(Vec2::ZERO),
            length,
            style: ConstraintStyle::default(),
        }
    }

    /// A constraint from a fixed world point to a body's center.
    pub fn pinned(id: ConstraintId, point: Vec2, body: BodyId, length: f64) -> Self {
        Self {
            id,
            body_a: None,
            body_b: Some(body),
            point_a: Some(point),
            point_b: Some(Vec2::ZERO),
            length,
            style: ConstraintStyle::default(),
        }
    }

    /// Change the draw kind.
    pub fn with_kind(mut self, kind: ConstraintKind) -> Self {
        self.style.kind = kind;
        self
    }
}
