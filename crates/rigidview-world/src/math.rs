//! Plane vectors and axis-aligned bounds.
//!
//! Everything in the world model is expressed in world units with `f64`
//! precision. [`Bounds`] is the axis-aligned box used both for per-part
//! culling bounds and for the renderer's view window.

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Vec2
// ---------------------------------------------------------------------------

/// A 2D vector or point in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Vec2 {
    /// The origin.
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    /// Construct a vector from its components.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length.
    #[inline]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Unit vector in the same direction, or zero for a zero vector.
    pub fn normalise(self) -> Self {
        let len = self.length();
        if len == 0.0 {
            return Vec2::ZERO;
        }
        Vec2::new(self.x / len, self.y / len)
    }

    /// The vector rotated a quarter turn: `(-y, x)`.
    #[inline]
    pub fn perp(self) -> Self {
        Vec2::new(-self.y, self.x)
    }

    /// Rotate about the origin by `angle` radians.
    pub fn rotate(self, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Vec2::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    /// Midpoint between `self` and `other`.
    #[inline]
    pub fn midpoint(self, other: Vec2) -> Self {
        Vec2::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }

    /// Whether both components are finite.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

// ---------------------------------------------------------------------------
// Bounds
// ---------------------------------------------------------------------------

/// An axis-aligned rectangle `{min, max}` in world coordinates.
///
/// A well-formed box has `max.x >= min.x` and `max.y >= min.y`.
/// [`Bounds::EMPTY`] is the identity for [`Bounds::union`] and is the only
/// value that deliberately violates the ordering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Minimum corner.
    pub min: Vec2,
    /// Maximum corner.
    pub max: Vec2,
}

impl Bounds {
    /// Inverted infinite box; growing it by any point yields that point.
    pub const EMPTY: Bounds = Bounds {
        min: Vec2 {
            x: f64::INFINITY,
            y: f64::INFINITY,
        },
        max: Vec2 {
            x: f64::NEG_INFINITY,
            y: f64::NEG_INFINITY,
        },
    };

    /// Construct from corners.
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Construct from a corner and a size.
    pub fn from_origin_size(origin: Vec2, width: f64, height: f64) -> Self {
        Self::new(origin, Vec2::new(origin.x + width, origin.y + height))
    }

    /// Smallest box containing every point, or [`Bounds::EMPTY`] for none.
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Vec2>,
    {
        points.into_iter().fold(Bounds::EMPTY, |mut b, p| {
            b.include(p);
            b
        })
    }

    /// Grow the box to contain `p`.
    pub fn include(&mut self, p: Vec2) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    /// Smallest box containing both.
    pub fn union(self, other: Bounds) -> Self {
        let mut out = self;
        out.include(other.min);
        out.include(other.max);
        out
    }

    /// Whether no point has been included yet.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Horizontal extent.
    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Vertical extent.
    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Center point.
    #[inline]
    pub fn center(&self) -> Vec2 {
        self.min.midpoint(self.max)
    }

    /// Whether the two boxes overlap (touching edges count).
    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.max.y >= other.min.y
            && self.min.y <= other.max.y
    }

    /// Whether `p` lies inside the box (edges inclusive).
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// The box moved by `delta`.
    pub fn translated(self, delta: Vec2) -> Self {
        Self::new(self.min + delta, self.max + delta)
    }
}

impl Default for Bounds {
    /// The 800x600 window anchored at the origin.
    fn default() -> Self {
        Bounds::new(Vec2::ZERO, Vec2::new(800.0, 600.0))
    }
}
