//! Vector path descriptors shared by retained nodes and overlay commands.

use rigidview_world::math::{Bounds, Vec2};

/// One path instruction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    /// Start a new subpath.
    MoveTo(Vec2),
    /// Straight edge to a point.
    LineTo(Vec2),
    /// Full circle.
    Circle { center: Vec2, radius: f64 },
    /// Axis-aligned rectangle.
    Rect { origin: Vec2, width: f64, height: f64 },
    /// Close the current subpath.
    Close,
}

/// An ordered list of path segments.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    /// An empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty path with room for `n` segments.
    pub fn with_capacity(n: usize) -> Self {
        Self {
            segments: Vec::with_capacity(n),
        }
    }

    /// Start a subpath.
    pub fn move_to(&mut self, p: Vec2) -> &mut Self {
        self.segments.push(Segment::MoveTo(p));
        self
    }

    /// Add an edge.
    pub fn line_to(&mut self, p: Vec2) -> &mut Self {
        self.segments.push(Segment::LineTo(p));
        self
    }

    /// Add a circle.
    pub fn circle(&mut self, center: Vec2, radius: f64) -> &mut Self {
        self.segments.push(Segment::Circle { center, radius });
        self
    }

    /// Add a rectangle.
    pub fn rect(&mut self, origin: Vec2, width: f64, height: f64) -> &mut Self {
        self.segments.push(Segment::Rect {
            origin,
            width,
            height,
        });
        self
    }

    /// Close the current subpath.
    pub fn close(&mut self) -> &mut Self {
        self.segments.push(Segment::Close);
        self
    }

    /// The segments in order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether the path has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether every coordinate is finite.
    pub fn is_finite(&self) -> bool {
        self.segments.iter().all(|s| match *s {
            Segment::MoveTo(p) | Segment::LineTo(p) => p.is_finite(),
            Segment::Circle { center, radius } => center.is_finite() && radius.is_finite(),
            Segment::Rect {
                origin,
                width,
                height,
            } => origin.is_finite() && width.is_finite() && height.is_finite(),
            Segment::Close => true,
        })
    }

    /// Bounding box of all segment geometry.
    pub fn bounds(&self) -> Bounds {
        let mut b = Bounds::EMPTY;
        for s in &self.segments {
            match *s {
                Segment::MoveTo(p) | Segment::LineTo(p) => b.include(p),
                Segment::Circle { center, radius } => {
                    b.include(center - Vec2::new(radius, radius));
                    b.include(center + Vec2::new(radius, radius));
                }
                Segment::Rect {
                    origin,
                    width,
                    height,
                } => {
                    b.include(origin);
                    b.include(origin + Vec2::new(width, height));
                }
                Segment::Close => {}
            }
        }
        b
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_cover_circles_and_rects() {
        let mut path = Path::new();
        path.circle(Vec2::new(0.0, 0.0), 2.0)
            .rect(Vec2::new(5.0, 5.0), 3.0, 1.0);
        let b = path.bounds();
        assert_eq!(b.min, Vec2::new(-2.0, -2.0));
        assert_eq!(b.max, Vec2::new(8.0, 6.0));
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn nan_coordinates_are_not_finite() {
        let mut path = Path::new();
        path.move_to(Vec2::ZERO).line_to(Vec2::new(1.0, 1.0)).close();
        assert!(path.is_finite());
        path.line_to(Vec2::new(f64::NAN, 0.0));
        assert!(!path.is_finite());
        assert!(Path::new().bounds().is_empty());
    }
}
