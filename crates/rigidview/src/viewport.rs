//! Viewport and bounds management.
//!
//! The view window is a world-space rectangle held by
//! [`RenderState`](crate::state::RenderState). This module is the only code
//! that changes it. It also computes the surface transform that maps the
//! window onto the canvas and keeps the pointer mapping calibrated to it.
//!
//! # Fitting
//!
//! [`fit_to_objects`] takes a heterogeneous list of [`FitTarget`]s, grows
//! their union box by `padding`, widens one axis so the box matches the
//! canvas aspect ratio, optionally re-centers, and switches the renderer into
//! bounds-clipped mode.

use rigidview_world::body::{Body, Part};
use rigidview_world::math::{Bounds, Vec2};

use crate::state::RenderState;
use crate::surface::{Surface, Transform};

// ---------------------------------------------------------------------------
// FitTarget
// ---------------------------------------------------------------------------

/// Something the view can be fitted around.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FitTarget {
    /// An object with explicit bounds.
    Bounds(Bounds),
    /// An object exposing separate min and max corners.
    MinMax {
        /// Minimum corner.
        min: Vec2,
        /// Maximum corner.
        max: Vec2,
    },
    /// An object known only by its position.
    Position(Vec2),
    /// A bare point.
    Point(Vec2),
}

impl FitTarget {
    /// Pick a variant from whatever an object offers, in priority order:
    /// explicit bounds, then min/max, then position, then a raw point.
    pub fn resolve(
        bounds: Option<Bounds>,
        min_max: Option<(Vec2, Vec2)>,
        position: Option<Vec2>,
        point: Option<Vec2>,
    ) -> Option<Self> {
        bounds
            .map(FitTarget::Bounds)
            .or_else(|| min_max.map(|(min, max)| FitTarget::MinMax { min, max }))
            .or_else(|| position.map(FitTarget::Position))
            .or_else(|| point.map(FitTarget::Point))
    }

    /// The `(min, max)` corners this target contributes.
    pub fn extent(&self) -> (Vec2, Vec2) {
        match *self {
            FitTarget::Bounds(b) => (b.min, b.max),
            FitTarget::MinMax { min, max } => (min, max),
            FitTarget::Position(p) | FitTarget::Point(p) => (p, p),
        }
    }
}

impl From<&Body> for FitTarget {
    fn from(body: &Body) -> Self {
        FitTarget::resolve(
            (!body.bounds.is_empty()).then_some(body.bounds),
            None,
            Some(body.position),
            None,
        )
        .unwrap_or(FitTarget::Position(body.position))
    }
}

impl From<&Part> for FitTarget {
    fn from(part: &Part) -> Self {
        if part.bounds.is_empty() {
            FitTarget::Position(part.position)
        } else {
            FitTarget::Bounds(part.bounds)
        }
    }
}

impl From<Bounds> for FitTarget {
    fn from(b: Bounds) -> Self {
        FitTarget::Bounds(b)
    }
}

impl From<Vec2> for FitTarget {
    fn from(p: Vec2) -> Self {
        FitTarget::Point(p)
    }
}

// ---------------------------------------------------------------------------
// PointerMapping
// ---------------------------------------------------------------------------

/// Maps pointer coordinates on the canvas into world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerMapping {
    /// World units per canvas unit.
    pub scale: Vec2,
    /// World position of the canvas origin.
    pub offset: Vec2,
    /// Last pointer position on the canvas.
    pub absolute: Vec2,
}

impl Default for PointerMapping {
    fn default() -> Self {
        Self {
            scale: Vec2::new(1.0, 1.0),
            offset: Vec2::ZERO,
            absolute: Vec2::ZERO,
        }
    }
}

impl PointerMapping {
    /// The pointer in world coordinates.
    pub fn position(&self) -> Vec2 {
        Vec2::new(
            self.absolute.x * self.scale.x + self.offset.x,
            self.absolute.y * self.scale.y + self.offset.y,
        )
    }

    /// Recalibrate to a view window on a canvas of the given size.
    pub fn calibrate(&mut self, bounds: &Bounds, width: f64, height: f64) {
        self.scale = Vec2::new(bounds.width() / width, bounds.height() / height);
        self.offset = bounds.min;
    }
}

// ---------------------------------------------------------------------------
// Fitting and view changes
// ---------------------------------------------------------------------------

/// Fit the view window around `targets`.
///
/// Returns the new bounds. An empty target list leaves the view unchanged.
/// A target set with no extent on an axis takes that axis from the other
/// one through the canvas aspect ratio; a single point keeps the current
/// window size and centers on the point.
pub fn fit_to_objects<I>(state: &mut RenderState, targets: I, padding: Vec2, center: bool) -> Bounds
where
    I: IntoIterator,
    I::Item: Into<FitTarget>,
{
    let mut union = Bounds::EMPTY;
    // Targets contribute corners, not boxes, so a lone point still counts.
    for target in targets {
        let (min, max) = target.into().extent();
        union.include(min);
        union.include(max);
    }
    if union.is_empty() || !union.min.is_finite() || !union.max.is_finite() {
        tracing::debug!("fit_to_objects: nothing to fit");
        return state.bounds;
    }

    let view_width = state.options.width;
    let view_height = state.options.height;
    let outer_ratio = view_width / view_height;

    let mut min = union.min;
    let mut width = union.width() + 2.0 * padding.x;
    let mut height = union.height() + 2.0 * padding.y;
    // Axes with no extent are sized from the canvas and centered on the
    // targets.
    if width <= 0.0 && height <= 0.0 {
        width = state.bounds.width();
        height = state.bounds.height();
        min = min - Vec2::new(width * 0.5, height * 0.5);
    } else if height <= 0.0 {
        height = width / outer_ratio;
        min.y -= height * 0.5;
    } else if width <= 0.0 {
        width = height * outer_ratio;
        min.x -= width * 0.5;
    }

    let inner_ratio = width / height;
    let (mut scale_x, mut scale_y) = (1.0, 1.0);
    if inner_ratio > outer_ratio {
        scale_y = inner_ratio / outer_ratio;
    } else {
        scale_x = outer_ratio / inner_ratio;
    }

    let mut bounds = Bounds::new(
        min,
        Vec2::new(min.x + width * scale_x, min.y + height * scale_y),
    );

    if center {
        bounds = bounds.translated(Vec2::new(
            width * 0.5 - width * scale_x * 0.5,
            height * 0.5 - height * scale_y * 0.5,
        ));
    }

    bounds = bounds.translated(-padding);

    set_view_bounds(state, bounds);
    bounds
}

/// Replace the view window and switch to bounds-clipped rendering.
///
/// Corners are reordered if needed so `max >= min` holds.
pub fn set_view_bounds(state: &mut RenderState, bounds: Bounds) {
    let normalized = Bounds::new(
        Vec2::new(bounds.min.x.min(bounds.max.x), bounds.min.y.min(bounds.max.y)),
        Vec2::new(bounds.min.x.max(bounds.max.x), bounds.min.y.max(bounds.max.y)),
    );
    state.bounds = normalized;
    if !state.options.has_bounds {
        std::sync::Arc::make_mut(&mut state.options).has_bounds = true;
    }
    refresh_pointer(state);
    tracing::debug!(
        min_x = normalized.min.x,
        min_y = normalized.min.y,
        max_x = normalized.max.x,
        max_y = normalized.max.y,
        "view bounds updated"
    );
}

/// Scroll the view window by `delta` world units.
pub fn pan(state: &mut RenderState, delta: Vec2) {
    let bounds = state.bounds.translated(delta);
    set_view_bounds(state, bounds);
}

/// Scale the view window by `factor` about `anchor`. Factors above one zoom
/// out. Non-positive or non-finite factors are ignored.
pub fn zoom(state: &mut RenderState, factor: f64, anchor: Vec2) {
    if !(factor.is_finite() && factor > 0.0) {
        return;
    }
    let b = state.bounds;
    let bounds = Bounds::new(
        anchor + (b.min - anchor) * factor,
        anchor + (b.max - anchor) * factor,
    );
    set_view_bounds(state, bounds);
}

/// Recalibrate the pointer mapping (if any) to the current bounds.
pub fn refresh_pointer(state: &mut RenderState) {
    let (width, height) = (state.options.width, state.options.height);
    let bounds = state.bounds;
    if let Some(pointer) = state.pointer.as_mut() {
        pointer.calibrate(&bounds, width, height);
    }
}

// ---------------------------------------------------------------------------
// View transform
// ---------------------------------------------------------------------------

/// The transform mapping the view window onto the canvas, including the
/// device pixel ratio.
pub fn view_transform(state: &RenderState) -> Transform {
    let opts = &state.options;
    let bounds_scale_x = state.bounds.width() / opts.width;
    let bounds_scale_y = state.bounds.height() / opts.height;
    let sx = opts.pixel_ratio / bounds_scale_x;
    let sy = opts.pixel_ratio / bounds_scale_y;
    Transform {
        scale: Vec2::new(sx, sy),
        translate: Vec2::new(-state.bounds.min.x * sx, -state.bounds.min.y * sy),
    }
}

/// Push the view transform to the surface.
pub fn begin_view_transform(state: &mut RenderState, surface: &mut dyn Surface) {
    surface.set_transform(view_transform(state));
    state.transform_active = true;
}

/// Reset the surface to the plain pixel-ratio transform. Safe to call when
/// no view transform is active.
pub fn end_view_transform(state: &mut RenderState, surface: &mut dyn Surface) {
    if !state.transform_active {
        return;
    }
    surface.set_transform(Transform::uniform(state.options.pixel_ratio));
    state.transform_active = false;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Canvas, RenderState};

    fn state() -> RenderState {
        RenderState::builder()
            .target(Canvas::new(800.0, 600.0))
            .build()
            .unwrap()
    }

    #[test]
    fn resolve_prefers_bounds() {
        let b = Bounds::new(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0));
        let p = Vec2::new(5.0, 5.0);
        assert_eq!(
            FitTarget::resolve(Some(b), Some((p, p)), Some(p), Some(p)),
            Some(FitTarget::Bounds(b))
        );
        assert_eq!(
            FitTarget::resolve(None, Some((p, p)), Some(Vec2::ZERO), None),
            Some(FitTarget::MinMax { min: p, max: p })
        );
        assert_eq!(
            FitTarget::resolve(None, None, Some(p), Some(Vec2::ZERO)),
            Some(FitTarget::Position(p))
        );
        assert_eq!(FitTarget::resolve(None, None, None, None), None);
    }

    #[test]
    fn fit_preserves_aspect_and_center() {
        let mut s = state();
        let a = Bounds::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
        let b = Bounds::new(Vec2::new(90.0, 90.0), Vec2::new(100.0, 100.0));
        let out = fit_to_objects(&mut s, [a, b], Vec2::ZERO, true);
        assert!((out.width() / out.height() - 800.0 / 600.0).abs() < 1e-9);
        assert!((out.center().x - 50.0).abs() < 1e-9);
        assert!((out.center().y - 50.0).abs() < 1e-9);
        assert!(s.options().has_bounds);
    }

    #[test]
    fn fit_without_centering_anchors_min_corner() {
        let mut s = state();
        let out = fit_to_objects(
            &mut s,
            [Bounds::new(Vec2::new(0.0, 0.0), Vec2::new(100.0, 100.0))],
            Vec2::new(10.0, 10.0),
            false,
        );
        assert!((out.min.x + 10.0).abs() < 1e-9);
        assert!((out.min.y + 10.0).abs() < 1e-9);
        assert!((out.height() - 120.0).abs() < 1e-9);
        assert!((out.width() - 160.0).abs() < 1e-9);
    }

    #[test]
    fn fit_single_point_centers_current_window() {
        let mut s = state();
        let out = fit_to_objects(&mut s, [Vec2::new(1000.0, 1000.0)], Vec2::ZERO, true);
        assert!((out.center().x - 1000.0).abs() < 1e-9);
        assert!((out.center().y - 1000.0).abs() < 1e-9);
        assert!((out.width() - 800.0).abs() < 1e-9);
    }

    #[test]
    fn empty_fit_is_a_no_op() {
        let mut s = state();
        let before = s.bounds();
        let out = fit_to_objects(&mut s, Vec::<FitTarget>::new(), Vec2::ZERO, true);
        assert_eq!(out, before);
        assert!(!s.options().has_bounds);
    }

    #[test]
    fn view_transform_maps_window_to_canvas() {
        let mut s = state();
        set_view_bounds(
            &mut s,
            Bounds::new(Vec2::new(100.0, 50.0), Vec2::new(500.0, 350.0)),
        );
        let t = view_transform(&s);
        assert_eq!(t.apply(Vec2::new(100.0, 50.0)), Vec2::new(0.0, 0.0));
        assert_eq!(t.apply(Vec2::new(500.0, 350.0)), Vec2::new(800.0, 600.0));
    }

    #[test]
    fn zoom_about_center_keeps_center() {
        let mut s = state();
        zoom(&mut s, 2.0, Vec2::new(400.0, 300.0));
        let b = s.bounds();
        assert_eq!(b.min, Vec2::new(-400.0, -300.0));
        assert_eq!(b.max, Vec2::new(1200.0, 900.0));
        zoom(&mut s, f64::NAN, Vec2::ZERO);
        assert_eq!(s.bounds(), b);
    }
}
