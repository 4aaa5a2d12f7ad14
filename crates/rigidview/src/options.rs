//! Render options: the flat configuration surface.
//!
//! Options are read from JSON (or built in code) with camelCase keys. Every
//! key is optional and unknown keys are ignored, so option files written for
//! other renderer versions still load.
//!
//! ```
//! use rigidview::options::RenderOptions;
//!
//! let opts = RenderOptions::from_json(r#"{ "wireframes": false, "showVelocity": true, "extra": 1 }"#).unwrap();
//! assert!(!opts.wireframes);
//! assert!(opts.show_velocity);
//! assert_eq!(opts.width, 800.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::background::BackgroundDesc;
use crate::error::RenderError;

/// Immutable-per-frame configuration snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderOptions {
    /// Logical canvas width.
    pub width: f64,
    /// Logical canvas height.
    pub height: f64,
    /// Device pixel ratio applied to every transform.
    pub pixel_ratio: f64,
    /// Backdrop in shaded mode.
    pub background: BackgroundDesc,
    /// Backdrop in wireframe mode.
    pub wireframe_background: BackgroundDesc,
    /// Draw only entities intersecting the view bounds.
    pub has_bounds: bool,
    /// Outline-only rendering.
    pub wireframes: bool,
    /// Fade sleeping bodies.
    pub show_sleeping: bool,
    /// Debug text (fps and counters).
    pub show_debug: bool,
    /// Broadphase grid cells.
    pub show_broadphase: bool,
    /// Part bounding boxes.
    pub show_bounds: bool,
    /// Velocity vectors.
    pub show_velocity: bool,
    /// Contact points and normals.
    pub show_collisions: bool,
    /// Separation (penetration) vectors.
    pub show_separations: bool,
    /// Edge normal axes.
    pub show_axes: bool,
    /// Current and previous positions.
    pub show_positions: bool,
    /// Angle indicator from center to first edge.
    pub show_angle_indicator: bool,
    /// Part ids.
    pub show_ids: bool,
    /// Vertex indices.
    pub show_vertex_numbers: bool,
    /// Outer hull outline of compound bodies (wireframe mode).
    pub show_convex_hulls: bool,
    /// Draw edges flagged internal.
    pub show_internal_edges: bool,
    /// Pointer coordinates.
    pub show_mouse_position: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            pixel_ratio: 1.0,
            background: BackgroundDesc::default(),
            wireframe_background: BackgroundDesc::default(),
            has_bounds: false,
            wireframes: true,
            show_sleeping: true,
            show_debug: false,
            show_broadphase: false,
            show_bounds: false,
            show_velocity: false,
            show_collisions: false,
            show_separations: false,
            show_axes: false,
            show_positions: false,
            show_angle_indicator: false,
            show_ids: false,
            show_vertex_numbers: false,
            show_convex_hulls: false,
            show_internal_edges: false,
            show_mouse_position: false,
        }
    }
}

impl RenderOptions {
    /// Parse options from JSON. Missing keys take their defaults and
    /// unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Options`] when the JSON is malformed or a known
    /// key has the wrong type.
    pub fn from_json(json: &str) -> Result<Self, RenderError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The backdrop for the current mode.
    pub fn active_background(&self) -> &BackgroundDesc {
        if self.wireframes {
            &self.wireframe_background
        } else {
            &self.background
        }
    }
}
