//! Rigidview World -- read model of a 2D rigid-body simulation.
//!
//! This crate describes the physics world as the renderer sees it: bodies
//! made of convex parts with render descriptors, constraints, contact pairs,
//! broadphase grid occupancy, and simulation timing. It performs no
//! simulation; a physics engine (or a scene file) fills a [`World`] and the
//! renderer borrows it once per frame.
//!
//! # Quick Start
//!
//! ```
//! use rigidview_world::prelude::*;
//!
//! let mut world = World::new();
//! world.insert_body(Body::rectangle(BodyId(1), 400.0, 580.0, 800.0, 40.0).with_static(true)).unwrap();
//! world.insert_body(Body::circle(BodyId(2), 400.0, 100.0, 20.0)).unwrap();
//!
//! assert_eq!(world.bodies().len(), 2);
//! assert!(world.body(BodyId(2)).unwrap().parts[0].circle_radius.is_some());
//! ```

#![deny(unsafe_code)]

pub mod body;
pub mod color;
pub mod constraint;
pub mod grid;
pub mod math;
pub mod pair;
#[cfg(feature = "rapier")]
pub mod rapier;
pub mod world;

pub use world::World;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced while building a world.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// Two bodies share an id.
    #[error("body id {0} is already present in the world")]
    DuplicateBody(body::BodyId),

    /// A constraint or pair references a body that does not exist.
    #[error("{context} references unknown body {id}")]
    UnknownBody {
        id: body::BodyId,
        context: &'static str,
    },

    /// The scene description could not be parsed.
    #[error("failed to parse scene: {0}")]
    Scene(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports.
pub mod prelude {
    pub use crate::body::{Body, BodyId, Part, PartId, PartStyle, Sprite, Vertex};
    pub use crate::color::Color;
    pub use crate::constraint::{Constraint, ConstraintId, ConstraintKind, ConstraintStyle};
    pub use crate::grid::{BroadphaseGrid, Bucket};
    pub use crate::math::{Bounds, Vec2};
    pub use crate::pair::{Pair, ReferenceBody};
    pub use crate::world::{Metrics, Scene, Timing, World};
    pub use crate::WorldError;
}
