//! The world container handed to the renderer each frame.
//!
//! [`World`] is a read model: the physics side (or a scene loader) fills it,
//! the renderer only borrows it. Body lookups go through an id index so
//! constraint and pair resolution stays O(1) per anchor.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::body::{Body, BodyId};
use crate::constraint::Constraint;
use crate::grid::BroadphaseGrid;
use crate::pair::Pair;
use crate::WorldError;

// ---------------------------------------------------------------------------
// Timing / Metrics
// ---------------------------------------------------------------------------

/// Simulation clock.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timing {
    /// Simulation time in milliseconds.
    pub timestamp: f64,
    /// Duration of the last step in milliseconds.
    #[serde(default)]
    pub delta: f64,
}

/// Engine counters surfaced by the debug overlay.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    /// Measured steps per second.
    #[serde(default)]
    pub fps: f64,
    /// Narrowphase collisions in the last step.
    #[serde(default)]
    pub collisions: usize,
}

// ---------------------------------------------------------------------------
// Scene (serialized form)
// ---------------------------------------------------------------------------

/// Serialized scene description loaded by [`World::from_json`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    /// Bodies in draw order.
    #[serde(default)]
    pub bodies: Vec<Body>,
    /// Constraints in draw order.
    #[serde(default)]
    pub constraints: Vec<Constraint>,
    /// Contact pairs.
    #[serde(default)]
    pub pairs: Vec<Pair>,
    /// Broadphase grid occupancy.
    #[serde(default)]
    pub grid: Option<BroadphaseGrid>,
    /// Simulation clock.
    #[serde(default)]
    pub timing: Timing,
    /// Engine counters.
    #[serde(default)]
    pub metrics: Metrics,
    /// Whether the solver puts bodies to sleep.
    #[serde(default)]
    pub enable_sleeping: bool,
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// Read-only snapshot of a physics world.
#[derive(Debug, Clone, Default)]
pub struct World {
    bodies: Vec<Body>,
    index: HashMap<BodyId, usize>,
    constraints: Vec<Constraint>,
    pairs: Vec<Pair>,
    grid: Option<BroadphaseGrid>,
    removed: Vec<BodyId>,
    /// Simulation clock.
    pub timing: Timing,
    /// Engine counters.
    pub metrics: Metrics,
    /// Whether the solver puts bodies to sleep.
    pub enable_sleeping: bool,
}

impl World {
    /// An empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a world from a scene, validating ids and references.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateBody`] when two bodies share an id and
    /// [`WorldError::UnknownBody`] when a constraint or pair names a body the
    /// scene does not contain.
    pub fn from_scene(scene: Scene) -> Result<Self, WorldError> {
        let mut world = World {
            timing: scene.timing,
            metrics: scene.metrics,
            enable_sleeping: scene.enable_sleeping,
            grid: scene.grid,
            ..World::default()
        };
        for mut body in scene.bodies {
            body.refresh();
            world.insert_body(body)?;
        }
        for constraint in &scene.constraints {
            for id in [constraint.body_a, constraint.body_b].into_iter().flatten() {
                if !world.contains_body(id) {
                    return Err(WorldError::UnknownBody { id, context: "constraint" });
                }
            }
        }
        for pair in &scene.pairs {
            for id in [pair.body_a, pair.body_b] {
                if !world.contains_body(id) {
                    return Err(WorldError::UnknownBody { id, context: "pair" });
                }
            }
        }
        world.constraints = scene.constraints;
        world.pairs = scene.pairs;
        tracing::debug!(
            bodies = world.bodies.len(),
            constraints = world.constraints.len(),
            pairs = world.pairs.len(),
            "world loaded from scene"
        );
        Ok(world)
    }

    /// Parse a JSON scene description.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Scene`] for malformed JSON and the validation
    /// errors of [`World::from_scene`].
    pub fn from_json(json: &str) -> Result<Self, WorldError> {
        let scene: Scene = serde_json::from_str(json)?;
        Self::from_scene(scene)
    }

    /// Add a body at the end of the draw order.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateBody`] if the id is taken.
    pub fn insert_body(&mut self, body: Body) -> Result<(), WorldError> {
        if self.index.contains_key(&body.id) {
            return Err(WorldError::DuplicateBody(body.id));
        }
        self.index.insert(body.id, self.bodies.len());
        self.bodies.push(body);
        Ok(())
    }

    /// Remove a body, queueing a removal notification for
    /// [`World::drain_removed`]. Constraints and pairs touching the body are
    /// dropped too.
    ///
    /// The queue is only emptied by draining it, so hosts that remove bodies
    /// must drain it (directly, or through the renderer's removal sync or
    /// orphan sweep).
    pub fn remove_body(&mut self, id: BodyId) -> Option<Body> {
        let idx = self.index.remove(&id)?;
        let body = self.bodies.remove(idx);
        for (i, b) in self.bodies.iter().enumerate().skip(idx) {
            self.index.insert(b.id, i);
        }
        self.constraints
            .retain(|c| c.body_a != Some(id) && c.body_b != Some(id));
        self.pairs.retain(|p| p.body_a != id && p.body_b != id);
        self.removed.push(id);
        Some(body)
    }

    /// Take the ids removed since the last call.
    pub fn drain_removed(&mut self) -> Vec<BodyId> {
        std::mem::take(&mut self.removed)
    }

    /// All bodies in draw order.
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// Mutable access for the physics side.
    pub fn bodies_mut(&mut self) -> &mut [Body] {
        &mut self.bodies
    }

    /// Look up a body by id.
    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.index.get(&id).and_then(|&i| self.bodies.get(i))
    }

    /// Mutable lookup by id.
    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        let i = *self.index.get(&id)?;
        self.bodies.get_mut(i)
    }

    /// Whether a body with this id exists.
    pub fn contains_body(&self, id: BodyId) -> bool {
        self.index.contains_key(&id)
    }

    /// All constraints.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Add a constraint.
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Active and inactive contact pairs.
    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    /// Replace the pair list (one collision pass worth).
    pub fn set_pairs(&mut self, pairs: Vec<Pair>) {
        self.pairs = pairs;
    }

    /// Broadphase grid, when the engine uses one.
    pub fn grid(&self) -> Option<&BroadphaseGrid> {
        self.grid.as_ref()
    }

    /// Replace the broadphase grid.
    pub fn set_grid(&mut self, grid: Option<BroadphaseGrid>) {
        self.grid = grid;
    }

    /// Remove everything, keeping allocations.
    pub fn clear(&mut self) {
        self.removed.extend(self.bodies.iter().map(|b| b.id));
        self.bodies.clear();
        self.index.clear();
        self.constraints.clear();
        self.pairs.clear();
    }
}
