//! rapier2d snapshot adapter.
//!
//! [`RapierSnapshot`] converts the state of a rapier2d simulation into a
//! [`World`] the renderer can borrow. It is the bridge for applications that
//! simulate with rapier: each frame, call [`RapierSnapshot::capture`] after
//! stepping and hand the result to the renderer.
//!
//! # Mapping
//!
//! | rapier | world model |
//! |--------|-------------|
//! | rigid body | [`Body`] (id packed from the handle) |
//! | ball collider | circular [`Part`] |
//! | cuboid / convex polygon collider | polygonal [`Part`] |
//! | any other shape | rectangle [`Part`] from its AABB |
//! | contact pair with solver contacts | active [`Pair`] |
//! | impulse joint | line [`Constraint`] |
//!
//! A body with several colliders becomes a compound body whose hull is
//! derived from all collider outlines. The hull is computed once per
//! collider set and then carried rigidly with the body, so its vertex order
//! (and with it the first vertex the renderer anchors on) never changes.

use std::collections::HashMap;

use rapier2d::prelude::*;

use crate::body::{Body, BodyId, Part, PartId, Vertex};
use crate::constraint::{Constraint, ConstraintId};
use crate::math::Vec2;
use crate::pair::Pair;
use crate::world::{Timing, World};

/// Collider part ids live in the upper half of the id space so they never
/// collide with body ids.
const COLLIDER_ID_BIT: u64 = 1 << 63;

fn pack(index: u32, generation: u32) -> u64 {
    (generation as u64) << 32 | index as u64
}

fn body_id(handle: RigidBodyHandle) -> BodyId {
    let (index, generation) = handle.into_raw_parts();
    BodyId(pack(index, generation))
}

fn collider_part_id(handle: ColliderHandle) -> PartId {
    let (index, generation) = handle.into_raw_parts();
    PartId(COLLIDER_ID_BIT | pack(index, generation))
}

fn to_vec(p: &Point<Real>) -> Vec2 {
    Vec2::new(p.x as f64, p.y as f64)
}

/// Hull of a compound in body-local coordinates (unrotated, relative to the
/// body position), keyed by the colliders it was built from.
#[derive(Debug)]
struct LocalHull {
    colliders: Vec<ColliderHandle>,
    vertices: Vec<Vec2>,
}

/// Converts rapier state into [`World`] snapshots, remembering the previous
/// position of every body so velocity overlays have something to draw.
#[derive(Debug, Default)]
pub struct RapierSnapshot {
    previous: HashMap<BodyId, Vec2>,
    hulls: HashMap<BodyId, LocalHull>,
}

impl RapierSnapshot {
    /// A snapshotter with no history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a world from the given rapier sets.
    ///
    /// `timestamp_ms` becomes the world's simulation clock.
    pub fn capture(
        &mut self,
        bodies: &RigidBodySet,
        colliders: &ColliderSet,
        narrow_phase: &NarrowPhase,
        joints: &ImpulseJointSet,
        timestamp_ms: f64,
    ) -> World {
        let mut world = World::new();
        world.enable_sleeping = true;
        world.timing = Timing {
            timestamp: timestamp_ms,
            delta: 0.0,
        };

        let mut collider_owner: HashMap<ColliderHandle, BodyId> = HashMap::new();

        for (handle, rb) in bodies.iter() {
            let id = body_id(handle);
            let parts: Vec<Part> = rb
                .colliders()
                .iter()
                .filter_map(|&ch| {
                    let collider = colliders.get(ch)?;
                    collider_owner.insert(ch, id);
                    Some(part_from_collider(ch, collider))
                })
                .collect();
            if parts.is_empty() {
                continue;
            }

            let mut body = Body::compound(id, parts);
            body.position = Vec2::new(rb.translation().x as f64, rb.translation().y as f64);
            body.angle = rb.rotation().angle() as f64;
            body.is_static = rb.is_fixed();
            body.is_sleeping = rb.is_sleeping();
            body.position_prev = Some(
                self.previous
                    .get(&id)
                    .copied()
                    .unwrap_or(body.position),
            );
            self.previous.insert(id, body.position);
            if body.is_compound() {
                self.rigid_hull(rb.colliders(), &mut body);
            }

            if let Err(e) = world.insert_body(body) {
                tracing::warn!(error = %e, "skipping rapier body");
            }
        }

        self.previous.retain(|id, _| world.contains_body(*id));
        self.hulls.retain(|id, _| world.contains_body(*id));

        let mut pairs = Vec::new();
        let mut collisions = 0;
        for contact in narrow_phase.contact_pairs() {
            let (Some(&a), Some(&b)) = (
                collider_owner.get(&contact.collider1),
                collider_owner.get(&contact.collider2),
            ) else {
                continue;
            };
            let mut points = Vec::new();
            let mut normal = Vec2::ZERO;
            let mut depth: f64 = 0.0;
            for manifold in &contact.manifolds {
                if manifold.data.solver_contacts.is_empty() {
                    continue;
                }
                normal = Vec2::new(manifold.data.normal.x as f64, manifold.data.normal.y as f64);
                for sc in &manifold.data.solver_contacts {
                    points.push(to_vec(&sc.point));
                    depth = depth.max(-(sc.dist as f64));
                }
            }
            if points.is_empty() {
                continue;
            }
            collisions += 1;
            points.truncate(2);
            pairs.push(Pair::touching(a, b, points, normal, depth));
        }
        world.set_pairs(pairs);
        world.metrics.collisions = collisions;

        for (handle, joint) in joints.iter() {
            let (index, generation) = handle.into_raw_parts();
            let a = body_id(joint.body1);
            let b = body_id(joint.body2);
            let anchor = |body: RigidBodyHandle, local: Point<Real>| {
                bodies.get(body).map(|rb| {
                    let v = rb.rotation() * local.coords;
                    Vec2::new(v.x as f64, v.y as f64)
                })
            };
            let point_a = anchor(joint.body1, joint.data.local_anchor1());
            let point_b = anchor(joint.body2, joint.data.local_anchor2());
            let length = match (world.body(a), world.body(b), point_a, point_b) {
                (Some(ba), Some(bb), Some(pa), Some(pb)) => {
                    ((bb.position + pb) - (ba.position + pa)).length()
                }
                _ => 0.0,
            };
            let mut constraint =
                Constraint::between(ConstraintId(pack(index, generation)), a, b, length);
            constraint.point_a = point_a;
            constraint.point_b = point_b;
            world.add_constraint(constraint);
        }

        world
    }
}

impl RapierSnapshot {
    /// Replace a compound's freshly sorted hull with the hull cached for its
    /// collider set, moved to the body's current pose. The first capture of
    /// a collider set caches the hull instead.
    fn rigid_hull(&mut self, colliders: &[ColliderHandle], body: &mut Body) {
        let (position, angle) = (body.position, body.angle);
        if let Some(hull) = self.hulls.get(&body.id).filter(|h| h.colliders == colliders) {
            body.parts[0].vertices = hull
                .vertices
                .iter()
                .map(|&v| Vertex::at(position + v.rotate(angle)))
                .collect();
            body.refresh();
            return;
        }
        let vertices = body.parts[0]
            .vertices
            .iter()
            .map(|v| (v.point() - position).rotate(-angle))
            .collect();
        self.hulls.insert(
            body.id,
            LocalHull {
                colliders: colliders.to_vec(),
                vertices,
            },
        );
    }
}

/// Convert one collider into a part in world coordinates.
fn part_from_collider(handle: ColliderHandle, collider: &Collider) -> Part {
    let id = collider_part_id(handle);
    let iso = collider.position();
    let center = Vec2::new(iso.translation.vector.x as f64, iso.translation.vector.y as f64);
    let angle = iso.rotation.angle() as f64;
    let shape = collider.shape();

    let mut part = if let Some(ball) = shape.as_ball() {
        Part::circle(id, center, ball.radius as f64)
    } else if let Some(cuboid) = shape.as_cuboid() {
        let (hx, hy) = (cuboid.half_extents.x, cuboid.half_extents.y);
        let local: Vec<Vec2> = [(-hx, -hy), (hx, -hy), (hx, hy), (-hx, hy)]
            .iter()
            .map(|&(x, y)| to_vec(&(iso * point![x, y])) - center)
            .collect();
        Part::polygon(id, center, &local)
    } else if let Some(poly) = shape.as_convex_polygon() {
        let local: Vec<Vec2> = poly
            .points()
            .iter()
            .map(|p| to_vec(&(iso * p)) - center)
            .collect();
        Part::polygon(id, center, &local)
    } else {
        let aabb = collider.compute_aabb();
        let (min, max) = (to_vec(&aabb.mins), to_vec(&aabb.maxs));
        let local = [
            Vec2::new(min.x, min.y) - center,
            Vec2::new(max.x, min.y) - center,
            Vec2::new(max.x, max.y) - center,
            Vec2::new(min.x, max.y) - center,
        ];
        Part::polygon(id, center, &local)
    };
    part.angle = angle;
    part
}
