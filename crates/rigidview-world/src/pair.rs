//! Contact pairs produced by the collision pipeline.

use serde::{Deserialize, Serialize};

use crate::body::BodyId;
use crate::math::Vec2;

/// Which body of a pair the contact normal is expressed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceBody {
    /// Support points were found on body A.
    #[default]
    A,
    /// Support points were found on body B.
    B,
}

/// A detected (potential) collision between two bodies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pair {
    /// First body.
    pub body_a: BodyId,
    /// Second body.
    pub body_b: BodyId,
    /// Whether the pair is currently touching.
    #[serde(default)]
    pub is_active: bool,
    /// Active contact points in world coordinates.
    #[serde(default)]
    pub contacts: Vec<Vec2>,
    /// Unit collision normal.
    #[serde(default)]
    pub normal: Vec2,
    /// Penetration vector (normal scaled by depth).
    #[serde(default)]
    pub penetration: Vec2,
    /// Body the support points belong to.
    #[serde(default)]
    pub reference: ReferenceBody,
}

impl Pair {
    /// An active pair with the given contact geometry.
    pub fn touching(body_a: BodyId, body_b: BodyId, contacts: Vec<Vec2>, normal: Vec2, depth: f64) -> Self {
        Self {
            body_a,
            body_b,
            is_active: true,
            contacts,
            normal,
            penetration: normal * depth,
            reference: ReferenceBody::A,
        }
    }
}
