//! Retained-node cache.
//!
//! Maps each visual (a part, or the hull of a compound body) to the surface
//! node that draws it. Nodes are created lazily the first time a visual is
//! drawn and afterwards receive only pose, opacity and visibility updates.
//!
//! Lifetime rules:
//!
//! - a visual outside the view bounds keeps its node but is hidden;
//! - a visual whose part turned invisible loses its node;
//! - a visual whose drawing mode changed gets a fresh node;
//! - a removed body loses all its nodes, either through
//!   [`NodeCache::release_body`] or the [`NodeCache::reclaim_orphans`] sweep.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use rigidview_world::body::{BodyId, PartId};
use rigidview_world::math::Vec2;
use rigidview_world::World;

use crate::error::SurfaceError;
use crate::surface::{NodeId, NodeSpec, Pose, Surface};
use crate::synth::DrawMode;

/// Opacity multiplier for sleeping bodies.
pub const SLEEP_FADE: f64 = 0.5;

/// Round to one decimal place.
#[inline]
pub fn quantize(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// The pose pushed to the surface for an entity at `position` rotated by
/// `angle` radians: position rounded to one decimal, rotation converted to
/// degrees and rounded to one decimal.
pub fn quantized_pose(position: Vec2, angle: f64) -> Pose {
    Pose {
        position: Vec2::new(quantize(position.x), quantize(position.y)),
        rotation: quantize(angle.to_degrees()),
    }
}

/// Identifies one cached visual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualKey {
    /// A drawable part.
    Part(PartId),
    /// The outer hull of a compound body.
    Hull(BodyId),
}

/// Cached state of one visual.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityVisual {
    node: NodeId,
    owner: BodyId,
    mode: DrawMode,
    last_pose: Option<Pose>,
    opacity: f64,
    faded_from: Option<f64>,
    shown: bool,
    seen: u64,
}

impl EntityVisual {
    fn new(node: NodeId, owner: BodyId, mode: DrawMode, opacity: f64) -> Self {
        Self {
            node,
            owner,
            mode,
            last_pose: None,
            opacity,
            faded_from: None,
            shown: true,
            seen: 0,
        }
    }

    /// Surface handle.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Body the visual belongs to.
    pub fn owner(&self) -> BodyId {
        self.owner
    }

    /// Mode the node was synthesized for.
    pub fn mode(&self) -> DrawMode {
        self.mode
    }

    /// Last pose pushed to the surface.
    pub fn last_pose(&self) -> Option<Pose> {
        self.last_pose
    }

    /// Opacity currently on the surface.
    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    /// Whether the sleeping fade is applied.
    pub fn is_faded(&self) -> bool {
        self.faded_from.is_some()
    }

    /// Whether the node is currently shown.
    pub fn is_shown(&self) -> bool {
        self.shown
    }

    /// Stamp the visual as drawn in `frame`, unhiding it if needed.
    pub fn mark_seen(&mut self, frame: u64, surface: &mut dyn Surface) {
        self.seen = frame;
        if !self.shown {
            surface.set_visible(self.node, true);
            self.shown = true;
        }
    }

    /// Push a new pose if its quantized value differs from the last one.
    /// Returns whether the surface was touched.
    pub fn update_pose(&mut self, surface: &mut dyn Surface, position: Vec2, angle: f64) -> bool {
        let pose = quantized_pose(position, angle);
        if self.last_pose == Some(pose) {
            return false;
        }
        surface.set_pose(self.node, pose);
        self.last_pose = Some(pose);
        true
    }

    /// Bring the node's opacity in line with `base`, halved while `faded`.
    ///
    /// Fading remembers the opacity it replaced; un-fading restores exactly
    /// that value.
    pub fn update_opacity(&mut self, surface: &mut dyn Surface, base: f64, faded: bool) {
        let target = match (faded, self.faded_from) {
            (true, Some(prior)) if prior == base => return,
            (true, _) => {
                self.faded_from = Some(base);
                base * SLEEP_FADE
            }
            (false, Some(prior)) => {
                self.faded_from = None;
                prior
            }
            (false, None) => base,
        };
        if target != self.opacity {
            surface.set_opacity(self.node, target);
            self.opacity = target;
        }
    }
}

/// Visual-to-node map.
#[derive(Debug, Default)]
pub struct NodeCache {
    entries: HashMap<VisualKey, EntityVisual>,
}

impl NodeCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached visuals.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a visual.
    pub fn get(&self, key: &VisualKey) -> Option<&EntityVisual> {
        self.entries.get(key)
    }

    /// Iterate over cached visuals.
    pub fn iter(&self) -> impl Iterator<Item = (&VisualKey, &EntityVisual)> {
        self.entries.iter()
    }

    /// Fetch the visual for `key`, creating its node from `make` when it is
    /// missing or was synthesized for a different mode.
    ///
    /// Returns `Ok(None)` when `make` produces no geometry.
    ///
    /// # Errors
    ///
    /// Propagates [`SurfaceError`] from node creation. The cache is left
    /// without an entry for `key` in that case.
    pub fn get_or_create<F>(
        &mut self,
        key: VisualKey,
        owner: BodyId,
        mode: DrawMode,
        surface: &mut dyn Surface,
        make: F,
    ) -> Result<Option<&mut EntityVisual>, SurfaceError>
    where
        F: FnOnce() -> Option<NodeSpec>,
    {
        if self.entries.get(&key).is_some_and(|e| e.mode != mode) {
            if let Some(stale) = self.entries.remove(&key) {
                tracing::trace!(?key, "drawing mode changed, recreating node");
                surface.remove_node(stale.node);
            }
        }

        match self.entries.entry(key) {
            Entry::Occupied(o) => Ok(Some(o.into_mut())),
            Entry::Vacant(v) => {
                let Some(spec) = make() else {
                    return Ok(None);
                };
                let opacity = spec.paint.opacity;
                let node = surface.create_node(spec)?;
                tracing::trace!(?key, node = node.0, "created node");
                Ok(Some(v.insert(EntityVisual::new(node, owner, mode, opacity))))
            }
        }
    }

    /// Destroy one visual's node. Returns whether an entry existed.
    pub fn release(&mut self, key: &VisualKey, surface: &mut dyn Surface) -> bool {
        match self.entries.remove(key) {
            Some(entry) => {
                surface.remove_node(entry.node);
                true
            }
            None => false,
        }
    }

    /// Destroy every node owned by `body`. Returns how many were released.
    pub fn release_body(&mut self, body: BodyId, surface: &mut dyn Surface) -> usize {
        self.release_where(surface, |entry| entry.owner == body)
    }

    /// Destroy nodes whose owning body no longer exists in `world`.
    pub fn reclaim_orphans(&mut self, world: &World, surface: &mut dyn Surface) -> usize {
        let released = self.release_where(surface, |entry| !world.contains_body(entry.owner));
        if released > 0 {
            tracing::debug!(released, "reclaimed orphaned nodes");
        }
        released
    }

    /// Hide every shown visual not stamped with `frame`. Returns how many
    /// were hidden.
    pub fn hide_unseen(&mut self, frame: u64, surface: &mut dyn Surface) -> usize {
        let mut hidden = 0;
        for entry in self.entries.values_mut() {
            if entry.shown && entry.seen != frame {
                surface.set_visible(entry.node, false);
                entry.shown = false;
                hidden += 1;
            }
        }
        hidden
    }

    /// Destroy every node.
    pub fn clear(&mut self, surface: &mut dyn Surface) {
        for (_, entry) in self.entries.drain() {
            surface.remove_node(entry.node);
        }
    }

    fn release_where<P>(&mut self, surface: &mut dyn Surface, mut doomed: P) -> usize
    where
        P: FnMut(&EntityVisual) -> bool,
    {
        let mut released = 0;
        self.entries.retain(|_, entry| {
            if doomed(entry) {
                surface.remove_node(entry.node);
                released += 1;
                false
            } else {
                true
            }
        });
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{Geometry, Layer, Paint, RecordingSurface, Stroke};
    use rigidview_world::color::Color;

    fn spec() -> Option<NodeSpec> {
        Some(NodeSpec {
            geometry: Geometry::Circle { radius: 5.0 },
            paint: Paint::stroked(Stroke::solid(Color::rgb(187, 187, 187), 1.0)),
            layer: Layer::Bodies,
        })
    }

    #[test]
    fn quantize_rounds_to_one_decimal() {
        let pose = quantized_pose(Vec2::new(12.34, 56.78), std::f64::consts::FRAC_PI_4);
        assert_eq!(pose.position, Vec2::new(12.3, 56.8));
        assert_eq!(pose.rotation, 45.0);
    }

    #[test]
    fn creates_once_and_skips_unchanged_pose() {
        let mut surface = RecordingSurface::new();
        let mut cache = NodeCache::new();
        let key = VisualKey::Part(PartId(1));
        for _ in 0..3 {
            let entry = cache
                .get_or_create(key, BodyId(1), DrawMode::Wireframe, &mut surface, spec)
                .unwrap()
                .unwrap();
            entry.update_pose(&mut surface, Vec2::new(1.01, 2.0), 0.0);
        }
        assert_eq!(surface.stats().created, 1);
        assert_eq!(surface.stats().pose_updates, 1);
    }

    #[test]
    fn mode_switch_recreates_node() {
        let mut surface = RecordingSurface::new();
        let mut cache = NodeCache::new();
        let key = VisualKey::Part(PartId(1));
        let first = cache
            .get_or_create(key, BodyId(1), DrawMode::Wireframe, &mut surface, spec)
            .unwrap()
            .unwrap()
            .node();
        let second = cache
            .get_or_create(key, BodyId(1), DrawMode::Shaded, &mut surface, spec)
            .unwrap()
            .unwrap()
            .node();
        assert_ne!(first, second);
        assert_eq!(surface.node_count(), 1);
        assert_eq!(surface.stats().removed, 1);
    }

    #[test]
    fn fade_halves_once_and_restores() {
        let mut surface = RecordingSurface::new();
        let mut cache = NodeCache::new();
        let entry = cache
            .get_or_create(VisualKey::Part(PartId(1)), BodyId(1), DrawMode::Shaded, &mut surface, spec)
            .unwrap()
            .unwrap();
        entry.update_opacity(&mut surface, 0.8, true);
        entry.update_opacity(&mut surface, 0.8, true);
        assert_eq!(entry.opacity(), 0.4);
        assert!(entry.is_faded());
        entry.update_opacity(&mut surface, 0.8, false);
        assert_eq!(entry.opacity(), 0.8);
        assert!(!entry.is_faded());
    }

    #[test]
    fn hide_unseen_and_release() {
        let mut surface = RecordingSurface::new();
        let mut cache = NodeCache::new();
        for i in 1..=3 {
            cache
                .get_or_create(VisualKey::Part(PartId(i)), BodyId(i), DrawMode::Wireframe, &mut surface, spec)
                .unwrap()
                .unwrap()
                .mark_seen(1, &mut surface);
        }
        if let Ok(Some(e)) = cache.get_or_create(
            VisualKey::Part(PartId(1)),
            BodyId(1),
            DrawMode::Wireframe,
            &mut surface,
            spec,
        ) {
            e.mark_seen(2, &mut surface);
        }
        assert_eq!(cache.hide_unseen(2, &mut surface), 2);
        assert_eq!(surface.visible_count(), 1);

        assert_eq!(cache.release_body(BodyId(2), &mut surface), 1);
        assert_eq!(cache.len(), 2);
        assert_eq!(surface.node_count(), 2);
    }

    #[test]
    fn no_geometry_creates_nothing() {
        let mut surface = RecordingSurface::new();
        let mut cache = NodeCache::new();
        let out = cache
            .get_or_create(VisualKey::Hull(BodyId(1)), BodyId(1), DrawMode::Wireframe, &mut surface, || None)
            .unwrap();
        assert!(out.is_none());
        assert!(cache.is_empty());
    }
}
