//! In-memory retained surface.

use std::collections::BTreeMap;

use crate::background::BackgroundDesc;
use crate::error::SurfaceError;

use super::{DrawCommand, NodeId, NodeSpec, Pose, Surface, Transform};

/// A retained node as stored by [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedNode {
    /// Creation spec.
    pub spec: NodeSpec,
    /// Last pose.
    pub pose: Pose,
    /// Current opacity.
    pub opacity: f64,
    /// Current visibility.
    pub visible: bool,
}

/// Operation counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SurfaceStats {
    /// Nodes created.
    pub created: usize,
    /// Nodes removed.
    pub removed: usize,
    /// Pose updates applied to live nodes.
    pub pose_updates: usize,
    /// Opacity updates applied to live nodes.
    pub opacity_updates: usize,
    /// Visibility flips applied to live nodes.
    pub visibility_updates: usize,
    /// Backdrop replacements.
    pub background_changes: usize,
    /// Transform replacements.
    pub transform_changes: usize,
    /// Completed `apply` calls.
    pub applies: usize,
}

/// Headless [`Surface`] that keeps nodes in memory and counts operations.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    nodes: BTreeMap<NodeId, RecordedNode>,
    next_id: u64,
    capacity: Option<usize>,
    transform: Option<Transform>,
    background: Option<BackgroundDesc>,
    overlay: Vec<DrawCommand>,
    stats: SurfaceStats,
    failing_applies: usize,
}

impl RecordingSurface {
    /// Unbounded surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Surface that refuses to hold more than `capacity` nodes.
    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    /// Make the next `count` calls to [`Surface::apply`] fail with
    /// [`SurfaceError::Lost`].
    pub fn fail_applies(&mut self, count: usize) {
        self.failing_applies = count;
    }

    /// Live nodes.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &RecordedNode)> {
        self.nodes.iter().map(|(id, n)| (*id, n))
    }

    /// Look up a node.
    pub fn node(&self, id: NodeId) -> Option<&RecordedNode> {
        self.nodes.get(&id)
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of live, visible nodes.
    pub fn visible_count(&self) -> usize {
        self.nodes.values().filter(|n| n.visible).count()
    }

    /// Current view transform, if one was ever set.
    pub fn transform(&self) -> Option<Transform> {
        self.transform
    }

    /// Current backdrop.
    pub fn background(&self) -> Option<&BackgroundDesc> {
        self.background.as_ref()
    }

    /// The last overlay layer.
    pub fn overlay(&self) -> &[DrawCommand] {
        &self.overlay
    }

    /// Operation counters.
    pub fn stats(&self) -> SurfaceStats {
        self.stats
    }

    /// Zero the counters, keeping nodes.
    pub fn reset_stats(&mut self) {
        self.stats = SurfaceStats::default();
    }
}

impl Surface for RecordingSurface {
    fn create_node(&mut self, spec: NodeSpec) -> Result<NodeId, SurfaceError> {
        if let Some(capacity) = self.capacity {
            if self.nodes.len() >= capacity {
                return Err(SurfaceError::Capacity { capacity });
            }
        }
        let id = NodeId(self.next_id);
        self.next_id += 1;
        let opacity = spec.paint.opacity;
        self.nodes.insert(
            id,
            RecordedNode {
                spec,
                pose: Pose::default(),
                opacity,
                visible: true,
            },
        );
        self.stats.created += 1;
        Ok(id)
    }

    fn set_pose(&mut self, node: NodeId, pose: Pose) {
        match self.nodes.get_mut(&node) {
            Some(n) => {
                n.pose = pose;
                self.stats.pose_updates += 1;
            }
            None => tracing::trace!(?node, "set_pose on unknown node"),
        }
    }

    fn set_opacity(&mut self, node: NodeId, opacity: f64) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.opacity = opacity;
            self.stats.opacity_updates += 1;
        }
    }

    fn set_visible(&mut self, node: NodeId, visible: bool) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.visible = visible;
            self.stats.visibility_updates += 1;
        }
    }

    fn remove_node(&mut self, node: NodeId) {
        if self.nodes.remove(&node).is_some() {
            self.stats.removed += 1;
        }
    }

    fn set_background(&mut self, background: &BackgroundDesc) {
        self.background = Some(background.clone());
        self.stats.background_changes += 1;
    }

    fn set_transform(&mut self, transform: Transform) {
        self.transform = Some(transform);
        self.stats.transform_changes += 1;
    }

    fn draw_overlay(&mut self, commands: &[DrawCommand]) {
        self.overlay.clear();
        self.overlay.extend_from_slice(commands);
    }

    fn apply(&mut self) -> Result<(), SurfaceError> {
        if self.failing_applies > 0 {
            self.failing_applies -= 1;
            return Err(SurfaceError::Lost("injected apply failure".to_owned()));
        }
        self.stats.applies += 1;
        Ok(())
    }
}
