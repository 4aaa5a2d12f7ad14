//! Renderer state and its builder.
//!
//! [`RenderState`] is the single owner of everything the renderer remembers
//! between frames: the options snapshot, the view window, the node cache,
//! the applied background, pointer calibration, lifecycle handlers, the
//! pending overlay pass and the run-loop tick. It is created through
//! [`RenderStateBuilder`], which refuses to produce a state without a
//! drawing target.

use std::sync::Arc;

use rigidview_world::body::BodyId;
use rigidview_world::math::{Bounds, Vec2};
use rigidview_world::World;

use crate::background::BackgroundDesc;
use crate::cache::{NodeCache, VisualKey};
use crate::error::RenderError;
use crate::events::{EventBus, EventKind, RenderEvent, SubscriptionId};
use crate::overlay::debug::DebugText;
use crate::overlay::inspector::Selection;
use crate::overlay::OverlayLayer;
use crate::options::RenderOptions;
use crate::runner::TickHandle;
use crate::surface::{NodeId, Surface};
use crate::viewport::{self, PointerMapping};

/// Logical size and device pixel ratio of the drawing target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    /// Logical width.
    pub width: f64,
    /// Logical height.
    pub height: f64,
    /// Device pixels per logical unit.
    pub pixel_ratio: f64,
}

impl Canvas {
    /// A canvas with pixel ratio 1.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            pixel_ratio: 1.0,
        }
    }

    /// The same canvas at a different pixel ratio.
    pub fn with_pixel_ratio(self, pixel_ratio: f64) -> Self {
        Self { pixel_ratio, ..self }
    }

    fn validate(&self) -> Result<(), RenderError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if positive(self.width) && positive(self.height) && positive(self.pixel_ratio) {
            Ok(())
        } else {
            Err(RenderError::InvalidCanvas {
                width: self.width,
                height: self.height,
            })
        }
    }
}

/// Where a frame currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FramePhase {
    /// No frame in progress.
    #[default]
    Idle,
    /// The main pass finished; overlays are scheduled.
    OverlayPending,
}

/// Everything the renderer keeps between frames.
#[derive(Debug)]
pub struct RenderState {
    pub(crate) options: Arc<RenderOptions>,
    pub(crate) bounds: Bounds,
    pub(crate) cache: NodeCache,
    pub(crate) background: Option<BackgroundDesc>,
    pub(crate) pointer: Option<PointerMapping>,
    pub(crate) events: EventBus,
    pub(crate) selection: Option<Selection>,
    pub(crate) debug_text: DebugText,
    pub(crate) layer: OverlayLayer,
    pub(crate) visible_bodies: Vec<usize>,
    pub(crate) visible_constraints: Vec<usize>,
    pub(crate) frame: u64,
    pub(crate) pending: Option<u64>,
    pub(crate) transform_active: bool,
    pub(crate) tick: Option<TickHandle>,
}

impl RenderState {
    /// Start building a state.
    pub fn builder() -> RenderStateBuilder {
        RenderStateBuilder::default()
    }

    /// The current options snapshot.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Shared handle to the current options snapshot.
    pub fn options_arc(&self) -> Arc<RenderOptions> {
        Arc::clone(&self.options)
    }

    /// Replace the options. Takes effect at the next frame; a frame already
    /// in flight keeps the snapshot it started with.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidCanvas`] when the new size or pixel
    /// ratio is not positive and finite.
    pub fn set_options(&mut self, options: RenderOptions) -> Result<(), RenderError> {
        Canvas {
            width: options.width,
            height: options.height,
            pixel_ratio: options.pixel_ratio,
        }
        .validate()?;
        self.options = Arc::new(options);
        viewport::refresh_pointer(self);
        Ok(())
    }

    /// Change options in place through a closure.
    ///
    /// # Errors
    ///
    /// Same as [`RenderState::set_options`]; on error the old options stay.
    pub fn update_options<F>(&mut self, edit: F) -> Result<(), RenderError>
    where
        F: FnOnce(&mut RenderOptions),
    {
        let mut next = (*self.options).clone();
        edit(&mut next);
        self.set_options(next)
    }

    /// The view window in world coordinates.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// The node cache.
    pub fn cache(&self) -> &NodeCache {
        &self.cache
    }

    /// Surface node drawing a visual, if cached.
    pub fn node_for(&self, key: VisualKey) -> Option<NodeId> {
        self.cache.get(&key).map(|e| e.node())
    }

    /// The background last pushed to the surface.
    pub fn applied_background(&self) -> Option<&BackgroundDesc> {
        self.background.as_ref()
    }

    /// Pointer calibration, when pointer tracking is enabled.
    pub fn pointer(&self) -> Option<&PointerMapping> {
        self.pointer.as_ref()
    }

    /// Record the pointer's canvas position. No-op without pointer tracking.
    pub fn set_pointer_position(&mut self, absolute: Vec2) {
        if let Some(p) = self.pointer.as_mut() {
            p.absolute = absolute;
        }
    }

    /// Replace the inspector selection. `None` or an empty selection turns
    /// the inspector overlay off.
    pub fn set_selection(&mut self, selection: Option<Selection>) {
        self.selection = selection.filter(|s| !s.is_empty());
    }

    /// The inspector selection.
    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Register a lifecycle handler.
    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&RenderEvent) + 'static,
    {
        self.events.subscribe(kind, handler)
    }

    /// Remove a lifecycle handler.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Number of frames started so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Where the current frame is.
    pub fn phase(&self) -> FramePhase {
        if self.pending.is_some() {
            FramePhase::OverlayPending
        } else {
            FramePhase::Idle
        }
    }

    /// Whether the run loop has a tick outstanding.
    pub fn is_running(&self) -> bool {
        self.tick.is_some()
    }

    /// Destroy the nodes of a body removed from the world.
    pub fn release_body(&mut self, body: BodyId, surface: &mut dyn Surface) -> usize {
        self.cache.release_body(body, surface)
    }

    /// Destroy the nodes of bodies no longer present in `world`.
    ///
    /// The sweep covers every queued removal notification, so the queue is
    /// discarded too.
    pub fn reclaim_orphans(&mut self, world: &mut World, surface: &mut dyn Surface) -> usize {
        world.drain_removed();
        self.cache.reclaim_orphans(world, surface)
    }

    /// Destroy the nodes of every body `world` reports as removed since the
    /// last call, then sweep for any other orphans.
    pub fn sync_removals(&mut self, world: &mut World, surface: &mut dyn Surface) -> usize {
        let mut released = 0;
        for id in world.drain_removed() {
            released += self.cache.release_body(id, surface);
        }
        released + self.cache.reclaim_orphans(world, surface)
    }

    /// Destroy every cached node.
    pub fn clear_nodes(&mut self, surface: &mut dyn Surface) {
        self.cache.clear(surface);
    }
}

/// Builder for [`RenderState`].
#[derive(Debug, Default)]
pub struct RenderStateBuilder {
    options: Option<RenderOptions>,
    target: Option<Canvas>,
    pointer: bool,
    bounds: Option<Bounds>,
}

impl RenderStateBuilder {
    /// Start from these options instead of the defaults. Size and pixel
    /// ratio are taken from the target.
    pub fn options(mut self, options: RenderOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Parse options from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Options`] when the JSON does not parse.
    pub fn options_json(self, json: &str) -> Result<Self, RenderError> {
        Ok(self.options(RenderOptions::from_json(json)?))
    }

    /// The drawing target. Required.
    pub fn target(mut self, canvas: Canvas) -> Self {
        self.target = Some(canvas);
        self
    }

    /// Track the pointer and keep its world mapping calibrated.
    pub fn with_pointer(mut self) -> Self {
        self.pointer = true;
        self
    }

    /// Initial view window. Defaults to the canvas rectangle at the origin.
    pub fn bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Build the state.
    ///
    /// # Errors
    ///
    /// - [`RenderError::MissingTarget`] when no target was given.
    /// - [`RenderError::InvalidCanvas`] when the target size or pixel ratio
    ///   is not positive and finite.
    pub fn build(self) -> Result<RenderState, RenderError> {
        let canvas = self.target.ok_or(RenderError::MissingTarget)?;
        canvas.validate()?;

        let mut options = self.options.unwrap_or_default();
        options.width = canvas.width;
        options.height = canvas.height;
        options.pixel_ratio = canvas.pixel_ratio;

        let bounds = self
            .bounds
            .unwrap_or_else(|| Bounds::from_origin_size(Vec2::ZERO, canvas.width, canvas.height));

        tracing::debug!(
            width = canvas.width,
            height = canvas.height,
            pixel_ratio = canvas.pixel_ratio,
            wireframes = options.wireframes,
            "render state created"
        );

        let mut state = RenderState {
            options: Arc::new(options),
            bounds,
            cache: NodeCache::new(),
            background: None,
            pointer: self.pointer.then(PointerMapping::default),
            events: EventBus::new(),
            selection: None,
            debug_text: DebugText::new(),
            layer: OverlayLayer::new(),
            visible_bodies: Vec::new(),
            visible_constraints: Vec::new(),
            frame: 0,
            pending: None,
            transform_active: false,
            tick: None,
        };
        viewport::refresh_pointer(&mut state);
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_is_required() {
        let err = RenderState::builder().build().unwrap_err();
        assert!(matches!(err, RenderError::MissingTarget));
    }

    #[test]
    fn canvas_must_be_positive() {
        let err = RenderState::builder()
            .target(Canvas::new(0.0, 600.0))
            .build()
            .unwrap_err();
        assert!(matches!(err, RenderError::InvalidCanvas { .. }));
        let err = RenderState::builder()
            .target(Canvas::new(800.0, 600.0).with_pixel_ratio(f64::NAN))
            .build()
            .unwrap_err();
        assert!(matches!(err, RenderError::InvalidCanvas { .. }));
    }

    #[test]
    fn target_overrides_option_size() {
        let state = RenderState::builder()
            .options_json(r#"{ "width": 10, "height": 10, "wireframes": false }"#)
            .unwrap()
            .target(Canvas::new(640.0, 480.0).with_pixel_ratio(2.0))
            .with_pointer()
            .build()
            .unwrap();
        assert_eq!(state.options().width, 640.0);
        assert_eq!(state.options().pixel_ratio, 2.0);
        assert!(!state.options().wireframes);
        assert_eq!(state.bounds().max, Vec2::new(640.0, 480.0));
        assert_eq!(state.pointer().map(|p| p.scale), Some(Vec2::new(1.0, 1.0)));
        assert_eq!(state.phase(), FramePhase::Idle);
    }

    #[test]
    fn invalid_option_update_keeps_old_options() {
        let mut state = RenderState::builder()
            .target(Canvas::new(800.0, 600.0))
            .build()
            .unwrap();
        assert!(state.update_options(|o| o.height = -1.0).is_err());
        assert_eq!(state.options().height, 600.0);
        state.update_options(|o| o.show_ids = true).unwrap();
        assert!(state.options().show_ids);
    }
}
