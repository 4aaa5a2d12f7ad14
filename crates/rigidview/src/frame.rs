//! Frame orchestration.
//!
//! A frame runs in two phases:
//!
//! 1. [`main_pass`] emits `BeforeRender`, applies the background, culls
//!    against the view window, pushes the view transform and brings every
//!    retained node up to date. It hands back a [`FrameContinuation`] for
//!    the overlay phase.
//! 2. [`overlay_pass`] consumes the continuation after the surface applied
//!    the node updates, draws the diagnostic overlays in order, restores
//!    the transform and emits `AfterRender`.
//!
//! At most one overlay pass is pending at a time. A main pass that finds one
//! already pending updates nodes as usual but schedules nothing.
//!
//! Both passes cull against the view window the main pass saw. The overlay
//! pass culls again against the world it is given, so a world changed
//! between the two phases is never read through stale indices.

use std::sync::Arc;

use rigidview_world::body::Body;
use rigidview_world::math::Bounds;
use rigidview_world::World;

use crate::background::apply_background;
use crate::cache::{NodeCache, VisualKey};
use crate::constraint::{self, constraint_in_view};
use crate::error::RenderError;
use crate::events::RenderEvent;
use crate::options::RenderOptions;
use crate::overlay::{bodies, debug, inspector, pairs, OverlayContext, OverlayReport};
use crate::state::RenderState;
use crate::surface::{Surface, Transform};
use crate::synth::{self, DrawMode};
use crate::viewport;

/// How bodies are drawn this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawStrategy {
    /// Filled primitives and sprites.
    Shaded,
    /// Outlines, optionally with compound hulls beneath.
    Wireframe {
        /// Draw compound hull outlines.
        hulls: bool,
    },
}

impl DrawStrategy {
    /// Strategy selected by the options.
    pub fn select(options: &RenderOptions) -> Self {
        if options.wireframes {
            DrawStrategy::Wireframe {
                hulls: options.show_convex_hulls,
            }
        } else {
            DrawStrategy::Shaded
        }
    }

    /// Paint mode for part nodes.
    pub fn mode(self) -> DrawMode {
        match self {
            DrawStrategy::Shaded => DrawMode::Shaded,
            DrawStrategy::Wireframe { .. } => DrawMode::Wireframe,
        }
    }
}

/// Token for the overlay phase of one frame.
#[derive(Debug)]
#[must_use = "pass the continuation to `overlay_pass` once the surface applied the main pass"]
pub struct FrameContinuation {
    frame: u64,
    timestamp: f64,
    options: Arc<RenderOptions>,
    view: Option<Bounds>,
    view_applied: bool,
}

impl FrameContinuation {
    /// The frame this continuation belongs to.
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

/// What the main pass did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    /// Frame number.
    pub frame: u64,
    /// Bodies that survived culling.
    pub bodies_in_view: usize,
    /// Constraints that survived culling.
    pub constraints_in_view: usize,
    /// Visuals updated on the surface.
    pub visuals_drawn: usize,
    /// Visuals hidden because they were not drawn this frame.
    pub visuals_hidden: usize,
    /// Visuals skipped because the surface refused a node.
    pub visuals_failed: usize,
}

/// Result of [`main_pass`].
#[derive(Debug)]
pub struct MainPass {
    /// Counters.
    pub report: FrameReport,
    /// Overlay continuation, or `None` if an overlay pass was already
    /// pending.
    pub continuation: Option<FrameContinuation>,
}

/// Run the main pass of a frame.
///
/// # Errors
///
/// Does not fail on per-visual problems: a node the surface refuses is
/// logged and skipped. The `Result` is reserved for state-level failures.
pub fn main_pass(
    state: &mut RenderState,
    world: &World,
    surface: &mut dyn Surface,
) -> Result<MainPass, RenderError> {
    state.frame += 1;
    let frame = state.frame;
    let timestamp = world.timing.timestamp;
    let options = Arc::clone(&state.options);
    let _span = tracing::trace_span!("main_pass", frame).entered();

    state
        .events
        .emit(&RenderEvent::BeforeRender { timestamp });

    apply_background(&mut state.background, options.active_background(), surface);

    let view = options.has_bounds.then_some(state.bounds);
    cull(state, world, view);

    let view_applied = view.is_some();
    if view_applied {
        viewport::begin_view_transform(state, surface);
        viewport::refresh_pointer(state);
    } else if options.pixel_ratio != 1.0 {
        surface.set_transform(Transform::uniform(options.pixel_ratio));
    }

    let strategy = DrawStrategy::select(&options);
    let mut report = FrameReport {
        frame,
        bodies_in_view: state.visible_bodies.len(),
        constraints_in_view: state.visible_constraints.len(),
        ..FrameReport::default()
    };

    let bodies = world.bodies();
    let mut painter = Painter {
        cache: &mut state.cache,
        surface,
        options: &options,
        frame,
        report: &mut report,
    };
    if strategy == (DrawStrategy::Wireframe { hulls: true }) {
        for &i in &state.visible_bodies {
            if let Some(body) = bodies.get(i) {
                painter.hull(body);
            }
        }
    }
    let mode = strategy.mode();
    for &i in &state.visible_bodies {
        if let Some(body) = bodies.get(i) {
            painter.body(body, mode);
        }
    }
    report.visuals_hidden = state.cache.hide_unseen(frame, surface);

    tracing::trace!(
        frame,
        in_view = report.bodies_in_view,
        drawn = report.visuals_drawn,
        hidden = report.visuals_hidden,
        "main pass complete"
    );

    if let Some(pending) = state.pending {
        tracing::debug!(frame, pending, "overlay pass already pending, not scheduling another");
        return Ok(MainPass {
            report,
            continuation: None,
        });
    }
    state.pending = Some(frame);
    Ok(MainPass {
        report,
        continuation: Some(FrameContinuation {
            frame,
            timestamp,
            options,
            view,
            view_applied,
        }),
    })
}

/// Run the overlay pass for `continuation`.
///
/// # Errors
///
/// Returns [`RenderError::StaleContinuation`] if `continuation` is not the
/// pending one (for instance after [`abandon_overlay`]). Overlay failures are
/// isolated and reported in the [`OverlayReport`], not as errors.
pub fn overlay_pass(
    state: &mut RenderState,
    continuation: FrameContinuation,
    world: &World,
    surface: &mut dyn Surface,
) -> Result<OverlayReport, RenderError> {
    if state.pending != Some(continuation.frame) {
        return Err(RenderError::StaleContinuation {
            got: continuation.frame,
            pending: state.pending,
        });
    }
    let _span = tracing::trace_span!("overlay_pass", frame = continuation.frame).entered();
    cull(state, world, continuation.view);

    let options = &*continuation.options;
    let mut report = OverlayReport::default();
    {
        let RenderState {
            layer,
            debug_text,
            selection,
            pointer,
            visible_bodies,
            visible_constraints,
            ..
        } = &mut *state;
        let ctx = OverlayContext {
            options,
            world,
            bodies: visible_bodies,
            constraints: visible_constraints,
            pointer: pointer.as_ref(),
            timestamp: continuation.timestamp,
        };
        layer.clear();

        let mut run = |name: &'static str, enabled: bool, f: crate::overlay::OverlayFn| {
            if enabled {
                report.record(layer.isolate(name, |l| f(&ctx, l)));
            }
        };
        run("bounds", options.show_bounds, bodies::bounds);
        run("axes", options.show_axes || options.show_angle_indicator, bodies::axes);
        run("positions", options.show_positions, bodies::positions);
        run("velocity", options.show_velocity, bodies::velocity);
        run("ids", options.show_ids, bodies::ids);
        run("separations", options.show_separations, pairs::separations);
        run("collisions", options.show_collisions, pairs::collisions);
        run("vertex_numbers", options.show_vertex_numbers, bodies::vertex_numbers);
        run("mouse_position", options.show_mouse_position, debug::mouse_position);
        run("constraints", true, constraint::constraints);
        run("broadphase", options.show_broadphase, debug::grid);

        if options.show_debug {
            report.record(layer.isolate("debug", |l| debug_text.draw(&ctx, l)));
        }
        if let Some(selection) = selection.as_ref() {
            report.record(layer.isolate("inspector", |l| inspector::inspector(&ctx, selection, l)));
        }

        report.commands = layer.len();
        surface.draw_overlay(layer.commands());
    }

    if continuation.view_applied {
        viewport::end_view_transform(state, surface);
    }
    state.pending = None;
    state.events.emit(&RenderEvent::AfterRender {
        timestamp: continuation.timestamp,
    });
    if report.failed > 0 {
        tracing::debug!(failed = report.failed, "overlay pass finished with failures");
    }
    Ok(report)
}

/// Drop a pending overlay pass without drawing it, restoring the plain
/// transform if the main pass pushed a view transform. Returns whether a
/// pass was pending.
pub fn abandon_overlay(state: &mut RenderState, surface: &mut dyn Surface) -> bool {
    if state.pending.take().is_none() {
        return false;
    }
    viewport::end_view_transform(state, surface);
    true
}

/// Main pass, surface apply, overlay pass, surface apply.
///
/// # Errors
///
/// Propagates surface failures from either apply. When the first apply
/// fails the frame's overlay pass is abandoned, so the next frame schedules
/// its own.
pub fn render_frame(
    state: &mut RenderState,
    world: &World,
    surface: &mut dyn Surface,
) -> Result<(FrameReport, Option<OverlayReport>), RenderError> {
    let MainPass {
        report,
        continuation,
    } = main_pass(state, world, surface)?;
    if let Err(e) = surface.apply() {
        if continuation.is_some() {
            abandon_overlay(state, surface);
        }
        return Err(e.into());
    }
    let overlays = match continuation {
        Some(c) => {
            let r = overlay_pass(state, c, world, surface)?;
            surface.apply()?;
            Some(r)
        }
        None => None,
    };
    Ok((report, overlays))
}

fn cull(state: &mut RenderState, world: &World, view: Option<Bounds>) {
    let bodies = &mut state.visible_bodies;
    let constraints = &mut state.visible_constraints;
    bodies.clear();
    constraints.clear();

    if let Some(view) = view {
        bodies.extend(
            world
                .bodies()
                .iter()
                .enumerate()
                .filter(|(_, b)| b.bounds.overlaps(&view))
                .map(|(i, _)| i),
        );
        constraints.extend(
            world
                .constraints()
                .iter()
                .enumerate()
                .filter(|(_, c)| constraint_in_view(world, c, &view))
                .map(|(i, _)| i),
        );
    } else {
        bodies.extend(0..world.bodies().len());
        constraints.extend(0..world.constraints().len());
    }
}

struct Painter<'a> {
    cache: &'a mut NodeCache,
    surface: &'a mut dyn Surface,
    options: &'a RenderOptions,
    frame: u64,
    report: &'a mut FrameReport,
}

impl Painter<'_> {
    fn faded(&self, body: &Body) -> bool {
        self.options.show_sleeping && body.is_sleeping
    }

    fn body(&mut self, body: &Body, mode: DrawMode) {
        let faded = self.faded(body);
        for part in body.drawable_parts() {
            let key = VisualKey::Part(part.id);
            if !(body.visible && part.style.visible) {
                self.cache.release(&key, self.surface);
                continue;
            }
            let options = self.options;
            let created = self.cache.get_or_create(key, body.id, mode, self.surface, || {
                synth::part_spec(part, body, mode, options)
            });
            match created {
                Ok(Some(entry)) => {
                    entry.mark_seen(self.frame, self.surface);
                    entry.update_pose(self.surface, part.position, part.angle);
                    entry.update_opacity(self.surface, part.style.opacity, faded);
                    self.report.visuals_drawn += 1;
                }
                Ok(None) => {}
                Err(e) => {
                    self.report.visuals_failed += 1;
                    tracing::warn!(error = %e, body = %body.id, part = %part.id, "failed to create node");
                }
            }
        }
    }

    fn hull(&mut self, body: &Body) {
        if !body.visible || !body.is_compound() {
            return;
        }
        let Some(anchor) = synth::hull_anchor(body) else {
            return;
        };
        let faded = self.faded(body);
        let key = VisualKey::Hull(body.id);
        match self
            .cache
            .get_or_create(key, body.id, DrawMode::Wireframe, self.surface, || synth::hull_spec(body))
        {
            Ok(Some(entry)) => {
                entry.mark_seen(self.frame, self.surface);
                entry.update_pose(self.surface, anchor, body.angle);
                entry.update_opacity(self.surface, 1.0, faded);
                self.report.visuals_drawn += 1;
            }
            Ok(None) => {}
            Err(e) => {
                self.report.visuals_failed += 1;
                tracing::warn!(error = %e, body = %body.id, "failed to create hull node");
            }
        }
    }
}
