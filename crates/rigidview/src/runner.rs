//! Frame-paced run loop.
//!
//! The host provides a [`TickSource`] (display refresh callbacks, a timer,
//! or [`ManualTicks`] in tests). Each tick delivered to [`RunLoop`] renders
//! one frame and re-arms the next tick. Stopping cancels the outstanding
//! tick and drops any overlay pass still pending.

use std::collections::VecDeque;

use rigidview_world::World;

use crate::error::RenderError;
use crate::frame::{self, FrameReport};
use crate::overlay::OverlayReport;
use crate::state::RenderState;
use crate::surface::Surface;

/// Identifies one requested tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle(pub u64);

/// Something that can call back once per displayed frame.
pub trait TickSource {
    /// Ask for one tick. The host later passes the handle to
    /// [`RunLoop::on_tick`].
    fn request_tick(&mut self) -> TickHandle;

    /// Withdraw a requested tick. Unknown handles are ignored.
    fn cancel_tick(&mut self, handle: TickHandle);
}

/// A tick source driven by hand.
#[derive(Debug, Default)]
pub struct ManualTicks {
    next: u64,
    pending: VecDeque<TickHandle>,
}

impl ManualTicks {
    /// No ticks requested yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticks requested and not yet fired or cancelled.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Take the oldest requested tick.
    pub fn fire(&mut self) -> Option<TickHandle> {
        self.pending.pop_front()
    }
}

impl TickSource for ManualTicks {
    fn request_tick(&mut self) -> TickHandle {
        self.next += 1;
        let handle = TickHandle(self.next);
        self.pending.push_back(handle);
        handle
    }

    fn cancel_tick(&mut self, handle: TickHandle) {
        self.pending.retain(|h| *h != handle);
    }
}

/// Drives frames from a [`TickSource`].
///
/// The outstanding tick handle lives in [`RenderState`], so a state can be
/// stopped from any loop wrapping the same source.
#[derive(Debug, Default)]
pub struct RunLoop<T> {
    ticks: T,
}

impl<T: TickSource> RunLoop<T> {
    /// Wrap a tick source.
    pub fn new(ticks: T) -> Self {
        Self { ticks }
    }

    /// The tick source.
    pub fn ticks(&self) -> &T {
        &self.ticks
    }

    /// The tick source, mutably.
    pub fn ticks_mut(&mut self) -> &mut T {
        &mut self.ticks
    }

    /// Start the loop. Does nothing if it is already running.
    pub fn start(&mut self, state: &mut RenderState) {
        if state.tick.is_some() {
            return;
        }
        state.tick = Some(self.ticks.request_tick());
        tracing::info!("render loop started");
    }

    /// Handle a delivered tick: re-arm, then render one frame (main pass,
    /// apply, overlay pass, apply).
    ///
    /// Returns `None` for ticks the loop no longer expects (stale, or
    /// delivered after [`RunLoop::stop`]).
    ///
    /// # Errors
    ///
    /// Propagates surface failures. The loop stays armed; call
    /// [`RunLoop::stop`] to shut it down.
    pub fn on_tick(
        &mut self,
        state: &mut RenderState,
        handle: TickHandle,
        world: &World,
        surface: &mut dyn Surface,
    ) -> Result<Option<(FrameReport, Option<OverlayReport>)>, RenderError> {
        if state.tick != Some(handle) {
            tracing::trace!(tick = handle.0, "ignoring unexpected tick");
            return Ok(None);
        }
        state.tick = Some(self.ticks.request_tick());
        frame::render_frame(state, world, surface).map(Some)
    }

    /// Stop the loop: cancel the outstanding tick and drop any pending
    /// overlay pass. Safe to call any number of times.
    pub fn stop(&mut self, state: &mut RenderState, surface: &mut dyn Surface) {
        let was_running = state.tick.is_some();
        if let Some(handle) = state.tick.take() {
            self.ticks.cancel_tick(handle);
        }
        if frame::abandon_overlay(state, surface) {
            tracing::debug!("dropped pending overlay pass");
        }
        if was_running {
            tracing::info!("render loop stopped");
        }
    }
}

impl RunLoop<ManualTicks> {
    /// Fire the oldest requested tick, if any, and handle it.
    ///
    /// # Errors
    ///
    /// Same as [`RunLoop::on_tick`].
    pub fn step(
        &mut self,
        state: &mut RenderState,
        world: &World,
        surface: &mut dyn Surface,
    ) -> Result<Option<(FrameReport, Option<OverlayReport>)>, RenderError> {
        match self.ticks.fire() {
            Some(handle) => self.on_tick(state, handle, world, surface),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Canvas;
    use crate::surface::RecordingSurface;

    fn state() -> RenderState {
        RenderState::builder()
            .target(Canvas::new(800.0, 600.0))
            .build()
            .unwrap()
    }

    #[test]
    fn tick_renders_and_rearms() {
        let mut state = state();
        let world = World::new();
        let mut surface = RecordingSurface::new();
        let mut runner = RunLoop::new(ManualTicks::new());

        runner.start(&mut state);
        runner.start(&mut state);
        assert_eq!(runner.ticks().pending(), 1);

        let out = runner.step(&mut state, &world, &mut surface).unwrap();
        assert!(out.is_some());
        assert_eq!(runner.ticks().pending(), 1);
        assert_eq!(surface.stats().applies, 2);
    }

    #[test]
    fn stop_twice_is_safe() {
        let mut state = state();
        let world = World::new();
        let mut surface = RecordingSurface::new();
        let mut runner = RunLoop::new(ManualTicks::new());

        runner.start(&mut state);
        runner.stop(&mut state, &mut surface);
        runner.stop(&mut state, &mut surface);
        assert_eq!(runner.ticks().pending(), 0);
        assert!(!state.is_running());

        let late = TickHandle(1);
        assert!(runner
            .on_tick(&mut state, late, &world, &mut surface)
            .unwrap()
            .is_none());
    }
}
