//! Debug overlays: broadphase grid, stats text and pointer position.

use rigidview_world::color::Color;
use rigidview_world::math::Vec2;

use super::{OverlayContext, OverlayLayer};
use crate::error::OverlayError;
use crate::path::Path;
use crate::surface::Stroke;

/// Minimum time between debug text refreshes, in milliseconds.
pub const DEBUG_REFRESH_MS: f64 = 500.0;

const DEBUG_ORIGIN: Vec2 = Vec2::new(50.0, 50.0);
const DEBUG_LINE_HEIGHT: f64 = 18.0;
const DEBUG_FONT_SIZE: f64 = 12.0;

/// Grid cells holding at least two bodies.
pub fn grid(ctx: &OverlayContext<'_>, layer: &mut OverlayLayer) -> Result<(), OverlayError> {
    let Some(grid) = ctx.world.grid() else {
        return Ok(());
    };
    let (w, h) = (grid.bucket_width, grid.bucket_height);
    let mut path = Path::new();
    for bucket in grid.buckets.iter().filter(|b| b.occupants >= 2) {
        path.rect(
            Vec2::new(0.5 + bucket.column as f64 * w, 0.5 + bucket.row as f64 * h),
            w,
            h,
        );
    }
    let color = ctx.pick(Color::rgba(255, 180, 0, 0.1), Color::rgba(255, 180, 0, 0.5));
    layer.stroke(path, Stroke::solid(color, 1.0));
    Ok(())
}

/// Throttled stats text. Holds the last rendered text between refreshes.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DebugText {
    text: String,
    stamp: Option<f64>,
}

impl DebugText {
    /// A cache that refreshes on its first use.
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Rebuild the text if the refresh interval elapsed (or the clock went
    /// backwards). Returns whether it was rebuilt.
    pub fn refresh(&mut self, ctx: &OverlayContext<'_>) -> bool {
        let now = ctx.timestamp;
        let due = match self.stamp {
            None => true,
            Some(last) => now < last || now - last >= DEBUG_REFRESH_MS,
        };
        if !due {
            return false;
        }
        let world = ctx.world;
        self.text = format!(
            "fps: {}    bodies: {}    \npairs: {}    collisions: {}    ",
            world.metrics.fps.round(),
            world.bodies().len(),
            world.pairs().len(),
            world.metrics.collisions,
        );
        self.stamp = Some(now);
        true
    }

    /// Refresh if due, then draw the text one line per row.
    pub fn draw(&mut self, ctx: &OverlayContext<'_>, layer: &mut OverlayLayer) -> Result<(), OverlayError> {
        self.refresh(ctx);
        let color = ctx.pick(Color::rgba(255, 255, 255, 0.5), Color::rgba(0, 0, 0, 0.5));
        for (i, line) in self.text.lines().enumerate() {
            layer.text(
                line,
                DEBUG_ORIGIN + Vec2::new(0.0, i as f64 * DEBUG_LINE_HEIGHT),
                DEBUG_FONT_SIZE,
                color,
            );
        }
        Ok(())
    }
}

/// Pointer world coordinates next to the pointer.
pub fn mouse_position(ctx: &OverlayContext<'_>, layer: &mut OverlayLayer) -> Result<(), OverlayError> {
    let Some(pointer) = ctx.pointer else {
        return Ok(());
    };
    let p = pointer.position();
    if !p.is_finite() {
        return Ok(());
    }
    layer.text(
        format!("{}  {}", p.x, p.y),
        p + Vec2::new(5.0, -5.0),
        12.0,
        Color::rgba(255, 255, 255, 0.8),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::RenderOptions;
    use crate::surface::DrawCommand;
    use crate::viewport::PointerMapping;
    use rigidview_world::grid::{BroadphaseGrid, Bucket};
    use rigidview_world::World;

    fn ctx<'a>(world: &'a World, options: &'a RenderOptions, ts: f64) -> OverlayContext<'a> {
        OverlayContext {
            options,
            world,
            bodies: &[],
            constraints: &[],
            pointer: None,
            timestamp: ts,
        }
    }

    #[test]
    fn debug_text_is_throttled() {
        let mut world = World::new();
        world.metrics.fps = 59.7;
        let opts = RenderOptions::default();
        let mut text = DebugText::new();

        assert!(text.refresh(&ctx(&world, &opts, 0.0)));
        assert!(text.text().starts_with("fps: 60    bodies: 0"));

        world.metrics.fps = 30.0;
        assert!(!text.refresh(&ctx(&world, &opts, 499.0)));
        assert!(text.text().starts_with("fps: 60"));
        assert!(text.refresh(&ctx(&world, &opts, 500.0)));
        assert!(text.text().starts_with("fps: 30"));
    }

    #[test]
    fn debug_text_draws_two_rows() {
        let world = World::new();
        let opts = RenderOptions::default();
        let mut text = DebugText::new();
        let mut layer = OverlayLayer::new();
        text.draw(&ctx(&world, &opts, 0.0), &mut layer).unwrap();
        assert_eq!(layer.len(), 2);
        assert!(matches!(
            &layer.commands()[1],
            DrawCommand::Text { position, .. } if *position == Vec2::new(50.0, 68.0)
        ));
    }

    #[test]
    fn grid_draws_crowded_cells_only() {
        let mut world = World::new();
        world.set_grid(Some(BroadphaseGrid {
            bucket_width: 10.0,
            bucket_height: 10.0,
            buckets: vec![
                Bucket { column: 1, row: 2, occupants: 2 },
                Bucket { column: 0, row: 0, occupants: 1 },
            ],
        }));
        let opts = RenderOptions::default();
        let mut layer = OverlayLayer::new();
        grid(&ctx(&world, &opts, 0.0), &mut layer).unwrap();
        let DrawCommand::Path { path, .. } = &layer.commands()[0] else {
            panic!("expected path");
        };
        assert_eq!(path.len(), 1);
        assert_eq!(path.bounds().min, Vec2::new(10.5, 20.5));
    }

    #[test]
    fn mouse_position_needs_pointer() {
        let world = World::new();
        let opts = RenderOptions::default();
        let mut layer = OverlayLayer::new();
        mouse_position(&ctx(&world, &opts, 0.0), &mut layer).unwrap();
        assert!(layer.is_empty());

        let pointer = PointerMapping {
            absolute: Vec2::new(10.0, 20.0),
            ..PointerMapping::default()
        };
        let mut with_pointer = ctx(&world, &opts, 0.0);
        with_pointer.pointer = Some(&pointer);
        mouse_position(&with_pointer, &mut layer).unwrap();
        assert!(matches!(
            &layer.commands()[0],
            DrawCommand::Text { text, position, .. } if text == "10  20" && *position == Vec2::new(15.0, 15.0)
        ));
    }
}
