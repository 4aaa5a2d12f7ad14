//! Headless render loop -- loads a scene, renders frames into a recording
//! surface and logs what the renderer did.
//!
//! Run with:
//!   cargo run --example headless_frames -p rigidview [-- scene.json [frames]]
//!
//! Without arguments a small built-in scene is used. Set `RUST_LOG=debug`
//! to see per-frame renderer logs.

use anyhow::Context;
use rigidview::prelude::*;

// ---------------------------------------------------------------------------
// Scene setup
// ---------------------------------------------------------------------------

const BUILTIN_SCENE: &str = r#"{
    "bodies": [
        {
            "id": 1,
            "label": "ground",
            "position": { "x": 400, "y": 590 },
            "isStatic": true,
            "parts": [{
                "id": 1,
                "position": { "x": 400, "y": 590 },
                "vertices": [
                    { "x": 0, "y": 580 }, { "x": 800, "y": 580 },
                    { "x": 800, "y": 600 }, { "x": 0, "y": 600 }
                ]
            }]
        },
        {
            "id": 2,
            "label": "ball",
            "position": { "x": 300, "y": 100 },
            "parts": [{ "id": 2, "position": { "x": 300, "y": 100 }, "circleRadius": 20 }]
        },
        {
            "id": 3,
            "label": "crate",
            "position": { "x": 500, "y": 150 },
            "parts": [{
                "id": 3,
                "position": { "x": 500, "y": 150 },
                "vertices": [
                    { "x": 480, "y": 130 }, { "x": 520, "y": 130 },
                    { "x": 520, "y": 170 }, { "x": 480, "y": 170 }
                ]
            }]
        }
    ],
    "constraints": [
        {
            "id": 1,
            "bodyA": 2,
            "bodyB": 3,
            "pointA": { "x": 0, "y": 0 },
            "pointB": { "x": 0, "y": 0 },
            "length": 200,
            "style": { "type": "spring" }
        }
    ],
    "timing": { "timestamp": 0, "delta": 16.666 },
    "metrics": { "fps": 60, "collisions": 0 }
}"#;

fn load_world(path: Option<&str>) -> Result<World, anyhow::Error> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read scene {path}"))?;
            World::from_json(&json).with_context(|| format!("failed to load scene {path}"))
        }
        None => World::from_json(BUILTIN_SCENE).context("built-in scene is invalid"),
    }
}

/// Toy integration so frames have something to show: dynamic bodies fall
/// until they reach the floor.
fn advance(world: &mut World) {
    let dt = world.timing.delta;
    world.timing.timestamp += dt;
    for body in world.bodies_mut() {
        if body.is_static || body.position.y >= 540.0 {
            continue;
        }
        let next = body.position + Vec2::new(0.0, dt * 0.2);
        body.set_position(next);
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut world = load_world(args.first().map(String::as_str))?;
    let frames: usize = match args.get(1) {
        Some(n) => n.parse().with_context(|| format!("invalid frame count '{n}'"))?,
        None => 120,
    };

    let options = RenderOptions {
        show_angle_indicator: true,
        show_debug: true,
        ..RenderOptions::default()
    };
    let mut state = RenderState::builder()
        .target(Canvas::new(800.0, 600.0))
        .options(options)
        .with_pointer()
        .build()?;
    let mut surface = RecordingSurface::new();
    let mut runner = RunLoop::new(ManualTicks::new());

    fit_to_objects(&mut state, world.bodies(), Vec2::new(20.0, 20.0), true);
    runner.start(&mut state);

    let mut overlay_failures = 0;
    for _ in 0..frames {
        advance(&mut world);
        state.sync_removals(&mut world, &mut surface);
        if let Some((_, Some(overlays))) = runner.step(&mut state, &world, &mut surface)? {
            overlay_failures += overlays.failed;
        }
    }
    runner.stop(&mut state, &mut surface);

    let stats = surface.stats();
    tracing::info!(
        frames = state.frame(),
        nodes = surface.node_count(),
        created = stats.created,
        pose_updates = stats.pose_updates,
        opacity_updates = stats.opacity_updates,
        overlay_commands = surface.overlay().len(),
        overlay_failures,
        "headless run finished"
    );
    Ok(())
}
