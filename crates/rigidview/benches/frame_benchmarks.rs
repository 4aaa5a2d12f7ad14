//! Frame throughput benchmarks.
//!
//! Measures the renderer's per-frame cost against the headless recording
//! surface:
//!
//! - Steady state: a settled world where nothing moved since the last frame,
//!   so every node is already up to date.
//! - Moving: every body moves between frames and each node gets a pose
//!   update.
//! - Overlays: steady state with the per-body diagnostic overlays enabled.
//! - Culled: a fitted view that keeps only a fraction of the world in view.
//!
//! Run with: `cargo bench --bench frame_benchmarks`

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rigidview::prelude::*;

const BODIES: u64 = 400;

/// A grid of boxes and circles filling a 800x600 canvas.
fn scene() -> World {
    let mut world = World::new();
    for i in 0..BODIES {
        let x = 20.0 + (i % 20) as f64 * 38.0;
        let y = 20.0 + (i / 20) as f64 * 28.0;
        let body = if i % 3 == 0 {
            Body::circle(BodyId(i + 1), x, y, 10.0)
        } else {
            Body::rectangle(BodyId(i + 1), x, y, 16.0, 16.0)
        };
        world
            .insert_body(body)
            .expect("scene ids are unique");
    }
    world
}

fn state(options: RenderOptions) -> RenderState {
    RenderState::builder()
        .target(Canvas::new(800.0, 600.0))
        .options(options)
        .build()
        .expect("valid canvas")
}

// ---------------------------------------------------------------------------
// Benchmark 1: steady-state frame
// ---------------------------------------------------------------------------

fn bench_steady_state(c: &mut Criterion) {
    let world = scene();
    let mut state = state(RenderOptions::default());
    let mut surface = RecordingSurface::new();
    render_frame(&mut state, &world, &mut surface).expect("warm-up frame");

    c.bench_function("frame_steady_state_400", |b| {
        b.iter(|| {
            let out = render_frame(&mut state, &world, &mut surface).expect("frame");
            black_box(out);
        });
    });
}

// ---------------------------------------------------------------------------
// Benchmark 2: every body moves
// ---------------------------------------------------------------------------

fn bench_moving(c: &mut Criterion) {
    let mut world = scene();
    let mut state = state(RenderOptions::default());
    let mut surface = RecordingSurface::new();
    let mut step = 0u64;

    c.bench_function("frame_moving_400", |b| {
        b.iter(|| {
            step += 1;
            let dy = if step % 2 == 0 { 1.0 } else { -1.0 };
            for body in world.bodies_mut() {
                let next = body.position + Vec2::new(0.0, dy);
                body.set_position(next);
            }
            let out = render_frame(&mut state, &world, &mut surface).expect("frame");
            black_box(out);
        });
    });
}

// ---------------------------------------------------------------------------
// Benchmark 3: overlays enabled
// ---------------------------------------------------------------------------

fn bench_overlays(c: &mut Criterion) {
    let world = scene();
    let options = RenderOptions {
        show_bounds: true,
        show_angle_indicator: true,
        show_positions: true,
        show_velocity: true,
        show_ids: true,
        ..RenderOptions::default()
    };
    let mut state = state(options);
    let mut surface = RecordingSurface::new();

    c.bench_function("frame_overlays_400", |b| {
        b.iter(|| {
            let out = render_frame(&mut state, &world, &mut surface).expect("frame");
            black_box(out);
        });
    });
}

// ---------------------------------------------------------------------------
// Benchmark 4: culled view
// ---------------------------------------------------------------------------

fn bench_culled(c: &mut Criterion) {
    let world = scene();
    let mut state = state(RenderOptions::default());
    let targets = [Vec2::new(0.0, 0.0), Vec2::new(200.0, 150.0)];
    fit_to_objects(&mut state, targets, Vec2::ZERO, false);
    let mut surface = RecordingSurface::new();

    c.bench_function("frame_culled_400", |b| {
        b.iter(|| {
            let out = render_frame(&mut state, &world, &mut surface).expect("frame");
            black_box(out);
        });
    });
}

criterion_group!(
    benches,
    bench_steady_state,
    bench_moving,
    bench_overlays,
    bench_culled
);
criterion_main!(benches);
