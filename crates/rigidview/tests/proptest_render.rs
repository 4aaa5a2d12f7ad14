//! Property tests for view fitting and the node cache.
//!
//! These tests use `proptest` to generate random scenes and view targets and
//! verify that fitting and retained-node invariants hold.

use proptest::prelude::*;
use rigidview::cache::quantize;
use rigidview::prelude::*;

/// Strategy for finite coordinates with two decimals.
fn coord() -> impl Strategy<Value = f64> {
    (-100_000i32..100_000i32).prop_map(|v| v as f64 * 0.01)
}

/// Strategy for a positive extent.
fn extent() -> impl Strategy<Value = f64> {
    (100i32..50_000i32).prop_map(|v| v as f64 * 0.01)
}

fn boxes() -> impl Strategy<Value = Vec<Bounds>> {
    prop::collection::vec(
        (coord(), coord(), extent(), extent())
            .prop_map(|(x, y, w, h)| Bounds::from_origin_size(Vec2::new(x, y), w, h)),
        1..20,
    )
}

fn state() -> RenderState {
    RenderState::builder()
        .target(Canvas::new(800.0, 600.0))
        .build()
        .unwrap()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-6 * a.abs().max(b.abs()).max(1.0)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn fitted_view_matches_canvas_aspect(targets in boxes()) {
        let mut state = state();
        let bounds = fit_to_objects(&mut state, targets.iter().copied(), Vec2::ZERO, true);
        prop_assert!(close(bounds.width() / bounds.height(), 800.0 / 600.0));

        let union = targets.iter().fold(Bounds::EMPTY, |acc, b| acc.union(*b));
        let slack = 1e-6 * bounds.width().max(bounds.height());
        prop_assert!(bounds.min.x <= union.min.x + slack);
        prop_assert!(bounds.min.y <= union.min.y + slack);
        prop_assert!(bounds.max.x >= union.max.x - slack);
        prop_assert!(bounds.max.y >= union.max.y - slack);
    }

    #[test]
    fn fitting_twice_gives_the_same_view(targets in boxes(), pad in 0i32..50) {
        let mut state = state();
        let padding = Vec2::new(pad as f64, pad as f64);
        let first = fit_to_objects(&mut state, targets.iter().copied(), padding, true);
        let second = fit_to_objects(&mut state, targets.iter().copied(), padding, true);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn one_node_per_part_across_frames(
        positions in prop::collection::vec((coord(), coord()), 0..40),
        frames in 1usize..6,
    ) {
        let mut world = World::new();
        for (i, (x, y)) in positions.iter().enumerate() {
            world
                .insert_body(Body::rectangle(BodyId(i as u64 + 1), *x, *y, 10.0, 10.0))
                .unwrap();
        }
        let mut state = state();
        let mut surface = RecordingSurface::new();

        for _ in 0..frames {
            let (report, _) = render_frame(&mut state, &world, &mut surface).unwrap();
            prop_assert_eq!(report.visuals_drawn, positions.len());
        }
        prop_assert_eq!(surface.node_count(), positions.len());
        prop_assert_eq!(surface.stats().created, positions.len());
        prop_assert_eq!(state.cache().len(), positions.len());
    }

    #[test]
    fn quantize_is_idempotent(v in coord()) {
        let q = quantize(v);
        prop_assert_eq!(quantize(q), q);
        prop_assert!((q - v).abs() <= 0.05 + 1e-9);
    }
}
