//! Property-based tests for world geometry helpers.

use proptest::prelude::*;
use rigidview_world::body::convex_hull;
use rigidview_world::math::{Bounds, Vec2};

/// Integer-valued points so orientation tests are exact.
fn point() -> impl Strategy<Value = Vec2> {
    (-200i32..200, -200i32..200).prop_map(|(x, y)| Vec2::new(f64::from(x), f64::from(y)))
}

fn cross(o: Vec2, a: Vec2, b: Vec2) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn hull_spans_the_same_box(points in prop::collection::vec(point(), 1..40)) {
        let hull = convex_hull(&points);
        prop_assert!(!hull.is_empty());
        prop_assert_eq!(
            Bounds::from_points(hull.iter().copied()),
            Bounds::from_points(points.iter().copied())
        );
    }

    #[test]
    fn every_point_is_inside_the_hull(points in prop::collection::vec(point(), 3..40)) {
        let hull = convex_hull(&points);
        prop_assume!(hull.len() >= 3);
        for i in 0..hull.len() {
            let a = hull[i];
            let b = hull[(i + 1) % hull.len()];
            for &p in &points {
                prop_assert!(cross(a, b, p) >= 0.0, "{:?} is outside edge {:?}-{:?}", p, a, b);
            }
        }
    }

    #[test]
    fn union_contains_both_boxes(
        a in (point(), point()),
        b in (point(), point()),
    ) {
        let ba = Bounds::from_points([a.0, a.1]);
        let bb = Bounds::from_points([b.0, b.1]);
        let u = ba.union(bb);
        for p in [ba.min, ba.max, bb.min, bb.max] {
            prop_assert!(u.contains(p));
        }
        prop_assert_eq!(Bounds::EMPTY.union(ba), ba);
    }
}
