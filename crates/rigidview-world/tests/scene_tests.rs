//! Tests for loading worlds from JSON scene descriptions.

use rigidview_world::prelude::*;

const SCENE: &str = r##"{
    "bodies": [
        {
            "id": 1,
            "position": { "x": 50, "y": 50 },
            "isStatic": true,
            "parts": [{
                "id": 1,
                "position": { "x": 50, "y": 50 },
                "vertices": [
                    { "x": 40, "y": 40 }, { "x": 60, "y": 40, "isInternal": true },
                    { "x": 60, "y": 60 }, { "x": 40, "y": 60 }
                ],
                "style": { "fill": "#ff0000", "opacity": 0.5 }
            }]
        },
        {
            "id": 2,
            "position": { "x": 200, "y": 100 },
            "isSleeping": true,
            "parts": [{ "id": 2, "position": { "x": 200, "y": 100 }, "circleRadius": 15 }]
        }
    ],
    "constraints": [
        { "id": 7, "bodyA": 1, "bodyB": 2, "length": 150 }
    ],
    "pairs": [
        { "bodyA": 1, "bodyB": 2, "isActive": true, "contacts": [{ "x": 60, "y": 50 }] }
    ],
    "grid": { "bucketWidth": 48, "bucketHeight": 48, "buckets": [{ "column": 1, "row": 1, "occupants": 2 }] },
    "timing": { "timestamp": 1000, "delta": 16 },
    "metrics": { "fps": 60, "collisions": 1 }
}"##;

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[test]
fn scene_loads_with_derived_geometry() {
    let world = World::from_json(SCENE).unwrap();
    assert_eq!(world.bodies().len(), 2);
    assert_eq!(world.constraints().len(), 1);
    assert_eq!(world.pairs().len(), 1);
    assert_eq!(world.timing.timestamp, 1000.0);
    assert_eq!(world.metrics.collisions, 1);
    assert_eq!(world.grid().map(|g| g.buckets.len()), Some(1));

    let ground = world.body(BodyId(1)).unwrap();
    assert!(ground.is_static);
    assert_eq!(ground.bounds, Bounds::new(Vec2::new(40.0, 40.0), Vec2::new(60.0, 60.0)));
    assert!(ground.parts[0].vertices[1].is_internal);
    assert_eq!(ground.parts[0].style.fill, Some(Color::rgb(255, 0, 0)));
    assert_eq!(ground.parts[0].style.opacity, 0.5);
    assert_eq!(ground.parts[0].axes.len(), 2);

    // Circles without an outline get bounds from their radius.
    let ball = world.body(BodyId(2)).unwrap();
    assert!(ball.is_sleeping);
    assert!(ball.visible);
    assert_eq!(ball.bounds.min, Vec2::new(185.0, 85.0));
    assert_eq!(ball.bounds.max, Vec2::new(215.0, 115.0));
}

#[test]
fn duplicate_body_ids_are_rejected() {
    let json = r#"{ "bodies": [
        { "id": 1, "position": { "x": 0, "y": 0 }, "parts": [] },
        { "id": 1, "position": { "x": 5, "y": 5 }, "parts": [] }
    ] }"#;
    let err = World::from_json(json).unwrap_err();
    assert!(matches!(err, WorldError::DuplicateBody(BodyId(1))));
}

#[test]
fn dangling_references_are_rejected() {
    let json = r#"{
        "bodies": [{ "id": 1, "position": { "x": 0, "y": 0 }, "parts": [] }],
        "constraints": [{ "id": 1, "bodyA": 1, "bodyB": 9 }]
    }"#;
    let err = World::from_json(json).unwrap_err();
    assert!(matches!(
        err,
        WorldError::UnknownBody { id: BodyId(9), context: "constraint" }
    ));

    let json = r#"{
        "bodies": [{ "id": 1, "position": { "x": 0, "y": 0 }, "parts": [] }],
        "pairs": [{ "bodyA": 4, "bodyB": 1 }]
    }"#;
    let err = World::from_json(json).unwrap_err();
    assert!(matches!(err, WorldError::UnknownBody { id: BodyId(4), context: "pair" }));
}

#[test]
fn malformed_json_is_a_scene_error() {
    let err = World::from_json("{ \"bodies\": 3 }").unwrap_err();
    assert!(matches!(err, WorldError::Scene(_)));
    assert!(err.to_string().starts_with("failed to parse scene"));
}

// ---------------------------------------------------------------------------
// Mutation
// ---------------------------------------------------------------------------

#[test]
fn removing_a_body_drops_its_links_and_queues_a_notification() {
    let mut world = World::from_json(SCENE).unwrap();
    assert!(world.remove_body(BodyId(2)).is_some());
    assert!(world.constraints().is_empty());
    assert!(world.pairs().is_empty());
    assert_eq!(world.drain_removed(), vec![BodyId(2)]);
    assert!(world.drain_removed().is_empty());
    assert!(world.remove_body(BodyId(2)).is_none());
}
