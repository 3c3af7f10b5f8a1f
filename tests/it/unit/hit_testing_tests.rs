//! Hit testing through the document's scene index.

use crate::helpers::TestBoardBuilder;
use refboard::{Point, Rect, SceneIndex};

#[test]
fn test_point_inside_single_item() {
    let (doc, ids) = TestBoardBuilder::new()
        .with_item((0.0, 0.0), (100, 100))
        .with_item((500.0, 500.0), (100, 100))
        .build();
    assert_eq!(doc.hit_test(Point::new(50.0, 50.0)), vec![ids[0]]);
    assert_eq!(doc.topmost_at(Point::new(550.0, 550.0)), Some(ids[1]));
    assert!(doc.hit_test(Point::new(300.0, 300.0)).is_empty());
}

#[test]
fn test_overlap_returns_topmost_first() {
    let (mut doc, ids) = TestBoardBuilder::new()
        .with_item((0.0, 0.0), (100, 100))
        .with_item((50.0, 50.0), (100, 100))
        .build();
    let overlap = Point::new(75.0, 75.0);
    assert_eq!(doc.hit_test(overlap), vec![ids[1], ids[0]]);

    doc.bring_to_front(ids[0]).unwrap();
    assert_eq!(doc.hit_test(overlap), vec![ids[0], ids[1]]);
}

#[test]
fn test_scale_changes_footprint() {
    let (mut doc, ids) = TestBoardBuilder::new().with_item((0.0, 0.0), (100, 100)).build();
    assert!(doc.hit_test(Point::new(150.0, 150.0)).is_empty());
    doc.resize_item(ids[0], 2.0).unwrap();
    assert_eq!(doc.hit_test(Point::new(150.0, 150.0)), vec![ids[0]]);
}

#[test]
fn test_rotation_is_exact_not_bounding_box() {
    let (mut doc, ids) = TestBoardBuilder::new().with_item((0.0, 0.0), (100, 10)).build();
    doc.rotate_item(ids[0], 45.0).unwrap();
    // Along the rotated strip
    assert_eq!(doc.hit_test(Point::new(35.0, 40.0)), vec![ids[0]]);
    // Inside the bounding box but off the strip
    assert!(doc.hit_test(Point::new(60.0, 10.0)).is_empty());
}

#[test]
fn test_rect_query_intersects() {
    let (doc, ids) = TestBoardBuilder::new()
        .with_item((0.0, 0.0), (100, 100))
        .with_item((200.0, 0.0), (100, 100))
        .with_item((400.0, 0.0), (100, 100))
        .build();
    let hits = doc.hit_test_rect(&Rect::from_corners(Point::new(90.0, 10.0), Point::new(210.0, 20.0)));
    assert_eq!(hits, vec![ids[1], ids[0]]);
}

#[test]
fn test_scene_index_rebuild_matches_document() {
    let (doc, _) = TestBoardBuilder::new().with_n_items(10).build();
    let rebuilt = SceneIndex::from_items(doc.items().iter().map(|i| (i.id(), i.quad())));
    assert_eq!(rebuilt.len(), doc.scene().len());
    for item in doc.items() {
        assert_eq!(rebuilt.footprint(item.id()), doc.scene().footprint(item.id()));
    }
}
