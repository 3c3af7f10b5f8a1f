//! Placement algebra: move, resize, rotate and handle scaling.

use crate::helpers::{TestBoardBuilder, assert_close, assert_point_close};
use refboard::board::{handle_scale, normalize_rotation};
use refboard::constants::{MAX_HANDLE_SCALE, MIN_HANDLE_SCALE};
use refboard::{BoardError, Corner, Point};

#[test]
fn test_move_anywhere() {
    let (mut doc, ids) = TestBoardBuilder::new().with_item((0.0, 0.0), (10, 10)).build();
    doc.move_item(ids[0], -5_000.0, 12_000.0).unwrap();
    assert_eq!(doc.item(ids[0]).unwrap().position(), Point::new(-5_000.0, 12_000.0));
    assert_eq!(
        doc.move_item(ids[0], f32::NAN, 0.0),
        Err(BoardError::InvalidPosition)
    );
}

#[test]
fn test_resize_rejects_non_positive() {
    let (mut doc, ids) = TestBoardBuilder::new().with_item((0.0, 0.0), (10, 10)).build();
    assert_eq!(doc.resize_item(ids[0], 0.0), Err(BoardError::InvalidScale(0.0)));
    assert_eq!(doc.resize_item(ids[0], -1.0), Err(BoardError::InvalidScale(-1.0)));
    assert!(doc.resize_item(ids[0], f32::INFINITY).is_err());
    assert_eq!(doc.item(ids[0]).unwrap().scale(), 1.0);
}

#[test]
fn test_rotation_normalizes() {
    assert_eq!(normalize_rotation(370.0), Some(10.0));
    assert_eq!(normalize_rotation(-90.0), Some(270.0));
    assert_eq!(normalize_rotation(360.0), Some(0.0));
    assert_eq!(normalize_rotation(f32::NAN), None);

    let (mut doc, ids) = TestBoardBuilder::new().with_item((0.0, 0.0), (10, 10)).build();
    doc.rotate_item(ids[0], -450.0).unwrap();
    assert_close(doc.item(ids[0]).unwrap().rotation(), 270.0);
    assert_eq!(
        doc.rotate_item(ids[0], f32::INFINITY),
        Err(BoardError::InvalidRotation(f32::INFINITY))
    );
}

#[test]
fn test_resize_about_keeps_anchor() {
    let (mut doc, ids) = TestBoardBuilder::new().with_item((100.0, 100.0), (40, 20)).build();
    let anchor = doc.item(ids[0]).unwrap().corner_position(Corner::BottomRight);
    doc.resize_item_about(ids[0], Corner::BottomRight, 2.0).unwrap();
    let item = doc.item(ids[0]).unwrap();
    assert_point_close(item.corner_position(Corner::BottomRight), anchor);
    assert_point_close(item.position(), Point::new(60.0, 80.0));
    assert_eq!(item.display_size(), (80.0, 40.0));
}

#[test]
fn test_resize_about_rotated_item() {
    let (mut doc, ids) = TestBoardBuilder::new().with_item((0.0, 0.0), (30, 10)).build();
    doc.rotate_item(ids[0], 30.0).unwrap();
    let anchor = doc.item(ids[0]).unwrap().corner_position(Corner::TopRight);
    doc.resize_item_about(ids[0], Corner::TopRight, 0.5).unwrap();
    assert_point_close(doc.item(ids[0]).unwrap().corner_position(Corner::TopRight), anchor);
}

#[test]
fn test_handle_scale_ratio_and_clamp() {
    let anchor = Point::new(0.0, 0.0);
    let start = Point::new(10.0, 0.0);
    assert_close(handle_scale(1.0, anchor, start, Point::new(20.0, 0.0)), 2.0);
    assert_close(handle_scale(2.0, anchor, start, Point::new(5.0, 0.0)), 1.0);
    assert_eq!(handle_scale(1.0, anchor, start, Point::new(10_000.0, 0.0)), MAX_HANDLE_SCALE);
    assert_eq!(handle_scale(1.0, anchor, start, anchor), MIN_HANDLE_SCALE);
    // Degenerate handle keeps the starting scale
    assert_eq!(handle_scale(1.5, anchor, anchor, Point::new(3.0, 3.0)), 1.5);
}

#[test]
fn test_move_items_all_or_nothing() {
    let (mut doc, ids) = TestBoardBuilder::new().with_n_items(2).build();
    let missing = refboard::ItemId(999);
    assert!(doc.move_items(&[ids[0], missing], 10.0, 10.0).is_err());
    assert_eq!(doc.item(ids[0]).unwrap().position(), Point::new(0.0, 0.0));
    doc.move_items(&ids, 10.0, 5.0).unwrap();
    assert_eq!(doc.item(ids[1]).unwrap().position(), Point::new(110.0, 5.0));
}

#[test]
fn test_move_items_overflow_moves_nothing() {
    let (mut doc, ids) = TestBoardBuilder::new()
        .with_item((0.0, 0.0), (10, 10))
        .with_item((3.0e38, 0.0), (10, 10))
        .build();
    assert!(matches!(
        doc.move_items(&ids, 1.0e38, 0.0),
        Err(BoardError::InvalidPosition)
    ));
    assert_eq!(doc.item(ids[0]).unwrap().position(), Point::new(0.0, 0.0));
    assert_eq!(doc.item(ids[1]).unwrap().position(), Point::new(3.0e38, 0.0));
}
