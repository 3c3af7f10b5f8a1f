//! Save, load, consolidate and relink workflows.

use crate::helpers::{TestBoardBuilder, tempdir, test_controller, write_file, write_png};
use refboard::codec::ImageCrateCodec;
use refboard::{
    AssetStore, BoardDocument, BoardSerializer, BoardSettings, DropPayload, InteractionController, LoadError,
    Point, SaveOptions, WriteError,
};
use std::path::Path;
use std::sync::Arc;

fn serializer() -> BoardSerializer {
    BoardSerializer::new(Arc::new(ImageCrateCodec))
}

fn assert_same_placement(a: &BoardDocument, b: &BoardDocument) {
    assert_eq!(a.len(), b.len());
    for (x, y) in a.items().iter().zip(b.items()) {
        assert_eq!(x.position(), y.position());
        assert_eq!(x.scale(), y.scale());
        assert_eq!(x.rotation(), y.rotation());
        assert_eq!(x.z_order(), y.z_order());
        assert_eq!(x.asset().width(), y.asset().width());
        assert_eq!(x.asset().height(), y.asset().height());
    }
}

fn drop_file(controller: &mut InteractionController, path: &Path, at: (f32, f32)) {
    let report = controller.handle_drop(Point::new(at.0, at.1), vec![DropPayload::file(path)]);
    assert_eq!(report.added.len(), 1, "{}", report.summary());
}

#[test]
fn test_embedded_round_trip() {
    let (mut doc, ids) = TestBoardBuilder::new()
        .with_name("Refs")
        .with_item((0.0, 0.0), (40, 30))
        .with_item((-120.5, 80.25), (10, 60))
        .with_item((300.0, -40.0), (25, 25))
        .with_zoom(0.5)
        .with_pan(12.0, -7.0)
        .build();
    doc.resize_item(ids[0], 2.5).unwrap();
    doc.rotate_item(ids[1], 45.0).unwrap();
    doc.send_to_back(ids[2]).unwrap();

    let bytes = serializer().to_bytes(&doc, &SaveOptions::embedded()).unwrap();
    let loaded = serializer()
        .from_bytes(&bytes, None, &mut AssetStore::new(true))
        .unwrap();

    assert!(loaded.missing.is_empty());
    assert_eq!(loaded.document.name(), "Refs");
    assert_eq!(loaded.document.id(), doc.id());
    assert_eq!(loaded.document.viewport(), doc.viewport());
    assert_same_placement(&doc, &loaded.document);
    assert!(loaded.document.is_consistent());
}

#[test]
fn test_shared_asset_written_once() {
    let mut doc = BoardDocument::new("Shared");
    let asset = crate::helpers::test_asset(8, 8);
    doc.add_item(Arc::clone(&asset), Point::new(0.0, 0.0)).unwrap();
    doc.add_item(asset, Point::new(50.0, 0.0)).unwrap();

    let bytes = serializer().to_bytes(&doc, &SaveOptions::embedded()).unwrap();
    let loaded = serializer()
        .from_bytes(&bytes, None, &mut AssetStore::new(true))
        .unwrap();
    let items = loaded.document.items();
    assert!(Arc::ptr_eq(items[0].asset(), items[1].asset()));
}

#[test]
fn test_referenced_board_survives_moving_folder() {
    let dir = tempdir();
    let project = dir.path().join("project");
    let image = write_png(&project.join("refs"), "a.png", 30, 20);

    let mut controller = test_controller();
    drop_file(&mut controller, &image, (10.0, 10.0));
    let report = controller
        .save_with(&project.join("board.json"), &SaveOptions::referenced())
        .unwrap();
    assert_eq!(report.items, 1);
    assert_eq!(report.files_written, 0);

    let moved = dir.path().join("moved");
    std::fs::rename(&project, &moved).unwrap();

    let mut reopened = test_controller();
    let missing = reopened.load_board(&moved.join("board.json")).unwrap();
    assert!(missing.is_empty());
    let item = &reopened.document().items()[0];
    assert_eq!(item.position(), Point::new(10.0, 10.0));
    assert_eq!((item.asset().width(), item.asset().height()), (30, 20));
    assert!(item.asset().source_path().unwrap().starts_with(&moved));
}

#[test]
fn test_missing_asset_becomes_placeholder_then_relinks() {
    let dir = tempdir();
    let image = write_png(dir.path(), "gone.png", 16, 12);
    let replacement = write_png(&dir.path().join("found"), "gone.png", 16, 12);

    let mut controller = test_controller();
    drop_file(&mut controller, &image, (0.0, 0.0));
    let board = dir.path().join("board.json");
    controller.save_with(&board, &SaveOptions::referenced()).unwrap();
    std::fs::remove_file(&image).unwrap();

    let mut reopened = test_controller();
    let missing = reopened.load_board(&board).unwrap();
    assert_eq!(missing.len(), 1);
    let id = reopened.document().items()[0].id();
    assert_eq!(missing[0].items, vec![id]);
    assert!(missing[0].path.ends_with("gone.png"));
    let placeholder = reopened.document().item(id).unwrap().asset();
    assert!(placeholder.is_missing());
    // Placeholder keeps the recorded dimensions
    assert_eq!((placeholder.width(), placeholder.height()), (16, 12));

    assert_eq!(reopened.relink_item(id, &replacement).unwrap(), 1);
    let asset = reopened.document().item(id).unwrap().asset();
    assert!(!asset.is_missing());
    assert_eq!(asset.source_path(), Some(replacement.as_path()));
    assert!(reopened.is_dirty());
}

#[test]
fn test_saving_placeholder_keeps_reference() {
    let dir = tempdir();
    let image = write_png(dir.path(), "a.png", 8, 8);
    let mut controller = test_controller();
    drop_file(&mut controller, &image, (0.0, 0.0));
    let board = dir.path().join("board.json");
    controller.save_with(&board, &SaveOptions::referenced()).unwrap();
    std::fs::remove_file(&image).unwrap();

    let mut reopened = test_controller();
    assert_eq!(reopened.load_board(&board).unwrap().len(), 1);
    // Embedded policy cannot embed pixels it never had
    reopened.save_with(&board, &SaveOptions::embedded()).unwrap();

    write_png(dir.path(), "a.png", 8, 8);
    let mut third = test_controller();
    assert!(third.load_board(&board).unwrap().is_empty());
}

#[test]
fn test_unsupported_version_leaves_document() {
    let dir = tempdir();
    let image = write_png(dir.path(), "a.png", 8, 8);
    let mut controller = test_controller();
    drop_file(&mut controller, &image, (0.0, 0.0));
    let before = controller.document().snapshot();

    let future = write_file(
        dir.path(),
        "future.json",
        br#"{"format":"refboard","version":99,"items":[]}"#,
    );
    match controller.load_board(&future) {
        Err(LoadError::UnsupportedVersion { found, supported }) => {
            assert_eq!(found, 99);
            assert_eq!(supported, refboard::constants::BOARD_FORMAT_VERSION);
        }
        other => panic!("expected UnsupportedVersion, got {:?}", other.map(|m| m.len())),
    }
    assert_eq!(controller.document().len(), 1);
    assert_eq!(controller.document().snapshot(), before);
    assert_eq!(controller.board_path(), None);
}

#[test]
fn test_corrupt_board_is_rejected_whole() {
    let dir = tempdir();
    let mut controller = test_controller();
    let garbage = write_file(dir.path(), "bad.json", b"{\"format\": \"refboard\", \"version\": 1,");
    assert!(matches!(controller.load_board(&garbage), Err(LoadError::Corrupt(_))));

    let other_format = write_file(dir.path(), "other.json", br#"{"format":"something","version":1}"#);
    assert!(matches!(controller.load_board(&other_format), Err(LoadError::Corrupt(_))));

    let absent = dir.path().join("nope.json");
    assert!(matches!(controller.load_board(&absent), Err(LoadError::Io(_))));
}

#[test]
fn test_failed_save_keeps_previous_file() {
    let dir = tempdir();
    let image = write_png(&dir.path().join("src"), "a.png", 8, 8);
    let mut controller = test_controller();
    drop_file(&mut controller, &image, (0.0, 0.0));
    let board = dir.path().join("board.json");
    controller.save_as(&board).unwrap();
    let saved = std::fs::read(&board).unwrap();

    drop_file(&mut controller, &image, (100.0, 0.0));
    // A plain file where the images folder has to go
    write_file(dir.path(), "board_images", b"in the way");
    let result = controller.save_with(&board, &SaveOptions::consolidated());
    assert!(matches!(result, Err(WriteError::IoFailure(_))));

    assert_eq!(std::fs::read(&board).unwrap(), saved);
    assert!(controller.is_dirty());
}

#[test]
fn test_consolidate_copies_images_beside_board() {
    let dir = tempdir();
    let a = write_png(&dir.path().join("src"), "a.png", 8, 8);
    let b = write_file(&dir.path().join("src"), "b.png", &crate::helpers::png_bytes_shaded(4, 4, 20));
    let mut controller = test_controller();
    drop_file(&mut controller, &a, (0.0, 0.0));
    drop_file(&mut controller, &b, (50.0, 0.0));
    let pasted = controller.handle_paste(vec![DropPayload::bytes(
        crate::helpers::png_bytes_shaded(6, 6, 90),
        Some("image/png"),
    )]);
    assert_eq!(pasted.added.len(), 1);

    let board = dir.path().join("out").join("board.json");
    controller.save_as(&board).unwrap();
    let report = controller.consolidate().unwrap();
    assert_eq!(report.files_written, 3);
    let images = dir.path().join("out").join("board_images");
    assert!(images.join("a.png").exists());
    assert!(images.join("b.png").exists());

    std::fs::remove_dir_all(dir.path().join("src")).unwrap();
    let mut reopened = test_controller();
    assert!(reopened.load_board(&board).unwrap().is_empty());
    assert_eq!(reopened.document().len(), 3);
}

fn asset_sizes(controller: &InteractionController) -> Vec<(u32, u32)> {
    let mut sizes: Vec<_> = controller
        .document()
        .items()
        .iter()
        .map(|item| (item.asset().width(), item.asset().height()))
        .collect();
    sizes.sort();
    sizes
}

#[test]
fn test_consolidate_again_keeps_earlier_copies() {
    let dir = tempdir();
    let first = write_png(&dir.path().join("a"), "photo.png", 8, 8);
    let second = write_file(&dir.path().join("b"), "photo.png", &crate::helpers::png_bytes_shaded(4, 4, 20));
    let board = dir.path().join("out").join("board.json");

    let mut controller = test_controller();
    drop_file(&mut controller, &first, (0.0, 0.0));
    controller.save_as(&board).unwrap();
    controller.consolidate().unwrap();

    let mut reopened = test_controller();
    assert!(reopened.load_board(&board).unwrap().is_empty());
    drop_file(&mut reopened, &second, (50.0, 0.0));
    assert!(reopened.send_selection_to_back());
    let report = reopened.consolidate().unwrap();
    assert_eq!(report.files_written, 1);

    let images = dir.path().join("out").join("board_images");
    assert!(images.join("photo_1.png").exists());
    let mut check = test_controller();
    assert!(check.load_board(&board).unwrap().is_empty());
    assert_eq!(asset_sizes(&check), vec![(4, 4), (8, 8)]);
}

#[test]
fn test_consolidate_same_file_names_in_one_save() {
    let dir = tempdir();
    let first = write_png(&dir.path().join("a"), "photo.png", 8, 8);
    let second = write_file(&dir.path().join("b"), "photo.png", &crate::helpers::png_bytes_shaded(4, 4, 20));
    let board = dir.path().join("board.json");

    let mut controller = test_controller();
    drop_file(&mut controller, &first, (0.0, 0.0));
    drop_file(&mut controller, &second, (50.0, 0.0));
    controller.save_as(&board).unwrap();
    let report = controller.consolidate().unwrap();
    assert_eq!(report.files_written, 2);

    let images = dir.path().join("board_images");
    assert!(images.join("photo.png").exists());
    assert!(images.join("photo_1.png").exists());
    std::fs::remove_dir_all(dir.path().join("a")).unwrap();
    std::fs::remove_dir_all(dir.path().join("b")).unwrap();
    let mut reopened = test_controller();
    assert!(reopened.load_board(&board).unwrap().is_empty());
    assert_eq!(asset_sizes(&reopened), vec![(4, 4), (8, 8)]);
}

#[test]
fn test_load_keeps_path_when_pasted_copy_is_live() {
    let dir = tempdir();
    let bytes = crate::helpers::png_bytes(8, 8);
    let image = write_file(dir.path(), "a.png", &bytes);
    let board = dir.path().join("board.json");

    let mut controller = test_controller();
    drop_file(&mut controller, &image, (0.0, 0.0));
    controller.save_with(&board, &SaveOptions::referenced()).unwrap();

    let mut other = test_controller();
    let pasted = other.handle_paste(vec![DropPayload::bytes(bytes, Some("image/png"))]);
    assert_eq!(pasted.added.len(), 1);
    assert!(other.load_board(&board).unwrap().is_empty());
    let asset = other.document().items()[0].asset();
    assert_eq!(asset.origin(), refboard::AssetOrigin::File);
    assert_eq!(asset.source_path(), Some(std::path::absolute(&image).unwrap().as_path()));

    let resaved = dir.path().join("again.json");
    let report = other.save_with(&resaved, &SaveOptions::referenced()).unwrap();
    assert_eq!(report.files_written, 0);
}

#[test]
fn test_consolidate_requires_saved_board() {
    let mut controller = test_controller();
    assert!(matches!(controller.consolidate(), Err(WriteError::IoFailure(_))));
}

#[test]
fn test_save_defaults_to_boards_dir() {
    let dir = tempdir();
    let mut controller = InteractionController::new(BoardSettings {
        decode_workers: 0,
        boards_dir: Some(dir.path().join("boards")),
        ..Default::default()
    });
    controller.new_board("Mood: June");
    let report = controller.save().unwrap();
    assert_eq!(report.path, dir.path().join("boards").join("Mood__June.json"));
    assert_eq!(controller.board_path(), Some(report.path.as_path()));
    assert!(!controller.is_dirty());
}

#[test]
fn test_load_marks_clean_and_records_path() {
    let dir = tempdir();
    let image = write_png(dir.path(), "a.png", 8, 8);
    let mut controller = test_controller();
    drop_file(&mut controller, &image, (0.0, 0.0));
    assert!(controller.is_dirty());
    let board = dir.path().join("board.json");
    controller.save_as(&board).unwrap();

    let mut reopened = test_controller();
    reopened.load_board(&board).unwrap();
    assert!(!reopened.is_dirty());
    assert_eq!(reopened.board_path(), Some(board.as_path()));
    assert!(reopened.perf_stats().get("board_load").is_some());
}
