//! Snapshot tests for user-facing text, using insta inline snapshots.
//!
//! To update snapshots after intentional changes:
//! ```sh
//! cargo insta test --accept
//! ```

use refboard::input::{ImportFailure, ImportReport};
use refboard::{BoardError, DecodeError, ImportError, ItemId, LoadError, WriteError};

fn failure(source: &str, error: impl Into<ImportError>) -> ImportFailure {
    ImportFailure {
        source: source.to_string(),
        error: error.into(),
    }
}

#[test]
fn snapshot_summary_mixed_batch() {
    let report = ImportReport {
        added: vec![ItemId(1), ItemId(3)],
        failures: vec![failure("b.png", DecodeError::CorruptData("bad chunk".to_string()))],
        queued: Vec::new(),
    };
    insta::assert_snapshot!(report.summary(), @"Added 2 images, 1 failed: b.png: corrupt image data: bad chunk");
}

#[test]
fn snapshot_summary_single_image() {
    let report = ImportReport {
        added: vec![ItemId(1)],
        ..Default::default()
    };
    insta::assert_snapshot!(report.summary(), @"Added 1 image");
}

#[test]
fn snapshot_summary_all_failed() {
    let report = ImportReport {
        added: Vec::new(),
        failures: vec![
            failure("notes.txt", DecodeError::UnsupportedFormat("txt".to_string())),
            failure("pasted image", DecodeError::EmptyInput),
        ],
        queued: Vec::new(),
    };
    insta::assert_snapshot!(report.summary(), @"No images added, 2 failed: notes.txt: unsupported image format: txt; pasted image: empty input");
}

#[test]
fn snapshot_error_messages() {
    insta::assert_snapshot!(BoardError::InvalidScale(0.0).to_string(), @"invalid scale 0: scale must be a finite value greater than zero");
    insta::assert_snapshot!(
        LoadError::UnsupportedVersion { found: 4, supported: 1 }.to_string(),
        @"unsupported board format version 4 (this build reads up to 1)"
    );
    insta::assert_snapshot!(WriteError::MissingSourcePath(ItemId(7)).to_string(), @"item#7 has no source file to reference");
    insta::assert_snapshot!(
        ImportError::from(BoardError::UnknownItem(ItemId(2))).to_string(),
        @"rejected by board: no such item: item#2"
    );
}
