//! Codec boundary and payload reading.

use crate::helpers::{corrupt_png, png_bytes, tempdir, write_file, write_png};
use refboard::asset::DecodedImage;
use refboard::codec::{format_from_hint, is_supported_path};
use refboard::{AssetOrigin, DecodeError, DropPayload, ImageCodec, ImageCrateCodec, ImportError};
use std::path::Path;

#[test]
fn test_decode_png_dimensions() {
    let pixels = ImageCrateCodec.decode(&png_bytes(12, 9), None).unwrap();
    assert_eq!(pixels.dimensions(), (12, 9));
}

#[test]
fn test_decode_error_kinds() {
    let codec = ImageCrateCodec;
    assert_eq!(codec.decode(&[], None), Err(DecodeError::EmptyInput));
    assert!(matches!(
        codec.decode(b"plain text", Some("text/plain")),
        Err(DecodeError::UnsupportedFormat(_))
    ));
    assert!(matches!(
        codec.decode(&corrupt_png(), Some("png")),
        Err(DecodeError::CorruptData(_))
    ));
}

#[test]
fn test_hints() {
    assert_eq!(format_from_hint("image/png"), Some(image::ImageFormat::Png));
    assert_eq!(format_from_hint(".JPG"), Some(image::ImageFormat::Jpeg));
    assert_eq!(format_from_hint("nope"), None);
}

#[test]
fn test_supported_extensions() {
    assert!(is_supported_path(Path::new("a.PNG")));
    assert!(is_supported_path(Path::new("dir/b.tiff")));
    assert!(!is_supported_path(Path::new("notes.txt")));
    assert!(!is_supported_path(Path::new("no_extension")));
}

#[test]
fn test_file_payload_keeps_provenance() {
    let dir = tempdir();
    let path = write_png(dir.path(), "ref.png", 4, 6);
    let decoded = DecodedImage::from_payload(DropPayload::file(&path), &ImageCrateCodec).unwrap();
    assert_eq!(decoded.origin, AssetOrigin::File);
    assert_eq!(decoded.source_path.as_deref(), Some(path.as_path()));
    assert_eq!(decoded.pixels.dimensions(), (4, 6));
}

#[test]
fn test_unsupported_extension_skips_read() {
    // The file does not exist: rejection must happen before any IO.
    let err = DecodedImage::from_payload(DropPayload::file("/nowhere/readme.txt"), &ImageCrateCodec)
        .err()
        .unwrap();
    assert!(matches!(err.decode_error(), Some(DecodeError::UnsupportedFormat(_))));
}

#[test]
fn test_unreadable_file_is_read_error() {
    let dir = tempdir();
    let err = DecodedImage::from_payload(DropPayload::file(dir.path().join("gone.png")), &ImageCrateCodec)
        .err()
        .unwrap();
    assert!(matches!(err, ImportError::Read { .. }));
    assert!(err.decode_error().is_none());
}

#[test]
fn test_misnamed_file_decodes_by_content() {
    let dir = tempdir();
    let path = write_file(dir.path(), "actually_png.jpg", &png_bytes(3, 3));
    let decoded = DecodedImage::from_payload(DropPayload::file(path), &ImageCrateCodec).unwrap();
    assert_eq!(decoded.pixels.dimensions(), (3, 3));
}
