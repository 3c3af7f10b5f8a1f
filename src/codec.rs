//! Image codec boundary.
//!
//! The engine never touches image formats directly. Everything goes through
//! [`ImageCodec`], which turns encoded bytes into an RGBA raster and back
//! into PNG for embedding. [`ImageCrateCodec`] is the default implementation
//! on top of the `image` crate.

use crate::constants::SUPPORTED_EXTENSIONS;
use crate::error::{DecodeError, WriteError};
use image::{ImageError, ImageFormat, ImageReader, RgbaImage};
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;

static SUPPORTED: Lazy<HashSet<&'static str>> =
    Lazy::new(|| SUPPORTED_EXTENSIONS.iter().copied().collect());

/// Turns encoded bytes into rasters. Shared with decode workers, so `Send + Sync`.
pub trait ImageCodec: Send + Sync {
    /// Decode `bytes`. `hint` is a file extension or MIME type used when the
    /// format cannot be sniffed from the data itself.
    fn decode(&self, bytes: &[u8], hint: Option<&str>) -> Result<RgbaImage, DecodeError>;

    /// Encode a raster as PNG for embedding in board files.
    fn encode_png(&self, pixels: &RgbaImage) -> Result<Vec<u8>, WriteError>;
}

/// Default codec backed by the `image` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageCrateCodec;

impl ImageCodec for ImageCrateCodec {
    fn decode(&self, bytes: &[u8], hint: Option<&str>) -> Result<RgbaImage, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::EmptyInput);
        }

        let mut reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| DecodeError::CorruptData(e.to_string()))?;

        if reader.format().is_none() {
            match hint.and_then(format_from_hint) {
                Some(format) => reader.set_format(format),
                None => {
                    return Err(DecodeError::UnsupportedFormat(
                        hint.unwrap_or("unrecognised data").to_string(),
                    ));
                }
            }
        }

        let image = reader.decode().map_err(map_image_error)?;
        if image.width() == 0 || image.height() == 0 {
            return Err(DecodeError::CorruptData("zero-sized image".to_string()));
        }
        Ok(image.to_rgba8())
    }

    fn encode_png(&self, pixels: &RgbaImage) -> Result<Vec<u8>, WriteError> {
        let mut buf = Vec::new();
        pixels
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .map_err(|e| WriteError::Encode(e.to_string()))?;
        Ok(buf)
    }
}

fn map_image_error(error: ImageError) -> DecodeError {
    match error {
        ImageError::Unsupported(e) => DecodeError::UnsupportedFormat(e.to_string()),
        other => DecodeError::CorruptData(other.to_string()),
    }
}

/// Resolve an extension ("png") or MIME type ("image/png") to a format.
pub fn format_from_hint(hint: &str) -> Option<ImageFormat> {
    let hint = hint.trim().to_ascii_lowercase();
    if hint.contains('/') {
        ImageFormat::from_mime_type(&hint)
    } else {
        ImageFormat::from_extension(hint.trim_start_matches('.'))
    }
}

/// Lowercased extension of `path`, used as the decode hint for dropped files.
pub fn format_hint_for_path(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Whether a dropped file looks like a raster the board accepts.
pub fn is_supported_path(path: &Path) -> bool {
    format_hint_for_path(path)
        .map(|ext| SUPPORTED.contains(ext.as_str()))
        .unwrap_or(false)
}
