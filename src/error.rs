//! Error types for the board engine.
//!
//! Every failure in this crate is recoverable at the board level. The
//! enums here mirror the places a failure can surface:
//! - `DecodeError`: the codec boundary could not produce a raster
//! - `ImportError`: a dropped or pasted payload could not become an item
//! - `BoardError`: a placement operation was rejected
//! - `LoadError` / `WriteError`: board persistence failed as a whole

use crate::types::ItemId;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the image codec boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The bytes are not in a format the codec understands
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// The format was recognised but the data could not be decoded
    #[error("corrupt image data: {0}")]
    CorruptData(String),

    /// Nothing to decode
    #[error("empty input")]
    EmptyInput,
}

/// A single dropped or pasted payload that did not make it onto the board.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Decoded fine, but the board refused the placement
    #[error("rejected by board: {0}")]
    Rejected(#[from] BoardError),
}

impl ImportError {
    /// The decode failure behind this error, if it was one.
    pub fn decode_error(&self) -> Option<&DecodeError> {
        match self {
            ImportError::Decode(e) => Some(e),
            ImportError::Read { .. } | ImportError::Rejected(_) => None,
        }
    }
}

/// Errors from the placement algebra.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoardError {
    #[error("invalid scale {0}: scale must be a finite value greater than zero")]
    InvalidScale(f32),

    #[error("invalid rotation {0}: rotation must be finite")]
    InvalidRotation(f32),

    #[error("invalid position: coordinates must be finite")]
    InvalidPosition,

    #[error("no such item: {0}")]
    UnknownItem(ItemId),
}

/// Document-level load failures. Nothing is applied when one of these is returned.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("corrupt board file: {0}")]
    Corrupt(String),

    #[error("unsupported board format version {found} (this build reads up to {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for LoadError {
    fn from(e: serde_json::Error) -> Self {
        LoadError::Corrupt(e.to_string())
    }
}

/// Save failures. The previously persisted file is left untouched.
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("IO failure: {0}")]
    IoFailure(#[from] std::io::Error),

    #[error("failed to encode board: {0}")]
    Encode(String),

    #[error("{0} has no source file to reference")]
    MissingSourcePath(ItemId),
}

impl From<serde_json::Error> for WriteError {
    fn from(e: serde_json::Error) -> Self {
        WriteError::Encode(e.to_string())
    }
}

/// Result type alias for placement operations
pub type BoardResult<T> = Result<T, BoardError>;
