//! Board management methods - new, load, save, consolidate, clear, relink.
//!
//! Save and load run to completion on the interaction thread while the
//! controller is mutably borrowed, so no input event can reach the document
//! in the middle of one.

use super::InteractionController;
use crate::asset::{DecodedImage, DropPayload};
use crate::board::BoardDocument;
use crate::board_file::{MissingAsset, SaveOptions, SaveReport};
use crate::constants::BOARD_FILE_EXTENSION;
use crate::error::{BoardError, ImportError, LoadError, WriteError};
use crate::perf::measure;
use crate::types::ItemId;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

impl InteractionController {
    /// Start over with an empty, unsaved board.
    pub fn new_board(&mut self, name: impl Into<String>) {
        let name = name.into();
        let name = if name.trim().is_empty() {
            crate::constants::DEFAULT_BOARD_NAME.to_string()
        } else {
            name.trim().to_string()
        };
        info!(name = %name, "New board");
        self.install_document(BoardDocument::new(name));
        self.session.board_path = None;
        self.session.dirty = false;
    }

    /// Replace the current board with the one stored at `path`.
    ///
    /// On error the current document is left exactly as it was. On success
    /// the returned list names every asset that had to be replaced by a
    /// placeholder.
    pub fn load_board(&mut self, path: &Path) -> Result<Vec<MissingAsset>, LoadError> {
        let (loaded, elapsed_ms) = measure(|| {
            self.session
                .serializer
                .load_from_path(path, &mut self.imports.assets)
        });
        self.perf.record("board_load", elapsed_ms);
        let loaded = match loaded {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Board load failed");
                return Err(e);
            }
        };

        self.install_document(loaded.document);
        self.session.board_path = Some(std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf()));
        self.session.dirty = false;
        Ok(loaded.missing)
    }

    /// Save with the configured policy to the board's file, or to a new
    /// file in the boards directory if it has never been saved.
    pub fn save(&mut self) -> Result<SaveReport, WriteError> {
        let path = match &self.session.board_path {
            Some(path) => path.clone(),
            None => self.default_board_path()?,
        };
        let options = SaveOptions {
            policy: self.session.settings.asset_policy,
            consolidate: false,
        };
        self.save_with(&path, &options)
    }

    pub fn save_as(&mut self, path: &Path) -> Result<SaveReport, WriteError> {
        let options = SaveOptions {
            policy: self.session.settings.asset_policy,
            consolidate: false,
        };
        self.save_with(path, &options)
    }

    /// Save to `path` with explicit options. The path becomes the board's file.
    pub fn save_with(&mut self, path: &Path, options: &SaveOptions) -> Result<SaveReport, WriteError> {
        let (report, elapsed_ms) = measure(|| {
            self.session
                .serializer
                .save_to_path(&self.canvas.document, path, options)
        });
        self.perf.record("board_save", elapsed_ms);
        let report = report.inspect_err(|e| warn!(path = %path.display(), error = %e, "Board save failed"))?;
        self.session.board_path = Some(report.path.clone());
        self.session.dirty = false;
        Ok(report)
    }

    /// Copy every referenced image next to the saved board and save again
    /// pointing at the copies.
    pub fn consolidate(&mut self) -> Result<SaveReport, WriteError> {
        let path = self.session.board_path.clone().ok_or_else(|| {
            WriteError::IoFailure(io::Error::new(
                io::ErrorKind::NotFound,
                "board has not been saved yet",
            ))
        })?;
        self.save_with(&path, &SaveOptions::consolidated())
    }

    fn default_board_path(&self) -> Result<PathBuf, WriteError> {
        let dir = self.session.settings.boards_dir().ok_or_else(|| {
            WriteError::IoFailure(io::Error::new(
                io::ErrorKind::NotFound,
                "no boards directory available",
            ))
        })?;
        std::fs::create_dir_all(&dir)?;
        let stem = file_stem_for(self.canvas.document.name());
        Ok(dir.join(format!("{}.{}", stem, BOARD_FILE_EXTENSION)))
    }

    /// Remove every item. Returns how many were removed.
    pub fn clear_all(&mut self) -> usize {
        self.canvas.input_state.reset();
        self.canvas.gesture_snapshot = None;
        let removed = self.canvas.document.clear().len();
        self.imports.assets.purge();
        if removed > 0 {
            self.mark_dirty();
            info!(items = removed, "Cleared board");
        }
        removed
    }

    /// Re-decode the asset behind `id` from `path`.
    ///
    /// Every item showing the same asset is switched over, so relinking one
    /// copy of a missing image fixes all of them. Returns how many items
    /// changed.
    pub fn relink_item(&mut self, id: ItemId, path: &Path) -> Result<usize, ImportError> {
        let old = self
            .canvas
            .document
            .item(id)
            .map(|item| Arc::clone(item.asset()))
            .ok_or(BoardError::UnknownItem(id))?;

        let decoded = DecodedImage::from_payload(DropPayload::file(path), self.session.codec.as_ref())?;
        let asset = self.share_decoded(decoded);

        let targets: Vec<ItemId> = self
            .canvas
            .document
            .items()
            .iter()
            .filter(|item| Arc::ptr_eq(item.asset(), &old))
            .map(|item| item.id())
            .collect();
        for &target in &targets {
            self.canvas.document.replace_asset(target, Arc::clone(&asset))?;
        }
        drop(old);
        self.imports.assets.purge();
        self.mark_dirty();
        info!(item = %id, path = %path.display(), items = targets.len(), "Relinked asset");
        Ok(targets.len())
    }
}

/// File name for a board called `name`.
fn file_stem_for(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    let stem = stem.trim_matches('_');
    if stem.is_empty() {
        "board".to_string()
    } else {
        stem.to_string()
    }
}
