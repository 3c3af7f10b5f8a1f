//! Drop and paste import.
//!
//! Each payload of a batch is submitted to the decode queue on its own, so
//! one bad file never blocks the rest. Finished decodes are applied by
//! [`process_decodes`](InteractionController::process_decodes), which the
//! host calls from its event loop; drop and paste call it once themselves so
//! inline decodes land immediately.
//!
//! A completion is discarded silently when its ticket was cancelled or the
//! document it was aimed at has since been replaced.

use crate::app::InteractionController;
use crate::app::state::PendingImport;
use crate::asset::{DecodedImage, DropPayload, SharedAsset};
use crate::decode_queue::{DecodeCompletion, DecodeTicket};
use crate::error::{BoardResult, ImportError};
use crate::input::coords::CoordinateConverter;
use crate::types::{ItemId, Point};
use std::time::Duration;
use tracing::{debug, info, warn};

/// One payload that did not become an item.
#[derive(Debug)]
pub struct ImportFailure {
    /// File path or clipboard description
    pub source: String,
    pub error: ImportError,
}

/// Outcome of a drop or paste, or of applying queued decodes.
#[derive(Debug, Default)]
pub struct ImportReport {
    /// New items, in placement order
    pub added: Vec<ItemId>,
    pub failures: Vec<ImportFailure>,
    /// Decodes still running
    pub queued: Vec<DecodeTicket>,
}

impl ImportReport {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.failures.is_empty() && self.queued.is_empty()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Fold a later report into this one.
    pub fn merge(&mut self, other: ImportReport) {
        self.added.extend(other.added);
        self.failures.extend(other.failures);
        self.queued = other.queued;
    }

    /// One line for the host to show the user.
    pub fn summary(&self) -> String {
        let mut line = match self.added.len() {
            0 => "No images added".to_string(),
            1 => "Added 1 image".to_string(),
            n => format!("Added {} images", n),
        };
        if !self.failures.is_empty() {
            let details: Vec<String> = self
                .failures
                .iter()
                .map(|f| format!("{}: {}", f.source, f.error))
                .collect();
            line.push_str(&format!(", {} failed: {}", self.failures.len(), details.join("; ")));
        }
        if !self.queued.is_empty() {
            line.push_str(&format!(", {} still decoding", self.queued.len()));
        }
        line
    }
}

impl InteractionController {
    /// Payloads dropped at `screen`. Items cascade down-right from the drop point.
    pub fn handle_drop(&mut self, screen: Point, payloads: Vec<DropPayload>) -> ImportReport {
        self.canvas.last_pointer = Some(screen);
        let anchor = self.screen_to_canvas(screen);
        let tickets = self.submit_imports(payloads, anchor, false);
        debug!(count = tickets.len(), "Drop received");
        self.process_decodes()
    }

    /// Clipboard images pasted. They land under the last known pointer
    /// position, or centred in the view if there is none.
    pub fn handle_paste(&mut self, payloads: Vec<DropPayload>) -> ImportReport {
        let (anchor, centered) = match self.canvas.last_pointer {
            Some(screen) => (self.screen_to_canvas(screen), false),
            None => {
                let (w, h) = self.canvas.surface_size;
                let visible = CoordinateConverter::visible_canvas_rect(self.canvas.document.viewport(), w, h);
                (visible.center(), true)
            }
        };
        let tickets = self.submit_imports(payloads, anchor, centered);
        let report = self.process_decodes();

        if self.canvas.input_state.is_idle() {
            if let Some(&ticket) = tickets.iter().find(|t| self.imports.pending.contains_key(*t)) {
                self.canvas.input_state.start_pasting(ticket);
                debug!(?ticket, "Paste decoding in background");
            }
        }
        report
    }

    fn submit_imports(&mut self, payloads: Vec<DropPayload>, anchor: Point, centered: bool) -> Vec<DecodeTicket> {
        let generation = self.imports.generation;
        let mut tickets = Vec::with_capacity(payloads.len());
        for (index, payload) in payloads.into_iter().enumerate() {
            let ticket = self.ensure_queue().submit(payload);
            self.imports.pending.insert(
                ticket,
                PendingImport {
                    generation,
                    anchor,
                    index,
                    centered,
                },
            );
            tickets.push(ticket);
        }
        tickets
    }

    /// Apply every finished decode. Never blocks.
    pub fn process_decodes(&mut self) -> ImportReport {
        let completions = match self.imports.queue.as_mut() {
            Some(queue) => queue.drain(),
            None => Vec::new(),
        };
        self.apply_completions(completions)
    }

    /// Wait up to `timeout` for outstanding decodes, then apply them.
    pub fn finish_imports(&mut self, timeout: Duration) -> ImportReport {
        let completions = match self.imports.queue.as_mut() {
            Some(queue) => queue.drain_until_idle(timeout),
            None => Vec::new(),
        };
        self.apply_completions(completions)
    }

    /// Drop one outstanding decode. Its result will never be applied.
    pub fn cancel_import(&mut self, ticket: DecodeTicket) -> bool {
        if self.imports.pending.remove(&ticket).is_none() {
            return false;
        }
        if let Some(queue) = self.imports.queue.as_mut() {
            queue.cancel(ticket);
        }
        if self.canvas.input_state.paste_ticket() == Some(ticket) {
            self.canvas.input_state.reset();
        }
        true
    }

    pub fn cancel_pending_imports(&mut self) {
        if let Some(queue) = self.imports.queue.as_mut() {
            queue.cancel_all();
        }
        if !self.imports.pending.is_empty() {
            debug!(count = self.imports.pending.len(), "Cancelled pending imports");
        }
        self.imports.pending.clear();
        if self.canvas.input_state.is_pasting() {
            self.canvas.input_state.reset();
        }
    }

    fn apply_completions(&mut self, completions: Vec<DecodeCompletion>) -> ImportReport {
        let mut report = ImportReport::default();
        for completion in completions {
            let Some(pending) = self.imports.pending.remove(&completion.ticket) else {
                debug!(ticket = ?completion.ticket, "Discarding decode with no pending import");
                continue;
            };
            if pending.generation != self.imports.generation {
                debug!(ticket = ?completion.ticket, "Discarding decode for a replaced board");
                continue;
            }
            self.perf.record("decode", completion.elapsed_ms);

            let placed = completion
                .result
                .and_then(|decoded| self.place_decoded(decoded, pending).map_err(ImportError::from));
            match placed {
                Ok(id) => report.added.push(id),
                Err(error) => {
                    warn!(source = %completion.label, error = %error, "Import failed");
                    report.failures.push(ImportFailure {
                        source: completion.label,
                        error,
                    });
                }
            }
        }

        if let Some(ticket) = self.canvas.input_state.paste_ticket() {
            if !self.imports.pending.contains_key(&ticket) {
                self.canvas.input_state.reset();
            }
        }
        if !report.added.is_empty() {
            self.mark_dirty();
        }
        if !report.added.is_empty() || !report.failures.is_empty() {
            info!(
                added = report.added.len(),
                failed = report.failures.len(),
                pending = self.imports.pending.len(),
                "Imported images"
            );
        }
        let mut queued: Vec<DecodeTicket> = self.imports.pending.keys().copied().collect();
        queued.sort();
        report.queued = queued;
        report
    }

    /// Put a decoded image on top of the board and select it exclusively.
    fn place_decoded(&mut self, decoded: DecodedImage, pending: PendingImport) -> BoardResult<ItemId> {
        let asset = self.share_decoded(decoded);
        let cascade = self.session.settings.drop_cascade_offset * pending.index as f32;
        let mut position = pending.anchor + Point::new(cascade, cascade);
        if pending.centered {
            position = position - Point::new(asset.width() as f32 / 2.0, asset.height() as f32 / 2.0);
        }
        let doc = &mut self.canvas.document;
        let id = doc.add_item(asset, position)?;
        doc.select(id, false)?;
        Ok(id)
    }

    /// Reuse a live asset decoded from the same bytes, or share this one.
    pub(crate) fn share_decoded(&mut self, decoded: DecodedImage) -> SharedAsset {
        if let Some(existing) = self.imports.assets.lookup(&decoded.hash) {
            debug!(hash = %decoded.hash.short(), asset = %existing.id(), "Reusing decoded asset");
            return existing;
        }
        self.imports.assets.insert(decoded.into_asset())
    }
}
