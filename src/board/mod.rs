//! Board document - the aggregate root of the engine.
//!
//! A [`BoardDocument`] owns every [`BoardItem`] on a board together with the
//! board name and viewport. Items are stored in a `Vec` ordered by z order,
//! so an item's z order is always its index; every operation that reorders
//! or removes items renormalizes before returning.
//!
//! The document also owns its [`SceneIndex`]. Every mutation that moves an
//! item updates the index before returning, so hit tests never observe a
//! stale footprint.

mod item;

pub use item::{BoardItem, handle_scale, normalize_rotation};

use crate::asset::SharedAsset;
use crate::constants::{DEFAULT_BOARD_NAME, GRID_COLUMNS, GRID_SPACING};
use crate::error::{BoardError, BoardResult};
use crate::profile_scope;
use crate::spatial_index::SceneIndex;
use crate::types::{Corner, ItemId, Point, Rect, SelectionMode, Viewport};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Placement and selection of every item, captured at gesture start.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlacementSnapshot {
    entries: Vec<SnapshotEntry>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct SnapshotEntry {
    id: ItemId,
    position: Point,
    scale: f32,
    rotation: f32,
    selected: bool,
}

impl PlacementSnapshot {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub struct BoardDocument {
    id: Uuid,
    name: String,
    viewport: Viewport,
    items: Vec<BoardItem>,
    index_by_id: HashMap<ItemId, usize>,
    scene: SceneIndex,
    selection_mode: SelectionMode,
    next_item_id: u64,
}

impl Default for BoardDocument {
    fn default() -> Self {
        Self::new(DEFAULT_BOARD_NAME)
    }
}

impl BoardDocument {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            viewport: Viewport::default(),
            items: Vec::new(),
            index_by_id: HashMap::new(),
            scene: SceneIndex::new(),
            selection_mode: SelectionMode::default(),
            next_item_id: 1,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        if viewport.is_valid() {
            self.viewport = viewport;
        }
    }

    pub fn selection_mode(&self) -> SelectionMode {
        self.selection_mode
    }

    /// Switching to single-select keeps only the topmost selected item.
    pub fn set_selection_mode(&mut self, mode: SelectionMode) {
        self.selection_mode = mode;
        if mode == SelectionMode::Single {
            let mut kept = false;
            for item in self.items.iter_mut().rev() {
                if item.selected {
                    item.selected = !kept;
                    kept = true;
                }
            }
        }
    }

    // ------------------------------------------------------------------------
    // Item access
    // ------------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items bottom to top.
    pub fn items(&self) -> &[BoardItem] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&BoardItem> {
        self.index_by_id.get(&id).map(|&i| &self.items[i])
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.index_by_id.contains_key(&id)
    }

    pub fn scene(&self) -> &SceneIndex {
        &self.scene
    }

    /// Distinct assets referenced by the board.
    pub fn assets(&self) -> Vec<SharedAsset> {
        let mut seen = HashSet::new();
        self.items
            .iter()
            .filter(|item| seen.insert(item.asset().id()))
            .map(|item| Arc::clone(item.asset()))
            .collect()
    }

    fn index_of(&self, id: ItemId) -> BoardResult<usize> {
        self.index_by_id
            .get(&id)
            .copied()
            .ok_or(BoardError::UnknownItem(id))
    }

    /// Reassign z orders from vec positions and refresh the id lookup.
    fn renormalize(&mut self) {
        self.index_by_id.clear();
        for (i, item) in self.items.iter_mut().enumerate() {
            item.z_order = i;
            self.index_by_id.insert(item.id(), i);
        }
    }

    fn reindex_item(&mut self, index: usize) {
        let item = &self.items[index];
        self.scene.upsert(item.id(), item.quad());
    }

    fn with_item<T>(
        &mut self,
        id: ItemId,
        f: impl FnOnce(&mut BoardItem) -> BoardResult<T>,
    ) -> BoardResult<T> {
        let index = self.index_of(id)?;
        let result = f(&mut self.items[index])?;
        self.reindex_item(index);
        Ok(result)
    }

    // ------------------------------------------------------------------------
    // Adding and removing
    // ------------------------------------------------------------------------

    /// Place `asset` at `position` on top of every other item.
    pub fn add_item(&mut self, asset: SharedAsset, position: Point) -> BoardResult<ItemId> {
        if !position.is_finite() {
            return Err(BoardError::InvalidPosition);
        }
        let id = ItemId(self.next_item_id);
        self.next_item_id += 1;

        let mut item = BoardItem::new(id, asset, position);
        item.z_order = self.items.len();
        self.scene.upsert(id, item.quad());
        self.index_by_id.insert(id, self.items.len());
        self.items.push(item);
        debug!(item = %id, "added item");
        Ok(id)
    }

    /// Remove the given items. Unknown ids are ignored.
    ///
    /// Returns the removed items; dropping them releases their assets.
    pub fn remove_items(&mut self, ids: &[ItemId]) -> Vec<BoardItem> {
        let doomed: HashSet<ItemId> = ids.iter().copied().collect();
        if doomed.is_empty() {
            return Vec::new();
        }
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.items)
            .into_iter()
            .partition(|item| doomed.contains(&item.id()));
        self.items = kept;
        for item in &removed {
            self.scene.remove(item.id());
        }
        self.renormalize();
        if !removed.is_empty() {
            debug!(count = removed.len(), "removed items");
        }
        removed
    }

    pub fn remove_selected(&mut self) -> Vec<BoardItem> {
        let ids = self.selected_ids();
        self.remove_items(&ids)
    }

    /// Remove every item.
    pub fn clear(&mut self) -> Vec<BoardItem> {
        self.scene.clear();
        self.index_by_id.clear();
        std::mem::take(&mut self.items)
    }

    // ------------------------------------------------------------------------
    // Placement
    // ------------------------------------------------------------------------

    pub fn move_item(&mut self, id: ItemId, dx: f32, dy: f32) -> BoardResult<()> {
        self.with_item(id, |item| item.translate(dx, dy))
    }

    pub fn set_position(&mut self, id: ItemId, position: Point) -> BoardResult<()> {
        self.with_item(id, |item| item.set_position(position))
    }

    /// Move several items by the same delta. Either all move or none do.
    pub fn move_items(&mut self, ids: &[ItemId], dx: f32, dy: f32) -> BoardResult<()> {
        if !dx.is_finite() || !dy.is_finite() {
            return Err(BoardError::InvalidPosition);
        }
        let indices = ids
            .iter()
            .map(|&id| self.index_of(id))
            .collect::<BoardResult<Vec<_>>>()?;
        let landed = |item: &BoardItem| (item.position() + Point::new(dx, dy)).is_finite();
        if !indices.iter().all(|&index| landed(&self.items[index])) {
            return Err(BoardError::InvalidPosition);
        }
        for index in indices {
            self.items[index].translate(dx, dy)?;
            self.reindex_item(index);
        }
        Ok(())
    }

    pub fn resize_item(&mut self, id: ItemId, scale: f32) -> BoardResult<()> {
        self.with_item(id, |item| item.set_scale(scale))
    }

    /// Resize keeping `anchor` fixed on the canvas.
    pub fn resize_item_about(&mut self, id: ItemId, anchor: Corner, scale: f32) -> BoardResult<()> {
        self.with_item(id, |item| item.resize_about(anchor, scale))
    }

    /// Set the absolute rotation in degrees. Stored normalized to `[0, 360)`.
    pub fn rotate_item(&mut self, id: ItemId, degrees: f32) -> BoardResult<()> {
        self.with_item(id, |item| item.set_rotation(degrees))
    }

    pub(crate) fn replace_asset(&mut self, id: ItemId, asset: SharedAsset) -> BoardResult<()> {
        self.with_item(id, |item| {
            item.replace_asset(asset);
            Ok(())
        })
    }

    /// Lay every item out in rows of `GRID_COLUMNS`, bottom item first.
    ///
    /// Rotation is ignored for cell sizing; each item's footprint bounding
    /// box decides its row height and column width.
    pub fn arrange_grid(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let origin = self.bounds().map(|b| b.min).unwrap_or(Point::ZERO);
        let sizes: Vec<(f32, f32)> = self
            .items
            .iter()
            .map(|item| {
                let aabb = item.aabb();
                (aabb.width(), aabb.height())
            })
            .collect();

        let mut col_widths = vec![0.0f32; GRID_COLUMNS];
        let rows = sizes.len().div_ceil(GRID_COLUMNS);
        let mut row_heights = vec![0.0f32; rows];
        for (i, &(w, h)) in sizes.iter().enumerate() {
            col_widths[i % GRID_COLUMNS] = col_widths[i % GRID_COLUMNS].max(w);
            row_heights[i / GRID_COLUMNS] = row_heights[i / GRID_COLUMNS].max(h);
        }

        for i in 0..self.items.len() {
            let (col, row) = (i % GRID_COLUMNS, i / GRID_COLUMNS);
            let cell_x = origin.x + col_widths[..col].iter().map(|w| w + GRID_SPACING).sum::<f32>();
            let cell_y = origin.y + row_heights[..row].iter().map(|h| h + GRID_SPACING).sum::<f32>();
            // Shift so the footprint's bounding box lands on the cell corner.
            let item = &mut self.items[i];
            let aabb = item.aabb();
            let offset = item.position() - aabb.min;
            // Finite by construction: all inputs come from valid placements.
            let _ = item.set_position(Point::new(cell_x, cell_y) + offset);
            self.reindex_item(i);
        }
        debug!(items = self.items.len(), "arranged grid");
    }

    // ------------------------------------------------------------------------
    // Z order
    // ------------------------------------------------------------------------

    /// Move `id` to `target` (clamped), shifting the items in between by one.
    pub fn set_z_order(&mut self, id: ItemId, target: usize) -> BoardResult<()> {
        let from = self.index_of(id)?;
        let to = target.min(self.items.len() - 1);
        if from != to {
            let item = self.items.remove(from);
            self.items.insert(to, item);
            self.renormalize();
        }
        Ok(())
    }

    pub fn bring_to_front(&mut self, id: ItemId) -> BoardResult<()> {
        let top = self.items.len().saturating_sub(1);
        self.set_z_order(id, top)
    }

    pub fn send_to_back(&mut self, id: ItemId) -> BoardResult<()> {
        self.set_z_order(id, 0)
    }

    /// Raise every selected item above the rest, keeping their relative order.
    pub fn bring_selection_to_front(&mut self) {
        let (selected, rest): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.items).into_iter().partition(|i| i.selected);
        self.items = rest;
        self.items.extend(selected);
        self.renormalize();
    }

    /// Lower every selected item below the rest, keeping their relative order.
    pub fn send_selection_to_back(&mut self) {
        let (mut selected, rest): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.items).into_iter().partition(|i| i.selected);
        selected.extend(rest);
        self.items = selected;
        self.renormalize();
    }

    // ------------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------------

    /// Select `id`. Non-additive selection clears everything else first;
    /// additive selection toggles `id` alone. In single-select mode every
    /// request is exclusive.
    pub fn select(&mut self, id: ItemId, additive: bool) -> BoardResult<()> {
        let index = self.index_of(id)?;
        if additive && self.selection_mode == SelectionMode::Multi {
            let item = &mut self.items[index];
            item.selected = !item.selected;
        } else {
            for item in &mut self.items {
                item.selected = false;
            }
            self.items[index].selected = true;
        }
        Ok(())
    }

    /// Select every id in `ids`. Unknown ids are skipped.
    ///
    /// Non-additive calls replace the current selection. In single-select
    /// mode only the topmost of `ids` ends up selected.
    pub fn select_many(&mut self, ids: &[ItemId], additive: bool) {
        let wanted: HashSet<ItemId> = ids.iter().copied().collect();
        match self.selection_mode {
            SelectionMode::Multi => {
                for item in &mut self.items {
                    if wanted.contains(&item.id()) {
                        item.selected = true;
                    } else if !additive {
                        item.selected = false;
                    }
                }
            }
            SelectionMode::Single => {
                let topmost = self.items.iter().rev().find(|i| wanted.contains(&i.id())).map(|i| i.id());
                if let Some(top) = topmost {
                    for item in &mut self.items {
                        item.selected = item.id() == top;
                    }
                } else if !additive {
                    self.clear_selection();
                }
            }
        }
    }

    pub fn clear_selection(&mut self) {
        for item in &mut self.items {
            item.selected = false;
        }
    }

    /// Selected ids, bottom to top.
    pub fn selected_ids(&self) -> Vec<ItemId> {
        self.items
            .iter()
            .filter(|item| item.selected)
            .map(|item| item.id())
            .collect()
    }

    pub fn selection_count(&self) -> usize {
        self.items.iter().filter(|item| item.selected).count()
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Items under `point`, topmost first.
    pub fn hit_test(&self, point: Point) -> Vec<ItemId> {
        profile_scope!("hit_test");
        let mut hits = self.scene.query_point(point);
        self.sort_topmost_first(&mut hits);
        hits
    }

    pub fn topmost_at(&self, point: Point) -> Option<ItemId> {
        self.hit_test(point).into_iter().next()
    }

    /// Items whose footprint intersects `rect`, topmost first.
    pub fn hit_test_rect(&self, rect: &Rect) -> Vec<ItemId> {
        profile_scope!("hit_test_rect");
        let mut hits = self.scene.query_rect(rect);
        self.sort_topmost_first(&mut hits);
        hits
    }

    fn sort_topmost_first(&self, ids: &mut [ItemId]) {
        ids.sort_by_key(|id| std::cmp::Reverse(self.index_by_id.get(id).copied().unwrap_or(0)));
    }

    /// Bounding rectangle of every item footprint.
    pub fn bounds(&self) -> Option<Rect> {
        self.items
            .iter()
            .map(BoardItem::aabb)
            .reduce(|acc, r| acc.union(&r))
    }

    // ------------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------------

    pub fn snapshot(&self) -> PlacementSnapshot {
        PlacementSnapshot {
            entries: self
                .items
                .iter()
                .map(|item| SnapshotEntry {
                    id: item.id(),
                    position: item.position(),
                    scale: item.scale(),
                    rotation: item.rotation(),
                    selected: item.selected,
                })
                .collect(),
        }
    }

    /// Put placement and selection back to `snapshot`. Items added since are
    /// left alone; items removed since stay removed.
    pub fn restore(&mut self, snapshot: &PlacementSnapshot) {
        for entry in &snapshot.entries {
            let Some(&index) = self.index_by_id.get(&entry.id) else {
                continue;
            };
            let item = &mut self.items[index];
            // Values were valid when captured.
            let _ = item.set_position(entry.position);
            let _ = item.set_scale(entry.scale);
            let _ = item.set_rotation(entry.rotation);
            item.selected = entry.selected;
            self.reindex_item(index);
        }
    }

    /// True when z orders are dense and the scene index matches the items.
    pub fn is_consistent(&self) -> bool {
        self.items.iter().enumerate().all(|(i, item)| {
            item.z_order == i
                && self.index_by_id.get(&item.id()) == Some(&i)
                && self.scene.footprint(item.id()) == Some(item.quad())
        }) && self.scene.len() == self.items.len()
            && self.index_by_id.len() == self.items.len()
    }
}
