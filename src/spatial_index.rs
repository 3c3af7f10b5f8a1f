//! Scene index: an R-tree over item footprints for hit testing on the board. The tree holds
//! the axis-aligned envelope of each (possibly rotated) item; candidates are
//! then checked against the exact footprint.
//!
//! The index knows nothing about z order. Callers sort results themselves.

use crate::types::{ItemId, Point, Quad, Rect};
use rstar::{AABB, RTree, RTreeObject};
use std::collections::HashMap;

/// A spatial entry: one item's footprint.
#[derive(Debug, Clone, Copy)]
pub struct SceneEntry {
    pub item_id: ItemId,
    pub quad: Quad,
    envelope: Rect,
}

impl SceneEntry {
    pub fn new(item_id: ItemId, quad: Quad) -> Self {
        Self {
            item_id,
            quad,
            envelope: quad.aabb(),
        }
    }
}

impl RTreeObject for SceneEntry {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.envelope.min.x, self.envelope.min.y],
            [self.envelope.max.x, self.envelope.max.y],
        )
    }
}

impl PartialEq for SceneEntry {
    fn eq(&self, other: &Self) -> bool {
        self.item_id == other.item_id
    }
}

/// Spatial index for board items.
#[derive(Default)]
pub struct SceneIndex {
    tree: RTree<SceneEntry>,
    by_item: HashMap<ItemId, SceneEntry>,
}

impl SceneIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index in one go from `(id, footprint)` pairs.
    pub fn from_items<I>(items: I) -> Self
    where
        I: IntoIterator<Item = (ItemId, Quad)>,
    {
        let mut index = Self::new();
        index.rebuild(items);
        index
    }

    /// Insert or replace the footprint of `item_id`.
    pub fn upsert(&mut self, item_id: ItemId, quad: Quad) {
        let entry = SceneEntry::new(item_id, quad);
        if let Some(previous) = self.by_item.insert(item_id, entry) {
            self.tree.remove(&previous);
        }
        self.tree.insert(entry);
    }

    pub fn remove(&mut self, item_id: ItemId) -> bool {
        self.by_item
            .remove(&item_id)
            .is_some_and(|entry| self.tree.remove(&entry).is_some())
    }

    pub fn contains(&self, item_id: ItemId) -> bool {
        self.by_item.contains_key(&item_id)
    }

    pub fn footprint(&self, item_id: ItemId) -> Option<Quad> {
        self.by_item.get(&item_id).map(|e| e.quad)
    }

    /// Items whose footprint contains `point`, in no particular order.
    pub fn query_point(&self, point: Point) -> Vec<ItemId> {
        let point_envelope = AABB::from_point([point.x, point.y]);

        self.tree
            .locate_in_envelope_intersecting(&point_envelope)
            .filter(|entry| entry.quad.contains(point))
            .map(|entry| entry.item_id)
            .collect()
    }

    /// Items whose footprint intersects `rect`, in no particular order.
    pub fn query_rect(&self, rect: &Rect) -> Vec<ItemId> {
        let envelope = AABB::from_corners([rect.min.x, rect.min.y], [rect.max.x, rect.max.y]);

        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .filter(|entry| entry.quad.intersects_rect(rect))
            .map(|entry| entry.item_id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.by_item.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_item.is_empty()
    }

    pub fn rebuild<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = (ItemId, Quad)>,
    {
        let entries: Vec<SceneEntry> = items
            .into_iter()
            .map(|(id, quad)| SceneEntry::new(id, quad))
            .collect();

        self.by_item = entries.iter().map(|entry| (entry.item_id, *entry)).collect();
        self.tree = RTree::bulk_load(entries);
    }

    pub fn clear(&mut self) {
        self.by_item.clear();
        self.tree = RTree::new();
    }
}
