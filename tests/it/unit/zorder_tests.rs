//! Z order tests, including the dense-permutation property under random
//! sequences of reorders and deletions.

use crate::helpers::{TestBoardBuilder, z_orders};
use proptest::prelude::*;
use refboard::{BoardDocument, ItemId, Point};

#[derive(Clone, Debug)]
enum ZOp {
    Front(usize),
    Back(usize),
    Set(usize, usize),
    Delete(usize),
    Add,
}

fn z_op() -> impl Strategy<Value = ZOp> {
    prop_oneof![
        (0..16usize).prop_map(ZOp::Front),
        (0..16usize).prop_map(ZOp::Back),
        (0..16usize, 0..20usize).prop_map(|(i, t)| ZOp::Set(i, t)),
        (0..16usize).prop_map(ZOp::Delete),
        Just(ZOp::Add),
    ]
}

fn pick(doc: &BoardDocument, index: usize) -> Option<ItemId> {
    if doc.is_empty() {
        None
    } else {
        Some(doc.items()[index % doc.len()].id())
    }
}

fn assert_dense(doc: &BoardDocument) {
    let mut orders: Vec<usize> = doc.items().iter().map(|i| i.z_order()).collect();
    orders.sort_unstable();
    assert_eq!(orders, (0..doc.len()).collect::<Vec<_>>());
    assert!(doc.is_consistent());
}

proptest! {
    #[test]
    fn prop_z_orders_stay_dense(ops in prop::collection::vec(z_op(), 1..40)) {
        let (mut doc, _) = TestBoardBuilder::new().with_n_items(6).build();
        for op in ops {
            match op {
                ZOp::Front(i) => if let Some(id) = pick(&doc, i) { doc.bring_to_front(id).unwrap() },
                ZOp::Back(i) => if let Some(id) = pick(&doc, i) { doc.send_to_back(id).unwrap() },
                ZOp::Set(i, t) => if let Some(id) = pick(&doc, i) { doc.set_z_order(id, t).unwrap() },
                ZOp::Delete(i) => if let Some(id) = pick(&doc, i) { doc.remove_items(&[id]); },
                ZOp::Add => { doc.add_item(crate::helpers::test_asset(10, 10), Point::ZERO).unwrap(); }
            }
            assert_dense(&doc);
        }
    }

    #[test]
    fn prop_untouched_items_keep_relative_order(from in 0..8usize, to in 0..8usize) {
        let (mut doc, ids) = TestBoardBuilder::new().with_n_items(8).build();
        doc.set_z_order(ids[from], to).unwrap();
        let others: Vec<ItemId> = ids.iter().copied().filter(|id| *id != ids[from]).collect();
        let orders = z_orders(&doc, &others);
        prop_assert!(orders.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(doc.item(ids[from]).unwrap().z_order(), to);
    }
}

#[test]
fn test_bring_to_front_and_send_to_back() {
    let (mut doc, ids) = TestBoardBuilder::new().with_n_items(4).build();
    doc.bring_to_front(ids[0]).unwrap();
    assert_eq!(z_orders(&doc, &ids), vec![3, 0, 1, 2]);
    doc.send_to_back(ids[3]).unwrap();
    assert_eq!(z_orders(&doc, &ids), vec![3, 1, 2, 0]);
}

#[test]
fn test_delete_middle_item_packs_survivors() {
    let (mut doc, ids) = TestBoardBuilder::new().with_n_items(5).build();
    doc.select(ids[2], false).unwrap();
    let removed = doc.remove_selected();
    assert_eq!(removed.len(), 1);
    assert_eq!(doc.selection_count(), 0);
    let survivors = [ids[0], ids[1], ids[3], ids[4]];
    assert_eq!(z_orders(&doc, &survivors), vec![0, 1, 2, 3]);
}

#[test]
fn test_unknown_item_is_rejected() {
    let (mut doc, _) = TestBoardBuilder::new().with_n_items(2).build();
    assert!(doc.bring_to_front(ItemId(77)).is_err());
    assert!(doc.is_consistent());
}
