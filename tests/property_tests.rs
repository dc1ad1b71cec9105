use btree_arena::{BTree, Key};
use proptest::prelude::*;
use std::collections::BTreeSet;

#[derive(Debug, Clone)]
enum Operation {
    Insert(Key),
    Delete(Key),
    Search(Key),
}

fn arb_operation() -> impl Strategy<Value = Operation> {
    // A narrow key range makes duplicates, hits and misses all common
    prop_oneof![
        3 => (-200i64..200).prop_map(Operation::Insert),
        2 => (-200i64..200).prop_map(Operation::Delete),
        1 => (-200i64..200).prop_map(Operation::Search),
    ]
}

proptest! {
    #[test]
    fn prop_matches_ordered_set_model(
        t in 2usize..=6,
        ops in prop::collection::vec(arb_operation(), 1..400),
    ) {
        let mut tree = BTree::new(t).unwrap();
        let mut model = BTreeSet::new();

        for op in ops {
            match op {
                Operation::Insert(key) => {
                    prop_assert_eq!(tree.insert(key), model.insert(key));
                }
                Operation::Delete(key) => {
                    prop_assert_eq!(tree.delete(key), model.remove(&key));
                }
                Operation::Search(key) => {
                    prop_assert_eq!(tree.contains(key), model.contains(&key));
                }
            }
            prop_assert!(tree.validate().is_ok(), "{:?}", tree.validate());
        }

        prop_assert_eq!(tree.len(), model.len());
        prop_assert_eq!(tree.traverse(), model.iter().copied().collect::<Vec<_>>());
        prop_assert_eq!(tree.first(), model.first().copied());
        prop_assert_eq!(tree.last(), model.last().copied());
    }

    #[test]
    fn prop_insert_then_traverse_is_sorted_set(
        t in 2usize..=5,
        keys in prop::collection::vec(any::<i64>(), 0..300),
    ) {
        let mut tree = BTree::new(t).unwrap();
        for &key in &keys {
            tree.insert(key);
        }

        let expected: Vec<Key> = keys.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        prop_assert_eq!(tree.traverse(), expected.clone());
        prop_assert_eq!(tree.traverse(), tree.traverse());
        for key in expected {
            prop_assert!(tree.contains(key));
        }
        prop_assert!(tree.validate().is_ok());
    }

    #[test]
    fn prop_delete_absent_leaves_tree_unchanged(
        t in 2usize..=4,
        keys in prop::collection::btree_set(0i64..1000, 1..200),
        probe in 1000i64..2000,
    ) {
        let mut tree = BTree::new(t).unwrap();
        for &key in &keys {
            tree.insert(key);
        }

        let before = tree.export_tree();
        prop_assert!(!tree.delete(probe));
        prop_assert_eq!(tree.export_tree(), before);
    }

    #[test]
    fn prop_delete_all_empties_tree(
        t in 2usize..=4,
        keys in prop::collection::vec(0i64..500, 1..250),
    ) {
        let mut tree = BTree::new(t).unwrap();
        for &key in &keys {
            tree.insert(key);
        }

        let unique: BTreeSet<Key> = keys.into_iter().collect();
        for key in unique.iter().rev() {
            prop_assert!(tree.delete(*key));
        }
        prop_assert!(tree.is_empty());
        prop_assert_eq!(tree.height(), 0);
        prop_assert_eq!(tree.stats().node_count, 0);
        prop_assert!(tree.validate().is_ok());
    }
}

#[test]
fn sequential_growth_with_minimum_degree_two() {
    let mut tree = BTree::new(2).unwrap();
    let mut heights = Vec::new();
    for key in 1..=7 {
        tree.insert(key);
        heights.push(tree.height());
    }
    assert_eq!(heights, vec![0, 0, 0, 1, 1, 1, 1]);
    assert_eq!(tree.traverse(), (1..=7).collect::<Vec<_>>());
}

#[test]
fn mixed_insertion_order_with_minimum_degree_three() {
    let mut tree = BTree::new(3).unwrap();
    for key in [10, 20, 5, 6, 12, 30, 7, 17] {
        tree.insert(key);
    }
    assert_eq!(tree.traverse(), vec![5, 6, 7, 10, 12, 17, 20, 30]);
    assert!(tree.contains(6));
    assert!(!tree.contains(15));
}

#[test]
fn merge_keeps_minimum_occupancy() {
    let mut tree = BTree::new(3).unwrap();
    for key in 1..=9 {
        tree.insert(key);
    }
    assert!(tree.delete(5));
    assert_eq!(tree.traverse(), vec![1, 2, 3, 4, 6, 7, 8, 9]);
    assert!(tree.validate().is_ok());
}
