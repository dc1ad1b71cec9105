//! Deletion with borrow/merge rebalancing.
//!
//! Before the descent enters a child that holds only `t-1` keys, the child is
//! topped up to at least `t` keys, by rotating a key in from a sibling or by
//! merging with a sibling. Removing one key from any node reached this way
//! therefore never leaves it below `t-1`, and nothing has to be fixed on the
//! way back up. The only exception is the root, which may drop to zero keys
//! and is then replaced by its single child.

use super::BTree;
use crate::types::{Key, NodeId};
use tracing::{debug, trace};

impl BTree {
    /// Delete a key.
    ///
    /// Returns `false` and leaves the tree untouched if the key is absent.
    pub fn delete(&mut self, key: Key) -> bool {
        let root = match self.root {
            Some(root) if self.contains(key) => root,
            _ => {
                debug!(key, "btree.delete.not_found");
                return false;
            }
        };

        let removed = self.remove(root, key);
        debug_assert!(removed, "key {} vanished during delete", key);

        self.len -= 1;
        self.shrink_root();
        removed
    }

    /// Replace a keyless root by its only child, or drop it if it is a leaf
    fn shrink_root(&mut self) {
        let Some(root) = self.root else {
            return;
        };
        let node = &self.arena[root];
        if !node.is_empty() {
            return;
        }

        if node.is_leaf() {
            self.arena.release(root);
            self.root = None;
            debug!(root = root.value(), "btree.root.emptied");
        } else {
            let child = node.child(0);
            self.arena.release(root);
            self.root = Some(child);
            self.height -= 1;
            debug!(
                old_root = root.value(),
                new_root = child.value(),
                height = self.height,
                "btree.root.shrink"
            );
        }
    }

    /// Remove `key` from the subtree rooted at `id`.
    ///
    /// `id` must hold at least `t` keys unless it is the root.
    fn remove(&mut self, id: NodeId, key: Key) -> bool {
        let t = self.config.min_degree;
        let node = &self.arena[id];
        let idx = node.find_key(key);
        let count = node.len();

        if idx < count && node.key(idx) == key {
            if node.is_leaf() {
                self.arena[id].remove_key(idx);
            } else {
                self.remove_from_internal(id, idx);
            }
            return true;
        }

        if node.is_leaf() {
            return false;
        }

        // Whether the key would live under the last child
        let last_child = idx == count;
        if self.arena[node.child(idx)].len() < t {
            self.fill(id, idx);
        }

        // A fill of the last child merges it into its left sibling
        let node = &self.arena[id];
        let next = if last_child && idx > node.len() {
            node.child(idx - 1)
        } else {
            node.child(idx)
        };
        self.remove(next, key)
    }

    /// Remove `keys[idx]` from the internal node `id`
    fn remove_from_internal(&mut self, id: NodeId, idx: usize) {
        let t = self.config.min_degree;
        let node = &self.arena[id];
        let key = node.key(idx);
        let left = node.child(idx);
        let right = node.child(idx + 1);

        if self.arena[left].len() >= t {
            let pred = self.predecessor(left);
            self.arena[id].set_key(idx, pred);
            self.remove(left, pred);
        } else if self.arena[right].len() >= t {
            let succ = self.successor(right);
            self.arena[id].set_key(idx, succ);
            self.remove(right, succ);
        } else {
            self.merge(id, idx);
            self.remove(left, key);
        }
    }

    /// Largest key in the subtree rooted at `id`
    fn predecessor(&self, id: NodeId) -> Key {
        let mut current = id;
        loop {
            let node = &self.arena[current];
            if node.is_leaf() {
                return node.key(node.len() - 1);
            }
            current = node.child(node.len());
        }
    }

    /// Smallest key in the subtree rooted at `id`
    fn successor(&self, id: NodeId) -> Key {
        let mut current = id;
        loop {
            let node = &self.arena[current];
            if node.is_leaf() {
                return node.key(0);
            }
            current = node.child(0);
        }
    }

    /// Bring child `idx` of `parent` up from `t-1` keys to at least `t`
    fn fill(&mut self, parent: NodeId, idx: usize) {
        let t = self.config.min_degree;
        let node = &self.arena[parent];
        let count = node.len();

        if idx != 0 && self.arena[node.child(idx - 1)].len() >= t {
            self.borrow_from_prev(parent, idx);
        } else if idx != count && self.arena[node.child(idx + 1)].len() >= t {
            self.borrow_from_next(parent, idx);
        } else if idx != count {
            self.merge(parent, idx);
        } else {
            self.merge(parent, idx - 1);
        }
    }

    /// Rotate the last key of child `idx - 1` through the parent into child `idx`
    fn borrow_from_prev(&mut self, parent: NodeId, idx: usize) {
        let node = &self.arena[parent];
        let child = node.child(idx);
        let sibling = node.child(idx - 1);
        let separator = node.key(idx - 1);

        let (up, moved) = self.arena[sibling].pop_back();
        self.arena[child].push_front(separator, moved);
        self.arena[parent].set_key(idx - 1, up);

        trace!(
            parent = parent.value(),
            child = child.value(),
            sibling = sibling.value(),
            "btree.borrow_prev"
        );
    }

    /// Rotate the first key of child `idx + 1` through the parent into child `idx`
    fn borrow_from_next(&mut self, parent: NodeId, idx: usize) {
        let node = &self.arena[parent];
        let child = node.child(idx);
        let sibling = node.child(idx + 1);
        let separator = node.key(idx);

        let (up, moved) = self.arena[sibling].pop_front();
        self.arena[child].push_back(separator, moved);
        self.arena[parent].set_key(idx, up);

        trace!(
            parent = parent.value(),
            child = child.value(),
            sibling = sibling.value(),
            "btree.borrow_next"
        );
    }

    /// Fold separator `keys[idx]` and child `idx + 1` into child `idx`.
    ///
    /// Both children hold `t-1` keys, so the result holds exactly `2t-1`.
    /// The right child's slot is released.
    fn merge(&mut self, parent: NodeId, idx: usize) {
        let child = self.arena[parent].child(idx);
        let (separator, sibling) = self.arena[parent].remove_separator(idx);
        let right = self.arena.release(sibling);
        self.arena[child].absorb(separator, right);

        trace!(
            parent = parent.value(),
            child = child.value(),
            released = sibling.value(),
            separator,
            "btree.merge"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with(t: usize, keys: impl IntoIterator<Item = Key>) -> BTree {
        let mut tree = BTree::new(t).unwrap();
        for key in keys {
            tree.insert(key);
        }
        tree
    }

    fn child_keys(tree: &BTree) -> Vec<Vec<Key>> {
        let root = tree.node(tree.root().unwrap()).unwrap();
        root.children()
            .iter()
            .map(|&id| tree.node(id).unwrap().keys().to_vec())
            .collect()
    }

    #[test]
    fn test_delete_from_leaf_root() {
        let mut tree = tree_with(3, [3, 1, 2]);
        assert!(tree.delete(2));
        assert_eq!(tree.traverse(), vec![1, 3]);
        assert!(tree.delete(1));
        assert!(tree.delete(3));
        assert_eq!(tree.root(), None);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_borrow_from_next() {
        // Root [3, 6], children [1, 2] [4, 5] [7, 8, 9]
        let mut tree = tree_with(3, 1..=9);
        assert_eq!(child_keys(&tree), vec![vec![1, 2], vec![4, 5], vec![7, 8, 9]]);

        tree.delete(5);
        let root = tree.node(tree.root().unwrap()).unwrap();
        assert_eq!(root.keys(), &[3, 7]);
        assert_eq!(child_keys(&tree), vec![vec![1, 2], vec![4, 6], vec![8, 9]]);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_borrow_from_prev() {
        // Root [4], children [1, 2, 3] [5, 6]
        let mut tree = tree_with(3, [4, 5, 6, 1, 2, 3]);
        let root = tree.node(tree.root().unwrap()).unwrap();
        assert_eq!(root.keys(), &[4]);
        assert_eq!(child_keys(&tree), vec![vec![1, 2, 3], vec![5, 6]]);

        tree.delete(6);
        let root = tree.node(tree.root().unwrap()).unwrap();
        assert_eq!(root.keys(), &[3]);
        assert_eq!(child_keys(&tree), vec![vec![1, 2], vec![4, 5]]);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_merge_shrinks_root() {
        // Root [2], children [1] [3]
        let mut tree = tree_with(2, 1..=4);
        tree.delete(4);
        assert_eq!(tree.height(), 1);

        tree.delete(1);
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.traverse(), vec![2, 3]);
        let root = tree.node(tree.root().unwrap()).unwrap();
        assert!(root.is_leaf());
        assert_eq!(tree.stats().node_count, 1);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_delete_internal_replaces_with_neighbor() {
        // Root [3], children [1, 2] [4, 5, 6]; only the right child can spare a key
        let mut tree = tree_with(3, 1..=6);
        tree.delete(3);
        let root = tree.node(tree.root().unwrap()).unwrap();
        assert_eq!(root.keys(), &[4]);
        assert_eq!(child_keys(&tree), vec![vec![1, 2], vec![5, 6]]);

        // Now the left child can spare one, so the predecessor is used
        tree.insert(0);
        tree.delete(4);
        let root = tree.node(tree.root().unwrap()).unwrap();
        assert_eq!(root.keys(), &[2]);
        assert_eq!(child_keys(&tree), vec![vec![0, 1], vec![5, 6]]);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_delete_internal_merges_minimal_children() {
        // Root [3], children [1, 2] [4, 5]
        let mut tree = tree_with(3, 1..=6);
        tree.delete(6);
        assert_eq!(child_keys(&tree), vec![vec![1, 2], vec![4, 5]]);

        tree.delete(3);
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.traverse(), vec![1, 2, 4, 5]);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_delete_descends_into_last_child_after_merge() {
        let mut tree = tree_with(2, 1..=10);
        for key in (1..=10).rev() {
            assert!(tree.delete(key));
            assert!(tree.validate().is_ok(), "invalid after deleting {}", key);
        }
        assert!(tree.is_empty());
    }
}
