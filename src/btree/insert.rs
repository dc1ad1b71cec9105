//! Insertion with pre-emptive splitting.
//!
//! Every node on the way down is made non-full before it is entered, so the
//! leaf that finally receives the key always has room and no split ever has
//! to propagate back up.

use super::BTree;
use crate::node::Node;
use crate::types::{Key, NodeId};
use tracing::{debug, trace};

impl BTree {
    /// Insert a key.
    ///
    /// Returns `false` and leaves the tree untouched if the key is already present.
    pub fn insert(&mut self, key: Key) -> bool {
        if self.contains(key) {
            debug!(key, "btree.insert.duplicate");
            return false;
        }

        let t = self.config.min_degree;
        let root = match self.root {
            Some(root) => root,
            None => {
                let root = self.arena.alloc(Node::new_leaf(t));
                self.root = Some(root);
                root
            }
        };

        let root = if self.arena[root].is_full() {
            self.grow_root(root)
        } else {
            root
        };

        self.insert_non_full(root, key);
        self.len += 1;
        true
    }

    /// Put a new root above the full `old_root` and split it
    fn grow_root(&mut self, old_root: NodeId) -> NodeId {
        let new_root = self
            .arena
            .alloc(Node::with_child(self.config.min_degree, old_root));
        self.split_child(new_root, 0);

        self.root = Some(new_root);
        self.height += 1;
        debug!(
            old_root = old_root.value(),
            new_root = new_root.value(),
            height = self.height,
            "btree.root.split"
        );
        new_root
    }

    /// Descend from the non-full node `id` and place `key` in a leaf
    fn insert_non_full(&mut self, id: NodeId, key: Key) {
        let mut current = id;

        loop {
            let node = &self.arena[current];
            if node.is_leaf() {
                self.arena[current].insert_key(key);
                return;
            }

            let mut idx = node.find_key(key);
            if self.arena[node.child(idx)].is_full() {
                self.split_child(current, idx);
                // The promoted median now sits at idx; step right if key is larger
                if self.arena[current].key(idx) < key {
                    idx += 1;
                }
            }
            current = self.arena[current].child(idx);
        }
    }

    /// Split the full child at slot `idx` of `parent`.
    ///
    /// The child keeps its lower half, a new right sibling takes the upper
    /// half, and the median moves up into `parent` at `idx`.
    pub(super) fn split_child(&mut self, parent: NodeId, idx: usize) {
        let child = self.arena[parent].child(idx);
        let (median, right) = self.arena[child].split_off();
        let sibling = self.arena.alloc(right);
        self.arena[parent].insert_split(idx, median, sibling);

        trace!(
            parent = parent.value(),
            child = child.value(),
            sibling = sibling.value(),
            median,
            "btree.split"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_insert_creates_leaf_root() {
        let mut tree = BTree::new(3).unwrap();
        assert!(tree.insert(42));

        let root = tree.root().unwrap();
        let node = tree.node(root).unwrap();
        assert!(node.is_leaf());
        assert_eq!(node.keys(), &[42]);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_split_child_promotes_median() {
        let mut tree = BTree::new(2).unwrap();
        for key in [10, 20, 30] {
            tree.insert(key);
        }
        let old_root = tree.root().unwrap();

        tree.insert(25);
        let root = tree.node(tree.root().unwrap()).unwrap();
        assert_eq!(root.keys(), &[20]);
        // The old root stays in place as the left half
        assert_eq!(root.child(0), old_root);
        assert_eq!(tree.node(old_root).unwrap().keys(), &[10]);
        assert_eq!(tree.node(root.child(1)).unwrap().keys(), &[25, 30]);
    }

    #[test]
    fn test_split_on_descent_picks_right_half() {
        let mut tree = BTree::new(2).unwrap();
        for key in [10, 20, 30, 40, 50] {
            tree.insert(key);
        }
        // Root [20], children [10] and [30, 40, 50]; 45 forces a split of the right child
        tree.insert(45);

        let root = tree.node(tree.root().unwrap()).unwrap();
        assert_eq!(root.keys(), &[20, 40]);
        assert_eq!(tree.node(root.child(2)).unwrap().keys(), &[45, 50]);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_descending_inserts() {
        let mut tree = BTree::new(3).unwrap();
        for key in (1..=100).rev() {
            assert!(tree.insert(key));
        }
        assert_eq!(tree.traverse(), (1..=100).collect::<Vec<_>>());
        assert!(tree.validate().is_ok());
    }
}
