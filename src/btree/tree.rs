//! B-tree core implementation.
//!
//! This module provides the main BTree struct with operations for:
//! - find/contains: Point lookups
//! - iter/traverse: In-order key enumeration
//! - stats/export_tree/debug_search: Inspection
//! - validate: Structural invariant checking
//!
//! Insertion and deletion live in the sibling `insert` and `delete` modules.

use super::Iter;
use crate::arena::NodeArena;
use crate::error::{BTreeError, Result};
use crate::node::Node;
use crate::types::{BTreeConfig, Key, NodeId};
use crate::{TreeNode, TreeStats};
use std::collections::HashSet;

/// An in-memory B-tree of minimum degree `t`
#[derive(Debug)]
pub struct BTree {
    /// Node size limits
    pub(super) config: BTreeConfig,
    /// Storage for every live node
    pub(super) arena: NodeArena,
    /// Root node (None means empty tree)
    pub(super) root: Option<NodeId>,
    /// Edges from the root to any leaf
    pub(super) height: usize,
    /// Number of keys stored
    pub(super) len: usize,
}

impl BTree {
    /// Create an empty tree with minimum degree `min_degree`
    pub fn new(min_degree: usize) -> Result<Self> {
        Self::with_config(BTreeConfig::new(min_degree))
    }

    /// Create an empty tree from a configuration
    pub fn with_config(config: BTreeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            arena: NodeArena::new(),
            root: None,
            height: 0,
            len: 0,
        })
    }

    /// Get the tree configuration
    pub fn config(&self) -> BTreeConfig {
        self.config
    }

    /// Get the minimum degree `t`
    pub fn min_degree(&self) -> usize {
        self.config.min_degree
    }

    /// Number of keys in the tree
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the tree holds no keys
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get the height of the tree (0 for an empty tree or a single leaf)
    pub fn height(&self) -> usize {
        self.height
    }

    /// Get the root node ID
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Look up a live node
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id)
    }

    /// Locate the node and key slot holding `key`
    pub fn find(&self, key: Key) -> Option<(NodeId, usize)> {
        let mut current = self.root?;

        loop {
            let node = &self.arena[current];
            let idx = node.find_key(key);

            if idx < node.len() && node.key(idx) == key {
                return Some((current, idx));
            }
            if node.is_leaf() {
                return None;
            }
            current = node.child(idx);
        }
    }

    /// Check if `key` is present
    pub fn contains(&self, key: Key) -> bool {
        self.find(key).is_some()
    }

    /// Smallest key in the tree
    pub fn first(&self) -> Option<Key> {
        let mut current = self.root?;
        loop {
            let node = &self.arena[current];
            if node.is_leaf() {
                return node.keys().first().copied();
            }
            current = node.child(0);
        }
    }

    /// Largest key in the tree
    pub fn last(&self) -> Option<Key> {
        let mut current = self.root?;
        loop {
            let node = &self.arena[current];
            if node.is_leaf() {
                return node.keys().last().copied();
            }
            current = node.child(node.len());
        }
    }

    /// Iterate over all keys in ascending order
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(&self.arena, self.root, self.len)
    }

    /// Collect all keys in ascending order
    pub fn traverse(&self) -> Vec<Key> {
        self.iter().collect()
    }

    /// Remove every key
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
        self.height = 0;
        self.len = 0;
    }

    /// Get statistics about the tree
    pub fn stats(&self) -> TreeStats {
        TreeStats {
            key_count: self.len,
            node_count: self.arena.len(),
            free_slots: self.arena.free_slots(),
            height: self.height,
            min_degree: self.config.min_degree,
        }
    }

    /// Export the tree structure for visualization
    pub fn export_tree(&self) -> Option<TreeNode> {
        self.root.map(|root| self.export_node(root))
    }

    fn export_node(&self, id: NodeId) -> TreeNode {
        let node = &self.arena[id];
        TreeNode {
            node_id: id.value(),
            is_leaf: node.is_leaf(),
            keys: node.keys().to_vec(),
            children: node
                .children()
                .iter()
                .map(|&child| self.export_node(child))
                .collect(),
        }
    }

    /// Debug search - traces the path through the tree
    pub fn debug_search(&self, key: Key) -> Vec<String> {
        let mut trace = Vec::new();
        let Some(root) = self.root else {
            trace.push("Tree is empty (no root)".to_string());
            return trace;
        };

        trace.push(format!("Searching for key: {}", key));
        trace.push(format!("Root node: {}, Height: {}", root, self.height));

        let mut current = root;
        loop {
            let node = &self.arena[current];
            let idx = node.find_key(key);
            trace.push(format!(
                "  Node {}: is_leaf={}, keys={:?}",
                current,
                node.is_leaf(),
                node.keys()
            ));

            if idx < node.len() && node.key(idx) == key {
                trace.push(format!("  FOUND at index {}", idx));
                return trace;
            }
            if node.is_leaf() {
                trace.push("  NOT FOUND in leaf".to_string());
                return trace;
            }

            current = node.child(idx);
            trace.push(format!("  -> Descending to child {} (node {})", idx, current));
        }
    }

    /// Check every structural invariant.
    ///
    /// Verifies node occupancy bounds, key ordering within and across nodes,
    /// child counts, uniform leaf depth, the recorded height and length, and
    /// that every live arena node is reachable exactly once from the root.
    pub fn validate(&self) -> Result<()> {
        let Some(root) = self.root else {
            if self.len != 0 || self.height != 0 || !self.arena.is_empty() {
                return Err(BTreeError::invariant(format!(
                    "empty tree reports len={}, height={}, live nodes={}",
                    self.len,
                    self.height,
                    self.arena.len()
                )));
            }
            return Ok(());
        };

        let mut walk = Walk {
            leaf_depth: None,
            visited: HashSet::new(),
        };
        let keys = self.validate_node(root, None, None, 0, &mut walk)?;

        if keys != self.len {
            return Err(BTreeError::invariant(format!(
                "tree reports {} keys but holds {}",
                self.len, keys
            )));
        }
        if walk.leaf_depth != Some(self.height) {
            return Err(BTreeError::invariant(format!(
                "tree reports height {} but leaves sit at depth {:?}",
                self.height, walk.leaf_depth
            )));
        }
        if walk.visited.len() != self.arena.len() {
            return Err(BTreeError::invariant(format!(
                "{} live nodes but only {} reachable from the root",
                self.arena.len(),
                walk.visited.len()
            )));
        }
        Ok(())
    }

    /// Validate the subtree at `id`, whose keys must lie strictly inside
    /// `(lower, upper)`. Returns the number of keys in the subtree.
    fn validate_node(
        &self,
        id: NodeId,
        lower: Option<Key>,
        upper: Option<Key>,
        depth: usize,
        walk: &mut Walk,
    ) -> Result<usize> {
        let node = self
            .arena
            .get(id)
            .ok_or_else(|| BTreeError::invariant(format!("node {} is not live", id)))?;

        if !walk.visited.insert(id) {
            return Err(BTreeError::invariant(format!("node {} is linked twice", id)));
        }

        let is_root = self.root == Some(id);
        if node.is_empty() {
            return Err(BTreeError::invariant(format!("node {} holds no keys", id)));
        }
        if !is_root && node.len() < self.config.min_keys() {
            return Err(BTreeError::invariant(format!(
                "node {} holds {} keys, minimum is {}",
                id,
                node.len(),
                self.config.min_keys()
            )));
        }
        if node.len() > self.config.max_keys() {
            return Err(BTreeError::invariant(format!(
                "node {} holds {} keys, maximum is {}",
                id,
                node.len(),
                self.config.max_keys()
            )));
        }

        let keys = node.keys();
        if keys.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(BTreeError::invariant(format!(
                "node {} keys are not strictly increasing: {:?}",
                id, keys
            )));
        }
        let (first, last) = (keys[0], keys[keys.len() - 1]);
        if lower.is_some_and(|bound| first <= bound) || upper.is_some_and(|bound| last >= bound) {
            return Err(BTreeError::invariant(format!(
                "node {} keys {:?} escape separator bounds ({:?}, {:?})",
                id, keys, lower, upper
            )));
        }

        if node.is_leaf() {
            match walk.leaf_depth {
                None => walk.leaf_depth = Some(depth),
                Some(expected) if expected != depth => {
                    return Err(BTreeError::invariant(format!(
                        "leaf {} at depth {}, other leaves at depth {}",
                        id, depth, expected
                    )));
                }
                Some(_) => {}
            }
            return Ok(keys.len());
        }

        let mut total = keys.len();
        for (i, &child) in node.children().iter().enumerate() {
            if !child.is_valid() {
                return Err(BTreeError::invariant(format!(
                    "node {} has an unset child slot {}",
                    id, i
                )));
            }
            let child_lower = if i == 0 { lower } else { Some(keys[i - 1]) };
            let child_upper = if i == keys.len() { upper } else { Some(keys[i]) };
            total += self.validate_node(child, child_lower, child_upper, depth + 1, walk)?;
        }
        Ok(total)
    }
}

impl Default for BTree {
    fn default() -> Self {
        Self {
            config: BTreeConfig::default(),
            arena: NodeArena::new(),
            root: None,
            height: 0,
            len: 0,
        }
    }
}

/// Bookkeeping shared across one validation walk
struct Walk {
    leaf_depth: Option<usize>,
    visited: HashSet<NodeId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    fn tree_with(t: usize, keys: impl IntoIterator<Item = Key>) -> BTree {
        let mut tree = BTree::new(t).unwrap();
        for key in keys {
            assert!(tree.insert(key), "insert of {} rejected", key);
        }
        tree
    }

    #[test]
    fn test_rejects_invalid_degree() {
        assert_eq!(
            BTree::new(1).unwrap_err(),
            BTreeError::InvalidDegree { degree: 1, min: 2 }
        );
        assert!(BTree::new(0).is_err());
        assert!(BTree::new(2).is_ok());
    }

    #[test]
    fn test_btree_empty() -> Result<()> {
        let tree = BTree::new(3)?;
        assert!(tree.is_empty());
        assert!(!tree.contains(1));
        assert_eq!(tree.find(1), None);
        assert_eq!(tree.traverse(), Vec::<Key>::new());
        assert_eq!(tree.first(), None);
        assert_eq!(tree.last(), None);
        assert_eq!(tree.height(), 0);
        assert!(tree.export_tree().is_none());
        tree.validate()
    }

    #[test]
    fn test_insert_and_traverse_sorted() -> Result<()> {
        let tree = tree_with(3, [10, 20, 5, 6, 12, 30, 7, 17]);
        assert_eq!(tree.traverse(), vec![5, 6, 7, 10, 12, 17, 20, 30]);
        assert_eq!(tree.len(), 8);
        assert_eq!(tree.first(), Some(5));
        assert_eq!(tree.last(), Some(30));
        tree.validate()
    }

    #[test]
    fn test_height_grows_on_root_split() -> Result<()> {
        let mut tree = tree_with(2, 1..=3);
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.stats().node_count, 1);

        // Root holds 2t-1 = 3 keys, so the next insert splits it first
        tree.insert(4);
        assert_eq!(tree.height(), 1);
        let root = tree.node(tree.root().unwrap()).unwrap();
        assert_eq!(root.keys(), &[2]);

        for key in 5..=7 {
            tree.insert(key);
        }
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.traverse(), (1..=7).collect::<Vec<_>>());
        tree.validate()
    }

    #[test]
    fn test_find_reports_slot() {
        let tree = tree_with(2, 1..=7);
        for key in 1..=7 {
            let (id, idx) = tree.find(key).unwrap();
            assert_eq!(tree.node(id).unwrap().key(idx), key);
        }
        assert_eq!(tree.find(0), None);
        assert_eq!(tree.find(8), None);
    }

    #[test]
    fn test_duplicate_insert_rejected() -> Result<()> {
        let mut tree = tree_with(2, [5, 1, 9]);
        assert!(!tree.insert(5));
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.traverse(), vec![1, 5, 9]);
        tree.validate()
    }

    #[test]
    fn test_traverse_is_idempotent() {
        let tree = tree_with(3, (0..200).rev());
        let first = tree.traverse();
        let second = tree.traverse();
        assert_eq!(first, second);
        assert_eq!(tree.iter().len(), 200);
    }

    #[test]
    fn test_delete_merges_children() -> Result<()> {
        let mut tree = tree_with(3, 1..=9);
        assert!(tree.delete(5));
        assert_eq!(tree.traverse(), vec![1, 2, 3, 4, 6, 7, 8, 9]);
        assert!(!tree.contains(5));
        tree.validate()
    }

    #[test]
    fn test_delete_absent_key_is_noop() -> Result<()> {
        let mut tree = tree_with(2, 1..=20);
        let before = tree.export_tree();
        assert!(!tree.delete(100));
        assert!(!tree.delete(0));
        assert_eq!(tree.export_tree(), before);
        assert_eq!(tree.traverse(), (1..=20).collect::<Vec<_>>());

        let mut empty = BTree::new(2)?;
        assert!(!empty.delete(1));
        tree.validate()
    }

    #[test]
    fn test_delete_everything_shrinks_to_empty() -> Result<()> {
        let mut tree = tree_with(2, 1..=50);
        assert!(tree.height() > 1);

        for key in 1..=50 {
            assert!(tree.delete(key), "delete of {} failed", key);
            tree.validate()?;
        }
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.root(), None);
        assert_eq!(tree.stats().node_count, 0);
        Ok(())
    }

    #[test]
    fn test_delete_from_internal_node() -> Result<()> {
        let mut tree = tree_with(2, 1..=15);
        let root = tree.node(tree.root().unwrap()).unwrap();
        let separator = root.key(0);

        assert!(tree.delete(separator));
        assert!(!tree.contains(separator));
        let expected: Vec<Key> = (1..=15).filter(|&k| k != separator).collect();
        assert_eq!(tree.traverse(), expected);
        tree.validate()
    }

    #[test]
    fn test_reinsert_reuses_released_nodes() -> Result<()> {
        let mut tree = tree_with(2, 1..=30);
        let peak = tree.stats().node_count + tree.stats().free_slots;
        for key in 1..=30 {
            tree.delete(key);
        }
        assert_eq!(tree.stats().free_slots, peak);

        for key in 1..=30 {
            tree.insert(key);
        }
        let stats = tree.stats();
        assert_eq!(stats.node_count + stats.free_slots, peak);
        tree.validate()
    }

    #[test]
    fn test_randomized_workload() -> Result<()> {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for t in 2..=5 {
            let mut keys: Vec<Key> = (0..500).collect();
            keys.shuffle(&mut rng);

            let mut tree = tree_with(t, keys.iter().copied());
            tree.validate()?;
            assert_eq!(tree.traverse(), (0..500).collect::<Vec<_>>());

            keys.shuffle(&mut rng);
            let (gone, kept) = keys.split_at(250);
            for &key in gone {
                assert!(tree.delete(key));
            }
            tree.validate()?;

            for &key in gone {
                assert!(!tree.contains(key));
            }
            for &key in kept {
                assert!(tree.contains(key));
            }
            let mut expected = kept.to_vec();
            expected.sort_unstable();
            assert_eq!(tree.traverse(), expected);
        }
        Ok(())
    }

    #[test]
    fn test_clear() -> Result<()> {
        let mut tree = tree_with(3, 1..=40);
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.traverse(), Vec::<Key>::new());
        tree.validate()?;

        tree.insert(3);
        assert_eq!(tree.traverse(), vec![3]);
        tree.validate()
    }

    #[test]
    fn test_debug_search_trace() {
        let tree = tree_with(2, 1..=7);
        let trace = tree.debug_search(7);
        assert!(trace.iter().any(|line| line.contains("FOUND at index")));

        let trace = tree.debug_search(42);
        assert_eq!(trace.last().map(String::as_str), Some("  NOT FOUND in leaf"));

        let empty = BTree::new(2).unwrap();
        assert_eq!(empty.debug_search(1), vec!["Tree is empty (no root)".to_string()]);
    }

    #[test]
    fn test_export_tree_shape() {
        let tree = tree_with(2, 1..=4);
        let root = tree.export_tree().unwrap();
        assert!(!root.is_leaf);
        assert_eq!(root.keys, vec![2]);
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].keys, vec![1]);
        assert_eq!(root.children[1].keys, vec![3, 4]);
        assert!(root.children.iter().all(|child| child.is_leaf));
    }
}
