//! # BTree Arena
//!
//! An in-memory B-tree of `i64` keys with minimum degree `t`.
//!
//! ## Architecture
//!
//! - **Node Layer** (`node`): fixed-capacity key/child arrays with in-place shifting
//! - **Arena Layer** (`arena`): node storage addressed by stable [`NodeId`]s,
//!   released slots recycled through a free list
//! - **B-Tree Layer** (`btree`): search, pre-emptive split insertion,
//!   borrow/merge deletion and in-order iteration
//!
//! Every non-root node holds between `t-1` and `2t-1` keys and all leaves sit
//! at the same depth after every operation.
//!
//! ## Usage
//!
//! ```rust
//! use btree_arena::BTree;
//!
//! let mut tree = BTree::new(3)?;
//! for key in [10, 20, 5, 6, 12, 30, 7, 17] {
//!     tree.insert(key);
//! }
//! assert!(tree.contains(12));
//! assert_eq!(tree.traverse(), vec![5, 6, 7, 10, 12, 17, 20, 30]);
//!
//! assert!(tree.delete(12));
//! assert!(!tree.delete(12));
//! # Ok::<(), btree_arena::BTreeError>(())
//! ```

pub mod arena;
pub mod btree;
pub mod error;
pub mod node;
pub mod types;

pub use error::{BTreeError, Result};
pub use types::{BTreeConfig, Key, NodeId, DEFAULT_MIN_DEGREE, MIN_DEGREE};

// Re-export main public API
pub use btree::{BTree, Iter};
pub use node::Node;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Node type for visualization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    /// Arena slot of the node
    pub node_id: u32,
    /// Whether this is a leaf node
    pub is_leaf: bool,
    /// Keys in this node
    pub keys: Vec<Key>,
    /// Child nodes (only for interior nodes)
    pub children: Vec<TreeNode>,
}

/// Tree statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeStats {
    /// Number of keys stored
    pub key_count: usize,
    /// Number of live nodes
    pub node_count: usize,
    /// Released arena slots waiting for reuse
    pub free_slots: usize,
    /// Edges from the root to any leaf
    pub height: usize,
    /// Minimum degree `t`
    pub min_degree: usize,
}

/// Thread-safe handle to a B-tree.
///
/// The tree itself assumes one writer and no overlapping readers. This
/// handle serializes access for callers that share a tree across threads:
/// lookups take the read lock, mutations take the write lock, so every
/// operation runs to completion before another observes the tree.
#[derive(Debug, Clone, Default)]
pub struct SharedBTree {
    btree: Arc<RwLock<BTree>>,
}

impl SharedBTree {
    /// Create an empty shared tree
    pub fn new(config: BTreeConfig) -> Result<Self> {
        Ok(Self::from_tree(BTree::with_config(config)?))
    }

    /// Wrap an existing tree
    pub fn from_tree(btree: BTree) -> Self {
        Self {
            btree: Arc::new(RwLock::new(btree)),
        }
    }

    /// Get the B-tree configuration
    pub fn config(&self) -> BTreeConfig {
        self.btree.read().config()
    }

    /// Check if a key exists
    pub fn contains(&self, key: Key) -> bool {
        self.btree.read().contains(key)
    }

    /// Insert a key
    ///
    /// Returns `true` if the key was not present before.
    pub fn insert(&self, key: Key) -> bool {
        self.btree.write().insert(key)
    }

    /// Insert many keys under a single write lock
    ///
    /// Returns the number of keys that were newly inserted.
    pub fn insert_many(&self, keys: impl IntoIterator<Item = Key>) -> usize {
        let mut btree = self.btree.write();
        keys.into_iter().filter(|&key| btree.insert(key)).count()
    }

    /// Delete a key
    ///
    /// Returns `true` if the key existed and was deleted.
    pub fn delete(&self, key: Key) -> bool {
        self.btree.write().delete(key)
    }

    /// Snapshot of all keys in ascending order
    pub fn traverse(&self) -> Vec<Key> {
        self.btree.read().traverse()
    }

    /// Remove every key
    pub fn clear(&self) {
        self.btree.write().clear();
    }

    /// Get statistics about the tree
    pub fn stats(&self) -> TreeStats {
        self.btree.read().stats()
    }

    /// Export the tree structure for visualization
    pub fn export_tree(&self) -> Option<TreeNode> {
        self.btree.read().export_tree()
    }

    /// Debug trace a key lookup
    pub fn debug_search(&self, key: Key) -> Vec<String> {
        self.btree.read().debug_search(key)
    }

    /// Check every structural invariant
    pub fn validate(&self) -> Result<()> {
        self.btree.read().validate()
    }
}
