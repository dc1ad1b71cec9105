//! Node layer: fixed-capacity key and child arrays.
//!
//! A node for minimum degree `t` owns two arrays allocated once at creation:
//! ```text
//! keys:     [k0][k1] ... [k(count-1)] | unused ...          (2t-1 slots)
//! children: [c0][c1] ... [c(count)]   | unused ...          (2t slots)
//! ```
//! Only the first `count` key slots (and `count+1` child slots of an internal
//! node) are meaningful. All mutation is done by shifting in place.
//!
//! Nodes never reach into other nodes. Operations that move data between a
//! parent and its children (split, borrow, merge) are expressed here as the
//! per-node halves and stitched together by the tree.

use crate::types::{Key, NodeId};

/// A single B-tree node
#[derive(Debug, Clone)]
pub struct Node {
    /// Key slots, sorted ascending in `keys[..count]`
    keys: Box<[Key]>,
    /// Child slots, meaningful in `children[..=count]` for internal nodes
    children: Box<[NodeId]>,
    /// Number of occupied key slots
    count: usize,
    /// Whether this node has no children
    leaf: bool,
}

impl Node {
    /// Create an empty node sized for minimum degree `t`
    pub fn new(min_degree: usize, leaf: bool) -> Self {
        debug_assert!(min_degree >= 2);
        Self {
            keys: vec![0; 2 * min_degree - 1].into_boxed_slice(),
            children: vec![NodeId::INVALID; 2 * min_degree].into_boxed_slice(),
            count: 0,
            leaf,
        }
    }

    /// Create an empty leaf node
    pub fn new_leaf(min_degree: usize) -> Self {
        Self::new(min_degree, true)
    }

    /// Create a keyless internal node whose only child is `child`.
    ///
    /// This is the transient shape of a new root right before its child is split.
    pub fn with_child(min_degree: usize, child: NodeId) -> Self {
        let mut node = Self::new(min_degree, false);
        node.children[0] = child;
        node
    }

    /// Minimum degree this node was sized for
    pub fn min_degree(&self) -> usize {
        self.children.len() / 2
    }

    /// Maximum number of keys (`2t-1`)
    pub fn capacity(&self) -> usize {
        self.keys.len()
    }

    /// Number of keys currently stored
    pub fn len(&self) -> usize {
        self.count
    }

    /// Check if the node holds no keys
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Check if the node holds `2t-1` keys
    pub fn is_full(&self) -> bool {
        self.count == self.keys.len()
    }

    /// Check if this is a leaf node
    pub fn is_leaf(&self) -> bool {
        self.leaf
    }

    /// Occupied keys
    pub fn keys(&self) -> &[Key] {
        &self.keys[..self.count]
    }

    /// Occupied child slots (empty for a leaf)
    pub fn children(&self) -> &[NodeId] {
        if self.leaf {
            &[]
        } else {
            &self.children[..=self.count]
        }
    }

    /// Key at slot `idx`
    pub fn key(&self, idx: usize) -> Key {
        debug_assert!(idx < self.count, "key slot {} out of {}", idx, self.count);
        self.keys[idx]
    }

    /// Child at slot `idx`
    pub fn child(&self, idx: usize) -> NodeId {
        debug_assert!(!self.leaf, "leaf nodes have no children");
        debug_assert!(idx <= self.count, "child slot {} out of {}", idx, self.count + 1);
        self.children[idx]
    }

    /// Overwrite the key at slot `idx`
    pub fn set_key(&mut self, idx: usize, key: Key) {
        debug_assert!(idx < self.count);
        self.keys[idx] = key;
    }

    /// Index of the first key `>= key`, or `len()` if every key is smaller.
    ///
    /// For an internal node this is also the child to descend into.
    pub fn find_key(&self, key: Key) -> usize {
        self.keys().partition_point(|&k| k < key)
    }

    /// Insert `key` into a non-full leaf, shifting larger keys right.
    ///
    /// Returns the slot the key landed in.
    pub fn insert_key(&mut self, key: Key) -> usize {
        debug_assert!(self.leaf, "direct key insertion only happens in leaves");
        debug_assert!(!self.is_full(), "insert into full node");

        let idx = self.find_key(key);
        self.keys.copy_within(idx..self.count, idx + 1);
        self.keys[idx] = key;
        self.count += 1;
        idx
    }

    /// Remove and return the key at `idx`, shifting later keys left
    pub fn remove_key(&mut self, idx: usize) -> Key {
        debug_assert!(self.leaf);
        debug_assert!(idx < self.count);

        let key = self.keys[idx];
        self.keys.copy_within(idx + 1..self.count, idx);
        self.count -= 1;
        key
    }

    /// Split a full node around its median.
    ///
    /// `self` keeps the lower `t-1` keys (and `t` children); the returned node
    /// holds the upper `t-1` keys (and `t` children). The median key is
    /// returned separately for the parent.
    pub fn split_off(&mut self) -> (Key, Node) {
        debug_assert!(self.is_full(), "only full nodes are split");

        let t = self.min_degree();
        let mut right = Node::new(t, self.leaf);
        right.keys[..t - 1].copy_from_slice(&self.keys[t..]);
        if !self.leaf {
            right.children[..t].copy_from_slice(&self.children[t..]);
            self.children[t..].fill(NodeId::INVALID);
        }
        right.count = t - 1;

        let median = self.keys[t - 1];
        self.count = t - 1;
        (median, right)
    }

    /// Link a freshly split sibling into this parent.
    ///
    /// `median` lands at key slot `idx` and `right` at child slot `idx + 1`;
    /// the existing keys and children from those slots on shift right by one.
    pub fn insert_split(&mut self, idx: usize, median: Key, right: NodeId) {
        debug_assert!(!self.leaf);
        debug_assert!(!self.is_full(), "split target parent is full");
        debug_assert!(idx <= self.count);

        self.children.copy_within(idx + 1..=self.count, idx + 2);
        self.children[idx + 1] = right;
        self.keys.copy_within(idx..self.count, idx + 1);
        self.keys[idx] = median;
        self.count += 1;
    }

    /// Prepend a key and, for internal nodes, a child
    pub fn push_front(&mut self, key: Key, child: Option<NodeId>) {
        debug_assert!(!self.is_full());
        debug_assert_eq!(child.is_some(), !self.leaf);

        self.keys.copy_within(0..self.count, 1);
        self.keys[0] = key;
        if let Some(child) = child {
            self.children.copy_within(0..=self.count, 1);
            self.children[0] = child;
        }
        self.count += 1;
    }

    /// Append a key and, for internal nodes, a child
    pub fn push_back(&mut self, key: Key, child: Option<NodeId>) {
        debug_assert!(!self.is_full());
        debug_assert_eq!(child.is_some(), !self.leaf);

        self.keys[self.count] = key;
        if let Some(child) = child {
            self.children[self.count + 1] = child;
        }
        self.count += 1;
    }

    /// Remove the first key and, for internal nodes, the first child
    pub fn pop_front(&mut self) -> (Key, Option<NodeId>) {
        debug_assert!(!self.is_empty());

        let key = self.keys[0];
        self.keys.copy_within(1..self.count, 0);
        let child = if self.leaf {
            None
        } else {
            let child = self.children[0];
            self.children.copy_within(1..=self.count, 0);
            self.children[self.count] = NodeId::INVALID;
            Some(child)
        };
        self.count -= 1;
        (key, child)
    }

    /// Remove the last key and, for internal nodes, the last child
    pub fn pop_back(&mut self) -> (Key, Option<NodeId>) {
        debug_assert!(!self.is_empty());

        let key = self.keys[self.count - 1];
        let child = if self.leaf {
            None
        } else {
            let child = self.children[self.count];
            self.children[self.count] = NodeId::INVALID;
            Some(child)
        };
        self.count -= 1;
        (key, child)
    }

    /// Remove separator `keys[idx]` together with the child to its right.
    ///
    /// This is the parent half of a merge of `children[idx]` and `children[idx + 1]`.
    pub fn remove_separator(&mut self, idx: usize) -> (Key, NodeId) {
        debug_assert!(!self.leaf);
        debug_assert!(idx < self.count);

        let key = self.keys[idx];
        let right = self.children[idx + 1];
        self.keys.copy_within(idx + 1..self.count, idx);
        self.children.copy_within(idx + 2..=self.count, idx + 1);
        self.children[self.count] = NodeId::INVALID;
        self.count -= 1;
        (key, right)
    }

    /// Append `separator` and all of `right`'s keys and children.
    ///
    /// This is the child half of a merge; `right` is consumed.
    pub fn absorb(&mut self, separator: Key, right: Node) {
        debug_assert_eq!(self.leaf, right.leaf, "merging nodes of different levels");
        debug_assert!(
            self.count + right.count < self.capacity(),
            "merge of {} + {} keys overflows capacity {}",
            self.count,
            right.count,
            self.capacity()
        );

        let start = self.count + 1;
        self.keys[self.count] = separator;
        self.keys[start..start + right.count].copy_from_slice(right.keys());
        if !self.leaf {
            self.children[start..=start + right.count].copy_from_slice(right.children());
        }
        self.count += right.count + 1;
    }
}
