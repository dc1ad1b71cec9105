//! In-order iteration.
//!
//! The iterator keeps a stack of `(node_id, slot)` pairs describing the path
//! from the root to the next key. Each step yields `keys[slot]` of the top
//! node and, for internal nodes, descends to the leftmost leaf of the child
//! to its right.

use crate::arena::NodeArena;
use crate::types::{Key, NodeId};

/// Lazy in-order iterator over the keys of a [`BTree`](super::BTree)
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    /// Node storage of the tree being walked
    arena: &'a NodeArena,
    /// Path to the next key: node and next key slot in that node
    stack: Vec<(NodeId, usize)>,
    /// Keys not yet yielded
    remaining: usize,
}

impl<'a> Iter<'a> {
    pub(crate) fn new(arena: &'a NodeArena, root: Option<NodeId>, len: usize) -> Self {
        let mut iter = Self {
            arena,
            stack: Vec::new(),
            remaining: len,
        };
        if let Some(root) = root {
            iter.descend_to_leftmost(root);
        }
        iter
    }

    /// Push the path from `id` down to its leftmost leaf
    fn descend_to_leftmost(&mut self, id: NodeId) {
        let arena = self.arena;
        let mut current = id;

        loop {
            self.stack.push((current, 0));
            let node = &arena[current];
            if node.is_leaf() {
                return;
            }
            current = node.child(0);
        }
    }
}

impl Iterator for Iter<'_> {
    type Item = Key;

    fn next(&mut self) -> Option<Key> {
        let arena = self.arena;

        loop {
            let (id, slot) = *self.stack.last()?;
            let node = &arena[id];

            if slot < node.len() {
                if let Some(top) = self.stack.last_mut() {
                    top.1 = slot + 1;
                }
                if !node.is_leaf() {
                    self.descend_to_leftmost(node.child(slot + 1));
                }
                self.remaining = self.remaining.saturating_sub(1);
                return Some(node.key(slot));
            }

            // Node exhausted, resume in the parent
            self.stack.pop();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl std::iter::FusedIterator for Iter<'_> {}
