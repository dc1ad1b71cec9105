//! Arena layer: node storage addressed by [`NodeId`].
//!
//! The tree never holds references to nodes, only ids. Parents own their
//! children by listing their ids; the arena owns the node values. Released
//! slots go onto a free list and are handed out again by later allocations.

mod freelist;

pub use freelist::FreeList;

use crate::node::Node;
use crate::types::NodeId;
use std::ops::{Index, IndexMut};

/// Slab of B-tree nodes
#[derive(Debug, Default)]
pub struct NodeArena {
    /// Node slots; `None` marks a released slot
    slots: Vec<Option<Node>>,
    /// Released slots available for reuse
    free: FreeList,
}

impl NodeArena {
    /// Create an empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a node and return its id
    pub fn alloc(&mut self, node: Node) -> NodeId {
        if let Some(id) = self.free.pop() {
            debug_assert!(self.slots[id.index()].is_none());
            self.slots[id.index()] = Some(node);
            return id;
        }

        let id = NodeId::new(self.slots.len() as u32);
        debug_assert!(id.is_valid(), "node arena exhausted");
        self.slots.push(Some(node));
        id
    }

    /// Remove a node from the arena and return it.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not name a live node.
    pub fn release(&mut self, id: NodeId) -> Node {
        match self.slots.get_mut(id.index()).and_then(Option::take) {
            Some(node) => {
                self.free.push(id);
                node
            }
            None => panic!("release of dead node {}", id),
        }
    }

    /// Look up a live node
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    /// Look up a live node mutably
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Check if no node is live
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of released slots waiting for reuse
    pub fn free_slots(&self) -> usize {
        self.free.len()
    }

    /// Drop every node and slot
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }
}

impl Index<NodeId> for NodeArena {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        match self.get(id) {
            Some(node) => node,
            None => panic!("access to dead node {}", id),
        }
    }
}

impl IndexMut<NodeId> for NodeArena {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        match self.get_mut(id) {
            Some(node) => node,
            None => panic!("access to dead node {}", id),
        }
    }
}
