//! Free list management.
//!
//! Tracks released node slots so that later allocations reuse them instead
//! of growing the arena.

use crate::types::NodeId;

/// Stack of released node slots
#[derive(Debug, Default)]
pub struct FreeList {
    /// Released slot IDs, most recent last
    slots: Vec<NodeId>,
}

impl FreeList {
    /// Create a new empty free list
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Add a released slot to the free list
    pub fn push(&mut self, id: NodeId) {
        self.slots.push(id);
    }

    /// Take the most recently released slot, if any
    pub fn pop(&mut self) -> Option<NodeId> {
        self.slots.pop()
    }

    /// Get the number of free slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if the free list is empty
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Forget every tracked slot
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}
