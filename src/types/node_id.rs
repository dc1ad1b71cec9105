//! Node identifier type.

use std::fmt;

/// Stable index of a node slot in the arena.
///
/// Ids stay valid until the node is released; a released id may be handed
/// out again by a later allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Invalid node ID, used to fill unoccupied child slots
    pub const INVALID: NodeId = NodeId(u32::MAX);

    /// Create a new node ID
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw node ID value
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Check if this is a valid node ID
    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }

    /// Slot position in the arena
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            write!(f, "INVALID")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl From<u32> for NodeId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<NodeId> for u32 {
    fn from(id: NodeId) -> Self {
        id.0
    }
}
